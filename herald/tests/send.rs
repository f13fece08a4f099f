//! Request/response dispatch through `Sender::send`.

use herald::{
    BoxError, CancellationToken, MediatorError, Registry, Request, RequestHandler, ResolveError,
    Sender, testing::RecordingHandler,
};
use std::time::SystemTime;

mod common;
use common::{Ping, PingError, PingHandler, Pong, VoidCommand, mediator};

#[derive(Clone, Debug)]
struct ResponseCommand;

impl Request for ResponseCommand {
    type Response = Response;
}

#[derive(Debug)]
struct Response {
    time: SystemTime,
}

struct ResponseCommandHandler;

impl RequestHandler<ResponseCommand> for ResponseCommandHandler {
    async fn handle(
        &self,
        _request: &ResponseCommand,
        _cancel: &CancellationToken,
    ) -> Result<Response, BoxError> {
        Ok(Response {
            time: SystemTime::now(),
        })
    }
}

#[tokio::test]
async fn test_single_handler_result_is_returned_unmodified() {
    let mediator = mediator(Registry::builder().request_handler::<Ping, _>(PingHandler));

    let pong = mediator
        .send(Ping::new("Ping"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        pong,
        Pong {
            message: "Ping Pong".to_string()
        }
    );
}

#[tokio::test]
async fn test_response_is_produced_during_the_call() {
    let mediator =
        mediator(Registry::builder().request_handler::<ResponseCommand, _>(ResponseCommandHandler));

    let before = SystemTime::now();
    let response = mediator
        .send(ResponseCommand, &CancellationToken::new())
        .await
        .unwrap();
    let after = SystemTime::now();

    assert!(response.time >= before);
    assert!(response.time <= after);
}

#[tokio::test]
async fn test_missing_handler_is_misconfiguration() {
    let mediator = mediator(Registry::builder());

    let err = mediator
        .send(Ping::new("Ping"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_handler_not_found());
    assert!(err.is_misconfigured());
    assert!(err.to_string().contains("handler not found"));
}

#[tokio::test]
async fn test_two_handlers_for_one_request_is_ambiguous() {
    let mediator = mediator(
        Registry::builder()
            .request_handler::<Ping, _>(PingHandler)
            .request_handler::<Ping, _>(PingHandler),
    );

    let err = mediator
        .send(Ping::new("Ping"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MediatorError::Misconfigured(ResolveError::Ambiguous { count: 2, .. })
    ));
}

#[tokio::test]
async fn test_void_request_completes_with_unit() {
    let handler = RecordingHandler::<VoidCommand>::new(());
    let mediator = mediator(Registry::builder().request_handler::<VoidCommand, _>(handler.clone()));

    mediator
        .send(VoidCommand, &CancellationToken::new())
        .await
        .unwrap();
    mediator
        .send(VoidCommand, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(handler.count(), 2);
}

#[tokio::test]
async fn test_domain_error_propagates_with_its_type() {
    struct Failing;

    impl RequestHandler<Ping> for Failing {
        async fn handle(&self, request: &Ping, _cancel: &CancellationToken) -> Result<Pong, BoxError> {
            Err(PingError(request.message.clone()).into())
        }
    }

    let mediator = mediator(Registry::builder().request_handler::<Ping, _>(Failing));

    let err = mediator
        .send(Ping::new("boom"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(!err.is_misconfigured());
    assert_eq!(err.downcast_ref::<PingError>().unwrap().0, "boom");
    assert_eq!(err.to_string(), "ping failed: boom");
}

#[tokio::test]
async fn test_cancelled_token_aborts_before_handler() {
    let handler = RecordingHandler::<Ping>::new(Pong {
        message: "unused".to_string(),
    });
    let mediator = mediator(Registry::builder().request_handler::<Ping, _>(handler.clone()));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = mediator.send(Ping::new("Ping"), &cancel).await.unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(handler.count(), 0);
}

#[tokio::test]
async fn test_recording_handler_sees_the_request() {
    let handler = RecordingHandler::<Ping>::new(Pong {
        message: "fixed".to_string(),
    });
    let mediator = mediator(Registry::builder().request_handler::<Ping, _>(handler.clone()));

    let pong = mediator
        .send(Ping::new("first"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(pong.message, "fixed");
    assert_eq!(handler.requests(), vec![Ping::new("first")]);
}
