#![cfg(feature = "macros")]
//! Derives and function handlers.

use futures::TryStreamExt;
use herald::{
    BoxError, CancellationToken, Notification, Publisher, Registry, Request, Sender,
    StreamRequest, StreamRequestHandler, StreamSender, handler, subscribe,
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

mod common;
use common::mediator;

#[derive(Debug, Request)]
#[request(response = String)]
struct Greet {
    name: String,
}

#[derive(Debug, Request)]
struct Forget;

#[derive(Debug, Notification)]
struct Greeted;

#[derive(Debug, StreamRequest)]
#[stream(item = u8)]
struct Letters(&'static str);

#[handler]
async fn greet(request: &Greet) -> Result<String, BoxError> {
    Ok(format!("hello {}", request.name))
}

#[handler(name = "ForgetHandler")]
async fn forget(_request: &Forget, cancel: &CancellationToken) -> Result<(), std::io::Error> {
    if cancel.is_cancelled() {
        return Err(std::io::Error::other("cancelled"));
    }
    Ok(())
}

static GREETED: AtomicUsize = AtomicUsize::new(0);

#[subscribe]
async fn count_greeted(_notification: &Greeted) {
    GREETED.fetch_add(1, Ordering::SeqCst);
}

struct Bytes;

impl StreamRequestHandler<Letters> for Bytes {
    fn handle(
        &self,
        request: Arc<Letters>,
        _cancel: CancellationToken,
    ) -> herald::ItemStream<u8> {
        use futures::StreamExt;
        futures::stream::iter(request.0.bytes().map(Ok)).boxed()
    }
}

#[tokio::test]
async fn test_derived_request_and_function_handler() {
    let mediator = mediator(Registry::builder().request_handler::<Greet, _>(greet));

    let greeting = mediator
        .send(
            Greet {
                name: "herald".to_string(),
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(greeting, "hello herald");
}

#[tokio::test]
async fn test_renamed_handler_with_cancel_and_unit_response() {
    let mediator = mediator(Registry::builder().request_handler::<Forget, _>(ForgetHandler));

    let () = mediator
        .send(Forget, &CancellationToken::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_subscribe_without_return_type() {
    let mediator = mediator(Registry::builder().notification_handler::<Greeted, _>(count_greeted));

    mediator
        .publish(Greeted, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(GREETED.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_derived_stream_request() {
    let mediator = mediator(Registry::builder().stream_handler::<Letters, _>(Bytes));

    let bytes: Vec<u8> = mediator
        .create_stream(Letters("ab"), &CancellationToken::new())
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(bytes, b"ab".to_vec());
}

#[cfg(feature = "inventory")]
mod auto_bound {
    use herald::{
        BoxError, CancellationToken, HandlerCategories, MediatorConfig, Registry, Request, Sender,
        handler,
    };

    #[derive(Debug, Request)]
    #[request(response = u32)]
    struct Answer;

    #[handler(auto_bind)]
    async fn answer(_request: &Answer) -> Result<u32, BoxError> {
        Ok(42)
    }

    #[tokio::test]
    async fn test_auto_bound_handler_is_registered_by_category() {
        let mediator = MediatorConfig::builder()
            .with_handler_categories(HandlerCategories::REQUEST_HANDLERS)
            .build()
            .build(Registry::builder());

        let value = mediator
            .send(Answer, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    #[derive(Debug, Request)]
    struct Chime;

    #[handler(auto_bind)]
    async fn chime(_request: &Chime) -> Result<(), BoxError> {
        Ok(())
    }

    #[tokio::test]
    async fn test_manual_request_handlers_keep_unit_handlers_bound() {
        let mediator = MediatorConfig::builder()
            .with_request_handlers_manually_registered()
            .build()
            .build(Registry::builder());

        mediator
            .send(Chime, &CancellationToken::new())
            .await
            .unwrap();
        let err = mediator
            .send(Answer, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_handler_not_found());
    }

    #[tokio::test]
    async fn test_auto_binding_is_skipped_without_its_category() {
        let mediator = MediatorConfig::default().build(Registry::builder());

        let err = mediator
            .send(Answer, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_handler_not_found());
    }
}
