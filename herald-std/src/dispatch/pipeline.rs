//! Chain composition.

use futures::future::BoxFuture;
use herald_core::{
    BoxError, Cancelled, DynPipelineBehavior, DynRequestHandler, ItemStream, Next, Request,
    StreamNext, StreamPipelineBehavior, StreamRequest, StreamRequestHandler,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs `behaviors` in order around `handler`, the first one outermost.
pub(crate) fn run_chain<'a, R: Request>(
    behaviors: &'a [Arc<dyn DynPipelineBehavior<R>>],
    handler: &'a dyn DynRequestHandler<R>,
    request: &'a R,
    cancel: &'a CancellationToken,
) -> BoxFuture<'a, Result<R::Response, BoxError>> {
    match behaviors.split_first() {
        Some((behavior, rest)) => {
            let next = Next::new(move || run_chain(rest, handler, request, cancel));
            behavior.handle_dyn(request, next, cancel)
        }
        None => {
            if cancel.is_cancelled() {
                return Box::pin(async { Err(Box::new(Cancelled) as BoxError) });
            }
            handler.handle_dyn(request, cancel)
        }
    }
}

/// Stream counterpart of [`run_chain`]. Builds the stream lazily, stage by
/// stage, as each behavior calls its continuation.
pub(crate) fn run_stream_chain<R: StreamRequest>(
    behaviors: Arc<[Arc<dyn StreamPipelineBehavior<R>>]>,
    index: usize,
    handler: Arc<dyn StreamRequestHandler<R>>,
    request: Arc<R>,
    cancel: CancellationToken,
) -> ItemStream<R::Item> {
    match behaviors.get(index).cloned() {
        Some(behavior) => {
            let next = {
                let request = Arc::clone(&request);
                let cancel = cancel.clone();
                StreamNext::new(move || {
                    run_stream_chain(behaviors, index + 1, handler, request, cancel)
                })
            };
            behavior.handle(request, next, cancel)
        }
        None => handler.handle(request, cancel),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::{PipelineBehavior, RequestHandler};
    use parking_lot::Mutex;

    struct Ping;
    impl Request for Ping {
        type Response = &'static str;
    }

    struct Pong;

    impl RequestHandler<Ping> for Pong {
        async fn handle(&self, _request: &Ping, _cancel: &CancellationToken) -> Result<&'static str, BoxError> {
            Ok("pong")
        }
    }

    struct Trace {
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl PipelineBehavior<Ping> for Trace {
        async fn handle(
            &self,
            _request: &Ping,
            next: Next<'_, Ping>,
            _cancel: &CancellationToken,
        ) -> Result<&'static str, BoxError> {
            self.log.lock().push(self.label);
            let response = next.run().await;
            self.log.lock().push(self.label);
            response
        }
    }

    #[tokio::test]
    async fn test_first_behavior_is_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let behaviors: Vec<Arc<dyn DynPipelineBehavior<Ping>>> = vec![
            Arc::new(Trace { label: "outer", log: log.clone() }),
            Arc::new(Trace { label: "inner", log: log.clone() }),
        ];
        let cancel = CancellationToken::new();
        let response = run_chain(&behaviors, &Pong, &Ping, &cancel).await.unwrap();
        assert_eq!(response, "pong");
        assert_eq!(*log.lock(), ["outer", "inner", "inner", "outer"]);
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_before_handler() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = run_chain(&[], &Pong, &Ping, &cancel).await.unwrap_err();
        assert!(err.is::<Cancelled>());
    }
}
