use futures::future::join_all;
use herald_core::{AggregateError, BoxError, Cancelled, HandlerExecutor, NotificationPublisher};
use std::any::Any;
use tokio_util::sync::CancellationToken;

/// Starts every handler at once and waits for all of them.
///
/// A single failure is returned unchanged; several are combined into an
/// [`AggregateError`] in handler order.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConcurrentPublisher;

impl NotificationPublisher for ConcurrentPublisher {
    async fn publish<'a>(
        &'a self,
        executors: Vec<HandlerExecutor<'a>>,
        _notification: &'a (dyn Any + Send + Sync),
        cancel: &'a CancellationToken,
    ) -> Result<(), BoxError> {
        if cancel.is_cancelled() {
            return Err(Box::new(Cancelled));
        }

        let results = join_all(executors.into_iter().map(HandlerExecutor::call)).await;
        let mut errors: Vec<BoxError> = results.into_iter().filter_map(Result::err).collect();

        if errors.len() > 1 {
            tracing::debug!(failures = errors.len(), "notification handlers failed");
            return Err(Box::new(AggregateError::new(errors)));
        }
        match errors.pop() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
