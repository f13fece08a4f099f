use herald_core::{BoxError, Cancelled, HandlerExecutor, NotificationPublisher};
use std::any::Any;
use tokio_util::sync::CancellationToken;

/// Awaits each handler before starting the next.
///
/// The first failure aborts the remaining handlers and is returned. The
/// cancellation token is checked before every handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialPublisher;

impl NotificationPublisher for SequentialPublisher {
    async fn publish<'a>(
        &'a self,
        executors: Vec<HandlerExecutor<'a>>,
        _notification: &'a (dyn Any + Send + Sync),
        cancel: &'a CancellationToken,
    ) -> Result<(), BoxError> {
        for executor in executors {
            if cancel.is_cancelled() {
                return Err(Box::new(Cancelled));
            }
            let name = executor.name();
            if let Err(error) = executor.call().await {
                tracing::debug!(handler = name, %error, "notification handler failed");
                return Err(error);
            }
        }
        Ok(())
    }
}
