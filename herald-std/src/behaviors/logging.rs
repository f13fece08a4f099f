//! Logging behavior for request observation.

use herald_core::{BoxError, ErasedResponse, OpenBehavior, OpenNext, RequestInfo};
use std::{any::Any, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Wraps every request in an `info` span and logs its outcome and duration.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingBehavior;

impl OpenBehavior for LoggingBehavior {
    async fn handle(
        &self,
        info: RequestInfo,
        _request: &(dyn Any + Send + Sync),
        next: OpenNext<'_>,
        _cancel: &CancellationToken,
    ) -> Result<ErasedResponse, BoxError> {
        let span = tracing::info_span!("request", name = info.short_name());

        async move {
            let started = Instant::now();
            let result = next.run().await;
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            match &result {
                Ok(_) => tracing::info!(elapsed_ms, "request handled"),
                Err(error) => tracing::warn!(elapsed_ms, %error, "request failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}
