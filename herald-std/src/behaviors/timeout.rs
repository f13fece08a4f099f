//! Timeout behavior for time-limited requests.

use herald_core::{BoxError, ErasedResponse, OpenBehavior, OpenNext, RequestInfo};
use std::{any::Any, time::Duration};
use thiserror::Error;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// Error returned when a request exceeds its time limit.
///
/// This is a domain error: exception handlers may recover it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("request timed out after {0:?}")]
pub struct TimeoutError(pub Duration);

/// Fails any request that runs longer than the configured duration.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutBehavior {
    duration: Duration,
}

impl TimeoutBehavior {
    /// Create a new timeout behavior.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl OpenBehavior for TimeoutBehavior {
    async fn handle(
        &self,
        info: RequestInfo,
        _request: &(dyn Any + Send + Sync),
        next: OpenNext<'_>,
        _cancel: &CancellationToken,
    ) -> Result<ErasedResponse, BoxError> {
        match timeout(self.duration, next.run()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(request = info.short_name(), duration = ?self.duration, "request timed out");
                Err(Box::new(TimeoutError(self.duration)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_slow_request_times_out() {
        let behavior = TimeoutBehavior::new(Duration::from_millis(10));
        let cancel = CancellationToken::new();
        let next = OpenNext::new(|| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(Box::new(()) as ErasedResponse)
            })
        });
        let err = behavior
            .handle(RequestInfo::of::<()>(), &(), next, &cancel)
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<TimeoutError>(),
            Some(&TimeoutError(Duration::from_millis(10)))
        );
    }
}
