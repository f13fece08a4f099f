//! Pre- and post-processors.
//!
//! Processors are behavior variants that run strictly before or after the
//! terminal handler. They are expected to be simple: their failures are
//! never offered to exception handlers.

use crate::{error::BoxError, message::Request};
use futures::future::BoxFuture;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Runs before the request's handler.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a pre-processor for `{R}`",
    label = "missing `RequestPreProcessor<{R}>` implementation"
)]
pub trait RequestPreProcessor<R: Request>: Send + Sync + 'static {
    /// Inspects the request before it is handled.
    fn process(
        &self,
        request: &R,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`RequestPreProcessor`].
pub trait DynRequestPreProcessor<R: Request>: Send + Sync + 'static {
    /// Inspects the request before it is handled (dynamic dispatch version).
    fn process_dyn<'a>(
        &'a self,
        request: &'a R,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}

impl<R: Request, T: RequestPreProcessor<R>> DynRequestPreProcessor<R> for T {
    fn process_dyn<'a>(
        &'a self,
        request: &'a R,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(self.process(request, cancel))
    }
}

/// Runs after the request's handler with the final response.
///
/// When an exception handler substituted a response, post-processors see the
/// substitute.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a post-processor for `{R}`",
    label = "missing `RequestPostProcessor<{R}>` implementation"
)]
pub trait RequestPostProcessor<R: Request>: Send + Sync + 'static {
    /// Inspects the request and its response.
    fn process(
        &self,
        request: &R,
        response: &R::Response,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`RequestPostProcessor`].
pub trait DynRequestPostProcessor<R: Request>: Send + Sync + 'static {
    /// Inspects the request and its response (dynamic dispatch version).
    fn process_dyn<'a>(
        &'a self,
        request: &'a R,
        response: &'a R::Response,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}

impl<R: Request, T: RequestPostProcessor<R>> DynRequestPostProcessor<R> for T {
    fn process_dyn<'a>(
        &'a self,
        request: &'a R,
        response: &'a R::Response,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(self.process(request, response, cancel))
    }
}
