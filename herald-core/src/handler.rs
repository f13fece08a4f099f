//! # Terminal handlers
//!
//! Handlers are the endpoint of a dispatch, where business logic executes.
//!
//! - [`RequestHandler`] - exactly one per request type, produces the response
//! - [`NotificationHandler`] - zero or more per notification type
//! - [`StreamRequestHandler`] - exactly one per stream request type
//!
//! # Static vs Dynamic Dispatch
//!
//! The handler traits use native `async fn` for zero-cost static dispatch.
//! Registries store their object-safe companions ([`DynRequestHandler`],
//! [`DynNotificationHandler`]), which every handler implements automatically.

use crate::{
    error::BoxError,
    message::{Notification, Request, StreamRequest},
};
use futures::{future::BoxFuture, stream::BoxStream};
use std::{future::Future, sync::Arc};
use tokio_util::sync::CancellationToken;

/// Handles one request type and produces its response.
///
/// # Example
///
/// ```rust,ignore
/// struct PingHandler;
///
/// impl RequestHandler<Ping> for PingHandler {
///     async fn handle(&self, request: &Ping, _cancel: &CancellationToken) -> Result<String, BoxError> {
///         Ok(format!("pong: {}", request.0))
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle requests of type `{R}`",
    label = "missing `RequestHandler<{R}>` implementation",
    note = "Request handlers must implement `handle` for the request type `{R}`."
)]
pub trait RequestHandler<R: Request>: Send + Sync + 'static {
    /// Handles the request.
    fn handle(
        &self,
        request: &R,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<R::Response, BoxError>> + Send;
}

/// Dynamic object-safe version of [`RequestHandler`].
pub trait DynRequestHandler<R: Request>: Send + Sync + 'static {
    /// Handles the request (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        request: &'a R,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<R::Response, BoxError>>;

    /// Type name of the concrete handler, for diagnostics.
    fn name(&self) -> &'static str;
}

impl<R: Request, T: RequestHandler<R>> DynRequestHandler<R> for T {
    fn handle_dyn<'a>(
        &'a self,
        request: &'a R,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<R::Response, BoxError>> {
        Box::pin(self.handle(request, cancel))
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Reacts to a broadcast notification.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle notifications of type `{N}`",
    label = "missing `NotificationHandler<{N}>` implementation",
    note = "Notification handlers must implement `handle` for the notification type `{N}`."
)]
pub trait NotificationHandler<N: Notification>: Send + Sync + 'static {
    /// Handles the notification.
    fn handle(
        &self,
        notification: &N,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`NotificationHandler`].
pub trait DynNotificationHandler<N: Notification>: Send + Sync + 'static {
    /// Handles the notification (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        notification: &'a N,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>>;

    /// Type name of the concrete handler, for diagnostics.
    fn name(&self) -> &'static str;
}

impl<N: Notification, T: NotificationHandler<N>> DynNotificationHandler<N> for T {
    fn handle_dyn<'a>(
        &'a self,
        notification: &'a N,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(self.handle(notification, cancel))
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Produces the item stream for one stream request type.
///
/// The request is shared through an `Arc` because the stream may outlive the
/// call that created it. This trait is already object-safe.
pub trait StreamRequestHandler<R: StreamRequest>: Send + Sync + 'static {
    /// Starts the stream.
    fn handle(
        &self,
        request: Arc<R>,
        cancel: CancellationToken,
    ) -> BoxStream<'static, Result<R::Item, BoxError>>;
}
