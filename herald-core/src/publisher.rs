//! # Notification publishing strategies
//!
//! The dispatcher resolves every handler bound to a notification type and
//! hands them to a [`NotificationPublisher`] as [`HandlerExecutor`]s. The
//! strategy alone decides ordering, parallelism and how failures combine.

use crate::error::BoxError;
use futures::future::BoxFuture;
use std::{any::Any, future::Future};
use tokio_util::sync::CancellationToken;

/// One notification handler, ready to be invoked.
pub struct HandlerExecutor<'a> {
    name: &'static str,
    run: Box<dyn FnOnce() -> BoxFuture<'a, Result<(), BoxError>> + Send + 'a>,
}

impl<'a> HandlerExecutor<'a> {
    /// Wraps a deferred handler invocation.
    pub fn new<F>(name: &'static str, run: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'a, Result<(), BoxError>> + Send + 'a,
    {
        Self {
            name,
            run: Box::new(run),
        }
    }

    /// Type name of the wrapped handler.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Starts the handler.
    pub fn call(self) -> BoxFuture<'a, Result<(), BoxError>> {
        (self.run)()
    }
}

impl std::fmt::Debug for HandlerExecutor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerExecutor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Fan-out strategy for notifications.
///
/// Receives the handlers in resolution order. An empty list is valid and must
/// complete successfully.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a notification publisher",
    label = "missing `NotificationPublisher` implementation"
)]
pub trait NotificationPublisher: Send + Sync + 'static {
    /// Invokes the handlers for one notification.
    fn publish<'a>(
        &'a self,
        executors: Vec<HandlerExecutor<'a>>,
        notification: &'a (dyn Any + Send + Sync),
        cancel: &'a CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send + 'a;
}

/// Dynamic object-safe version of [`NotificationPublisher`].
pub trait DynNotificationPublisher: Send + Sync + 'static {
    /// Invokes the handlers for one notification (dynamic dispatch version).
    fn publish_dyn<'a>(
        &'a self,
        executors: Vec<HandlerExecutor<'a>>,
        notification: &'a (dyn Any + Send + Sync),
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}

impl<T: NotificationPublisher> DynNotificationPublisher for T {
    fn publish_dyn<'a>(
        &'a self,
        executors: Vec<HandlerExecutor<'a>>,
        notification: &'a (dyn Any + Send + Sync),
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(self.publish(executors, notification, cancel))
    }
}
