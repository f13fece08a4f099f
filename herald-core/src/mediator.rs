//! The mediator capability set.
//!
//! A mediator is anything that can send requests, publish notifications and
//! create streams. Custom mediators implement the three traits; [`Mediator`]
//! then applies automatically, so a type missing one capability is rejected at
//! compile time.

use crate::{
    error::MediatorError,
    message::{Notification, Request, StreamRequest},
};
use futures::stream::BoxStream;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// A stream of items produced by [`StreamSender::create_stream`].
pub type ResponseStream<T> = BoxStream<'static, Result<T, MediatorError>>;

/// Sends a request to its single handler.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot send requests",
    label = "missing `Sender` implementation"
)]
pub trait Sender: Send + Sync {
    /// Dispatches `request` through its pipeline and returns the response.
    fn send<R: Request>(
        &self,
        request: R,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<R::Response, MediatorError>> + Send;
}

/// Broadcasts a notification to every bound handler.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot publish notifications",
    label = "missing `Publisher` implementation"
)]
pub trait Publisher: Send + Sync {
    /// Hands the notification's handlers to the configured publishing
    /// strategy.
    fn publish<N: Notification>(
        &self,
        notification: N,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), MediatorError>> + Send;
}

/// Creates the item stream of a stream request.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot create streams",
    label = "missing `StreamSender` implementation"
)]
pub trait StreamSender: Send + Sync {
    /// Resolves the stream handler and wraps its stream in the stream
    /// behaviors.
    ///
    /// Configuration errors are reported here, before any item is produced.
    fn create_stream<R: StreamRequest>(
        &self,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<ResponseStream<R::Item>, MediatorError>;
}

/// The full mediator capability set.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a mediator",
    label = "must implement `Sender`, `Publisher` and `StreamSender`"
)]
pub trait Mediator: Sender + Publisher + StreamSender {}

impl<T: Sender + Publisher + StreamSender> Mediator for T {}
