//! Testing utilities for Herald.
//!
//! Test doubles for verifying what the mediator dispatched.
//!
//! # Features
//!
//! - [`RecordingHandler`]: A request handler that records requests and returns a fixed response
//! - [`RecordingNotificationHandler`]: A notification handler that records what it receives
//! - [`FailingHandler`]: A request handler that always fails with a given message
//! - [`CountingBehavior`]: An open behavior counting every request it wraps

use herald_core::{
    BoxError, ErasedResponse, Notification, NotificationHandler, OpenBehavior, OpenNext, Request,
    RequestHandler, RequestInfo,
};
use parking_lot::Mutex;
use std::{
    any::Any,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Recording Handler
// ============================================================================

/// A request handler that records every request and answers with a clone of
/// a fixed response.
///
/// Clones share the recording, so keep one clone for assertions.
///
/// # Example
///
/// ```rust,ignore
/// let handler = RecordingHandler::<Ping>::new("pong".to_string());
/// let registry = Registry::builder().request_handler::<Ping, _>(handler.clone());
///
/// mediator.send(Ping, &cancel).await?;
/// assert_eq!(handler.count(), 1);
/// ```
pub struct RecordingHandler<R: Request> {
    requests: Arc<Mutex<Vec<R>>>,
    response: R::Response,
}

impl<R: Request> RecordingHandler<R>
where
    R::Response: Clone,
{
    /// Create a handler answering with `response`.
    pub fn new(response: R::Response) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            response,
        }
    }
}

impl<R: Request + Clone> RecordingHandler<R> {
    /// Get a clone of the recorded requests.
    pub fn requests(&self) -> Vec<R> {
        self.requests.lock().clone()
    }
}

impl<R: Request> RecordingHandler<R> {
    /// Get the number of recorded requests.
    pub fn count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Clear all recorded requests.
    pub fn clear(&self) {
        self.requests.lock().clear();
    }
}

impl<R: Request> Clone for RecordingHandler<R>
where
    R::Response: Clone,
{
    fn clone(&self) -> Self {
        Self {
            requests: self.requests.clone(),
            response: self.response.clone(),
        }
    }
}

impl<R: Request + Clone> RequestHandler<R> for RecordingHandler<R>
where
    R::Response: Clone,
{
    async fn handle(&self, request: &R, _cancel: &CancellationToken) -> Result<R::Response, BoxError> {
        self.requests.lock().push(request.clone());
        Ok(self.response.clone())
    }
}

// ============================================================================
// Recording Notification Handler
// ============================================================================

/// A notification handler that records every notification it receives.
pub struct RecordingNotificationHandler<N> {
    notifications: Arc<Mutex<Vec<N>>>,
}

impl<N: Clone> RecordingNotificationHandler<N> {
    /// Create a new recording handler.
    pub fn new() -> Self {
        Self {
            notifications: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get a clone of the recorded notifications.
    pub fn notifications(&self) -> Vec<N> {
        self.notifications.lock().clone()
    }

    /// Get the number of recorded notifications.
    pub fn count(&self) -> usize {
        self.notifications.lock().len()
    }
}

impl<N: Clone> Default for RecordingNotificationHandler<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Clone for RecordingNotificationHandler<N> {
    fn clone(&self) -> Self {
        Self {
            notifications: self.notifications.clone(),
        }
    }
}

impl<N: Notification + Clone> NotificationHandler<N> for RecordingNotificationHandler<N> {
    async fn handle(&self, notification: &N, _cancel: &CancellationToken) -> Result<(), BoxError> {
        self.notifications.lock().push(notification.clone());
        Ok(())
    }
}

// ============================================================================
// Failing Handler
// ============================================================================

/// A request handler that always fails with the given message.
#[derive(Debug, Clone)]
pub struct FailingHandler {
    message: String,
}

impl FailingHandler {
    /// Create a handler failing with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl<R: Request> RequestHandler<R> for FailingHandler {
    async fn handle(&self, _request: &R, _cancel: &CancellationToken) -> Result<R::Response, BoxError> {
        Err(self.message.clone().into())
    }
}

// ============================================================================
// Counting Behavior
// ============================================================================

/// An open behavior counting every request it wraps, whatever the outcome.
#[derive(Debug, Clone, Default)]
pub struct CountingBehavior {
    count: Arc<AtomicUsize>,
}

impl CountingBehavior {
    /// Create a new counting behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests seen so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl OpenBehavior for CountingBehavior {
    async fn handle(
        &self,
        _info: RequestInfo,
        _request: &(dyn Any + Send + Sync),
        next: OpenNext<'_>,
        _cancel: &CancellationToken,
    ) -> Result<ErasedResponse, BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        next.run().await
    }
}
