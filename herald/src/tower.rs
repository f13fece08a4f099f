//! Tower integration for herald.
//!
//! This module provides adapters between the mediator and tower's `Service`
//! trait:
//!
//! - [`MediatorService`] exposes `send` for one request type as a `Service`,
//!   so tower middleware (rate limiting, load shedding, buffering) can sit in
//!   front of the mediator.
//! - [`ServiceHandler`] uses an existing `Service` as the handler of a request
//!   type.
//!
//! # Example
//!
//! ```rust,ignore
//! use herald::tower::{MediatorService, ServiceHandler};
//!
//! // Mediator as a Service
//! let service = MediatorService::<_, Ping>::new(Arc::new(mediator));
//!
//! // Service as a handler
//! let registry = Registry::builder().request_handler::<Ping, _>(ServiceHandler::new(my_service));
//! ```

use crate::{BoxError, MediatorError, Request, RequestHandler, Sender};
use std::{
    future::Future,
    marker::PhantomData,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tokio_util::sync::CancellationToken;
use tower::{Service, ServiceExt};

// ============================================================================
// Mediator → Service Adapter
// ============================================================================

/// Exposes a mediator's `send` for request type `R` as a tower `Service`.
///
/// Every call shares the service's cancellation token; cancelling it aborts
/// all calls in flight.
pub struct MediatorService<M, R> {
    mediator: Arc<M>,
    cancel: CancellationToken,
    _marker: PhantomData<fn(R)>,
}

impl<M, R> MediatorService<M, R> {
    /// Create a new `MediatorService` with its own cancellation token.
    pub fn new(mediator: Arc<M>) -> Self {
        Self::with_cancellation(mediator, CancellationToken::new())
    }

    /// Create a new `MediatorService` bound to the given token.
    pub fn with_cancellation(mediator: Arc<M>, cancel: CancellationToken) -> Self {
        Self {
            mediator,
            cancel,
            _marker: PhantomData,
        }
    }

    /// Get a reference to the inner mediator.
    pub fn inner(&self) -> &M {
        &self.mediator
    }
}

impl<M, R> Clone for MediatorService<M, R> {
    fn clone(&self) -> Self {
        Self {
            mediator: Arc::clone(&self.mediator),
            cancel: self.cancel.clone(),
            _marker: PhantomData,
        }
    }
}

impl<M, R> Service<R> for MediatorService<M, R>
where
    M: Sender + 'static,
    R: Request,
{
    type Response = R::Response;
    type Error = MediatorError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: R) -> Self::Future {
        let mediator = Arc::clone(&self.mediator);
        let cancel = self.cancel.clone();
        Box::pin(async move { mediator.send(request, &cancel).await })
    }
}

// ============================================================================
// Service → Handler Adapter
// ============================================================================

/// Uses a tower `Service` as the handler of request type `R`.
///
/// Each request is cloned into a fresh clone of the service, which is driven
/// to readiness before the call.
pub struct ServiceHandler<S> {
    service: S,
}

impl<S> ServiceHandler<S> {
    /// Create a new `ServiceHandler` wrapping the given service.
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Get a reference to the inner service.
    pub fn inner(&self) -> &S {
        &self.service
    }
}

impl<S: Clone> Clone for ServiceHandler<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<S, R> RequestHandler<R> for ServiceHandler<S>
where
    R: Request + Clone,
    S: Service<R, Response = R::Response, Error = BoxError> + Clone + Send + Sync + 'static,
    S::Future: Send,
{
    async fn handle(&self, request: &R, _cancel: &CancellationToken) -> Result<R::Response, BoxError> {
        self.service.clone().oneshot(request.clone()).await
    }
}
