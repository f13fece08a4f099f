//! # Pipeline behaviors
//!
//! Behaviors are middleware wrapping the terminal handler of a request. A
//! behavior receives the request and a [`Next`] continuation bound to the
//! following stage. Calling [`Next::run`] proceeds down the chain; returning
//! without calling it (or returning an error) short-circuits the chain.
//!
//! Two flavours exist:
//!
//! - [`PipelineBehavior<R>`] is bound to one request type and sees the typed
//!   request and response.
//! - [`OpenBehavior`] applies to every request type. It sees a
//!   [`RequestInfo`], the request as `&dyn Any` and an erased response. It is
//!   adapted to a typed behavior per dispatch by [`OpenBehaviorAdapter`].
//!
//! Chains are rebuilt for every call, so behaviors hold no per-call state
//! unless they own it explicitly.

use crate::{error::BoxError, message::Request};
use futures::future::BoxFuture;
use std::{
    any::{Any, TypeId},
    future::Future,
    marker::PhantomData,
    sync::Arc,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// The continuation handed to a [`PipelineBehavior`].
pub struct Next<'a, R: Request> {
    run: Box<dyn FnOnce() -> BoxFuture<'a, Result<R::Response, BoxError>> + Send + 'a>,
}

impl<'a, R: Request> Next<'a, R> {
    /// Wraps the invocation of the following stage.
    pub fn new<F>(run: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'a, Result<R::Response, BoxError>> + Send + 'a,
    {
        Self { run: Box::new(run) }
    }

    /// Invokes the rest of the chain.
    pub fn run(self) -> BoxFuture<'a, Result<R::Response, BoxError>> {
        (self.run)()
    }
}

/// Middleware for one request type.
///
/// # Example
///
/// ```rust,ignore
/// struct Validate;
///
/// impl PipelineBehavior<CreateUser> for Validate {
///     async fn handle(
///         &self,
///         request: &CreateUser,
///         next: Next<'_, CreateUser>,
///         _cancel: &CancellationToken,
///     ) -> Result<UserId, BoxError> {
///         if request.name.is_empty() {
///             return Err("name is required".into());
///         }
///         next.run().await
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a pipeline behavior for `{R}`",
    label = "missing `PipelineBehavior<{R}>` implementation",
    note = "Behaviors must implement `handle` and decide whether to call `next.run()`."
)]
pub trait PipelineBehavior<R: Request>: Send + Sync + 'static {
    /// Handles the request, usually by delegating to `next`.
    fn handle(
        &self,
        request: &R,
        next: Next<'_, R>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<R::Response, BoxError>> + Send;
}

/// Dynamic object-safe version of [`PipelineBehavior`].
pub trait DynPipelineBehavior<R: Request>: Send + Sync + 'static {
    /// Handles the request (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        request: &'a R,
        next: Next<'a, R>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<R::Response, BoxError>>;
}

impl<R: Request, T: PipelineBehavior<R>> DynPipelineBehavior<R> for T {
    fn handle_dyn<'a>(
        &'a self,
        request: &'a R,
        next: Next<'a, R>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<R::Response, BoxError>> {
        Box::pin(self.handle(request, next, cancel))
    }
}

/// Identity of the message being dispatched, for behaviors that apply to
/// every message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestInfo {
    name: &'static str,
    type_id: TypeId,
}

impl RequestInfo {
    /// Describes the message type `M`.
    pub fn of<M: 'static>() -> Self {
        Self {
            name: std::any::type_name::<M>(),
            type_id: TypeId::of::<M>(),
        }
    }

    /// Full type name of the message.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path.
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        let start = base.rfind("::").map_or(0, |idx| idx + 2);
        &self.name[start..]
    }

    /// `TypeId` of the message.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns `true` when the message is of type `M`.
    pub fn is<M: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<M>()
    }
}

/// A response with its type erased.
pub type ErasedResponse = Box<dyn Any + Send>;

/// The continuation handed to an [`OpenBehavior`].
pub struct OpenNext<'a> {
    run: Box<dyn FnOnce() -> BoxFuture<'a, Result<ErasedResponse, BoxError>> + Send + 'a>,
}

impl<'a> OpenNext<'a> {
    /// Wraps the invocation of the following stage.
    pub fn new<F>(run: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'a, Result<ErasedResponse, BoxError>> + Send + 'a,
    {
        Self { run: Box::new(run) }
    }

    /// Invokes the rest of the chain.
    pub fn run(self) -> BoxFuture<'a, Result<ErasedResponse, BoxError>> {
        (self.run)()
    }
}

/// Middleware applied to every request type.
///
/// Open behaviors are configured once on the mediator and wrap every `send`,
/// which makes them the place for logging, metrics and timeouts.
pub trait OpenBehavior: Send + Sync + 'static {
    /// Handles the request, usually by delegating to `next`.
    fn handle(
        &self,
        info: RequestInfo,
        request: &(dyn Any + Send + Sync),
        next: OpenNext<'_>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<ErasedResponse, BoxError>> + Send;
}

/// Dynamic object-safe version of [`OpenBehavior`].
pub trait DynOpenBehavior: Send + Sync + 'static {
    /// Handles the request (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        info: RequestInfo,
        request: &'a (dyn Any + Send + Sync),
        next: OpenNext<'a>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<ErasedResponse, BoxError>>;
}

impl<T: OpenBehavior> DynOpenBehavior for T {
    fn handle_dyn<'a>(
        &'a self,
        info: RequestInfo,
        request: &'a (dyn Any + Send + Sync),
        next: OpenNext<'a>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<ErasedResponse, BoxError>> {
        Box::pin(self.handle(info, request, next, cancel))
    }
}

/// An open behavior produced a response of the wrong type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("open behavior produced a response that is not `{expected}`")]
pub struct ResponseTypeMismatch {
    /// Type name of the response the request expects.
    pub expected: &'static str,
}

/// Runs an [`OpenBehavior`] as the typed behavior of request `R`.
pub struct OpenBehaviorAdapter<R> {
    inner: Arc<dyn DynOpenBehavior>,
    _marker: PhantomData<fn() -> R>,
}

impl<R> OpenBehaviorAdapter<R> {
    /// Adapts the given open behavior.
    pub fn new(inner: Arc<dyn DynOpenBehavior>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

impl<R: Request> PipelineBehavior<R> for OpenBehaviorAdapter<R> {
    async fn handle(
        &self,
        request: &R,
        next: Next<'_, R>,
        cancel: &CancellationToken,
    ) -> Result<R::Response, BoxError> {
        let open_next = OpenNext::new(move || {
            Box::pin(async move {
                next.run()
                    .await
                    .map(|response| Box::new(response) as ErasedResponse)
            })
        });

        let erased = self
            .inner
            .handle_dyn(RequestInfo::of::<R>(), request, open_next, cancel)
            .await?;

        erased
            .downcast::<R::Response>()
            .map(|response| *response)
            .map_err(|_| {
                Box::new(ResponseTypeMismatch {
                    expected: std::any::type_name::<R::Response>(),
                }) as BoxError
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;
    impl Request for Ping {
        type Response = u32;
    }

    struct PassThrough;

    impl OpenBehavior for PassThrough {
        async fn handle(
            &self,
            info: RequestInfo,
            _request: &(dyn Any + Send + Sync),
            next: OpenNext<'_>,
            _cancel: &CancellationToken,
        ) -> Result<ErasedResponse, BoxError> {
            assert!(info.is::<Ping>());
            next.run().await
        }
    }

    struct Forge;

    impl OpenBehavior for Forge {
        async fn handle(
            &self,
            _info: RequestInfo,
            _request: &(dyn Any + Send + Sync),
            _next: OpenNext<'_>,
            _cancel: &CancellationToken,
        ) -> Result<ErasedResponse, BoxError> {
            Ok(Box::new("not a number"))
        }
    }

    #[test]
    fn test_request_info_short_name() {
        let info = RequestInfo::of::<Ping>();
        assert_eq!(info.short_name(), "Ping");
        assert!(info.name().ends_with("Ping"));
    }

    #[tokio::test]
    async fn test_adapter_round_trips_response() {
        let adapter = OpenBehaviorAdapter::<Ping>::new(Arc::new(PassThrough));
        let cancel = CancellationToken::new();
        let next = Next::new(|| Box::pin(async { Ok(7) }));
        let result = adapter.handle(&Ping, next, &cancel).await.unwrap();
        assert_eq!(result, 7);
    }

    #[tokio::test]
    async fn test_adapter_rejects_foreign_response() {
        let adapter = OpenBehaviorAdapter::<Ping>::new(Arc::new(Forge));
        let cancel = CancellationToken::new();
        let next = Next::new(|| Box::pin(async { Ok(7) }));
        let err = adapter.handle(&Ping, next, &cancel).await.unwrap_err();
        assert!(err.downcast_ref::<ResponseTypeMismatch>().is_some());
    }
}
