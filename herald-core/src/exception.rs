//! # Exception interception
//!
//! When a request's handler (or a behavior inside the exception stage) fails,
//! the dispatcher offers the error to the exception handlers and exception
//! actions bound to that request type.
//!
//! - [`ExceptionHandler`] may recover by calling
//!   [`ExceptionState::set_handled`] with a substitute response.
//! - [`ExceptionAction`] is a side effect only. It never recovers and its own
//!   failures do not change the dispatch outcome.
//!
//! # Matching
//!
//! Rust errors have no inheritance, so "is assignable to" is mapped onto the
//! `source()` chain. A handler declared for `E` matches when the failing
//! error, or any error it wraps, is an `E`. The depth at which `E` was found
//! orders handlers: the error itself (depth 0) is the most specific match,
//! its causes come next, and [`AnyError`] matches everything last. A
//! [`MediatorError::Handler`] returned by a nested `send` is looked through at
//! the same depth.

use crate::{
    error::{BoxError, MediatorError},
    message::Request,
};
use futures::future::BoxFuture;
use std::{error::Error, future::Future, marker::PhantomData};
use tokio_util::sync::CancellationToken;

/// Depth assigned to [`AnyError`] matches: after every concrete match.
pub const CATCH_ALL_DEPTH: usize = usize::MAX;

/// An error type an exception handler or action can be declared for.
///
/// Implemented for every `E: Error + Send + Sync + 'static` and for
/// [`AnyError`].
pub trait ErrorMatch: 'static {
    /// What the handler receives when the error matches.
    type Target: ?Sized + Sync + 'static;

    /// Looks for a match in `error` and its sources.
    ///
    /// Returns the matching error and the depth at which it was found.
    fn find<'e>(
        error: &'e (dyn Error + Send + Sync + 'static),
    ) -> Option<(&'e Self::Target, usize)>;
}

impl<E: Error + Send + Sync + 'static> ErrorMatch for E {
    type Target = E;

    fn find<'e>(error: &'e (dyn Error + Send + Sync + 'static)) -> Option<(&'e E, usize)> {
        let mut current: Option<&'e (dyn Error + 'static)> = Some(error);
        let mut depth = 0;
        while let Some(err) = current {
            if let Some(found) = err.downcast_ref::<E>() {
                return Some((found, depth));
            }
            // A failed nested dispatch is transparent: its `source()` skips the
            // domain error it carries.
            if let Some(MediatorError::Handler(inner)) = err.downcast_ref::<MediatorError>() {
                let inner: &'e (dyn Error + 'static) = &**inner;
                current = Some(inner);
                continue;
            }
            current = err.source();
            depth += 1;
        }
        None
    }
}

/// Matches every error. Handlers declared for it run after all concrete
/// matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyError {}

impl ErrorMatch for AnyError {
    type Target = dyn Error + Send + Sync + 'static;

    fn find<'e>(
        error: &'e (dyn Error + Send + Sync + 'static),
    ) -> Option<(&'e Self::Target, usize)> {
        Some((error, CATCH_ALL_DEPTH))
    }
}

/// Per-dispatch state shared by every exception handler invoked for one
/// failure.
#[derive(Debug)]
pub struct ExceptionState<T> {
    response: Option<T>,
}

impl<T> ExceptionState<T> {
    /// Creates an unhandled state.
    pub fn new() -> Self {
        Self { response: None }
    }

    /// Marks the failure as handled and records the substitute response.
    ///
    /// A later handler calling this again replaces the substitute.
    pub fn set_handled(&mut self, response: T) {
        self.response = Some(response);
    }

    /// Returns `true` once a handler recovered the failure.
    pub fn is_handled(&self) -> bool {
        self.response.is_some()
    }

    /// The substitute response, if any.
    pub fn response(&self) -> Option<&T> {
        self.response.as_ref()
    }

    /// Consumes the state and returns the substitute response, if any.
    pub fn into_response(self) -> Option<T> {
        self.response
    }
}

impl<T> Default for ExceptionState<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Recovery logic for failures of request `R` matching `E`.
///
/// # Example
///
/// ```rust,ignore
/// struct FallbackQuote;
///
/// impl ExceptionHandler<GetQuote, std::io::Error> for FallbackQuote {
///     async fn handle(
///         &self,
///         _request: &GetQuote,
///         _error: &std::io::Error,
///         state: &mut ExceptionState<Quote>,
///         _cancel: &CancellationToken,
///     ) -> Result<(), BoxError> {
///         state.set_handled(Quote::cached());
///         Ok(())
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an exception handler for `{R}` failing with `{E}`",
    label = "missing `ExceptionHandler<{R}, {E}>` implementation"
)]
pub trait ExceptionHandler<R: Request, E: ErrorMatch>: Send + Sync + 'static {
    /// Inspects the failure and optionally recovers it through `state`.
    fn handle(
        &self,
        request: &R,
        error: &E::Target,
        state: &mut ExceptionState<R::Response>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`ExceptionHandler`], with the error type
/// erased.
pub trait DynExceptionHandler<R: Request>: Send + Sync + 'static {
    /// Match depth for `error`, or `None` when the handler does not apply.
    fn depth(&self, error: &(dyn Error + Send + Sync + 'static)) -> Option<usize>;

    /// Runs the handler if it matches `error`.
    fn handle_dyn<'a>(
        &'a self,
        request: &'a R,
        error: &'a (dyn Error + Send + Sync + 'static),
        state: &'a mut ExceptionState<R::Response>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>>;

    /// Type name of the concrete handler, for diagnostics.
    fn name(&self) -> &'static str;
}

/// Binds an [`ExceptionHandler`] to the error type it was declared for.
pub struct MatchingExceptionHandler<E, H> {
    handler: H,
    _marker: PhantomData<fn() -> E>,
}

impl<E, H> MatchingExceptionHandler<E, H> {
    /// Wraps the handler.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

impl<R, E, H> DynExceptionHandler<R> for MatchingExceptionHandler<E, H>
where
    R: Request,
    E: ErrorMatch,
    H: ExceptionHandler<R, E>,
{
    fn depth(&self, error: &(dyn Error + Send + Sync + 'static)) -> Option<usize> {
        E::find(error).map(|(_, depth)| depth)
    }

    fn handle_dyn<'a>(
        &'a self,
        request: &'a R,
        error: &'a (dyn Error + Send + Sync + 'static),
        state: &'a mut ExceptionState<R::Response>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            match E::find(error) {
                Some((target, _)) => self.handler.handle(request, target, state, cancel).await,
                None => Ok(()),
            }
        })
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<H>()
    }
}

/// Side-effect-only reaction to failures of request `R` matching `E`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an exception action for `{R}` failing with `{E}`",
    label = "missing `ExceptionAction<{R}, {E}>` implementation"
)]
pub trait ExceptionAction<R: Request, E: ErrorMatch>: Send + Sync + 'static {
    /// Reacts to the failure.
    fn execute(
        &self,
        request: &R,
        error: &E::Target,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`ExceptionAction`], with the error type
/// erased.
pub trait DynExceptionAction<R: Request>: Send + Sync + 'static {
    /// Match depth for `error`, or `None` when the action does not apply.
    fn depth(&self, error: &(dyn Error + Send + Sync + 'static)) -> Option<usize>;

    /// Runs the action if it matches `error`.
    fn execute_dyn<'a>(
        &'a self,
        request: &'a R,
        error: &'a (dyn Error + Send + Sync + 'static),
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>>;

    /// Type name of the concrete action, for diagnostics.
    fn name(&self) -> &'static str;
}

/// Binds an [`ExceptionAction`] to the error type it was declared for.
pub struct MatchingExceptionAction<E, A> {
    action: A,
    _marker: PhantomData<fn() -> E>,
}

impl<E, A> MatchingExceptionAction<E, A> {
    /// Wraps the action.
    pub fn new(action: A) -> Self {
        Self {
            action,
            _marker: PhantomData,
        }
    }
}

impl<R, E, A> DynExceptionAction<R> for MatchingExceptionAction<E, A>
where
    R: Request,
    E: ErrorMatch,
    A: ExceptionAction<R, E>,
{
    fn depth(&self, error: &(dyn Error + Send + Sync + 'static)) -> Option<usize> {
        E::find(error).map(|(_, depth)| depth)
    }

    fn execute_dyn<'a>(
        &'a self,
        request: &'a R,
        error: &'a (dyn Error + Send + Sync + 'static),
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            match E::find(error) {
                Some((target, _)) => self.action.execute(request, target, cancel).await,
                None => Ok(()),
            }
        })
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<A>()
    }
}
