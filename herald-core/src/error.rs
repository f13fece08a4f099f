//! Error types for Herald.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`MediatorError`] - Top-level error returned by `send`, `publish` and `create_stream`
//! - [`ResolveError`] - Configuration errors raised while resolving bindings
//! - [`AggregateError`] - Several notification handlers failed concurrently
//! - [`Cancelled`] - The caller's cancellation token fired
//!
//! Inside a pipeline, domain failures travel as [`BoxError`] so that their
//! concrete type survives until an exception handler or the caller inspects it.

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all mediator operations.
#[derive(Error, Debug)]
pub enum MediatorError {
    /// The mediator is misconfigured for this message type.
    #[error("misconfiguration: {0}")]
    Misconfigured(#[from] ResolveError),

    /// The operation was aborted through its cancellation token.
    #[error("operation was cancelled")]
    Cancelled,

    /// A handler, processor or behavior failed and nothing recovered it.
    ///
    /// The original error is kept as-is; use [`MediatorError::downcast_ref`]
    /// to inspect its concrete type.
    #[error(transparent)]
    Handler(BoxError),
}

impl MediatorError {
    /// Classifies an error raised inside a pipeline.
    ///
    /// [`Cancelled`] becomes [`MediatorError::Cancelled`], a nested
    /// `MediatorError` (e.g. from a behavior that dispatches another request)
    /// is unwrapped, anything else is a domain error.
    pub fn from_domain(error: BoxError) -> Self {
        if error.is::<Cancelled>() {
            return MediatorError::Cancelled;
        }
        match error.downcast::<MediatorError>() {
            Ok(nested) => *nested,
            Err(error) => MediatorError::Handler(error),
        }
    }

    /// Returns `true` for [`MediatorError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, MediatorError::Cancelled)
    }

    /// Returns `true` for configuration errors.
    pub fn is_misconfigured(&self) -> bool {
        matches!(self, MediatorError::Misconfigured(_))
    }

    /// Returns `true` when no handler was bound for the dispatched type.
    pub fn is_handler_not_found(&self) -> bool {
        matches!(
            self,
            MediatorError::Misconfigured(ResolveError::NotFound { .. })
        )
    }

    /// Downcasts a domain error to its concrete type.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            MediatorError::Handler(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Consumes the error and returns the domain error, if any.
    pub fn into_domain(self) -> Option<BoxError> {
        match self {
            MediatorError::Handler(err) => Some(err),
            _ => None,
        }
    }
}

/// Errors raised by a [`Resolver`](crate::Resolver).
///
/// All of them are configuration errors: they are fatal to the call and never
/// reach exception handlers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Nothing is bound for the requested service.
    #[error("handler not found: nothing is bound to `{service}`")]
    NotFound {
        /// Type name of the requested service.
        service: &'static str,
    },

    /// More than one binding exists where exactly one is required.
    #[error("ambiguous handler: {count} bindings for `{service}`, expected exactly one")]
    Ambiguous {
        /// Type name of the requested service.
        service: &'static str,
        /// Number of bindings found.
        count: usize,
    },

    /// A binding exists but holds a different type than requested.
    #[error("binding for `{service}` does not hold the requested type")]
    TypeMismatch {
        /// Type name of the requested service.
        service: &'static str,
    },
}

/// The operation was aborted by its caller.
///
/// Handlers that observe their cancellation token return this error; the
/// dispatcher reports it as [`MediatorError::Cancelled`].
#[derive(Error, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[error("operation was cancelled")]
pub struct Cancelled;

/// Several notification handlers failed during one concurrent publish.
#[derive(Error, Debug)]
#[error("{} notification handlers failed", .errors.len())]
pub struct AggregateError {
    errors: Vec<BoxError>,
}

impl AggregateError {
    /// Creates an aggregate from the collected failures.
    pub fn new(errors: Vec<BoxError>) -> Self {
        Self { errors }
    }

    /// The individual failures, in handler order.
    pub fn errors(&self) -> &[BoxError] {
        &self.errors
    }

    /// Consumes the aggregate and returns the individual failures.
    pub fn into_errors(self) -> Vec<BoxError> {
        self.errors
    }
}
