//! # herald-core
//!
//! Core traits for the Herald in-process mediator.
//!
//! This crate has minimal dependencies and is meant to be imported by
//! libraries that provide handlers or behaviors without depending on the
//! full `herald-std` implementation.
//!
//! # Dispatch Model
//!
//! ## Messages ([`Request`], [`Notification`], [`StreamRequest`])
//!
//! Plain values tagged with what they expect back. A request has exactly one
//! handler and a response (`()` for void-like requests); a notification has
//! zero or more handlers; a stream request has one handler producing items.
//!
//! ## Terminal handlers ([`RequestHandler`], [`NotificationHandler`])
//!
//! The endpoint of a dispatch, where business logic executes.
//!
//! ## Pipeline ([`PipelineBehavior`], [`RequestPreProcessor`], [`RequestPostProcessor`])
//!
//! Behaviors wrap the handler as a chain of continuations. Each receives a
//! [`Next`] and decides whether to proceed. Processors are the simple
//! before/after variants.
//!
//! ## Exception interception ([`ExceptionHandler`], [`ExceptionAction`])
//!
//! Failures of the handler stage are offered to exception handlers, most
//! specific first. Handlers may substitute a response through
//! [`ExceptionState`]; actions only observe.
//!
//! ## Seams ([`Resolver`], [`NotificationPublisher`], [`Mediator`])
//!
//! The resolver provides instances, the publisher decides how notifications
//! fan out, and the mediator traits are what callers depend on.
//!
//! # Static vs Dynamic Dispatch
//!
//! Every capability comes as a pair: a static trait using native `async fn`,
//! and a `Dyn*` object-safe companion returning boxed futures. The companion
//! is implemented automatically and is what resolvers store.
//!
//! # Error Types
//!
//! - [`MediatorError`] - Top-level error type
//! - [`ResolveError`] - Configuration errors
//! - [`AggregateError`] - Combined notification failures
//! - [`Cancelled`] - Cancellation observed by a stage

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod behavior;
mod error;
mod exception;
mod handler;
mod mediator;
mod message;
mod processor;
mod publisher;
mod resolver;
mod stream;

// Re-exports
pub use behavior::{
    DynOpenBehavior, DynPipelineBehavior, ErasedResponse, Next, OpenBehavior, OpenBehaviorAdapter,
    OpenNext, PipelineBehavior, RequestInfo, ResponseTypeMismatch,
};
pub use error::{AggregateError, BoxError, Cancelled, MediatorError, ResolveError};
pub use exception::{
    AnyError, CATCH_ALL_DEPTH, DynExceptionAction, DynExceptionHandler, ErrorMatch,
    ExceptionAction, ExceptionHandler, ExceptionState, MatchingExceptionAction,
    MatchingExceptionHandler,
};
pub use handler::{
    DynNotificationHandler, DynRequestHandler, NotificationHandler, RequestHandler,
    StreamRequestHandler,
};
pub use mediator::{Mediator, Publisher, ResponseStream, Sender, StreamSender};
pub use message::{Message, Notification, Request, StreamRequest};
pub use processor::{
    DynRequestPostProcessor, DynRequestPreProcessor, RequestPostProcessor, RequestPreProcessor,
};
pub use publisher::{DynNotificationPublisher, HandlerExecutor, NotificationPublisher};
pub use resolver::{Instance, Resolver, ResolverExt, ServiceKey, instance};
pub use stream::{
    ErasedItem, ItemStream, OpenStreamBehavior, OpenStreamBehaviorAdapter, OpenStreamNext,
    StreamNext, StreamPipelineBehavior,
};
