//! # herald - Typed In-Process Mediator
//!
//! `herald` decouples callers from handler implementations. A caller sends a
//! request, publishes a notification or opens a stream; the mediator finds the
//! handlers, wraps them in behaviors and runs them.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! #[derive(Request)]
//! #[request(response = String)]
//! struct Ping(String);
//!
//! #[handler]
//! async fn pong(request: &Ping) -> Result<String, BoxError> {
//!     Ok(format!("pong: {}", request.0))
//! }
//!
//! let mediator = MediatorConfig::builder()
//!     .with_behavior(LoggingBehavior)
//!     .build()
//!     .build(Registry::builder().request_handler::<Ping, _>(pong));
//!
//! let cancel = CancellationToken::new();
//! assert_eq!(mediator.send(Ping("hi".into()), &cancel).await?, "pong: hi");
//! ```
//!
//! ## Pipeline
//!
//! Every `send` runs through, outermost first: post-processors,
//! pre-processors, exception interception, the behaviors configured on the
//! mediator, the behaviors registered for the request type, and finally the
//! handler. Notifications skip the pipeline and go straight to the configured
//! [`NotificationPublisher`].
//!
//! ## Feature Flags
//!
//! - `macros`: derives and `#[handler]` / `#[subscribe]`
//! - `inventory`: auto-binding of handlers marked `auto_bind`
//! - `timeout`: [`behaviors::TimeoutBehavior`]
//! - `tower`: adapters between the mediator and `tower::Service`

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use herald_core::{
    // Error types
    AggregateError,
    // Exception interception
    AnyError,
    BoxError,
    CATCH_ALL_DEPTH,
    Cancelled,
    // Pipeline
    DynExceptionAction,
    DynExceptionHandler,
    // Handlers
    DynNotificationHandler,
    // Seams
    DynNotificationPublisher,
    DynOpenBehavior,
    DynPipelineBehavior,
    DynRequestHandler,
    DynRequestPostProcessor,
    DynRequestPreProcessor,
    ErasedItem,
    ErasedResponse,
    ErrorMatch,
    ExceptionAction,
    ExceptionHandler,
    ExceptionState,
    HandlerExecutor,
    Instance,
    ItemStream,
    MatchingExceptionAction,
    MatchingExceptionHandler,
    // Mediator
    Mediator,
    MediatorError,
    // Messages
    Message,
    Next,
    Notification,
    NotificationHandler,
    NotificationPublisher,
    OpenBehavior,
    OpenBehaviorAdapter,
    OpenNext,
    // Streams
    OpenStreamBehavior,
    OpenStreamBehaviorAdapter,
    OpenStreamNext,
    PipelineBehavior,
    Publisher,
    Request,
    RequestHandler,
    RequestInfo,
    RequestPostProcessor,
    RequestPreProcessor,
    ResolveError,
    Resolver,
    ResolverExt,
    ResponseStream,
    ResponseTypeMismatch,
    Sender,
    ServiceKey,
    StreamNext,
    StreamPipelineBehavior,
    StreamRequest,
    StreamRequestHandler,
    StreamSender,
    instance,
};

pub use herald_std::{
    config::{HandlerCategories, MediatorConfig, MediatorConfigBuilder, RegistrationScope},
    dispatch::Dispatcher,
    registry::{Registry, RegistryBuilder},
};

#[cfg(feature = "inventory")]
pub use herald_std::registry::AutoBinding;

pub use tokio_util::sync::CancellationToken;

/// Standard behavior implementations.
pub mod behaviors {
    #![allow(clippy::wildcard_imports)]
    pub use herald_std::behaviors::*;
}

/// Notification publishing strategies.
pub mod publishers {
    #![allow(clippy::wildcard_imports)]
    pub use herald_std::publishers::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use herald_std::testing::*;
}

#[cfg(feature = "tower")]
pub mod tower;

/// Prelude module - common imports for Herald.
///
/// # Usage
///
/// ```rust,ignore
/// use herald::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BoxError,
        // Configuration
        CancellationToken,
        Dispatcher,
        ExceptionAction,
        ExceptionHandler,
        ExceptionState,
        // Core traits
        Mediator,
        MediatorConfig,
        MediatorError,
        Next,
        Notification,
        NotificationHandler,
        PipelineBehavior,
        Publisher,
        Registry,
        Request,
        RequestHandler,
        RequestPostProcessor,
        RequestPreProcessor,
        Sender,
        StreamRequest,
        StreamSender,
        behaviors::LoggingBehavior,
    };

    #[cfg(feature = "macros")]
    pub use crate::{handler, subscribe};
}

#[cfg(feature = "macros")]
pub use herald_macros::{Notification, Request, StreamRequest, handler, subscribe};

#[cfg(feature = "inventory")]
pub use inventory;
