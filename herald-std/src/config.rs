//! Mediator configuration.
//!
//! [`MediatorConfig`] gathers everything decided at setup time: the
//! notification publishing strategy, the behaviors applied to every request
//! and stream, which handler categories are bound automatically, and the
//! lifetime of factory-built handlers.
//!
//! # Example
//!
//! ```rust,ignore
//! let mediator = MediatorConfig::builder()
//!     .use_publisher(ConcurrentPublisher)
//!     .with_behavior(LoggingBehavior)
//!     .with_registration_scope(RegistrationScope::Scoped)
//!     .build()
//!     .build(Registry::builder().request_handler::<Ping, _>(PingHandler));
//! ```

use crate::{
    dispatch::Dispatcher,
    publishers::SequentialPublisher,
    registry::{Registry, RegistryBuilder},
};
use bitflags::bitflags;
use herald_core::{
    DynNotificationPublisher, DynOpenBehavior, Mediator, NotificationPublisher, OpenBehavior,
    OpenStreamBehavior, Resolver,
};
use std::{any::TypeId, sync::Arc};

bitflags! {
    /// Handler kinds that auto-binding applies to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HandlerCategories: u8 {
        /// `RequestPreProcessor` implementations.
        const PRE_PROCESSORS = 1 << 0;
        /// `RequestHandler` implementations with a response other than `()`.
        const REQUEST_HANDLERS = 1 << 1;
        /// `StreamRequestHandler` implementations.
        const STREAM_HANDLERS = 1 << 2;
        /// `RequestPostProcessor` implementations.
        const POST_PROCESSORS = 1 << 3;
        /// `ExceptionHandler` implementations.
        const EXCEPTION_HANDLERS = 1 << 4;
        /// `ExceptionAction` implementations.
        const EXCEPTION_ACTIONS = 1 << 5;
        /// `NotificationHandler` implementations.
        const NOTIFICATION_HANDLERS = 1 << 6;
        /// `RequestHandler` implementations for requests answering `()`.
        const VOID_REQUEST_HANDLERS = 1 << 7;

        /// Every category.
        const ALL = Self::PRE_PROCESSORS.bits()
            | Self::REQUEST_HANDLERS.bits()
            | Self::STREAM_HANDLERS.bits()
            | Self::POST_PROCESSORS.bits()
            | Self::EXCEPTION_HANDLERS.bits()
            | Self::EXCEPTION_ACTIONS.bits()
            | Self::NOTIFICATION_HANDLERS.bits()
            | Self::VOID_REQUEST_HANDLERS.bits();
    }
}

/// Lifetime of factory-built bindings.
///
/// Instance bindings are always shared; the scope only decides how often a
/// factory runs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationScope {
    /// A new instance for every resolution.
    #[default]
    Transient,
    /// One instance per registry scope (see [`Registry::begin_scope`]).
    Scoped,
}

/// Setup-time options of a mediator.
pub struct MediatorConfig {
    publisher: Arc<dyn DynNotificationPublisher>,
    behaviors: Vec<Arc<dyn DynOpenBehavior>>,
    stream_behaviors: Vec<Arc<dyn OpenStreamBehavior>>,
    categories: HandlerCategories,
    scope: RegistrationScope,
}

impl MediatorConfig {
    /// Starts a configuration with the defaults: sequential publishing, no
    /// behaviors, no auto-bound categories and transient factories.
    pub fn builder() -> MediatorConfigBuilder {
        MediatorConfigBuilder::new()
    }

    /// Handler categories selected for auto-binding.
    pub fn categories(&self) -> HandlerCategories {
        self.categories
    }

    /// Lifetime applied to factory bindings.
    pub fn scope(&self) -> RegistrationScope {
        self.scope
    }

    /// Number of open behaviors, in the order they wrap each request.
    pub fn behavior_count(&self) -> usize {
        self.behaviors.len()
    }

    /// Finishes a registry according to this configuration.
    ///
    /// Applies the registration scope and, with the `inventory` feature,
    /// auto-binds the selected handler categories.
    pub fn prepare(&self, registry: RegistryBuilder) -> Registry {
        let registry = registry.with_scope(self.scope);
        #[cfg(feature = "inventory")]
        let registry = registry.auto_bind(self.categories);
        registry.build()
    }

    /// Creates a dispatcher over any resolver.
    pub fn into_dispatcher(self, resolver: Arc<dyn Resolver>) -> Dispatcher {
        Dispatcher::from_parts(
            resolver,
            self.publisher,
            self.behaviors.into(),
            self.stream_behaviors.into(),
        )
    }

    /// Prepares the registry and creates the default dispatcher over it.
    pub fn build(self, registry: RegistryBuilder) -> Dispatcher {
        let registry = self.prepare(registry);
        self.into_dispatcher(Arc::new(registry))
    }

    /// Like [`build`](Self::build), then hands the dispatcher to `wrap` to
    /// produce a custom mediator.
    ///
    /// The custom type must implement the full [`Mediator`] capability set.
    pub fn build_with<M, F>(self, registry: RegistryBuilder, wrap: F) -> M
    where
        M: Mediator,
        F: FnOnce(Dispatcher) -> M,
    {
        wrap(self.build(registry))
    }
}

impl Default for MediatorConfig {
    fn default() -> Self {
        MediatorConfigBuilder::new().build()
    }
}

/// Builder for [`MediatorConfig`].
pub struct MediatorConfigBuilder {
    publisher: Option<Arc<dyn DynNotificationPublisher>>,
    behaviors: Vec<(TypeId, Arc<dyn DynOpenBehavior>)>,
    stream_behaviors: Vec<(TypeId, Arc<dyn OpenStreamBehavior>)>,
    categories: HandlerCategories,
    scope: RegistrationScope,
}

impl Default for MediatorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MediatorConfigBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        Self {
            publisher: None,
            behaviors: Vec::new(),
            stream_behaviors: Vec::new(),
            categories: HandlerCategories::empty(),
            scope: RegistrationScope::Transient,
        }
    }

    /// Replaces the notification publishing strategy.
    pub fn use_publisher<P: NotificationPublisher>(mut self, publisher: P) -> Self {
        self.publisher = Some(Arc::new(publisher));
        self
    }

    /// Adds a behavior applied to every request.
    ///
    /// Behaviors wrap requests in the order they are added, the first one
    /// outermost. Adding a second behavior of the same type is ignored.
    pub fn with_behavior<B: OpenBehavior>(mut self, behavior: B) -> Self {
        let id = TypeId::of::<B>();
        if self.behaviors.iter().all(|(existing, _)| *existing != id) {
            self.behaviors.push((id, Arc::new(behavior) as Arc<dyn DynOpenBehavior>));
        }
        self
    }

    /// Adds several behaviors, in iteration order.
    pub fn with_behaviors<I>(self, behaviors: I) -> Self
    where
        I: IntoIterator,
        I::Item: OpenBehavior,
    {
        behaviors.into_iter().fold(self, Self::with_behavior)
    }

    /// Adds a behavior applied to every stream request.
    ///
    /// Same ordering and de-duplication rules as
    /// [`with_behavior`](Self::with_behavior).
    pub fn with_stream_behavior<B: OpenStreamBehavior>(mut self, behavior: B) -> Self {
        let id = TypeId::of::<B>();
        if self.stream_behaviors.iter().all(|(existing, _)| *existing != id) {
            self.stream_behaviors
                .push((id, Arc::new(behavior) as Arc<dyn OpenStreamBehavior>));
        }
        self
    }

    /// Adds several stream behaviors, in iteration order.
    pub fn with_stream_behaviors<I>(self, behaviors: I) -> Self
    where
        I: IntoIterator,
        I::Item: OpenStreamBehavior,
    {
        behaviors.into_iter().fold(self, Self::with_stream_behavior)
    }

    /// Auto-binds every handler category.
    pub fn with_all_handler_categories(mut self) -> Self {
        self.categories = HandlerCategories::ALL;
        self
    }

    /// Adds categories to auto-bind.
    pub fn with_handler_categories(mut self, categories: HandlerCategories) -> Self {
        self.categories |= categories;
        self
    }

    /// Auto-binds every category except request handlers with a response,
    /// which the caller registers itself. Handlers of `()` requests stay
    /// auto-bound.
    pub fn with_request_handlers_manually_registered(mut self) -> Self {
        self.categories |= HandlerCategories::ALL - HandlerCategories::REQUEST_HANDLERS;
        self
    }

    /// Sets the lifetime of factory bindings.
    pub fn with_registration_scope(mut self, scope: RegistrationScope) -> Self {
        self.scope = scope;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> MediatorConfig {
        MediatorConfig {
            publisher: self
                .publisher
                .unwrap_or_else(|| Arc::new(SequentialPublisher)),
            behaviors: self.behaviors.into_iter().map(|(_, b)| b).collect(),
            stream_behaviors: self.stream_behaviors.into_iter().map(|(_, b)| b).collect(),
            categories: self.categories,
            scope: self.scope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::LoggingBehavior;

    #[test]
    fn test_defaults() {
        let config = MediatorConfig::default();
        assert!(config.categories().is_empty());
        assert_eq!(config.scope(), RegistrationScope::Transient);
        assert_eq!(config.behavior_count(), 0);
    }

    #[test]
    fn test_duplicate_behavior_is_ignored() {
        let config = MediatorConfig::builder()
            .with_behavior(LoggingBehavior)
            .with_behavior(LoggingBehavior)
            .build();
        assert_eq!(config.behavior_count(), 1);
    }

    #[test]
    fn test_manual_request_handlers_excludes_one_category() {
        let config = MediatorConfig::builder()
            .with_request_handlers_manually_registered()
            .build();
        assert!(!config.categories().contains(HandlerCategories::REQUEST_HANDLERS));
        assert!(config.categories().contains(HandlerCategories::NOTIFICATION_HANDLERS));
        assert!(config.categories().contains(HandlerCategories::EXCEPTION_ACTIONS));
        assert!(config.categories().contains(HandlerCategories::VOID_REQUEST_HANDLERS));
    }

    #[test]
    fn test_bulk_behaviors_keep_order_and_deduplicate() {
        let config = MediatorConfig::builder()
            .with_behavior(LoggingBehavior)
            .with_behaviors([LoggingBehavior, LoggingBehavior])
            .build();
        assert_eq!(config.behavior_count(), 1);

        let config = MediatorConfig::builder()
            .with_stream_behaviors([Passthrough, Passthrough])
            .build();
        assert_eq!(config.stream_behaviors.len(), 1);
    }

    struct Passthrough;

    impl OpenStreamBehavior for Passthrough {
        fn handle(
            &self,
            _info: herald_core::RequestInfo,
            _request: Arc<dyn std::any::Any + Send + Sync>,
            next: herald_core::OpenStreamNext,
            _cancel: tokio_util::sync::CancellationToken,
        ) -> herald_core::ItemStream<herald_core::ErasedItem> {
            next.run()
        }
    }

    #[test]
    fn test_all_categories() {
        let config = MediatorConfig::builder().with_all_handler_categories().build();
        assert_eq!(config.categories(), HandlerCategories::ALL);
    }
}
