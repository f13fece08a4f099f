//! Reference resolver.
//!
//! [`Registry`] maps capability keys to bindings populated at startup with
//! [`RegistryBuilder`]. Bindings are either shared instances or factories;
//! factories honour the configured [`RegistrationScope`].
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = Registry::builder()
//!     .request_handler::<CreateUser, _>(CreateUserHandler)
//!     .notification_handler::<UserCreated, _>(SendWelcomeMail)
//!     .notification_handler::<UserCreated, _>(UpdateStatistics)
//!     .exception_handler::<CreateUser, DuplicateUser, _>(ReturnExistingUser)
//!     .build();
//! ```

#[cfg(feature = "inventory")]
mod collected;

#[cfg(feature = "inventory")]
pub use collected::AutoBinding;

use crate::config::RegistrationScope;
use herald_core::{
    DynExceptionAction, DynExceptionHandler, DynNotificationHandler, DynPipelineBehavior,
    DynRequestHandler, DynRequestPostProcessor, DynRequestPreProcessor, ErrorMatch,
    ExceptionAction, ExceptionHandler, Instance, MatchingExceptionAction,
    MatchingExceptionHandler, Notification, NotificationHandler, PipelineBehavior, Request,
    RequestHandler, RequestPostProcessor, RequestPreProcessor, Resolver, ServiceKey,
    StreamPipelineBehavior, StreamRequest, StreamRequestHandler, instance,
};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

type Factory = Arc<dyn Fn(&Registry) -> Instance + Send + Sync>;

enum Binding {
    Instance(Instance),
    Factory { id: usize, build: Factory },
}

struct Bindings {
    services: HashMap<ServiceKey, Vec<Binding>>,
    scope: RegistrationScope,
}

/// A resolver populated at startup.
///
/// Cloning is not supported; share a registry through `Arc` and call
/// [`begin_scope`](Self::begin_scope) for a fresh set of scoped instances.
pub struct Registry {
    bindings: Arc<Bindings>,
    scoped: Mutex<HashMap<usize, Instance>>,
}

impl Registry {
    /// Create a new registry builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Opens a new scope sharing this registry's bindings.
    ///
    /// Scoped factories run again inside the new scope; instance bindings
    /// stay shared.
    pub fn begin_scope(&self) -> Registry {
        Registry {
            bindings: Arc::clone(&self.bindings),
            scoped: Mutex::new(HashMap::new()),
        }
    }

    /// Lifetime applied to factory bindings.
    pub fn scope(&self) -> RegistrationScope {
        self.bindings.scope
    }

    /// Returns `true` if anything is bound to `key`.
    pub fn contains(&self, key: ServiceKey) -> bool {
        self.bindings
            .services
            .get(&key)
            .is_some_and(|bindings| !bindings.is_empty())
    }

    fn materialize(&self, binding: &Binding) -> Instance {
        match binding {
            Binding::Instance(instance) => Arc::clone(instance),
            Binding::Factory { build, .. } if self.bindings.scope == RegistrationScope::Transient => {
                build(self)
            }
            Binding::Factory { id, build } => {
                if let Some(cached) = self.scoped.lock().get(id) {
                    return Arc::clone(cached);
                }
                // Built outside the lock: factories may resolve their own
                // dependencies from this registry.
                let built = build(self);
                Arc::clone(self.scoped.lock().entry(*id).or_insert(built))
            }
        }
    }
}

impl Resolver for Registry {
    fn resolve_all(&self, key: ServiceKey) -> Vec<Instance> {
        self.bindings
            .services
            .get(&key)
            .map(|bindings| bindings.iter().map(|b| self.materialize(b)).collect())
            .unwrap_or_default()
    }
}

/// Builder for constructing a [`Registry`].
pub struct RegistryBuilder {
    services: HashMap<ServiceKey, Vec<Binding>>,
    scope: RegistrationScope,
    next_factory: usize,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    /// Create a new empty registry builder.
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
            scope: RegistrationScope::Transient,
            next_factory: 0,
        }
    }

    /// Sets the lifetime of factory bindings.
    pub fn with_scope(mut self, scope: RegistrationScope) -> Self {
        self.scope = scope;
        self
    }

    /// Binds a shared instance of capability `T`.
    pub fn bind<T: ?Sized + Send + Sync + 'static>(mut self, value: Arc<T>) -> Self {
        self.services
            .entry(ServiceKey::of::<T>())
            .or_default()
            .push(Binding::Instance(instance(value)));
        self
    }

    /// Binds a factory of capability `T`.
    ///
    /// The factory receives the registry (or scope) it is resolved from, so it
    /// can resolve its own dependencies.
    pub fn bind_factory<T, F>(mut self, factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Registry) -> Arc<T> + Send + Sync + 'static,
    {
        let id = self.next_factory;
        self.next_factory += 1;
        let build: Factory = Arc::new(move |registry| instance(factory(registry)));
        self.services
            .entry(ServiceKey::of::<T>())
            .or_default()
            .push(Binding::Factory { id, build });
        self
    }

    /// Register the handler of request `R`.
    pub fn request_handler<R: Request, H: RequestHandler<R>>(self, handler: H) -> Self {
        self.bind::<dyn DynRequestHandler<R>>(Arc::new(handler))
    }

    /// Register a factory for the handler of request `R`.
    pub fn request_handler_factory<R, H, F>(self, factory: F) -> Self
    where
        R: Request,
        H: RequestHandler<R>,
        F: Fn(&Registry) -> H + Send + Sync + 'static,
    {
        self.bind_factory::<dyn DynRequestHandler<R>, _>(move |registry| {
            Arc::new(factory(registry)) as Arc<dyn DynRequestHandler<R>>
        })
    }

    /// Register a handler of notification `N`.
    pub fn notification_handler<N: Notification, H: NotificationHandler<N>>(self, handler: H) -> Self {
        self.bind::<dyn DynNotificationHandler<N>>(Arc::new(handler))
    }

    /// Register a factory for a handler of notification `N`.
    pub fn notification_handler_factory<N, H, F>(self, factory: F) -> Self
    where
        N: Notification,
        H: NotificationHandler<N>,
        F: Fn(&Registry) -> H + Send + Sync + 'static,
    {
        self.bind_factory::<dyn DynNotificationHandler<N>, _>(move |registry| {
            Arc::new(factory(registry)) as Arc<dyn DynNotificationHandler<N>>
        })
    }

    /// Register a pre-processor of request `R`.
    pub fn pre_processor<R: Request, P: RequestPreProcessor<R>>(self, processor: P) -> Self {
        self.bind::<dyn DynRequestPreProcessor<R>>(Arc::new(processor))
    }

    /// Register a post-processor of request `R`.
    pub fn post_processor<R: Request, P: RequestPostProcessor<R>>(self, processor: P) -> Self {
        self.bind::<dyn DynRequestPostProcessor<R>>(Arc::new(processor))
    }

    /// Register a pipeline behavior of request `R`.
    ///
    /// Per-request behaviors run inside the behaviors configured on the
    /// mediator, in registration order.
    pub fn behavior<R: Request, B: PipelineBehavior<R>>(self, behavior: B) -> Self {
        self.bind::<dyn DynPipelineBehavior<R>>(Arc::new(behavior))
    }

    /// Register an exception handler for failures of `R` matching `E`.
    pub fn exception_handler<R, E, H>(self, handler: H) -> Self
    where
        R: Request,
        E: ErrorMatch,
        H: ExceptionHandler<R, E>,
    {
        self.bind::<dyn DynExceptionHandler<R>>(Arc::new(MatchingExceptionHandler::<E, H>::new(
            handler,
        )))
    }

    /// Register an exception action for failures of `R` matching `E`.
    pub fn exception_action<R, E, A>(self, action: A) -> Self
    where
        R: Request,
        E: ErrorMatch,
        A: ExceptionAction<R, E>,
    {
        self.bind::<dyn DynExceptionAction<R>>(Arc::new(MatchingExceptionAction::<E, A>::new(
            action,
        )))
    }

    /// Register the handler of stream request `R`.
    pub fn stream_handler<R: StreamRequest, H: StreamRequestHandler<R>>(self, handler: H) -> Self {
        self.bind::<dyn StreamRequestHandler<R>>(Arc::new(handler))
    }

    /// Register a stream behavior of stream request `R`.
    pub fn stream_behavior<R: StreamRequest, B: StreamPipelineBehavior<R>>(self, behavior: B) -> Self {
        self.bind::<dyn StreamPipelineBehavior<R>>(Arc::new(behavior))
    }

    /// Build the registry.
    pub fn build(self) -> Registry {
        Registry {
            bindings: Arc::new(Bindings {
                services: self.services,
                scope: self.scope,
            }),
            scoped: Mutex::new(HashMap::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::{BoxError, ResolveError, ResolverExt};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;

    struct Ping;
    impl Request for Ping {
        type Response = usize;
    }

    struct Numbered(usize);

    impl RequestHandler<Ping> for Numbered {
        async fn handle(&self, _request: &Ping, _cancel: &CancellationToken) -> Result<usize, BoxError> {
            Ok(self.0)
        }
    }

    fn counting_builder(counter: Arc<AtomicUsize>) -> RegistryBuilder {
        Registry::builder().request_handler_factory::<Ping, _, _>(move |_| {
            Numbered(counter.fetch_add(1, Ordering::SeqCst))
        })
    }

    #[test]
    fn test_instance_binding_is_shared() {
        let registry = Registry::builder()
            .request_handler::<Ping, _>(Numbered(1))
            .build();
        let first = registry.resolve::<dyn DynRequestHandler<Ping>>().unwrap();
        let second = registry.resolve::<dyn DynRequestHandler<Ping>>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_transient_factory_builds_every_time() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_builder(counter.clone()).build();
        registry.resolve::<dyn DynRequestHandler<Ping>>().unwrap();
        registry.resolve::<dyn DynRequestHandler<Ping>>().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_scoped_factory_builds_once_per_scope() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_builder(counter.clone())
            .with_scope(RegistrationScope::Scoped)
            .build();
        let first = registry.resolve::<dyn DynRequestHandler<Ping>>().unwrap();
        let again = registry.resolve::<dyn DynRequestHandler<Ping>>().unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let scope = registry.begin_scope();
        let other = scope.resolve::<dyn DynRequestHandler<Ping>>().unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_two_handlers_are_ambiguous() {
        let registry = Registry::builder()
            .request_handler::<Ping, _>(Numbered(1))
            .request_handler::<Ping, _>(Numbered(2))
            .build();
        let err = registry.resolve::<dyn DynRequestHandler<Ping>>().err().unwrap();
        assert!(matches!(err, ResolveError::Ambiguous { count: 2, .. }));
    }

    #[test]
    fn test_factory_resolves_dependencies() {
        trait Clock: Send + Sync {
            fn now(&self) -> usize;
        }
        struct Fixed;
        impl Clock for Fixed {
            fn now(&self) -> usize {
                42
            }
        }

        let registry = Registry::builder()
            .bind::<dyn Clock>(Arc::new(Fixed))
            .request_handler_factory::<Ping, _, _>(|registry| {
                let clock = registry.resolve::<dyn Clock>().map(|c| c.now()).unwrap_or(0);
                Numbered(clock)
            })
            .build();
        assert!(registry.contains(ServiceKey::of::<dyn Clock>()));
        assert!(registry.resolve::<dyn DynRequestHandler<Ping>>().is_ok());
    }
}
