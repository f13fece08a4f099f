//! # Resolver seam
//!
//! The dispatcher never knows how handlers are built. It asks a [`Resolver`]
//! for "one" or "all" instances of a capability, identified by a
//! [`ServiceKey`]. Capabilities are trait objects such as
//! `dyn DynRequestHandler<Ping>`; an [`Instance`] stores an `Arc` of one.
//!
//! Any type satisfying the contract can stand in for the reference registry
//! shipped in `herald-std`.

use crate::error::ResolveError;
use std::{
    any::{Any, TypeId},
    hash::{Hash, Hasher},
    sync::Arc,
};

/// Identifies a capability by type.
#[derive(Debug, Clone, Copy)]
pub struct ServiceKey {
    type_id: TypeId,
    name: &'static str,
}

impl ServiceKey {
    /// Key of capability `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// `TypeId` of the capability.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Type name of the capability.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

/// A resolved capability, erased. Holds an `Arc<T>` for the key's `T`.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Erases a capability into an [`Instance`].
pub fn instance<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Instance {
    Arc::new(value)
}

/// Maps a capability to one or many instances.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a resolver",
    label = "missing `Resolver` implementation",
    note = "Resolvers must implement `resolve_all`; `resolve_one` has a default."
)]
pub trait Resolver: Send + Sync + 'static {
    /// Every instance bound to `key`, in binding order. Never fails.
    fn resolve_all(&self, key: ServiceKey) -> Vec<Instance>;

    /// Exactly one instance bound to `key`.
    ///
    /// Fails with [`ResolveError::NotFound`] for zero bindings and
    /// [`ResolveError::Ambiguous`] for several.
    fn resolve_one(&self, key: ServiceKey) -> Result<Instance, ResolveError> {
        let mut all = self.resolve_all(key);
        match all.len() {
            0 => Err(ResolveError::NotFound { service: key.name() }),
            1 => all.pop().ok_or(ResolveError::NotFound { service: key.name() }),
            count => Err(ResolveError::Ambiguous {
                service: key.name(),
                count,
            }),
        }
    }
}

/// Typed lookups over any [`Resolver`].
pub trait ResolverExt: Resolver {
    /// Resolves exactly one `T`.
    fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveError> {
        let key = ServiceKey::of::<T>();
        let instance = self.resolve_one(key)?;
        downcast::<T>(key, &instance)
    }

    /// Resolves every `T`, in binding order.
    ///
    /// Only fails when a binding holds something other than `T`.
    fn resolve_many<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<T>>, ResolveError> {
        let key = ServiceKey::of::<T>();
        self.resolve_all(key)
            .iter()
            .map(|instance| downcast::<T>(key, instance))
            .collect()
    }
}

impl<R: Resolver + ?Sized> ResolverExt for R {}

fn downcast<T: ?Sized + Send + Sync + 'static>(
    key: ServiceKey,
    instance: &Instance,
) -> Result<Arc<T>, ResolveError> {
    instance
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or(ResolveError::TypeMismatch { service: key.name() })
}

impl<R: Resolver + ?Sized> Resolver for Arc<R> {
    fn resolve_all(&self, key: ServiceKey) -> Vec<Instance> {
        (**self).resolve_all(key)
    }

    fn resolve_one(&self, key: ServiceKey) -> Result<Instance, ResolveError> {
        (**self).resolve_one(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct Hello(&'static str);

    impl Greeter for Hello {
        fn greet(&self) -> String {
            format!("hello {}", self.0)
        }
    }

    #[derive(Default)]
    struct MapResolver {
        bindings: HashMap<ServiceKey, Vec<Instance>>,
    }

    impl MapResolver {
        fn bind(mut self, greeter: Arc<dyn Greeter>) -> Self {
            self.bindings
                .entry(ServiceKey::of::<dyn Greeter>())
                .or_default()
                .push(instance(greeter));
            self
        }
    }

    impl Resolver for MapResolver {
        fn resolve_all(&self, key: ServiceKey) -> Vec<Instance> {
            self.bindings.get(&key).cloned().unwrap_or_default()
        }
    }

    #[test]
    fn test_resolve_one_not_found() {
        let resolver = MapResolver::default();
        let err = resolver.resolve::<dyn Greeter>().err().unwrap();
        assert!(matches!(err, ResolveError::NotFound { .. }));
        assert!(resolver.resolve_many::<dyn Greeter>().unwrap().is_empty());
    }

    #[test]
    fn test_resolve_one_ambiguous() {
        let resolver = MapResolver::default()
            .bind(Arc::new(Hello("a")))
            .bind(Arc::new(Hello("b")));
        let err = resolver.resolve::<dyn Greeter>().err().unwrap();
        assert_eq!(
            err,
            ResolveError::Ambiguous {
                service: ServiceKey::of::<dyn Greeter>().name(),
                count: 2
            }
        );
    }

    #[test]
    fn test_resolve_many_keeps_order() {
        let resolver = MapResolver::default()
            .bind(Arc::new(Hello("a")))
            .bind(Arc::new(Hello("b")));
        let names: Vec<_> = resolver
            .resolve_many::<dyn Greeter>()
            .unwrap()
            .iter()
            .map(|g| g.greet())
            .collect();
        assert_eq!(names, ["hello a", "hello b"]);
    }

    #[test]
    fn test_type_mismatch() {
        let mut resolver = MapResolver::default();
        resolver
            .bindings
            .insert(ServiceKey::of::<dyn Greeter>(), vec![Arc::new(5_u32) as Instance]);
        let err = resolver.resolve::<dyn Greeter>().err().unwrap();
        assert!(matches!(err, ResolveError::TypeMismatch { .. }));
    }
}
