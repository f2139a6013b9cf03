//! Lazy singleton dependency injection container
//!
//! The `Container` maps an interface type to the implementation bound under
//! it and hands out one shared instance per interface, constructing it (and
//! its dependencies, depth-first) on first request.

use crate::binding::{Binding, BindingState};
use crate::storage::BindingStorage;
use crate::{Component, DiError, Injectable, Provides, Result, Signature};
use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "logging")]
use tracing::{debug, trace};

// =============================================================================
// Same-thread cycle detection
// =============================================================================

thread_local! {
    /// Bindings currently under construction on this thread, outermost first.
    static RESOLVING: RefCell<Vec<(usize, TypeId, &'static str)>> = const { RefCell::new(Vec::new()) };
}

/// RAII marker for a binding under construction on the current thread.
///
/// Entering a binding that is already on the stack means its factory asked
/// for itself: the one-time initialization would wait on its own thread
/// forever, so the request fails with the full chain instead.
struct ResolutionGuard;

impl ResolutionGuard {
    fn enter(storage: usize, type_id: TypeId, type_name: &'static str) -> Result<Self> {
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(start) = stack
                .iter()
                .position(|&(s, id, _)| s == storage && id == type_id)
            {
                let chain = stack[start..]
                    .iter()
                    .map(|&(_, _, name)| name)
                    .chain(std::iter::once(type_name));
                return Err(DiError::circular(chain));
            }
            stack.push((storage, type_id, type_name));
            Ok(ResolutionGuard)
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLVING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Dependency injection container with lazily constructed singletons.
///
/// Clones share the same bindings. Registration is expected during a
/// wiring phase; resolution is safe from any number of threads.
///
/// # Examples
///
/// ```rust
/// use autowire::{Component, Container};
/// use std::sync::Arc;
///
/// struct Logger;
///
/// impl Component for Logger {
///     type Dependencies = ();
///     fn construct(_: ()) -> Self { Logger }
/// }
///
/// struct Service {
///     logger: Arc<Logger>,
/// }
///
/// impl Component for Service {
///     type Dependencies = Arc<Logger>;
///     fn construct(logger: Arc<Logger>) -> Self { Service { logger } }
/// }
///
/// let container = Container::new();
/// container.add::<Logger>().add::<Service>();
///
/// let service = container.get::<Service>().unwrap();
/// assert!(Arc::ptr_eq(&service.logger, &container.get::<Logger>().unwrap()));
/// ```
#[derive(Clone)]
pub struct Container {
    /// Binding storage
    storage: Arc<BindingStorage>,
    /// Lock state - uses AtomicBool for fast lock checking (no contention)
    locked: Arc<AtomicBool>,
}

impl Container {
    /// Create a new empty container.
    #[inline]
    pub fn new() -> Self {
        #[cfg(feature = "logging")]
        debug!(target: "autowire", "Creating new DI container");

        Self {
            storage: Arc::new(BindingStorage::new()),
            locked: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a container with pre-allocated capacity.
    ///
    /// Use this when you know approximately how many bindings will be registered.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Arc::new(BindingStorage::with_capacity(capacity)),
            locked: Arc::new(AtomicBool::new(false)),
        }
    }

    // =========================================================================
    // Registration Methods
    // =========================================================================

    /// Register `T` as its own implementation.
    ///
    /// Same as `bind::<T, T>()`.
    #[inline]
    pub fn add<T: Component>(&self) -> &Self {
        self.bind::<T, T>()
    }

    /// Register `T` as the implementation of interface `I`.
    ///
    /// Nothing is constructed until the first `get::<I>()`. If `I` is already
    /// bound the call is a no-op: the first registration wins.
    ///
    /// # Panics
    ///
    /// Panics if the container is locked.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use autowire::{provides, Component, Container};
    ///
    /// trait Greeter: Send + Sync {
    ///     fn greet(&self) -> &'static str;
    /// }
    ///
    /// struct English;
    /// struct French;
    ///
    /// impl Greeter for English { fn greet(&self) -> &'static str { "hello" } }
    /// impl Greeter for French { fn greet(&self) -> &'static str { "bonjour" } }
    ///
    /// impl Component for English {
    ///     type Dependencies = ();
    ///     fn construct(_: ()) -> Self { English }
    /// }
    ///
    /// impl Component for French {
    ///     type Dependencies = ();
    ///     fn construct(_: ()) -> Self { French }
    /// }
    ///
    /// provides!(English => dyn Greeter);
    /// provides!(French => dyn Greeter);
    ///
    /// let container = Container::new();
    /// container.bind::<dyn Greeter, English>();
    /// container.bind::<dyn Greeter, French>(); // ignored
    ///
    /// assert_eq!(container.get::<dyn Greeter>().unwrap().greet(), "hello");
    /// ```
    pub fn bind<I, T>(&self) -> &Self
    where
        I: ?Sized + Injectable,
        T: Component + Provides<I>,
    {
        self.check_not_locked();

        let inserted = self
            .storage
            .insert_if_absent(TypeId::of::<I>(), Binding::new::<I, T>);

        #[cfg(feature = "logging")]
        if inserted {
            let signature = T::signature();
            debug!(
                target: "autowire",
                interface = std::any::type_name::<I>(),
                implementation = std::any::type_name::<T>(),
                signature = %signature,
                binding_count = self.storage.len(),
                "Registered lazy singleton"
            );
        } else {
            debug!(
                target: "autowire",
                interface = std::any::type_name::<I>(),
                implementation = std::any::type_name::<T>(),
                "Interface already bound, keeping first registration"
            );
        }
        #[cfg(not(feature = "logging"))]
        let _ = inserted;

        self
    }

    // =========================================================================
    // Resolution Methods
    // =========================================================================

    /// Resolve the singleton bound to `T`.
    ///
    /// The first call constructs the implementation and everything it
    /// depends on; every later call, from any thread, returns the same `Arc`.
    /// Concurrent first calls block until the single construction finishes.
    ///
    /// # Errors
    ///
    /// - [`DiError::NotRegistered`] if nothing is bound to `T`
    /// - [`DiError::MissingDependency`] if a dependency somewhere below is unbound
    /// - [`DiError::CircularDependency`] if construction re-enters a binding
    ///   already being constructed on this thread
    pub fn get<T: ?Sized + Injectable>(&self) -> Result<Arc<T>> {
        let type_id = TypeId::of::<T>();

        let Some(binding) = self.storage.get(&type_id) else {
            #[cfg(feature = "logging")]
            debug!(
                target: "autowire",
                interface = std::any::type_name::<T>(),
                "Type not registered in container"
            );
            return Err(DiError::not_registered::<T>());
        };

        if let Some(cached) = binding.cached::<T>() {
            return Ok(cached);
        }

        let _guard = ResolutionGuard::enter(self.storage_id(), type_id, binding.interface)?;
        binding.resolve::<T>(self)
    }

    /// Alias for `get` - resolve a service.
    #[inline]
    pub fn resolve<T: ?Sized + Injectable>(&self) -> Result<Arc<T>> {
        self.get::<T>()
    }

    /// Try to resolve, returning None on any error.
    #[inline]
    pub fn try_get<T: ?Sized + Injectable>(&self) -> Option<Arc<T>> {
        self.get::<T>().ok()
    }

    // =========================================================================
    // Query Methods
    // =========================================================================

    /// Check if an implementation is bound to `T`.
    #[inline]
    pub fn contains<T: ?Sized + Injectable>(&self) -> bool {
        self.storage.contains(&TypeId::of::<T>())
    }

    /// Lifecycle state of the binding for `T`.
    #[inline]
    pub fn state<T: ?Sized + Injectable>(&self) -> BindingState {
        self.storage
            .get(&TypeId::of::<T>())
            .map_or(BindingState::Unbound, |b| b.state())
    }

    /// Constructor signature of the implementation bound to `T`.
    #[inline]
    pub fn signature_of<T: ?Sized + Injectable>(&self) -> Option<Signature> {
        self.storage
            .get(&TypeId::of::<T>())
            .map(|b| b.signature().clone())
    }

    /// Get the number of bindings.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Get all bound interface TypeIds.
    pub fn registered_types(&self) -> Vec<TypeId> {
        self.storage.type_ids()
    }

    /// Check the dependency graph without constructing anything.
    ///
    /// Every parameter of every bound implementation must itself be bound,
    /// and no implementation may depend on its own interface, directly or
    /// transitively. Run this at the end of wiring to catch what `get` would
    /// otherwise report (or, for cycles raced across threads, deadlock on).
    pub fn verify(&self) -> Result<()> {
        let bindings: HashMap<TypeId, Arc<Binding>> = self.storage.snapshot().into_iter().collect();

        for binding in bindings.values() {
            for param in binding.signature().params() {
                if !bindings.contains_key(&param.type_id) {
                    return Err(DiError::MissingDependency {
                        component: binding.implementation,
                        dependency: param.type_name,
                    });
                }
            }
        }

        let mut done: HashMap<TypeId, bool> = HashMap::with_capacity(bindings.len());
        let mut path: Vec<TypeId> = Vec::new();
        for type_id in bindings.keys() {
            visit(*type_id, &bindings, &mut done, &mut path)?;
        }

        #[cfg(feature = "logging")]
        debug!(
            target: "autowire",
            binding_count = bindings.len(),
            "Dependency graph verified"
        );

        Ok(())
    }

    // =========================================================================
    // Lifecycle Methods
    // =========================================================================

    /// Lock the container to prevent further registrations.
    ///
    /// Useful for ensuring nothing is bound after wiring is complete.
    #[inline]
    pub fn lock(&self) {
        self.locked.store(true, Ordering::Release);

        #[cfg(feature = "logging")]
        debug!(
            target: "autowire",
            binding_count = self.storage.len(),
            "Container locked - no further registrations allowed"
        );
    }

    /// Check if the container is locked.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Panic if locked (internal helper).
    #[inline]
    fn check_not_locked(&self) {
        if self.locked.load(Ordering::Relaxed) {
            panic!("Cannot register services: container is locked");
        }
    }

    /// Identity of the shared storage, so cycle detection never confuses two
    /// containers resolving the same type on one thread.
    #[inline]
    fn storage_id(&self) -> usize {
        Arc::as_ptr(&self.storage) as usize
    }
}

/// Depth-first walk marking nodes `false` while on the path and `true` once
/// all their dependencies are known to be acyclic.
fn visit(
    type_id: TypeId,
    bindings: &HashMap<TypeId, Arc<Binding>>,
    done: &mut HashMap<TypeId, bool>,
    path: &mut Vec<TypeId>,
) -> Result<()> {
    match done.get(&type_id).copied() {
        Some(true) => return Ok(()),
        Some(false) => {
            let start = path.iter().position(|id| *id == type_id).unwrap_or(0);
            let chain = path[start..]
                .iter()
                .chain(std::iter::once(&type_id))
                .filter_map(|id| bindings.get(id).map(|b| b.interface));
            return Err(DiError::circular(chain));
        }
        None => {}
    }

    let Some(binding) = bindings.get(&type_id) else {
        return Ok(());
    };

    done.insert(type_id, false);
    path.push(type_id);
    for param in binding.signature().params() {
        visit(param.type_id, bindings, done, path)?;
    }
    path.pop();
    done.insert(type_id, true);

    #[cfg(feature = "logging")]
    trace!(
        target: "autowire",
        interface = binding.interface,
        "Binding has an acyclic dependency graph"
    );

    Ok(())
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("binding_count", &self.len())
            .field("locked", &self.is_locked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::sync::atomic::AtomicU32;
    use std::thread;

    // Each test gets its own counter through a const generic so parallel
    // tests never observe each other's constructions.
    struct Counted<const N: usize>;

    static CONSTRUCTED: [AtomicU32; 8] = [const { AtomicU32::new(0) }; 8];

    impl<const N: usize> Component for Counted<N> {
        type Dependencies = ();
        fn construct(_: ()) -> Self {
            CONSTRUCTED[N].fetch_add(1, Ordering::SeqCst);
            Counted
        }
    }

    fn constructed<const N: usize>() -> u32 {
        CONSTRUCTED[N].load(Ordering::SeqCst)
    }

    struct Logger {
        lines: std::sync::Mutex<Vec<String>>,
    }

    impl Component for Logger {
        type Dependencies = ();
        fn construct(_: ()) -> Self {
            Logger {
                lines: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    struct Repository {
        logger: Arc<Logger>,
    }

    impl Component for Repository {
        type Dependencies = Arc<Logger>;
        fn construct(logger: Arc<Logger>) -> Self {
            logger.lines.lock().unwrap().push("repository ready".into());
            Repository { logger }
        }
    }

    struct Handler {
        logger: Arc<Logger>,
        repository: Arc<Repository>,
    }

    impl Component for Handler {
        type Dependencies = (Arc<Logger>, Arc<Repository>);
        fn construct((logger, repository): Self::Dependencies) -> Self {
            Handler { logger, repository }
        }
    }

    trait Store: Send + Sync {
        fn kind(&self) -> &'static str;
    }

    struct MemoryStore;
    struct DiskStore;

    impl Store for MemoryStore {
        fn kind(&self) -> &'static str {
            "memory"
        }
    }

    impl Store for DiskStore {
        fn kind(&self) -> &'static str {
            "disk"
        }
    }

    impl Component for MemoryStore {
        type Dependencies = ();
        fn construct(_: ()) -> Self {
            MemoryStore
        }
    }

    impl Component for DiskStore {
        type Dependencies = Arc<Logger>;
        fn construct(_: Arc<Logger>) -> Self {
            DiskStore
        }
    }

    crate::provides!(MemoryStore => dyn Store);
    crate::provides!(DiskStore => dyn Store);

    struct Ping {
        _pong: Arc<Pong>,
    }

    struct Pong {
        _ping: Arc<Ping>,
    }

    impl Component for Ping {
        type Dependencies = Arc<Pong>;
        fn construct(pong: Arc<Pong>) -> Self {
            Ping { _pong: pong }
        }
    }

    impl Component for Pong {
        type Dependencies = Arc<Ping>;
        fn construct(ping: Arc<Ping>) -> Self {
            Pong { _ping: ping }
        }
    }

    #[test]
    fn test_singleton_identity() {
        let container = Container::new();
        container.add::<Logger>();

        let l1 = container.get::<Logger>().unwrap();
        let l2 = container.get::<Logger>().unwrap();
        assert!(Arc::ptr_eq(&l1, &l2));
    }

    #[test]
    fn test_lazy_construction() {
        let container = Container::new();
        container.add::<Counted<0>>();

        assert_eq!(constructed::<0>(), 0);
        assert_eq!(container.state::<Counted<0>>(), BindingState::Bound);

        for _ in 0..5 {
            container.get::<Counted<0>>().unwrap();
        }
        assert_eq!(constructed::<0>(), 1);
        assert_eq!(container.state::<Counted<0>>(), BindingState::Realized);
    }

    #[test]
    fn test_exactly_once_under_concurrency() {
        const THREADS: usize = 16;

        let container = Container::new();
        container.add::<Counted<1>>();
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let container = container.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    container.get::<Counted<1>>().unwrap()
                })
            })
            .collect();

        let resolved: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(constructed::<1>(), 1);
        assert!(resolved.iter().all(|s| Arc::ptr_eq(s, &resolved[0])));
    }

    #[test]
    fn test_dependency_wiring() {
        let container = Container::new();
        container.add::<Handler>().add::<Repository>().add::<Logger>();

        let handler = container.get::<Handler>().unwrap();
        let logger = container.get::<Logger>().unwrap();
        let repository = container.get::<Repository>().unwrap();

        assert!(Arc::ptr_eq(&handler.logger, &logger));
        assert!(Arc::ptr_eq(&handler.repository, &repository));
        assert!(Arc::ptr_eq(&repository.logger, &logger));
        assert_eq!(logger.lines.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_interface_substitution() {
        let container = Container::new();
        container.bind::<dyn Store, MemoryStore>();

        let store = container.get::<dyn Store>().unwrap();
        assert_eq!(store.kind(), "memory");

        // The interface binding is its own key; the implementation is not bound.
        assert!(!container.contains::<MemoryStore>());
    }

    #[test]
    fn test_first_writer_wins() {
        let container = Container::new();
        container.add::<Logger>();
        container.bind::<dyn Store, MemoryStore>();
        container.bind::<dyn Store, DiskStore>();

        assert_eq!(container.len(), 2);
        assert_eq!(container.signature_of::<dyn Store>(), Some(Signature::empty()));
        assert_eq!(container.get::<dyn Store>().unwrap().kind(), "memory");
    }

    #[test]
    fn test_not_registered() {
        let container = Container::new();
        let result = container.get::<Logger>();
        assert_eq!(result.err(), Some(DiError::not_registered::<Logger>()));
        assert_eq!(container.state::<Logger>(), BindingState::Unbound);
        assert!(container.try_get::<Logger>().is_none());
    }

    #[test]
    fn test_missing_dependency_names_component() {
        let container = Container::new();
        container.add::<Repository>();

        let err = container.get::<Repository>().err();
        assert_eq!(
            err,
            Some(DiError::MissingDependency {
                component: std::any::type_name::<Repository>(),
                dependency: std::any::type_name::<Logger>(),
            })
        );
        // Failed construction leaves the binding bound; wiring can still finish.
        assert_eq!(container.state::<Repository>(), BindingState::Bound);

        container.add::<Logger>();
        assert!(container.get::<Repository>().is_ok());
    }

    #[test]
    fn test_cycle_is_reported_not_deadlocked() {
        let container = Container::new();
        container.add::<Ping>().add::<Pong>();

        match container.get::<Ping>() {
            Err(DiError::CircularDependency { chain }) => {
                assert_eq!(chain.matches("Ping").count(), 2);
                assert!(chain.contains("Pong"));
            }
            other => panic!("expected a cycle, got {:?}", other.err()),
        }
        assert_eq!(container.state::<Ping>(), BindingState::Bound);
    }

    #[test]
    fn test_verify() {
        let container = Container::new();
        container.add::<Handler>().add::<Repository>();
        match container.verify() {
            Err(DiError::MissingDependency { dependency, .. }) => {
                assert_eq!(dependency, std::any::type_name::<Logger>());
            }
            other => panic!("expected a missing dependency, got {:?}", other),
        }
        // verify never constructs
        assert_eq!(container.state::<Handler>(), BindingState::Bound);

        container.add::<Logger>();
        assert!(container.verify().is_ok());

        let cyclic = Container::new();
        cyclic.add::<Ping>().add::<Pong>();
        assert!(matches!(
            cyclic.verify(),
            Err(DiError::CircularDependency { .. })
        ));
    }

    #[test]
    fn test_signature_of() {
        let container = Container::new();
        container.add::<Handler>();

        let sig = container.signature_of::<Handler>().unwrap();
        assert_eq!(
            sig.type_names(),
            vec![
                std::any::type_name::<Logger>(),
                std::any::type_name::<Repository>()
            ]
        );
        assert!(container.signature_of::<Logger>().is_none());
    }

    #[test]
    fn test_registered_types() {
        let container = Container::with_capacity(4);
        assert!(container.registered_types().is_empty());

        container.add::<Logger>().bind::<dyn Store, MemoryStore>();
        container.bind::<dyn Store, DiskStore>();

        let mut types = container.registered_types();
        types.sort();
        let mut expected = vec![TypeId::of::<Logger>(), TypeId::of::<dyn Store>()];
        expected.sort();
        assert_eq!(types, expected);
        assert!(!types.contains(&TypeId::of::<MemoryStore>()));
    }

    #[test]
    fn test_clones_share_bindings() {
        let container = Container::new();
        let clone = container.clone();
        clone.add::<Logger>();

        assert!(container.contains::<Logger>());
        assert!(Arc::ptr_eq(
            &container.get::<Logger>().unwrap(),
            &clone.get::<Logger>().unwrap()
        ));
    }

    #[test]
    fn test_separate_containers_are_independent() {
        let a = Container::new();
        let b = Container::new();
        a.add::<Logger>();
        b.add::<Logger>();

        assert!(!Arc::ptr_eq(
            &a.get::<Logger>().unwrap(),
            &b.get::<Logger>().unwrap()
        ));
    }

    #[test]
    fn test_lock() {
        let container = Container::new();
        assert!(!container.is_locked());

        container.lock();
        assert!(container.is_locked());
    }

    #[test]
    #[should_panic(expected = "Cannot register services: container is locked")]
    fn test_register_after_lock() {
        let container = Container::new();
        container.lock();
        container.add::<Logger>();
    }
}
