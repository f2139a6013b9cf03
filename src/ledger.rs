//! Compile-time registration ledger
//!
//! A [`Wiring`] records every interface it binds in its own type parameter.
//! Two checks then happen while compiling, not while running:
//!
//! - `add`/`bind` require every constructor parameter of the implementation
//!   to be bound *earlier* in the same wiring. Missing dependencies and
//!   dependency cycles cannot be expressed.
//! - [`Resolver::get`] requires the requested type to be in the ledger.
//!
//! Index parameters (`_`) are inferred; they locate the entry in the ledger.
//!
//! # Example
//!
//! ```rust
//! use autowire::{Component, Wiring};
//! use std::sync::Arc;
//!
//! struct Logger;
//!
//! impl Component for Logger {
//!     type Dependencies = ();
//!     fn construct(_: ()) -> Self { Logger }
//! }
//!
//! struct Service {
//!     logger: Arc<Logger>,
//! }
//!
//! impl Component for Service {
//!     type Dependencies = Arc<Logger>;
//!     fn construct(logger: Arc<Logger>) -> Self { Service { logger } }
//! }
//!
//! let resolver = Wiring::new()
//!     .add::<Logger, _>()
//!     .add::<Service, _>()
//!     .build();
//!
//! let service = resolver.get::<Service, _>();
//! assert!(Arc::ptr_eq(&service.logger, &resolver.get::<Logger, _>()));
//! ```
//!
//! Asking for a type that was never added does not compile:
//!
//! ```rust,compile_fail
//! use autowire::{Component, Wiring};
//!
//! struct Logger;
//!
//! impl Component for Logger {
//!     type Dependencies = ();
//!     fn construct(_: ()) -> Self { Logger }
//! }
//!
//! let resolver = Wiring::new().build();
//! let logger = resolver.get::<Logger, _>();
//! ```
//!
//! Neither does adding a component before its dependencies:
//!
//! ```rust,compile_fail
//! use autowire::{Component, Wiring};
//! use std::sync::Arc;
//!
//! struct Logger;
//!
//! impl Component for Logger {
//!     type Dependencies = ();
//!     fn construct(_: ()) -> Self { Logger }
//! }
//!
//! struct Service(Arc<Logger>);
//!
//! impl Component for Service {
//!     type Dependencies = Arc<Logger>;
//!     fn construct(logger: Arc<Logger>) -> Self { Service(logger) }
//! }
//!
//! let resolver = Wiring::new()
//!     .add::<Service, _>()
//!     .add::<Logger, _>()
//!     .build();
//! ```

use crate::{Component, Container, Injectable, Provides};
use std::marker::PhantomData;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::debug;

// =============================================================================
// Ledger Marker Types
// =============================================================================

/// Ledger with no entries.
pub struct Empty;

/// Ledger entry for `T` in front of the entries in `Rest`.
pub struct Marked<T: ?Sized, Rest>(PhantomData<(PhantomData<T>, Rest)>);

/// Index: the entry is at the head of the ledger.
pub struct Here;

/// Index: the entry is somewhere in the tail, at index `I`.
pub struct There<I>(PhantomData<I>);

/// Proof that `T` is marked in this ledger at index `I`.
#[diagnostic::on_unimplemented(
    message = "`{T}` was never added to this wiring",
    label = "`{T}` is not registered",
    note = "call `.add::<{T}, _>()` or `.bind::<{T}, Impl, _>()` first"
)]
pub trait Contains<T: ?Sized, I> {}

impl<T: ?Sized, Rest> Contains<T, Here> for Marked<T, Rest> {}

impl<T: ?Sized, U: ?Sized, Rest, I> Contains<T, There<I>> for Marked<U, Rest> where
    Rest: Contains<T, I>
{
}

/// Proof that every element of a dependency list is marked in ledger `L`.
#[diagnostic::on_unimplemented(
    message = "a dependency in `{Self}` was never added to this wiring",
    label = "dependencies must be added before the components that use them"
)]
pub trait RegisteredIn<L, I> {}

impl<L> RegisteredIn<L, ()> for () {}

impl<L, T: ?Sized, I> RegisteredIn<L, I> for Arc<T> where L: Contains<T, I> {}

macro_rules! impl_registered_tuple {
    ($(($T:ident, $I:ident)),+) => {
        impl<L, $($T: ?Sized, $I),+> RegisteredIn<L, ($($I,)+)> for ($(Arc<$T>,)+)
        where
            $(L: Contains<$T, $I>),+
        {
        }
    };
}

impl_registered_tuple!((A, IA));
impl_registered_tuple!((A, IA), (B, IB));
impl_registered_tuple!((A, IA), (B, IB), (C, IC));
impl_registered_tuple!((A, IA), (B, IB), (C, IC), (D, ID));
impl_registered_tuple!((A, IA), (B, IB), (C, IC), (D, ID), (E, IE));
impl_registered_tuple!((A, IA), (B, IB), (C, IC), (D, ID), (E, IE), (F, IF));
impl_registered_tuple!((A, IA), (B, IB), (C, IC), (D, ID), (E, IE), (F, IF), (G, IG));
impl_registered_tuple!((A, IA), (B, IB), (C, IC), (D, ID), (E, IE), (F, IF), (G, IG), (H, IH));
impl_registered_tuple!(
    (A, IA), (B, IB), (C, IC), (D, ID), (E, IE), (F, IF), (G, IG), (H, IH), (J, IJ)
);
impl_registered_tuple!(
    (A, IA), (B, IB), (C, IC), (D, ID), (E, IE), (F, IF), (G, IG), (H, IH), (J, IJ), (K, IK)
);
impl_registered_tuple!(
    (A, IA), (B, IB), (C, IC), (D, ID), (E, IE), (F, IF), (G, IG), (H, IH), (J, IJ), (K, IK),
    (M, IM)
);
impl_registered_tuple!(
    (A, IA), (B, IB), (C, IC), (D, ID), (E, IE), (F, IF), (G, IG), (H, IH), (J, IJ), (K, IK),
    (M, IM), (N, IN)
);

// =============================================================================
// Type-State Wiring
// =============================================================================

/// A container builder whose type records every bound interface.
pub struct Wiring<L = Empty> {
    container: Container,
    _ledger: PhantomData<fn() -> L>,
}

impl Wiring<Empty> {
    /// Start an empty wiring.
    #[inline]
    pub fn new() -> Self {
        Self {
            container: Container::new(),
            _ledger: PhantomData,
        }
    }

    /// Create with pre-allocated capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            container: Container::with_capacity(capacity),
            _ledger: PhantomData,
        }
    }
}

impl Default for Wiring<Empty> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> Wiring<L> {
    /// Register `T` as its own implementation and mark `T` in the ledger.
    #[inline]
    pub fn add<T, Idx>(self) -> Wiring<Marked<T, L>>
    where
        T: Component,
        T::Dependencies: RegisteredIn<L, Idx>,
    {
        self.bind::<T, T, Idx>()
    }

    /// Register `T` as the implementation of `I` and mark `I` in the ledger.
    ///
    /// Re-binding an interface keeps the first implementation at runtime. The
    /// interface is then marked twice, so lookups of it must spell out the
    /// index instead of inferring it.
    #[inline]
    pub fn bind<I, T, Idx>(self) -> Wiring<Marked<I, L>>
    where
        I: ?Sized + Injectable,
        T: Component + Provides<I>,
        T::Dependencies: RegisteredIn<L, Idx>,
    {
        self.container.bind::<I, T>();
        Wiring {
            container: self.container,
            _ledger: PhantomData,
        }
    }

    /// Finish wiring; the container is locked against further registration.
    #[inline]
    pub fn build(self) -> Resolver<L> {
        self.container.lock();

        #[cfg(feature = "logging")]
        debug!(
            target: "autowire",
            binding_count = self.container.len(),
            "Wiring complete"
        );

        Resolver {
            container: self.container,
            _ledger: PhantomData,
        }
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// A locked container that only resolves types recorded in its ledger.
pub struct Resolver<L> {
    container: Container,
    _ledger: PhantomData<fn() -> L>,
}

impl<L> Resolver<L> {
    /// Resolve the singleton bound to `T`.
    ///
    /// Infallible: `T` and, transitively, everything it depends on were bound
    /// before `T` itself, so resolution cannot miss a binding or cycle.
    #[inline]
    pub fn get<T, Idx>(&self) -> Arc<T>
    where
        T: ?Sized + Injectable,
        L: Contains<T, Idx>,
    {
        self.container
            .get::<T>()
            .expect("Resolver: ledger admitted a type the container cannot resolve")
    }

    /// Access the underlying (locked) container.
    #[inline]
    pub fn container(&self) -> &Container {
        &self.container
    }
}

impl<L> Clone for Resolver<L> {
    fn clone(&self) -> Self {
        Self {
            container: self.container.clone(),
            _ledger: PhantomData,
        }
    }
}

impl<L> std::fmt::Debug for Resolver<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("inner", &self.container)
            .finish()
    }
}
