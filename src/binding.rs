//! Per-interface binding records
//!
//! A binding owns the deferred constructor registered for one interface and
//! the singleton it produces. The instance is type-erased as a boxed
//! `Arc<I>`, which keeps unsized interfaces such as `dyn Trait` storable
//! behind `dyn Any`.

use crate::{
    Component, Container, Dependencies, DiError, Injectable, Provides, Result, Signature,
};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Type-erased boxed `Arc<I>`
type Erased = Box<dyn Any + Send + Sync>;

/// Type-erased factory function
type BindingFn = Box<dyn Fn(&Container) -> Result<Erased> + Send + Sync>;

/// Lifecycle of a binding.
///
/// Transitions only move forward: `Unbound -> Bound` on the first `add`,
/// `Bound -> Realized` on the first successful `get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingState {
    /// Nothing registered for the type
    Unbound,
    /// Factory stored, not yet evaluated
    Bound,
    /// Singleton constructed and cached
    Realized,
}

/// The record stored under one interface.
pub(crate) struct Binding {
    factory: BindingFn,
    instance: OnceCell<Erased>,
    signature: Signature,
    pub(crate) interface: &'static str,
    pub(crate) implementation: &'static str,
}

impl Binding {
    /// Bind `T` as the implementation of `I`.
    ///
    /// Nothing is constructed here; dependencies are resolved from whichever
    /// container evaluates the factory.
    pub fn new<I, T>() -> Self
    where
        I: ?Sized + Injectable,
        T: Component + Provides<I>,
    {
        let implementation = std::any::type_name::<T>();
        Self {
            factory: Box::new(move |container| {
                let deps = T::Dependencies::resolve(container)
                    .map_err(|err| err.within(implementation))?;
                let instance = <T as Provides<I>>::upcast(Arc::new(T::construct(deps)));
                Ok(Box::new(instance) as Erased)
            }),
            instance: OnceCell::new(),
            signature: T::signature(),
            interface: std::any::type_name::<I>(),
            implementation,
        }
    }

    /// Get the singleton, constructing it on first access.
    ///
    /// Concurrent first callers block until the winning evaluation finishes.
    /// A failed evaluation leaves the binding `Bound`.
    pub fn resolve<I: ?Sized + Injectable>(&self, container: &Container) -> Result<Arc<I>> {
        let erased = self.instance.get_or_try_init(|| {
            #[cfg(feature = "logging")]
            debug!(
                target: "autowire",
                interface = self.interface,
                implementation = self.implementation,
                arity = self.signature.arity(),
                "Constructing singleton on first access"
            );

            (self.factory)(container)
        })?;

        erased.downcast_ref::<Arc<I>>().cloned().ok_or_else(|| {
            DiError::Internal(format!(
                "binding for {} holds a different type than {}",
                self.interface,
                std::any::type_name::<I>()
            ))
        })
    }

    /// Cached singleton, if already constructed.
    #[inline]
    pub fn cached<I: ?Sized + Injectable>(&self) -> Option<Arc<I>> {
        let instance = self.instance.get()?.downcast_ref::<Arc<I>>().cloned();

        #[cfg(feature = "logging")]
        if instance.is_some() {
            trace!(
                target: "autowire",
                interface = self.interface,
                "Singleton already constructed, returning cached instance"
            );
        }

        instance
    }

    #[inline]
    pub fn state(&self) -> BindingState {
        if self.instance.get().is_some() {
            BindingState::Realized
        } else {
            BindingState::Bound
        }
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("interface", &self.interface)
            .field("implementation", &self.implementation)
            .field("signature", &self.signature)
            .field("state", &self.state())
            .finish()
    }
}
