//! Process-wide registry
//!
//! A single [`Container`] created on first use. The free functions forward
//! to it, so bindings made in one module are visible everywhere.

use crate::{Component, Container, Injectable, Provides, Result};
use once_cell::sync::Lazy;
use std::sync::Arc;

static GLOBAL: Lazy<Container> = Lazy::new(Container::new);

/// The process-wide container.
///
/// ```
/// use autowire::Component;
///
/// struct Greeting;
///
/// impl Component for Greeting {
///     type Dependencies = ();
///     fn construct(_: ()) -> Self { Greeting }
/// }
///
/// autowire::global().add::<Greeting>();
/// assert!(autowire::get::<Greeting>().is_ok());
/// ```
#[inline]
pub fn global() -> &'static Container {
    &GLOBAL
}

/// Register `T` as its own implementation in the process-wide container.
#[inline]
pub fn add<T: Component>() {
    GLOBAL.add::<T>();
}

/// Register `T` as the implementation of `I` in the process-wide container.
#[inline]
pub fn bind<I, T>()
where
    I: ?Sized + Injectable,
    T: Component + Provides<I>,
{
    GLOBAL.bind::<I, T>();
}

/// Resolve the singleton bound to `T` from the process-wide container.
#[inline]
pub fn get<T: ?Sized + Injectable>() -> Result<Arc<T>> {
    GLOBAL.get::<T>()
}
