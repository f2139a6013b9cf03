//! # autowire - Lazy singleton dependency injection
//!
//! Bind interfaces to implementations once, then ask for any of them. The
//! container works out each constructor's parameters from a declared
//! signature, builds dependencies first, and shares one instance per
//! interface for the container's lifetime.
//!
//! ## Features
//!
//! - **Declared signatures** - a [`Component`] names its constructor parameters as
//!   `Arc<T>` handles; `#[derive(Component)]` and `#[component]` write that for you
//! - **Lazy singletons** - nothing is built until first asked for, then exactly once
//! - **Interfaces** - bind a `dyn Trait` to an implementation with [`provides!`]
//! - **First binding wins** - re-binding an interface is ignored
//! - **Compile-time wiring** - [`Wiring`] rejects missing dependencies and
//!   unregistered lookups before the program runs
//! - **Thread-safe** - `DashMap` bindings, `OnceCell` singletons
//! - **Observable** - optional `tracing` events under the `autowire` target
//!
//! ## Quick Start
//!
//! ```rust
//! use autowire::{Component, Container, provides};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, line: &str) -> String;
//! }
//!
//! struct StdoutLogger;
//!
//! impl Logger for StdoutLogger {
//!     fn log(&self, line: &str) -> String {
//!         format!("[stdout] {line}")
//!     }
//! }
//!
//! impl Component for StdoutLogger {
//!     type Dependencies = ();
//!     fn construct(_: ()) -> Self { StdoutLogger }
//! }
//!
//! provides!(StdoutLogger => dyn Logger);
//!
//! struct Service {
//!     logger: Arc<dyn Logger>,
//! }
//!
//! impl Component for Service {
//!     type Dependencies = (Arc<dyn Logger>,);
//!     fn construct((logger,): Self::Dependencies) -> Self { Service { logger } }
//! }
//!
//! let container = Container::new();
//! container.bind::<dyn Logger, StdoutLogger>().add::<Service>();
//!
//! let service = container.get::<Service>().unwrap();
//! assert_eq!(service.logger.log("hi"), "[stdout] hi");
//! ```
//!
//! ## Compile-Time Wiring
//!
//! ```rust
//! use autowire::{Component, Wiring};
//! use std::sync::Arc;
//!
//! struct Config;
//!
//! impl Component for Config {
//!     type Dependencies = ();
//!     fn construct(_: ()) -> Self { Config }
//! }
//!
//! struct Database(Arc<Config>);
//!
//! impl Component for Database {
//!     type Dependencies = Arc<Config>;
//!     fn construct(config: Arc<Config>) -> Self { Database(config) }
//! }
//!
//! let resolver = Wiring::new().add::<Config, _>().add::<Database, _>().build();
//! let db: Arc<Database> = resolver.get::<Database, _>();
//! ```
//!
//! ## Derived Signatures
//!
//! With the `derive` feature:
//!
//! ```rust,ignore
//! use autowire::{Component, component};
//! use std::sync::Arc;
//!
//! #[derive(Component)]
//! struct Repository {
//!     db: Arc<Database>,
//! }
//!
//! struct Handler { repo: Arc<Repository> }
//!
//! #[component]
//! impl Handler {
//!     fn new(repo: Arc<Repository>) -> Self { Handler { repo } }
//! }
//! ```

mod binding;
mod container;
mod error;
mod global;
pub mod ledger;
#[cfg(feature = "logging")]
pub mod logging;
mod provider;
mod signature;
mod storage;

pub use binding::BindingState;
pub use container::Container;
pub use error::{DiError, Result};
pub use global::{add, bind, get, global};
pub use ledger::{Resolver, Wiring};
pub use provider::{Injectable, Provides};
pub use signature::{Component, Dependencies, Parameter, Signature};

#[cfg(feature = "derive")]
pub use autowire_derive::{Component, component};

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BindingState, Component, Container, DiError, Injectable, Provides, Resolver, Result,
        Wiring, provides,
    };
    pub use std::sync::Arc;
}
