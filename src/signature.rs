//! Constructor signatures
//!
//! A [`Component`] names its constructor parameters through the
//! `Dependencies` associated type. The parameter list is an ordered tuple of
//! `Arc<T>` handles, so the container can resolve each element positionally
//! and describe the whole list as a [`Signature`] without running anything.
//!
//! Writing the impl by hand is always possible, but the `derive` feature
//! discovers it from the type itself:
//!
//! - `#[derive(Component)]` reads the struct's fields,
//! - `#[component]` on an `impl` block reads the constructor's parameters.
//!
//! # Example
//!
//! ```rust
//! use autowire::{Component, Container};
//! use std::sync::Arc;
//!
//! struct Config;
//!
//! impl Component for Config {
//!     type Dependencies = ();
//!     fn construct(_: ()) -> Self { Config }
//! }
//!
//! struct Database {
//!     config: Arc<Config>,
//! }
//!
//! impl Component for Database {
//!     type Dependencies = (Arc<Config>,);
//!     fn construct((config,): Self::Dependencies) -> Self { Database { config } }
//! }
//!
//! assert_eq!(Database::signature().arity(), 1);
//!
//! let container = Container::new();
//! container.add::<Config>().add::<Database>();
//!
//! let db = container.get::<Database>().unwrap();
//! assert!(Arc::ptr_eq(&db.config, &container.get::<Config>().unwrap()));
//! ```

use crate::{Container, Injectable, Result};
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Component Trait
// =============================================================================

/// A concrete type the container knows how to construct.
pub trait Component: Injectable + Sized {
    /// Constructor parameters, in declaration order.
    ///
    /// Use `()` for no parameters, `Arc<T>` for one, or a tuple of `Arc`s.
    type Dependencies: Dependencies;

    /// Build the value from its resolved parameters.
    fn construct(deps: Self::Dependencies) -> Self;

    /// The parameter signature of [`construct`](Component::construct).
    #[inline]
    fn signature() -> Signature {
        Self::Dependencies::signature()
    }
}

// =============================================================================
// Signature
// =============================================================================

/// One constructor parameter: a shared handle to the type bound under `type_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Parameter {
    /// Key of the binding this parameter is resolved from
    pub type_id: TypeId,
    /// Element type of the `Arc`, for diagnostics
    pub type_name: &'static str,
}

impl Parameter {
    /// Parameter resolved from the binding of `T`.
    #[inline]
    pub fn of<T: ?Sized + Injectable>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }
}

/// Ordered constructor parameter list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Parameter>,
}

impl Signature {
    /// Signature with no parameters.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of parameters.
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameters in declaration order.
    #[inline]
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Element type names in declaration order.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.params.iter().map(|p| p.type_name).collect()
    }

    /// Check whether any parameter is resolved from `type_id`.
    #[inline]
    pub fn depends_on(&self, type_id: &TypeId) -> bool {
        self.params.iter().any(|p| &p.type_id == type_id)
    }
}

impl FromIterator<Parameter> for Signature {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "Arc<{}>", param.type_name)?;
        }
        f.write_str(")")
    }
}

// =============================================================================
// Dependencies Trait - parameter lists that can be resolved from a container
// =============================================================================

/// A constructor parameter list made only of container-managed handles.
///
/// Implemented for:
/// - `()` - No dependencies
/// - `Arc<T>` - Single dependency
/// - Tuples of `Arc<T>` (1-12 elements) - Multiple dependencies
///
/// Any other parameter type is rejected when the component is declared:
///
/// ```rust,compile_fail
/// use autowire::Component;
/// use std::sync::Arc;
///
/// struct Logger;
///
/// struct Service {
///     logger: Arc<Logger>,
///     name: String,
/// }
///
/// impl Component for Service {
///     type Dependencies = (Arc<Logger>, String);
///     fn construct((logger, name): Self::Dependencies) -> Self {
///         Service { logger, name }
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a dependency list",
    label = "constructor parameters must be `Arc<T>` handles to registered types",
    note = "use `()`, `Arc<T>` or a tuple of `Arc`s"
)]
pub trait Dependencies: Sized + Send + 'static {
    /// Describe the parameter list.
    fn signature() -> Signature;

    /// Resolve every parameter from the container, in order.
    fn resolve(container: &Container) -> Result<Self>;
}

// No dependencies
impl Dependencies for () {
    #[inline]
    fn signature() -> Signature {
        Signature::empty()
    }

    #[inline]
    fn resolve(_container: &Container) -> Result<Self> {
        Ok(())
    }
}

// Single dependency
impl<T: ?Sized + Injectable> Dependencies for Arc<T> {
    #[inline]
    fn signature() -> Signature {
        std::iter::once(Parameter::of::<T>()).collect()
    }

    #[inline]
    fn resolve(container: &Container) -> Result<Self> {
        container.get::<T>()
    }
}

// Tuple implementations (1-12 elements)
macro_rules! impl_dependencies_tuple {
    ($($T:ident),+) => {
        impl<$($T: ?Sized + Injectable),+> Dependencies for ($(Arc<$T>,)+) {
            #[inline]
            fn signature() -> Signature {
                [$(Parameter::of::<$T>()),+].into_iter().collect()
            }

            #[inline]
            fn resolve(container: &Container) -> Result<Self> {
                Ok(($(container.get::<$T>()?,)+))
            }
        }
    };
}

impl_dependencies_tuple!(A);
impl_dependencies_tuple!(A, B);
impl_dependencies_tuple!(A, B, C);
impl_dependencies_tuple!(A, B, C, D);
impl_dependencies_tuple!(A, B, C, D, E);
impl_dependencies_tuple!(A, B, C, D, E, F);
impl_dependencies_tuple!(A, B, C, D, E, F, G);
impl_dependencies_tuple!(A, B, C, D, E, F, G, H);
impl_dependencies_tuple!(A, B, C, D, E, F, G, H, I);
impl_dependencies_tuple!(A, B, C, D, E, F, G, H, I, J);
impl_dependencies_tuple!(A, B, C, D, E, F, G, H, I, J, K);
impl_dependencies_tuple!(A, B, C, D, E, F, G, H, I, J, K, L);
