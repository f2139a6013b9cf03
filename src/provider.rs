//! Provider traits for dependency injection
//!
//! These traits define what types can be bound and how an implementation
//! is seen through the interface it is bound under.

use std::any::TypeId;
use std::sync::Arc;

/// Marker trait for types that can be used as a binding key.
///
/// This is automatically implemented for every `Send + Sync + 'static` type,
/// including unsized trait objects such as `dyn Greeter` when the trait has
/// `Send + Sync` as supertraits. You never need to implement this manually.
pub trait Injectable: Send + Sync + 'static {
    /// Returns the TypeId of this type (for internal use)
    #[inline]
    fn type_id_of() -> TypeId {
        TypeId::of::<Self>()
    }

    /// Returns the type name for debugging
    #[inline]
    fn type_name_of() -> &'static str {
        std::any::type_name::<Self>()
    }
}

// Blanket implementation - everything that's Send + Sync + 'static is Injectable
impl<T: ?Sized + Send + Sync + 'static> Injectable for T {}

/// An implementation that satisfies the contract of `I`.
///
/// Every type provides itself. Trait-object interfaces are provided with the
/// [`provides!`](crate::provides) macro, which relies on the unsizing coercion
/// from `Arc<Impl>` to `Arc<dyn Trait>`.
pub trait Provides<I: ?Sized>: Injectable {
    /// View a shared handle to the implementation as a handle to `I`.
    fn upcast(self: Arc<Self>) -> Arc<I>;
}

impl<T: Injectable> Provides<T> for T {
    #[inline]
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Declare that an implementation satisfies one or more interfaces.
///
/// # Example
///
/// ```rust
/// use autowire::{provides, Provides};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
///
/// provides!(English => dyn Greeter);
///
/// let greeter = <English as Provides<dyn Greeter>>::upcast(Arc::new(English));
/// assert_eq!(greeter.greet(), "hello");
/// ```
#[macro_export]
macro_rules! provides {
    ($implementation:ty => $($interface:ty),+ $(,)?) => {
        $(
            impl $crate::Provides<$interface> for $implementation {
                #[inline]
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$interface> {
                    self
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape: Send + Sync {
        fn sides(&self) -> u32;
    }

    trait Named: Send + Sync {
        fn name(&self) -> &'static str;
    }

    struct Square;

    impl Shape for Square {
        fn sides(&self) -> u32 {
            4
        }
    }

    impl Named for Square {
        fn name(&self) -> &'static str {
            "square"
        }
    }

    crate::provides!(Square => dyn Shape, dyn Named);

    #[test]
    fn test_identity_upcast_keeps_allocation() {
        let square = Arc::new(Square);
        let same = <Square as Provides<Square>>::upcast(Arc::clone(&square));
        assert!(Arc::ptr_eq(&square, &same));
    }

    #[test]
    fn test_trait_object_upcast() {
        let shape = <Square as Provides<dyn Shape>>::upcast(Arc::new(Square));
        let named = <Square as Provides<dyn Named>>::upcast(Arc::new(Square));
        assert_eq!(shape.sides(), 4);
        assert_eq!(named.name(), "square");
    }

    #[test]
    fn test_unsized_type_names() {
        assert_eq!(
            <dyn Shape as Injectable>::type_id_of(),
            TypeId::of::<dyn Shape>()
        );
        assert!(<dyn Shape as Injectable>::type_name_of().contains("Shape"));
    }
}
