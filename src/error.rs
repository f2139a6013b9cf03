//! Error types for dependency injection

use thiserror::Error;

/// Errors that can occur while resolving or verifying bindings.
///
/// The typed [`Wiring`](crate::Wiring) path turns every one of these into a
/// build failure; they are only observable through the dynamic [`Container`](crate::Container).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiError {
    /// Nothing was bound under the requested type
    #[error("Type not registered: {type_name}")]
    NotRegistered { type_name: &'static str },

    /// A component's constructor needs a type that was never bound
    #[error("{component} depends on {dependency}, which is not registered")]
    MissingDependency {
        component: &'static str,
        dependency: &'static str,
    },

    /// Resolution re-entered a type that is still being constructed
    #[error("Circular dependency detected: {chain}")]
    CircularDependency { chain: String },

    /// Internal error
    #[error("Internal DI error: {0}")]
    Internal(String),
}

impl DiError {
    /// Create a NotRegistered error for a type
    #[inline]
    pub fn not_registered<T: ?Sized + 'static>() -> Self {
        Self::NotRegistered {
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Create a CircularDependency error from the chain of type names
    pub fn circular<'a>(chain: impl IntoIterator<Item = &'a str>) -> Self {
        Self::CircularDependency {
            chain: chain.into_iter().collect::<Vec<_>>().join(" -> "),
        }
    }

    /// Attribute a missing registration to the component that asked for it.
    ///
    /// Only a bare `NotRegistered` is rewritten, so the innermost culprit
    /// survives nested resolution.
    pub(crate) fn within(self, component: &'static str) -> Self {
        match self {
            Self::NotRegistered { type_name } => Self::MissingDependency {
                component,
                dependency: type_name,
            },
            other => other,
        }
    }
}

/// Result type alias for DI operations
pub type Result<T> = std::result::Result<T, DiError>;

#[cfg(test)]
mod tests {
    use super::*;

    struct Database;

    #[test]
    fn test_not_registered_names_type() {
        let err = DiError::not_registered::<Database>();
        assert_eq!(
            err.to_string(),
            "Type not registered: autowire::error::tests::Database"
        );
    }

    #[test]
    fn test_within_rewrites_only_not_registered() {
        let err = DiError::not_registered::<Database>().within("Service");
        assert_eq!(
            err,
            DiError::MissingDependency {
                component: "Service",
                dependency: "autowire::error::tests::Database",
            }
        );

        let cycle = DiError::circular(["A", "B", "A"]).within("Service");
        assert_eq!(cycle.to_string(), "Circular dependency detected: A -> B -> A");
    }
}
