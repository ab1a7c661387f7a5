//! Error types for the ambient registry.

use std::fmt;

/// Registry errors.
///
/// Represents the error conditions that can occur while registering bindings
/// on a [`Scope`](crate::Scope) or resolving keys through the ambient chain.
///
/// # Examples
///
/// ```rust
/// use ambient_di::{DiError, Key, get};
///
/// let port: Key<u16> = Key::new("port");
///
/// // No scope is active and the key carries no default.
/// match get(&port) {
///     Err(DiError::MissingDependency(label)) => assert_eq!(label, "port"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiError {
    /// No node in the ambient chain binds the key and it has no default
    MissingDependency(String),
    /// A single-resolution factory transitively depends on itself.
    /// Carries the minimal cycle, in detection order.
    CircularDependency(Vec<String>),
    /// The same key was registered twice on one builder
    DuplicateBinding(String),
    /// A stored value did not match the key's declared type
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::MissingDependency(label) => {
                write!(f, "Missing dependency: {}", label)
            }
            DiError::CircularDependency(cycle) => {
                write!(f, "Circular dependency: {}", cycle.join(" -> "))
            }
            DiError::DuplicateBinding(label) => {
                write!(f, "Duplicate binding: {}", label)
            }
            DiError::TypeMismatch { key, expected, actual } => {
                write!(f, "Type mismatch for {}: expected {}, got {}", key, expected, actual)
            }
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for registry operations
///
/// A convenience alias for `Result<T, DiError>` used throughout ambient-di.
///
/// # Examples
///
/// ```rust
/// use ambient_di::{DiResult, DiError};
///
/// fn checked() -> DiResult<u32> {
///     Err(DiError::MissingDependency("budget".to_string()))
/// }
///
/// assert!(checked().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
