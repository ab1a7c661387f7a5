//! # ambient-di
//!
//! Scoped, typed ambient value-registry: make configuration and dependencies
//! available to code deep in a call tree without threading them through every
//! function signature.
//!
//! ## Features
//!
//! - **Identity-based typed keys**: [`Key<T>`] tokens name dependencies;
//!   labels are diagnostics only, equality is identity
//! - **Nested scopes**: executions chain immutable [`Injector`] nodes, inner
//!   bindings shadow outer ones, outer bindings stay visible
//! - **Eager factory resolution**: single-resolution producers run before the
//!   scoped action starts, in dependency order, with circular-dependency
//!   detection and minimal-cycle reporting
//! - **Ambient lookup**: [`get`] works anywhere under an execution, with no
//!   registry reference in scope
//! - **Task-aware propagation**: the ambient node survives `.await` points
//!   and never leaks between concurrent sibling executions
//!
//! ## Quick Start
//!
//! ```rust
//! use ambient_di::{Key, Scope, get_required};
//!
//! let db_url: Key<String> = Key::new("db_url");
//! let retries: Key<u32> = Key::with_default("retries", 3);
//!
//! let mut scope = Scope::new();
//! scope.bind_value(&db_url, "postgres://localhost".to_string()).unwrap();
//!
//! let summary = scope
//!     .execute(|| format!("{} x{}", get_required(&db_url), get_required(&retries)))
//!     .unwrap();
//! assert_eq!(summary, "postgres://localhost x3");
//! ```
//!
//! ## Nesting and shadowing
//!
//! An execution made while another node is ambient chains to it: inner
//! bindings win for the same key, everything else stays visible, and the
//! outer binding is observable again once the inner action returns.
//!
//! ```rust
//! use ambient_di::{Key, Scope, get_required};
//!
//! let tenant: Key<&'static str> = Key::new("tenant");
//!
//! let mut outer = Scope::new();
//! outer.bind_value(&tenant, "acme").unwrap();
//! let tenant2 = tenant.clone();
//! outer
//!     .execute(move || {
//!         assert_eq!(*get_required(&tenant2), "acme");
//!         let mut inner = Scope::new();
//!         inner.bind_value(&tenant2, "initech").unwrap();
//!         let tenant3 = tenant2.clone();
//!         inner.execute(move || assert_eq!(*get_required(&tenant3), "initech")).unwrap();
//!         assert_eq!(*get_required(&tenant2), "acme");
//!     })
//!     .unwrap();
//! ```
//!
//! ## Async executions
//!
//! ```rust
//! # use ambient_di::{Key, Scope, get_required};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let tenant: Key<&'static str> = Key::new("tenant");
//!
//! let mut scope = Scope::new();
//! scope.bind_value(&tenant, "acme").unwrap();
//! let tenant2 = tenant.clone();
//! let seen = scope
//!     .execute_async(async move {
//!         tokio::task::yield_now().await;
//!         *get_required(&tenant2)
//!     })
//!     .await
//!     .unwrap();
//! assert_eq!(seen, "acme");
//! # }
//! ```

// Module declarations
pub mod context;
pub mod error;
pub mod injector;
pub mod key;
pub mod scope;

// Internal modules
mod internal;
mod registration;
mod resolver;

// Re-export core types
pub use context::{exists, get, get_required, in_any_scope, propagate};
pub use error::{DiError, DiResult};
pub use injector::Injector;
pub use internal::CircularPanic;
pub use key::Key;
pub use scope::{provide_factories, FactoryBinding, Scope};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_binding_resolution() {
        let port: Key<u16> = Key::new("port");
        let mut scope = Scope::new();
        scope.bind_value(&port, 8080).unwrap();

        let resolved = scope.execute(|| *get_required(&port)).unwrap();
        assert_eq!(resolved, 8080);
    }

    #[test]
    fn test_key_identity_not_label() {
        let a: Key<u32> = Key::new("same-label");
        let b: Key<u32> = Key::new("same-label");
        assert_ne!(a, b);

        let mut scope = Scope::new();
        scope.bind_value(&a, 1).unwrap();
        // Distinct dependency despite the colliding label.
        scope.bind_value(&b, 2).unwrap();

        let (a2, b2) = (a.clone(), b.clone());
        let (va, vb) = scope
            .execute(move || (*get_required(&a2), *get_required(&b2)))
            .unwrap();
        assert_eq!((va, vb), (1, 2));
    }

    #[test]
    fn test_clone_shares_identity() {
        let key: Key<String> = Key::new("shared");
        let alias = key.clone();
        assert_eq!(key, alias);

        let mut scope = Scope::new();
        scope.bind_value(&key, "via-original".to_string()).unwrap();
        let err = scope
            .bind_value(&alias, "via-alias".to_string())
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err, DiError::DuplicateBinding("shared".to_string()));
    }

    #[test]
    fn test_no_ambient_scope() {
        let key: Key<u32> = Key::new("nothing");
        assert!(!in_any_scope());
        assert!(!exists(&key));
        assert_eq!(
            get(&key),
            Err(DiError::MissingDependency("nothing".to_string()))
        );
    }
}
