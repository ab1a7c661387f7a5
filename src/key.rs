//! Typed identity keys naming dependencies in the ambient registry.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::registration::AnyArc;

static NEXT_KEY_ID: AtomicU64 = AtomicU64::new(1);

/// An opaque, identity-based token naming one dependency.
///
/// Two keys are equal only if they are clones of the same original; the label
/// is a diagnostic aid and never part of identity, so keys with colliding
/// labels are still distinct dependencies. Cloning a key shares its identity,
/// which is how the same dependency is referenced from registration and
/// lookup sites.
///
/// A key may carry a default value, returned whenever no node in the ambient
/// chain binds it. Because `T` can itself be an `Option`, an "empty" default
/// is representable and distinct from "no default configured":
///
/// ```rust
/// use ambient_di::{Key, get, get_required};
///
/// let user: Key<Option<String>> = Key::with_default("user", None);
/// let limit: Key<u32> = Key::new("limit");
///
/// // Defaults resolve even outside any scope.
/// assert_eq!(*get_required(&user), None);
/// // No default, no binding: lookup fails.
/// assert!(get(&limit).is_err());
/// ```
pub struct Key<T> {
    inner: Arc<KeyInner>,
    _marker: PhantomData<fn() -> T>,
}

struct KeyInner {
    id: u64,
    label: Arc<str>,
    type_name: &'static str,
    default: Option<AnyArc>,
}

/// Type-erased key metadata carried through bindings and error reports.
#[derive(Clone)]
pub(crate) struct KeyInfo {
    pub(crate) id: u64,
    pub(crate) label: Arc<str>,
    pub(crate) type_name: &'static str,
}

impl<T: Send + Sync + 'static> Key<T> {
    /// Creates a key with no default value.
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Self::build(label.into(), None)
    }

    /// Creates a key that falls back to `value` when nothing in the ambient
    /// chain binds it. Any binding, at any depth, shadows the default.
    pub fn with_default(label: impl Into<Arc<str>>, value: T) -> Self {
        Self::build(label.into(), Some(Arc::new(value) as AnyArc))
    }

    fn build(label: Arc<str>, default: Option<AnyArc>) -> Self {
        Key {
            inner: Arc::new(KeyInner {
                id: NEXT_KEY_ID.fetch_add(1, Ordering::Relaxed),
                label,
                type_name: std::any::type_name::<T>(),
                default,
            }),
            _marker: PhantomData,
        }
    }

    /// The diagnostic label this key was created with.
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Whether this key carries a default value.
    pub fn has_default(&self) -> bool {
        self.inner.default.is_some()
    }

    pub(crate) fn info(&self) -> KeyInfo {
        KeyInfo {
            id: self.inner.id,
            label: self.inner.label.clone(),
            type_name: self.inner.type_name,
        }
    }

    pub(crate) fn resolve_default(&self) -> Option<DiResult<Arc<T>>> {
        self.inner
            .default
            .as_ref()
            .map(|value| self.cast(value.clone(), self.inner.type_name))
    }

    /// Converts a type-erased stored value back to `Arc<T>`. The generic API
    /// makes a mismatch unrepresentable from safe callers; the runtime check
    /// stays as the cross-boundary validation for erased storage.
    pub(crate) fn cast(&self, value: AnyArc, actual: &'static str) -> DiResult<Arc<T>> {
        value.downcast::<T>().map_err(|_| DiError::TypeMismatch {
            key: self.inner.label.to_string(),
            expected: self.inner.type_name,
            actual,
        })
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        Key {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

// Identity semantics: equality and hashing use the allocation id only.
impl<T> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl<T> Eq for Key<T> {}

impl<T> std::hash::Hash for Key<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({} #{})", self.inner.label, self.inner.id)
    }
}
