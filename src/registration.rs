//! Type-erased binding storage.

use std::any::Any;
use std::sync::Arc;

use crate::key::KeyInfo;

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased zero-argument producer.
pub(crate) type ProducerFn = Arc<dyn Fn() -> AnyArc + Send + Sync>;

/// How a bound key yields its value at lookup time.
#[derive(Clone)]
pub(crate) enum BindingValue {
    /// Resolved once; cloned out on every lookup.
    Fixed(AnyArc),
    /// Invoked on every lookup, never cached.
    Regenerated(ProducerFn),
}

/// One key's entry inside a sealed node.
#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) key: KeyInfo,
    pub(crate) value: BindingValue,
}

/// Wraps a typed producer into the erased form stored in binding maps.
pub(crate) fn erase_producer<T, F>(producer: F) -> ProducerFn
where
    T: Send + Sync + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    Arc::new(move || Arc::new(producer()) as AnyArc)
}
