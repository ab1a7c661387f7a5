//! Mutable binding builder for one scope.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::context::{self, Frame};
use crate::error::{DiError, DiResult};
use crate::injector::Injector;
use crate::key::{Key, KeyInfo};
use crate::registration::{erase_producer, Binding, BindingValue, ProducerFn};
use crate::resolver;

/// A single-owner staging object that accumulates bindings before being
/// sealed and executed.
///
/// A `Scope` collects eager values ([`bind_value`](Self::bind_value)),
/// single-resolution factories ([`bind_single`](Self::bind_single)) and
/// per-lookup generators ([`bind_sequence`](Self::bind_sequence)). Executing
/// it resolves all pending factories, seals the bindings into an immutable
/// [`Injector`] chained to whatever node is ambient at the call site, and
/// installs that node for the dynamic extent of the action.
///
/// A key may be registered at most once per builder; registering it again on
/// a *nested* builder is legal and shadows the outer binding instead.
///
/// # Examples
///
/// ```rust
/// use ambient_di::{Key, Scope, get_required};
///
/// let conn: Key<String> = Key::new("conn");
/// let pool: Key<usize> = Key::new("pool");
///
/// let mut scope = Scope::new();
/// scope
///     .bind_single(&conn, || "postgres://localhost".to_string())
///     .unwrap();
/// let conn2 = conn.clone();
/// scope
///     .bind_single(&pool, move || get_required(&conn2).len())
///     .unwrap();
///
/// let size = scope.execute(|| *get_required(&pool)).unwrap();
/// assert_eq!(size, "postgres://localhost".len());
/// ```
#[derive(Default)]
pub struct Scope {
    /// Already-resolved values and live generators, in registration order.
    provided: Vec<(KeyInfo, BindingValue)>,
    /// Single-resolution factories awaiting the next execute.
    pending: Vec<(KeyInfo, ProducerFn)>,
}

impl Scope {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an already-computed value.
    ///
    /// Fails with [`DiError::DuplicateBinding`] if the key is already
    /// registered on this builder, in either the value or factory set.
    pub fn bind_value<T: Send + Sync + 'static>(
        &mut self,
        key: &Key<T>,
        value: T,
    ) -> DiResult<&mut Self> {
        let info = key.info();
        self.check_unbound(&info)?;
        self.provided.push((info, BindingValue::Fixed(Arc::new(value))));
        Ok(self)
    }

    /// Registers a producer invoked exactly once, before the scoped action
    /// starts. During resolution the producer may look up sibling
    /// single-factories on the same builder and anything in the enclosing
    /// chain, but not sibling [`bind_value`](Self::bind_value) entries and
    /// not the node this execution is about to create.
    pub fn bind_single<T, F>(&mut self, key: &Key<T>, producer: F) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let info = key.info();
        self.check_unbound(&info)?;
        self.pending.push((info, erase_producer(producer)));
        Ok(self)
    }

    /// Registers a producer re-invoked on **every** lookup of the key, a live
    /// generator rather than a cached value.
    pub fn bind_sequence<T, F>(&mut self, key: &Key<T>, producer: F) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let info = key.info();
        self.check_unbound(&info)?;
        self.provided
            .push((info, BindingValue::Regenerated(erase_producer(producer))));
        Ok(self)
    }

    /// Seals the builder and runs `action` with the new node ambient.
    ///
    /// All pending single-factories are resolved first, in registration
    /// order; any resolution error propagates before `action` runs. The
    /// resolved values move into the provided set, so a re-run does not
    /// invoke the producers again (though it re-captures the parent chain at
    /// the new call site).
    pub fn execute<R>(&mut self, action: impl FnOnce() -> R) -> DiResult<R> {
        let node = self.seal()?;
        Ok(context::enter_sync(Frame::Sealed(node), action))
    }

    /// Async form of [`execute`](Self::execute): the node stays ambient
    /// across every suspension point of `action` and remains reachable to
    /// continuations until they complete.
    pub async fn execute_async<F: Future>(&mut self, action: F) -> DiResult<F::Output> {
        let node = self.seal()?;
        Ok(context::enter(Frame::Sealed(node), action).await)
    }

    fn check_unbound(&self, info: &KeyInfo) -> DiResult<()> {
        let taken = self.provided.iter().any(|(k, _)| k.id == info.id)
            || self.pending.iter().any(|(k, _)| k.id == info.id);
        if taken {
            Err(DiError::DuplicateBinding(info.label.to_string()))
        } else {
            Ok(())
        }
    }

    fn seal(&mut self) -> DiResult<Arc<Injector>> {
        let parent = context::ambient_parent();

        if !self.pending.is_empty() {
            // Producers are Fn and stay registered, so a failed resolution
            // leaves the builder re-runnable; only the cache is discarded.
            let resolved = resolver::resolve_all(self.pending.clone(), parent.clone())?;
            for (key, value) in resolved {
                self.provided.push((key, BindingValue::Fixed(value)));
            }
            self.pending.clear();
        }

        let mut bindings = HashMap::with_capacity(self.provided.len());
        for (key, value) in &self.provided {
            bindings.insert(
                key.id,
                Binding { key: key.clone(), value: value.clone() },
            );
        }
        Ok(Arc::new(Injector::new(bindings, parent)))
    }
}

/// One entry of the bulk [`provide_factories`] form.
pub struct FactoryBinding {
    key: KeyInfo,
    producer: ProducerFn,
}

impl FactoryBinding {
    /// A single-resolution factory entry, equivalent to
    /// [`Scope::bind_single`].
    pub fn single<T, F>(key: &Key<T>, producer: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        FactoryBinding {
            key: key.info(),
            producer: erase_producer(producer),
        }
    }
}

/// Bulk convenience: binds every entry as a single-resolution factory on a
/// fresh [`Scope`] and executes `action` under it.
///
/// # Examples
///
/// ```rust
/// use ambient_di::{provide_factories, FactoryBinding, Key, get_required};
///
/// let base: Key<u32> = Key::new("base");
/// let doubled: Key<u32> = Key::new("doubled");
/// let base2 = base.clone();
///
/// let out = provide_factories(
///     vec![
///         FactoryBinding::single(&base, || 21),
///         FactoryBinding::single(&doubled, move || *get_required(&base2) * 2),
///     ],
///     || *get_required(&doubled),
/// )
/// .unwrap();
/// assert_eq!(out, 42);
/// ```
pub fn provide_factories<R>(
    factories: Vec<FactoryBinding>,
    action: impl FnOnce() -> R,
) -> DiResult<R> {
    let mut scope = Scope::new();
    for factory in factories {
        scope.check_unbound(&factory.key)?;
        scope.pending.push((factory.key, factory.producer));
    }
    scope.execute(action)
}
