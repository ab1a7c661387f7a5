//! Ambient context propagation and registry-free lookup.
//!
//! No injector is ever passed explicitly to a lookup: the current node for
//! the executing logical task lives in a task-local, installed by
//! [`Scope::execute`](crate::Scope::execute) for the dynamic extent of the
//! action. Synchronous extents use `sync_scope`, asynchronous ones `scope`,
//! so the node stays visible across `.await` points while concurrent sibling
//! tasks each keep their own view.

use std::future::Future;
use std::sync::Arc;

use tokio::task_local;

use crate::error::{DiError, DiResult};
use crate::injector::Injector;
use crate::key::Key;
use crate::resolver::{self, ResolverFrame};

task_local! {
    static CURRENT: Frame;
}

/// What is ambient for the current task: either a sealed node chain, or a
/// live resolver while an execute call is still resolving its factories.
#[derive(Clone)]
pub(crate) enum Frame {
    Sealed(Arc<Injector>),
    Resolving(Arc<ResolverFrame>),
}

pub(crate) fn current_frame() -> Option<Frame> {
    CURRENT.try_with(|frame| frame.clone()).ok()
}

/// The chain a newly sealed node should attach to. During factory
/// resolution this is the chain from before the execute began, never the
/// node that execute is about to create.
pub(crate) fn ambient_parent() -> Option<Arc<Injector>> {
    match current_frame() {
        Some(Frame::Sealed(node)) => Some(node),
        Some(Frame::Resolving(frame)) => frame.outer().cloned(),
        None => None,
    }
}

pub(crate) fn enter_sync<R>(frame: Frame, f: impl FnOnce() -> R) -> R {
    CURRENT.sync_scope(frame, f)
}

pub(crate) async fn enter<F: Future>(frame: Frame, action: F) -> F::Output {
    CURRENT.scope(frame, action).await
}

/// Looks up a key in the current ambient scope chain.
///
/// The walk is innermost-to-outermost: the resolver frame or sealed node
/// installed by the nearest enclosing execute, then its parents, then the
/// key's default. Sequence bindings re-invoke their producer on every hit.
/// An absent, non-defaulted key always fails with
/// [`DiError::MissingDependency`], including when `T` is an `Option`.
///
/// # Examples
///
/// ```rust
/// use ambient_di::{Key, Scope, get};
///
/// let greeting: Key<String> = Key::new("greeting");
///
/// let mut scope = Scope::new();
/// scope.bind_value(&greeting, "hello".to_string()).unwrap();
/// let seen = scope.execute(|| get(&greeting).unwrap()).unwrap();
/// assert_eq!(*seen, "hello");
///
/// // Outside any execute the binding is gone again.
/// assert!(get(&greeting).is_err());
/// ```
pub fn get<T: Send + Sync + 'static>(key: &Key<T>) -> DiResult<Arc<T>> {
    let info = key.info();
    let found = match current_frame() {
        Some(Frame::Resolving(frame)) => resolver::resolve_in_frame(&frame, &info),
        Some(Frame::Sealed(node)) => node.lookup(info.id),
        None => None,
    };
    match found {
        Some((value, actual)) => key.cast(value, actual),
        None => match key.resolve_default() {
            Some(default) => default,
            None => Err(DiError::MissingDependency(key.label().to_string())),
        },
    }
}

/// Looks up a key, panicking on failure.
///
/// The panicking twin of [`get`], for call sites where a missing binding is
/// a programming error. Inside factory producers this is the usual form:
/// a cycle detected under it aborts the whole resolution with
/// [`DiError::CircularDependency`](crate::DiError) rather than poisoning the
/// scope.
pub fn get_required<T: Send + Sync + 'static>(key: &Key<T>) -> Arc<T> {
    get(key).unwrap_or_else(|e| panic!("Failed to resolve key `{}`: {}", key.label(), e))
}

/// Returns whether a binding or default exists for `key` in the current
/// ambient chain, without invoking generators or factory producers.
pub fn exists<T: Send + Sync + 'static>(key: &Key<T>) -> bool {
    let info = key.info();
    let bound = match current_frame() {
        Some(Frame::Resolving(frame)) => resolver::probe_frame(&frame, info.id),
        Some(Frame::Sealed(node)) => node.contains(info.id),
        None => false,
    };
    bound || key.has_default()
}

/// True iff at least one execute is on the caller's dynamic extent.
pub fn in_any_scope() -> bool {
    current_frame().is_some()
}

/// Captures the ambient frame so a spawned task observes the chain that was
/// current at spawn time.
///
/// Task-locals do not cross `tokio::spawn` on their own; wrap the spawned
/// future to carry the scope along. Sibling branches spawned from different
/// executions keep their own views and never observe each other's bindings.
///
/// # Examples
///
/// ```rust
/// # use ambient_di::{Key, Scope, get_required, propagate};
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let tenant: Key<&'static str> = Key::new("tenant");
///
/// let mut scope = Scope::new();
/// scope.bind_value(&tenant, "acme").unwrap();
/// let tenant2 = tenant.clone();
/// scope
///     .execute_async(async move {
///         let branch = tokio::spawn(propagate(async move { *get_required(&tenant2) }));
///         assert_eq!(branch.await.unwrap(), "acme");
///     })
///     .await
///     .unwrap();
/// # }
/// ```
pub fn propagate<F: Future>(action: F) -> impl Future<Output = F::Output> {
    let frame = current_frame();
    async move {
        match frame {
            Some(frame) => CURRENT.scope(frame, action).await,
            None => action.await,
        }
    }
}
