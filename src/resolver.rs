//! Eager factory resolution for one execute call.
//!
//! Each execute gets its own resolver frame; the frame is installed as the
//! ambient context only for the duration of the synchronous resolution pass,
//! so zero-argument producers can call [`get`](crate::get) and be routed
//! here for their sibling factories. The frame is never shared across
//! concurrent executes.

use std::panic;
use std::sync::{Arc, Mutex};

use crate::context::{self, Frame};
use crate::error::DiResult;
use crate::injector::Injector;
use crate::internal::{with_circular_catch, CircularPanic};
use crate::key::KeyInfo;
use crate::registration::{AnyArc, ProducerFn};

/// Resolution state scoped to a single execute call.
pub(crate) struct ResolverFrame {
    /// Chain ambient before the execute began. Producers delegate here for
    /// keys outside the pending set; they never see the node the execute is
    /// about to create.
    outer: Option<Arc<Injector>>,
    state: Mutex<ResolveState>,
}

struct ResolveState {
    /// Pending single-resolution factories, in registration order.
    pending: Vec<(KeyInfo, ProducerFn)>,
    /// Resolved values, in first-resolution order.
    cache: Vec<(KeyInfo, AnyArc)>,
    /// Ordered set of keys currently under construction. Membership test
    /// doubles as cycle detection; popped on success, preserved on failure.
    in_construction: Vec<KeyInfo>,
}

impl ResolverFrame {
    pub(crate) fn outer(&self) -> Option<&Arc<Injector>> {
        self.outer.as_ref()
    }
}

/// Resolves every pending factory, sweeping in registration order and
/// recursing depth-first through producer dependencies. On success returns
/// the resolved values; on failure the partial cache is discarded with the
/// frame.
pub(crate) fn resolve_all(
    pending: Vec<(KeyInfo, ProducerFn)>,
    outer: Option<Arc<Injector>>,
) -> DiResult<Vec<(KeyInfo, AnyArc)>> {
    let keys: Vec<KeyInfo> = pending.iter().map(|(key, _)| key.clone()).collect();
    let frame = Arc::new(ResolverFrame {
        outer,
        state: Mutex::new(ResolveState {
            pending,
            cache: Vec::new(),
            in_construction: Vec::new(),
        }),
    });

    with_circular_catch(|| {
        context::enter_sync(Frame::Resolving(frame.clone()), || {
            for key in &keys {
                let _ = resolve_in_frame(&frame, key);
            }
        })
    })?;

    let mut state = frame.state.lock().unwrap();
    Ok(std::mem::take(&mut state.cache))
}

/// Lookup during an active resolution pass: cache first, then pending
/// factories, then the chain that was ambient before the execute began.
/// Returns `None` when nothing binds the key anywhere.
///
/// # Panics
///
/// Raises [`CircularPanic`] when the requested key is already under
/// construction.
pub(crate) fn resolve_in_frame(frame: &ResolverFrame, key: &KeyInfo) -> Option<(AnyArc, &'static str)> {
    let producer = {
        let mut state = frame.state.lock().unwrap();

        if let Some((cached, value)) = state.cache.iter().find(|(k, _)| k.id == key.id) {
            return Some((value.clone(), cached.type_name));
        }

        let producer = match state.pending.iter().find(|(k, _)| k.id == key.id) {
            Some((_, producer)) => producer.clone(),
            None => {
                drop(state);
                return frame.outer.as_ref().and_then(|node| node.lookup(key.id));
            }
        };

        if let Some(pos) = state.in_construction.iter().position(|k| k.id == key.id) {
            let cycle = state.in_construction[pos..]
                .iter()
                .map(|k| k.label.to_string())
                .collect();
            panic::panic_any(CircularPanic::new(cycle));
        }

        state.in_construction.push(key.clone());
        producer
    };

    // The lock is released while the producer runs: it re-enters this path
    // for its own dependencies.
    let value = producer();

    let mut state = frame.state.lock().unwrap();
    state.in_construction.pop();
    state.cache.push((key.clone(), value.clone()));
    Some((value, key.type_name))
}

/// Presence probe during resolution: true when the key is cached, pending,
/// or bound somewhere in the outer chain. Never invokes a producer.
pub(crate) fn probe_frame(frame: &ResolverFrame, id: u64) -> bool {
    {
        let state = frame.state.lock().unwrap();
        if state.cache.iter().any(|(k, _)| k.id == id)
            || state.pending.iter().any(|(k, _)| k.id == id)
        {
            return true;
        }
    }
    frame.outer.as_ref().is_some_and(|node| node.contains(id))
}
