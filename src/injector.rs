//! Immutable resolution nodes forming the ambient scope chain.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::registration::{AnyArc, Binding, BindingValue};

/// An immutable snapshot of key-to-value bindings plus a reference to a
/// parent node, forming a singly-linked chain that mirrors scope nesting.
///
/// Injectors are created when a [`Scope`](crate::Scope) is executed and are
/// never handed out directly: code running under an execution reaches the
/// current injector through the ambient context ([`get`](crate::get),
/// [`exists`](crate::exists)). Lookup walks the chain innermost to
/// outermost and never mutates a node, so a sealed chain is safely shared by
/// however many concurrent continuations descend from one execution.
pub struct Injector {
    bindings: HashMap<u64, Binding>,
    parent: Option<Arc<Injector>>,
}

impl Injector {
    pub(crate) fn new(bindings: HashMap<u64, Binding>, parent: Option<Arc<Injector>>) -> Self {
        Injector { bindings, parent }
    }

    /// Walks the chain for `id`. Sequence bindings are invoked on every hit
    /// and their fresh result returned; fixed bindings are cloned out.
    /// Returns the value together with the type name recorded at binding
    /// time, for mismatch reporting.
    pub(crate) fn lookup(&self, id: u64) -> Option<(AnyArc, &'static str)> {
        let mut node = self;
        loop {
            if let Some(binding) = node.bindings.get(&id) {
                let value = match &binding.value {
                    BindingValue::Fixed(value) => value.clone(),
                    BindingValue::Regenerated(producer) => producer(),
                };
                return Some((value, binding.key.type_name));
            }
            match &node.parent {
                Some(parent) => node = parent,
                None => return None,
            }
        }
    }

    /// Same walk as [`lookup`](Self::lookup) without invoking generators.
    pub(crate) fn contains(&self, id: u64) -> bool {
        let mut node = self;
        loop {
            if node.bindings.contains_key(&id) {
                return true;
            }
            match &node.parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut labels: Vec<&str> = self.bindings.values().map(|b| &*b.key.label).collect();
        labels.sort_unstable();
        let mut depth = 0usize;
        let mut node = self;
        while let Some(parent) = &node.parent {
            depth += 1;
            node = parent;
        }
        f.debug_struct("Injector")
            .field("bindings", &labels)
            .field("depth", &depth)
            .finish()
    }
}
