//! Property-based tests for registration and chain resolution.
//!
//! These use proptest to generate random inputs and verify invariants that
//! should hold for all valid binding sequences.

use ambient_di::{get_required, DiError, Key, Scope};
use proptest::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Runs one execute per value, nested innermost-last, asserting the
/// innermost binding wins at every depth and outer values are restored.
fn assert_shadowing(key: &Key<i32>, values: &[i32]) {
    let Some((head, rest)) = values.split_first() else {
        return;
    };
    let mut scope = Scope::new();
    scope.bind_value(key, *head).unwrap();
    scope
        .execute(|| {
            assert_eq!(*get_required(key), *head);
            assert_shadowing(key, rest);
            assert_eq!(*get_required(key), *head);
        })
        .unwrap();
}

proptest! {
    #[test]
    fn nested_scopes_shadow_and_restore(values in prop::collection::vec(-1000i32..1000, 1..8)) {
        let key: Key<i32> = Key::new("shadowed");
        assert_shadowing(&key, &values);
    }
}

proptest! {
    #[test]
    fn second_registration_always_conflicts(first in 0usize..3, second in 0usize..3) {
        let key: Key<u32> = Key::new("contested");
        let mut scope = Scope::new();

        let bind = |scope: &mut Scope, kind: usize| match kind {
            0 => scope.bind_value(&key, 1).map(|_| ()),
            1 => scope.bind_single(&key, || 1).map(|_| ()),
            _ => scope.bind_sequence(&key, || 1).map(|_| ()),
        };

        prop_assert!(bind(&mut scope, first).is_ok());
        prop_assert_eq!(
            bind(&mut scope, second),
            Err(DiError::DuplicateBinding("contested".to_string()))
        );
    }
}

proptest! {
    #[test]
    fn default_resolves_until_shadowed(default in any::<u64>(), bound in any::<u64>()) {
        let key: Key<u64> = Key::with_default("budget", default);

        // Unbound anywhere in the chain: default wins, at any depth.
        prop_assert_eq!(*get_required(&key), default);
        let mut empty = Scope::new();
        prop_assert_eq!(empty.execute(|| *get_required(&key)).unwrap(), default);

        // Bound anywhere: the binding shadows the default.
        let mut scope = Scope::new();
        scope.bind_value(&key, bound).unwrap();
        prop_assert_eq!(scope.execute(|| *get_required(&key)).unwrap(), bound);
    }
}

proptest! {
    #[test]
    fn each_single_factory_runs_exactly_once(count in 1usize..12) {
        let keys: Vec<Key<u32>> = (0..count)
            .map(|i| Key::new(format!("single-{}", i)))
            .collect();
        let invocations = Arc::new(AtomicU32::new(0));

        let mut scope = Scope::new();
        for (i, key) in keys.iter().enumerate() {
            let invocations = invocations.clone();
            scope
                .bind_single(key, move || {
                    invocations.fetch_add(1, Ordering::SeqCst);
                    i as u32
                })
                .unwrap();
        }

        scope
            .execute(|| {
                for (i, key) in keys.iter().enumerate() {
                    assert_eq!(*get_required(key), i as u32);
                }
            })
            .unwrap();
        prop_assert_eq!(invocations.load(Ordering::SeqCst), count as u32);

        // Re-running the builder must not invoke any producer again.
        scope.execute(|| ()).unwrap();
        prop_assert_eq!(invocations.load(Ordering::SeqCst), count as u32);
    }
}
