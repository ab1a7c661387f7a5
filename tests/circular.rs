use ambient_di::{get, get_required, DiError, Key, Scope};

#[test]
fn test_self_referencing_factory() {
    let selfish: Key<u32> = Key::new("selfish");

    let mut scope = Scope::new();
    let selfish2 = selfish.clone();
    scope
        .bind_single(&selfish, move || *get_required(&selfish2) + 1)
        .unwrap();

    match scope.execute(|| ()) {
        Err(DiError::CircularDependency(cycle)) => {
            assert_eq!(cycle, vec!["selfish".to_string()]);
        }
        other => panic!("Expected CircularDependency, got {:?}", other),
    }
}

#[test]
fn test_two_factory_cycle() {
    let a: Key<u32> = Key::new("a");
    let b: Key<u32> = Key::new("b");

    let mut scope = Scope::new();
    let b2 = b.clone();
    scope.bind_single(&a, move || *get_required(&b2)).unwrap();
    let a2 = a.clone();
    scope.bind_single(&b, move || *get_required(&a2)).unwrap();

    match scope.execute(|| ()) {
        Err(DiError::CircularDependency(cycle)) => {
            assert_eq!(cycle, vec!["a".to_string(), "b".to_string()]);
        }
        other => panic!("Expected CircularDependency, got {:?}", other),
    }
}

#[test]
fn test_minimal_cycle_excludes_unrelated_keys() {
    // E -> F, F -> (C, G), G -> E, with C resolving fine on its own.
    // The reported cycle is the slice of the construction stack from the
    // first occurrence of the looping key onward: exactly [E, F, G].
    let c: Key<u32> = Key::new("C");
    let e: Key<u32> = Key::new("E");
    let f: Key<u32> = Key::new("F");
    let g: Key<u32> = Key::new("G");

    let mut scope = Scope::new();
    scope.bind_single(&c, || 1).unwrap();

    let f2 = f.clone();
    scope.bind_single(&e, move || *get_required(&f2)).unwrap();

    let (c2, g2) = (c.clone(), g.clone());
    scope
        .bind_single(&f, move || *get_required(&c2) + *get_required(&g2))
        .unwrap();

    let e2 = e.clone();
    scope.bind_single(&g, move || *get_required(&e2)).unwrap();

    match scope.execute(|| ()) {
        Err(DiError::CircularDependency(cycle)) => {
            assert_eq!(
                cycle,
                vec!["E".to_string(), "F".to_string(), "G".to_string()]
            );
        }
        other => panic!("Expected CircularDependency, got {:?}", other),
    }
}

#[test]
fn test_cycle_error_surfaces_through_result_lookup() {
    // A producer using the fallible lookup cannot suppress cycle detection:
    // the abort unwinds past it and the execute reports the cycle.
    let a: Key<u32> = Key::new("a");
    let b: Key<u32> = Key::new("b");

    let mut scope = Scope::new();
    let b2 = b.clone();
    scope
        .bind_single(&a, move || get(&b2).map(|v| *v).unwrap_or(0))
        .unwrap();
    let a2 = a.clone();
    scope
        .bind_single(&b, move || get(&a2).map(|v| *v).unwrap_or(0))
        .unwrap();

    assert!(matches!(
        scope.execute(|| ()),
        Err(DiError::CircularDependency(_))
    ));
}

#[test]
fn test_diamond_dependency_is_not_a_cycle() {
    // top -> left -> base, top -> right -> base: base resolves once.
    let base: Key<u32> = Key::new("base");
    let left: Key<u32> = Key::new("left");
    let right: Key<u32> = Key::new("right");
    let top: Key<u32> = Key::new("top");

    let mut scope = Scope::new();
    scope.bind_single(&base, || 10).unwrap();
    let base2 = base.clone();
    scope.bind_single(&left, move || *get_required(&base2) + 1).unwrap();
    let base3 = base.clone();
    scope.bind_single(&right, move || *get_required(&base3) + 2).unwrap();
    let (left2, right2) = (left.clone(), right.clone());
    scope
        .bind_single(&top, move || *get_required(&left2) + *get_required(&right2))
        .unwrap();

    let top2 = top.clone();
    assert_eq!(scope.execute(move || *get_required(&top2)).unwrap(), 23);
}

#[test]
fn test_builder_remains_rerunnable_after_cycle() {
    // Producers stay registered, so a failed resolution reports the same
    // cycle again instead of corrupting the builder.
    let a: Key<u32> = Key::new("a");

    let mut scope = Scope::new();
    let a2 = a.clone();
    scope.bind_single(&a, move || *get_required(&a2)).unwrap();

    assert!(matches!(
        scope.execute(|| ()),
        Err(DiError::CircularDependency(_))
    ));
    assert!(matches!(
        scope.execute(|| ()),
        Err(DiError::CircularDependency(_))
    ));
}
