use nativegraph::{Engine, GraphError, LongSet, SetKind, Status};

fn drain(engine: &mut Engine, set: nativegraph::Handle) -> Vec<i64> {
    let it = engine.set_iterator(set).expect("iterator");
    let mut values = Vec::new();
    while engine.iterator_has_next(it).expect("has_next") {
        values.push(engine.iterator_next_long(it).expect("next"));
    }
    values
}

#[test]
fn test_linked_set_scenario() {
    let mut engine = Engine::new();
    let set = engine.create_set(SetKind::Linked);
    for value in [4, 100, 500] {
        assert!(engine.set_add(set, value).expect("add"));
    }
    assert_eq!(engine.set_size(set).expect("size"), 3);
    assert!(engine.set_contains(set, 500).expect("contains"));

    assert!(engine.set_remove(set, 500).expect("remove"));
    assert_eq!(engine.set_size(set).expect("size"), 2);
    assert_eq!(drain(&mut engine, set), vec![4, 100]);
}

#[test]
fn test_duplicate_add_and_missing_remove_report_false() {
    let mut engine = Engine::new();
    let set = engine.create_set(SetKind::Hash);
    assert!(engine.set_add(set, 1).expect("add"));
    assert!(!engine.set_add(set, 1).expect("add again"));
    assert!(!engine.set_remove(set, 2).expect("remove missing"));
    assert_eq!(engine.set_size(set).expect("size"), 1);
}

#[test]
fn test_sorted_set_iterates_ascending() {
    let mut engine = Engine::new();
    let set = engine.create_set(SetKind::Sorted);
    for value in [42, -3, 17, 0] {
        engine.set_add(set, value).expect("add");
    }
    assert_eq!(drain(&mut engine, set), vec![-3, 0, 17, 42]);
}

#[test]
fn test_hash_set_iteration_covers_every_member() {
    let mut engine = Engine::new();
    let set = engine.create_set(SetKind::Hash);
    for value in 0..50 {
        engine.set_add(set, value * 3).expect("add");
    }
    let mut values = drain(&mut engine, set);
    values.sort_unstable();
    assert_eq!(values, (0..50).map(|v| v * 3).collect::<Vec<_>>());
}

#[test]
fn test_clear_empties_and_invalidates_iterators() {
    let mut engine = Engine::new();
    let set = engine.create_set(SetKind::Linked);
    engine.set_add(set, 1).expect("add");
    engine.set_add(set, 2).expect("add");
    let it = engine.set_iterator(set).expect("iterator");
    assert_eq!(engine.iterator_next_long(it).expect("first"), 1);

    engine.set_clear(set).expect("clear");
    assert_eq!(engine.set_size(set).expect("size"), 0);
    let err = engine.iterator_next_long(it).expect_err("stale iterator");
    assert!(matches!(err, GraphError::ConcurrentModification(_)));
    assert_eq!(engine.last_status(), Status::ConcurrentModification);
}

#[test]
fn test_sets_compare_by_membership() {
    let linked = LongSet::from_values(SetKind::Linked, [3, 1, 2]);
    let sorted = LongSet::from_values(SetKind::Sorted, [1, 2, 3]);
    assert_eq!(linked, sorted);
    assert_ne!(linked, LongSet::from_values(SetKind::Hash, [1, 2]));
}
