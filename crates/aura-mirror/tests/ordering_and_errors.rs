//! Ordered mirrors, tie handling and failure propagation
//!
//! Errors raised while a change is applied surface from the mutating call on
//! the source. These tests drive the engine into each failure on purpose.

use assert_matches::assert_matches;
use aura_collections::ObservableVec;
use aura_mirror::{
    shared, ChangeEvent, MirrorBuilder, MirrorConfig, MirrorError, Pipeline, RemovalPolicy,
    Synchronizer,
};
use aura_testkit::{assert_desynchronized, assert_mirrors, init_test_tracing};

#[derive(Debug, Clone, PartialEq)]
struct Task {
    title: &'static str,
    priority: u8,
}

fn task(title: &'static str, priority: u8) -> Task {
    Task { title, priority }
}

#[test]
fn test_ordered_projection_of_structs() {
    init_test_tracing();
    let source = ObservableVec::from(vec![task("write", 2), task("read", 1), task("ship", 3)]);
    let titles = shared(Vec::new());
    MirrorBuilder::new()
        .select(|t: &Task| (t.priority, t.title))
        .order_by(|a: &(u8, &'static str), b: &(u8, &'static str)| a.0.cmp(&b.0))
        .target(titles.clone())
        .start(&source)
        .unwrap();
    assert_mirrors!(titles, vec![(1, "read"), (2, "write"), (3, "ship")]);

    source.push(task("test", 2)).unwrap();
    assert_mirrors!(titles, vec![(1, "read"), (2, "write"), (2, "test"), (3, "ship")]);

    source.push(task("plan", 0)).unwrap();
    assert_eq!(titles.read().first(), Some(&(0, "plan")));
}

#[test]
fn test_all_equivalent_removal_drops_every_tie() {
    init_test_tracing();
    let source = ObservableVec::from(vec![task("a", 1), task("b", 1), task("c", 2)]);
    let target = shared(Vec::new());
    MirrorBuilder::identity()
        .order_by(|a: &Task, b: &Task| a.priority.cmp(&b.priority))
        .target(target.clone())
        .start(&source)
        .unwrap();

    source.remove(&task("a", 1)).unwrap();
    assert_mirrors!(target, vec![task("c", 2)]);
    assert_eq!(source.len(), 2);
}

#[test]
fn test_first_equivalent_removal_drops_one_tie() {
    init_test_tracing();
    let source = ObservableVec::from(vec![task("a", 1), task("b", 1), task("c", 2)]);
    let target = shared(Vec::new());
    MirrorBuilder::identity()
        .order_by(|a: &Task, b: &Task| a.priority.cmp(&b.priority))
        .config(MirrorConfig::labeled("tasks").with_removal_policy(RemovalPolicy::FirstEquivalent))
        .target(target.clone())
        .start(&source)
        .unwrap();

    source.remove(&task("b", 1)).unwrap();
    // Equivalence follows the orderer, so the first tie goes, not the equal item.
    assert_mirrors!(target, vec![task("b", 1), task("c", 2)]);
}

#[test]
fn test_ordered_replace_moves_item() {
    init_test_tracing();
    let source = ObservableVec::from(vec![3, 1, 2]);
    let target = shared(Vec::new());
    MirrorBuilder::identity()
        .order_by(|a: &i32, b: &i32| a.cmp(b))
        .target(target.clone())
        .start(&source)
        .unwrap();

    source.set(1, 9).unwrap();
    assert_mirrors!(target, vec![2, 3, 9]);
}

#[test]
fn test_selector_failure_surfaces_from_mutation() {
    init_test_tracing();
    let source = ObservableVec::from(vec!["1".to_string(), "2".to_string()]);
    let target = shared(Vec::new());
    MirrorBuilder::new()
        .try_select(|s: &String| s.parse::<i64>())
        .target(target.clone())
        .start(&source)
        .unwrap();

    let result = source.push("three".to_string());
    assert_matches!(result, Err(MirrorError::TransformFailure { .. }));
    // The source keeps the item; the target does not.
    assert_eq!(source.len(), 3);
    assert_mirrors!(target, vec![1, 2]);
}

#[test]
fn test_untranslated_filtered_positions_desynchronize() {
    init_test_tracing();
    let config = MirrorConfig {
        translate_filtered_positions: false,
        ..MirrorConfig::labeled("raw")
    };
    let source = ObservableVec::from(vec![1, 3, 5, 2]);
    let target = shared(Vec::new());
    MirrorBuilder::identity()
        .filter(|x: &i32| x % 2 == 0)
        .config(config)
        .target(target.clone())
        .start(&source)
        .unwrap();
    assert_mirrors!(target, vec![2]);

    assert_desynchronized!(source.remove_at(3));
}

#[test]
fn test_out_of_range_event_is_consistency_violation() {
    init_test_tracing();
    let mut sync = Synchronizer::new(Pipeline::<i32, i32>::identity(), MirrorConfig::default());
    let mut target = Vec::new();
    sync.populate(&mut target, &vec![1, 2]).unwrap();

    let err = sync
        .apply(&mut target, &ChangeEvent::removed(Some(5), vec![9]), &vec![1, 2])
        .unwrap_err();
    assert_matches!(err, MirrorError::ConsistencyViolation { .. });
    assert_eq!(target, vec![1, 2]);
}

#[test]
fn test_malformed_event_is_invalid_argument() {
    let result = ChangeEvent::<i32>::new(
        aura_mirror::ChangeKind::Replace,
        Some(0),
        Some(0),
        Some(vec![]),
        Some(vec![1]),
    );
    assert_matches!(result, Err(MirrorError::InvalidArgument { .. }));
}

#[test]
fn test_config_from_toml_drives_mirror() {
    init_test_tracing();
    let config = MirrorConfig::from_toml_str(
        r#"
        label = "priorities"
        removal_policy = "first_equivalent"
        "#,
    )
    .unwrap();
    let source = ObservableVec::from(vec![1, 1, 2]);
    let target = shared(Vec::new());
    let handle = MirrorBuilder::identity()
        .order_by(|a: &i32, b: &i32| a.cmp(b))
        .config(config)
        .target(target.clone())
        .start(&source)
        .unwrap();
    assert_eq!(handle.label(), "priorities");

    source.remove(&1).unwrap();
    assert_mirrors!(target, vec![1, 2]);
}
