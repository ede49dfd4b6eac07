use super::*;
use crate::test_utils::{bigint_table, relate};
use dt_core::{Database, ReviewConfig};

fn run(db: &Database) -> Vec<Finding> {
    CircularRelationships.run(&ReviewContext::new(db, ReviewConfig::default()))
}

#[test]
fn test_self_loop_and_two_cycles() {
    let mut db = Database::new("d");
    for t in ["a", "b", "c", "d", "e", "f"] {
        bigint_table(&mut db, t, &["id", "ref"], &["id"]);
    }
    relate(&mut db, "a", "ref", "b", "id");
    relate(&mut db, "b", "ref", "a", "id");
    relate(&mut db, "c", "ref", "c", "id");
    relate(&mut db, "d", "ref", "e", "id");
    relate(&mut db, "e", "ref", "f", "id");
    relate(&mut db, "f", "ref", "d", "id");

    let findings = run(&db);
    assert_eq!(findings.len(), 3);

    assert_eq!(findings[0].category, FindingCategory::SelfReferencing);
    assert_eq!(findings[0].tables, vec!["c".to_string()]);

    assert_eq!(findings[1].category, FindingCategory::Circular);
    assert_eq!(findings[1].message, "circular relationship: a -> b -> a");

    assert_eq!(findings[2].tables, vec!["d", "e", "f"]);
    assert_eq!(findings[2].message, "circular relationship: d -> e -> f -> d");
    assert_eq!(findings[2].evidence["cycle_length"], "3");
}

#[test]
fn test_cycle_closes_at_first_edge_back() {
    let mut db = Database::new("d");
    for t in ["a", "b", "c"] {
        bigint_table(&mut db, t, &["id", "x", "y"], &["id"]);
    }
    // a -> b -> c -> a and a shortcut c <- b -> a
    relate(&mut db, "a", "x", "b", "id");
    relate(&mut db, "b", "x", "c", "id");
    relate(&mut db, "c", "x", "a", "id");
    db.add_relationship(
        "b",
        "rel_back",
        "a",
        vec![dt_core::ColumnPair::new("y", "id")],
    )
    .unwrap();

    let findings = run(&db);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].tables, vec!["a", "b", "c"]);
    assert_eq!(findings[0].message, "circular relationship: a -> b -> a");
}

#[test]
fn test_acyclic_model_is_clean() {
    let mut db = Database::new("d");
    bigint_table(&mut db, "a", &["id", "ref"], &["id"]);
    bigint_table(&mut db, "b", &["id"], &["id"]);
    relate(&mut db, "a", "ref", "b", "id");
    assert!(run(&db).is_empty());
}

#[test]
fn test_reported_cycle_is_smallest_by_name_not_length() {
    let mut db = Database::new("d");
    for t in ["a", "b", "c", "d"] {
        bigint_table(&mut db, t, &["id", "x", "y"], &["id"]);
    }
    // a -> b -> c -> a and a -> d -> a
    relate(&mut db, "a", "x", "b", "id");
    relate(&mut db, "b", "x", "c", "id");
    relate(&mut db, "c", "x", "a", "id");
    relate(&mut db, "a", "y", "d", "id");
    relate(&mut db, "d", "x", "a", "id");

    let findings = run(&db);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].message, "circular relationship: a -> b -> c -> a");
    assert_eq!(findings[0].evidence["cycle_length"], "3");
}
