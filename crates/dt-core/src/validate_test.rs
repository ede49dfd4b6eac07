use super::*;
use crate::model::{Column, ColumnPair, JoinEdge, NameCase, PrimaryKey, ShardingSpec};
use crate::types::CanonicalType;

fn codes(issues: &[ValidationIssue]) -> Vec<&str> {
    issues.iter().map(|i| i.code.as_str()).collect()
}

fn table(name: &str, columns: &[&str]) -> Table {
    let mut t = Table::new(name, NameCase::Insensitive);
    t.columns = columns
        .iter()
        .map(|c| Column::new(*c, CanonicalType::WIDE_INTEGER))
        .collect();
    t
}

#[test]
fn test_clean_model_has_no_issues() {
    let mut db = Database::new("d");
    db.add_table("a").unwrap();
    db.add_column("a", Column::new("id", CanonicalType::WIDE_INTEGER))
        .unwrap();
    db.set_primary_key("a", vec!["id".into()]).unwrap();
    db.set_sharding("a", ShardingSpec::hash(4, vec!["id".into()]))
        .unwrap();
    assert!(validate(&db).is_empty());
}

#[test]
fn test_unknown_type_is_a_warning() {
    let mut db = Database::new("d");
    db.add_table("a").unwrap();
    db.add_column(
        "a",
        Column::new("blob", CanonicalType::Unknown).with_raw_type("BYTEA"),
    )
    .unwrap();
    let issues = validate(&db);
    assert_eq!(codes(&issues), vec!["V001"]);
    assert_eq!(issues[0].severity, Severity::Warning);
    assert!(issues[0].message.contains("BYTEA"));
    assert!(!has_errors(&issues));
}

#[test]
fn test_missing_primary_key_and_shard_columns() {
    let mut t = table("a", &["id"]);
    t.primary_key = Some(PrimaryKey {
        columns: vec!["pk".into()],
    });
    t.sharding = Some(ShardingSpec::hash(4, vec!["sk".into()]));
    let mut db = Database::new("d");
    db.push_unchecked(t);
    let issues = validate(&db);
    assert_eq!(codes(&issues), vec!["V002", "V003"]);
    assert!(has_errors(&issues));
}

#[test]
fn test_shard_key_outside_primary_key() {
    let mut db = Database::new("d");
    db.add_table("a").unwrap();
    db.add_column("a", Column::new("id", CanonicalType::WIDE_INTEGER))
        .unwrap();
    db.add_column("a", Column::new("region", CanonicalType::WIDE_INTEGER))
        .unwrap();
    db.set_primary_key("a", vec!["id".into()]).unwrap();
    db.set_sharding("a", ShardingSpec::hash(4, vec!["region".into()]))
        .unwrap();
    let issues = validate(&db);
    assert_eq!(codes(&issues), vec!["V004"]);
}

#[test]
fn test_broken_joins() {
    let mut a = table("a", &["id", "b_id"]);
    a.joins = vec![
        JoinEdge {
            name: "to_nowhere".into(),
            target: "zzz".into(),
            kind: JoinKind::Relationship,
            pairs: vec![ColumnPair::new("id", "id")],
        },
        JoinEdge {
            name: "fk_b".into(),
            target: "b".into(),
            kind: JoinKind::ForeignKey,
            pairs: vec![ColumnPair::new("b_id", "code")],
        },
        JoinEdge {
            name: "missing_col".into(),
            target: "b".into(),
            kind: JoinKind::Relationship,
            pairs: vec![ColumnPair::new("nope", "id")],
        },
    ];
    let mut b = table("b", &["id", "code"]);
    b.primary_key = Some(PrimaryKey {
        columns: vec!["id".into()],
    });

    let mut db = Database::new("d");
    db.push_unchecked(a);
    db.push_unchecked(b);
    let issues = validate(&db);
    assert_eq!(codes(&issues), vec!["V005", "V007", "V006"]);
}

#[test]
fn test_incompatible_join_types() {
    let mut a = table("a", &["id"]);
    a.columns.push(Column::new("name", CanonicalType::WIDE_STRING));
    a.joins = vec![JoinEdge {
        name: "r".into(),
        target: "a".into(),
        kind: JoinKind::Relationship,
        pairs: vec![ColumnPair::new("name", "id")],
    }];
    let mut db = Database::new("d");
    db.push_unchecked(a);
    assert_eq!(codes(&validate(&db)), vec!["V008"]);
}
