use super::*;
use crate::types::{CanonicalType, IntBitWidth};

fn sample() -> Database {
    let mut db = Database::new("library");
    db.add_table("authors").unwrap();
    db.add_column(
        "authors",
        Column::new(
            "author_id",
            CanonicalType::Integer {
                bits: IntBitWidth::I32,
            },
        )
        .nullable(false),
    )
    .unwrap();
    db.add_column(
        "authors",
        Column::new("name", CanonicalType::String { max_length: Some(40) }),
    )
    .unwrap();
    db.set_primary_key("authors", vec!["author_id".into()])
        .unwrap();
    db.set_sharding("authors", ShardingSpec::hash(8, vec!["author_id".into()]))
        .unwrap();
    db.set_row_count("authors", Some(1200)).unwrap();

    db.add_table("books").unwrap();
    db.add_column("books", Column::new("book_id", CanonicalType::WIDE_INTEGER))
        .unwrap();
    db.add_column(
        "books",
        Column::new(
            "author_id",
            CanonicalType::Integer {
                bits: IntBitWidth::I32,
            },
        ),
    )
    .unwrap();
    db.add_column("books", Column::new("author_name", CanonicalType::WIDE_STRING))
        .unwrap();
    db.set_primary_key("books", vec!["book_id".into()]).unwrap();
    db.add_foreign_key(
        "books",
        "fk_author",
        "authors",
        vec![ColumnPair::new("author_id", "author_id")],
    )
    .unwrap();
    db.add_relationship(
        "books",
        "rel_author_name",
        "authors",
        vec![ColumnPair::new("author_name", "name")],
    )
    .unwrap();
    db
}

#[test]
fn test_from_database_rows() {
    let model = TabularModel::from_database(&sample());
    assert_eq!(model.database, "library");
    assert_eq!(model.columns.len(), 5);
    assert_eq!(model.columns[1].data_type, "VARCHAR(40)");
    assert_eq!(model.tables[0].shard_count, Some(8));
    assert_eq!(model.tables[0].row_count, Some(1200));
    assert_eq!(model.foreign_keys.len(), 1);
    assert_eq!(
        model.relationships[0].condition,
        "books.author_name = authors.name"
    );
}

#[test]
fn test_rows_rebuild_the_same_model() {
    let db = sample();
    let (rebuilt, issues) = TabularModel::from_database(&db).into_database(NameCase::Insensitive);
    assert!(issues.is_empty(), "{issues:?}");
    assert_eq!(rebuilt.shape(), db.shape());
    assert_eq!(rebuilt.table("authors").unwrap().row_count(), Some(1200));
}

#[test]
fn test_json_round_trip() {
    let model = TabularModel::from_database(&sample());
    let json = serde_json::to_string(&model).unwrap();
    let back: TabularModel = serde_json::from_str(&json).unwrap();
    assert_eq!(back, model);
}

#[test]
fn test_rows_referencing_unknown_tables_are_reported() {
    let mut model = TabularModel::from_database(&sample());
    model.foreign_keys.push(ForeignKeyRow {
        name: "fk_publisher".into(),
        from_table: "books".into(),
        from_columns: vec!["book_id".into()],
        to_table: "publishers".into(),
        to_columns: vec!["id".into()],
    });
    let (db, issues) = model.into_database(NameCase::Insensitive);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, "T001");
    assert_eq!(db.table("books").unwrap().foreign_keys().count(), 1);
}

#[test]
fn test_bad_condition_is_reported() {
    let mut model = TabularModel::from_database(&sample());
    model.relationships[0].condition = "books.author_name".into();
    let (_, issues) = model.into_database(NameCase::Insensitive);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, "T002");
}

#[test]
fn test_parse_condition_flips_reversed_predicates() {
    let pairs = parse_condition(
        "\"authors\".\"name\" = books.author_name and books.x = authors.y",
        "books",
        "authors",
        NameCase::Insensitive,
    )
    .unwrap();
    assert_eq!(
        pairs,
        vec![
            ColumnPair::new("author_name", "name"),
            ColumnPair::new("x", "y")
        ]
    );
}

#[test]
fn test_parse_condition_rejects_foreign_qualifier() {
    let err = parse_condition("other.a = books.b", "books", "authors", NameCase::Insensitive)
        .unwrap_err();
    assert!(err.contains("other"));
}

#[test]
fn test_schema_travels_through_the_tables_sheet() {
    let mut db = Database::new("library");
    db.add_table_in("catalog", "shelves").unwrap();
    db.add_column("shelves", Column::new("id", CanonicalType::WIDE_INTEGER))
        .unwrap();
    db.add_table("loans").unwrap();
    db.add_column("loans", Column::new("id", CanonicalType::WIDE_INTEGER))
        .unwrap();

    let model = TabularModel::from_database(&db);
    let json = serde_json::to_value(&model).unwrap();
    assert_eq!(json["tables"][0]["schema"], "catalog");
    assert!(json["tables"][1].get("schema").is_none());

    let (back, issues) = model.into_database(NameCase::Insensitive);
    assert!(issues.is_empty(), "{issues:?}");
    assert_eq!(back.table("shelves").unwrap().schema(), "catalog");
    assert_eq!(back.table("loans").unwrap().schema(), DEFAULT_SCHEMA);
}

#[test]
fn test_missing_schema_cell_means_default() {
    let json = r#"{
        "database": "d",
        "columns": [{"table": "t", "column": "id", "type": "BIGINT"}],
        "tables": [{"name": "t"}]
    }"#;
    let model: TabularModel = serde_json::from_str(json).unwrap();
    assert_eq!(model.tables[0].schema, DEFAULT_SCHEMA);
}
