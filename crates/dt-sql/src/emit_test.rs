use super::*;
use dt_core::{Column, ColumnPair, ShardingSpec};

fn shop() -> Database {
    let mut db = Database::new("shop");
    db.add_table("customers").unwrap();
    db.add_column(
        "customers",
        Column::new("id", CanonicalType::WIDE_INTEGER).nullable(false),
    )
    .unwrap();
    db.add_column(
        "customers",
        Column::new("name", CanonicalType::String { max_length: Some(40) }),
    )
    .unwrap();
    db.set_primary_key("customers", vec!["id".into()]).unwrap();
    db.set_sharding("customers", ShardingSpec::hash(8, vec!["id".into()]))
        .unwrap();

    db.add_table("orders").unwrap();
    db.add_column(
        "orders",
        Column::new("id", CanonicalType::WIDE_INTEGER).nullable(false),
    )
    .unwrap();
    db.add_column("orders", Column::new("customer_id", CanonicalType::WIDE_INTEGER))
        .unwrap();
    db.add_column(
        "orders",
        Column::new(
            "total",
            CanonicalType::Decimal {
                precision: Some(10),
                scale: Some(2),
            },
        ),
    )
    .unwrap();
    db.set_primary_key("orders", vec!["id".into()]).unwrap();
    db.add_foreign_key(
        "orders",
        "fk_customer",
        "customers",
        vec![ColumnPair::new("customer_id", "id")],
    )
    .unwrap();
    db
}

#[test]
fn test_emit_layout() {
    let emitted = TqlEmitter::default().emit(&shop());
    let expected = r#"CREATE DATABASE "shop";
USE "shop";

CREATE TABLE "customers" (
  "id" BIGINT NOT NULL,
  "name" VARCHAR(40),
  CONSTRAINT PRIMARY KEY ("id")
) PARTITION BY HASH (8) KEY ("id");

CREATE TABLE "orders" (
  "id" BIGINT NOT NULL,
  "customer_id" BIGINT,
  "total" DOUBLE,
  CONSTRAINT PRIMARY KEY ("id")
);

ALTER TABLE "orders"
  ADD CONSTRAINT "fk_customer" FOREIGN KEY ("customer_id")
  REFERENCES "customers" ("id");
"#;
    assert_eq!(emitted.text, expected);
    assert_eq!(emitted.diagnostics.len(), 1);
    assert_eq!(emitted.diagnostics[0].code, DiagnosticCode::TypeWidened);
    assert_eq!(emitted.diagnostics[0].column.as_deref(), Some("total"));
}

#[test]
fn test_name_case_applies_to_every_reference() {
    let emitter = TqlEmitter::new(EmitOptions {
        name_case: IdentifierCase::Upper,
        create_database: false,
    });
    let text = emitter.emit(&shop()).text;
    assert!(text.starts_with("USE \"shop\";"));
    assert!(text.contains("CREATE TABLE \"ORDERS\""));
    assert!(text.contains("FOREIGN KEY (\"CUSTOMER_ID\")"));
    assert!(text.contains("REFERENCES \"CUSTOMERS\" (\"ID\")"));
    assert!(!text.contains("\"orders\""));
}

#[test]
fn test_camel_case_names() {
    let mut db = Database::new("d");
    db.add_table("order_items").unwrap();
    db.add_column("order_items", Column::new("unit_price", CanonicalType::WIDE_FLOAT))
        .unwrap();
    let emitter = TqlEmitter::new(EmitOptions {
        name_case: IdentifierCase::Camel,
        create_database: true,
    });
    let text = emitter.emit(&db).text;
    assert!(text.contains("CREATE TABLE \"OrderItems\" (\n  \"UnitPrice\" DOUBLE\n);"));
}

#[test]
fn test_unknown_type_written_as_unbounded_varchar() {
    let mut db = Database::new("d");
    db.add_table("files").unwrap();
    db.add_column(
        "files",
        Column::new("payload", CanonicalType::Unknown).with_raw_type("BYTEA"),
    )
    .unwrap();
    let emitted = TqlEmitter::default().emit(&db);
    assert!(emitted.text.contains("\"payload\" VARCHAR(0)"));
    let d = &emitted.diagnostics[0];
    assert_eq!(d.code, DiagnosticCode::UnknownTypeEmitted);
    assert_eq!(d.severity, Severity::Warning);
    assert!(d.message.contains("BYTEA"));
}

#[test]
fn test_relationships_follow_foreign_keys() {
    let mut db = shop();
    db.add_relationship(
        "customers",
        "rel_self",
        "customers",
        vec![ColumnPair::new("name", "name")],
    )
    .unwrap();
    let text = TqlEmitter::default().emit(&db).text;
    let fk = text.find("ADD CONSTRAINT").unwrap();
    let rel = text.find("ADD RELATIONSHIP").unwrap();
    assert!(fk < rel);
    assert!(text.contains(
        "ADD RELATIONSHIP \"rel_self\" WITH \"customers\"\n  AS \"customers\".\"name\" = \"customers\".\"name\";"
    ));
}

#[test]
fn test_empty_tables_are_skipped() {
    let mut db = shop();
    db.add_table("placeholder").unwrap();
    let emitted = TqlEmitter::default().emit(&db);
    assert!(!emitted.text.contains("placeholder"));
    assert_eq!(
        emitted.diagnostics.last().map(|d| d.code),
        Some(DiagnosticCode::EmptyTableSkipped)
    );
}

#[test]
fn test_round_trip_is_structurally_equal() {
    let mut db = shop();
    db.add_column(
        "customers",
        Column::new("blob", CanonicalType::Unknown).with_raw_type("BLOB"),
    )
    .unwrap();
    db.add_column(
        "customers",
        Column::new(
            "tiny",
            CanonicalType::Integer {
                bits: IntBitWidth::I8,
            },
        ),
    )
    .unwrap();
    db.add_column("orders", Column::new("ship_name", CanonicalType::WIDE_STRING))
        .unwrap();
    db.add_relationship(
        "orders",
        "rel_name",
        "customers",
        vec![ColumnPair::new("ship_name", "name")],
    )
    .unwrap();

    assert_eq!(round_trip_differences(&db).unwrap(), Vec::<String>::new());
    assert!(verify_round_trip(&db).is_ok());
}

/// `shop` with `orders` moved to the `sales` schema
fn shop_with_sales() -> Database {
    let mut db = Database::new("shop");
    db.add_table("customers").unwrap();
    db.add_column("customers", Column::new("id", CanonicalType::WIDE_INTEGER))
        .unwrap();
    db.set_primary_key("customers", vec!["id".into()]).unwrap();
    db.add_table_in("sales", "orders").unwrap();
    db.add_column("orders", Column::new("customer_id", CanonicalType::WIDE_INTEGER))
        .unwrap();
    db.add_foreign_key(
        "orders",
        "fk_customer",
        "customers",
        vec![ColumnPair::new("customer_id", "id")],
    )
    .unwrap();
    db.add_relationship(
        "customers",
        "rel_orders",
        "orders",
        vec![ColumnPair::new("id", "customer_id")],
    )
    .unwrap();
    db
}

#[test]
fn test_non_default_schemas_are_created_and_qualified() {
    let text = TqlEmitter::default().emit(&shop_with_sales()).text;
    assert!(text.starts_with("CREATE DATABASE \"shop\";\nUSE \"shop\";\nCREATE SCHEMA \"sales\";\n"));
    assert!(!text.contains("falcon_default_schema"));
    assert!(text.contains("CREATE TABLE \"customers\" ("));
    assert!(text.contains("CREATE TABLE \"sales\".\"orders\" ("));
    assert!(text.contains("ALTER TABLE \"sales\".\"orders\"\n  ADD CONSTRAINT \"fk_customer\""));
    assert!(text.contains(
        "ADD RELATIONSHIP \"rel_orders\" WITH \"sales\".\"orders\"\n  AS \"customers\".\"id\" = \"orders\".\"customer_id\";"
    ));
}

#[test]
fn test_schema_statements_need_create_database() {
    let emitter = TqlEmitter::new(EmitOptions {
        name_case: IdentifierCase::Upper,
        create_database: false,
    });
    let text = emitter.emit(&shop_with_sales()).text;
    assert!(!text.contains("CREATE SCHEMA"));
    assert!(text.contains("CREATE TABLE \"SALES\".\"ORDERS\""));
}

#[test]
fn test_round_trip_keeps_schemas() {
    let db = shop_with_sales();
    assert_eq!(round_trip_differences(&db).unwrap(), Vec::<String>::new());
    let text = TqlEmitter::default().emit(&db).text;
    let back = parse(Dialect::Tql, &text, &ParseOptions::default()).unwrap();
    assert_eq!(back.database.table("orders").unwrap().schema(), "sales");
    assert!(!back.has_errors());
}

#[test]
fn test_tql_type_spellings() {
    assert_eq!(tql_type(&CanonicalType::Boolean).0, "BOOL");
    assert_eq!(tql_type(&CanonicalType::DateTime).0, "DATETIME");
    assert_eq!(
        tql_type(&CanonicalType::Integer {
            bits: IntBitWidth::I16
        }),
        ("INT".to_string(), Some(DiagnosticCode::TypeWidened))
    );
    assert_eq!(tql_type(&CanonicalType::WIDE_STRING).0, "VARCHAR(0)");
}

#[test]
fn test_quote_ident_doubles_quotes() {
    assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
}
