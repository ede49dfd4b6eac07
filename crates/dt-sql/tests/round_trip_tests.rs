//! Vendor DDL → canonical model → TQL → canonical model, per dialect

use dt_core::{Dialect, JoinKind, Severity};
use dt_sql::{parse, verify_round_trip, ParseOptions, TqlEmitter};

fn read(dialect: Dialect, sql: &str) -> dt_core::Database {
    let outcome = parse(dialect, sql, &ParseOptions::default()).unwrap();
    assert!(
        !outcome.has_errors(),
        "unexpected errors: {:?}",
        outcome.diagnostics
    );
    outcome.database
}

// ── PostgreSQL ──────────────────────────────────────────────────────────

#[test]
fn test_postgres_round_trip() {
    let db = read(
        Dialect::Postgres,
        r#"
CREATE TABLE customers (
    id bigint PRIMARY KEY,
    email character varying(255) NOT NULL,
    signed_up timestamp without time zone
);
CREATE TABLE orders (
    id bigint NOT NULL,
    customer_id bigint,
    total numeric(12,2),
    CONSTRAINT orders_pkey PRIMARY KEY (id),
    CONSTRAINT orders_customer_fk FOREIGN KEY (customer_id) REFERENCES customers (id)
);
"#,
    );
    assert_eq!(db.len(), 2);
    assert!(verify_round_trip(&db).is_ok());

    let emitted = TqlEmitter::default().emit(&db);
    assert!(emitted.text.contains("\"total\" DOUBLE"));
    assert!(emitted
        .diagnostics
        .iter()
        .all(|d| d.severity != Severity::Error));
}

// ── MySQL ───────────────────────────────────────────────────────────────

#[test]
fn test_mysql_round_trip() {
    let db = read(
        Dialect::MySql,
        r#"
CREATE TABLE `products` (
  `sku` varchar(32) NOT NULL,
  `price` double DEFAULT NULL,
  `stock` int unsigned NOT NULL,
  PRIMARY KEY (`sku`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;

CREATE TABLE `order_lines` (
  `line_id` bigint NOT NULL AUTO_INCREMENT,
  `sku` varchar(32) NOT NULL,
  PRIMARY KEY (`line_id`),
  KEY `idx_sku` (`sku`),
  CONSTRAINT `fk_lines_sku` FOREIGN KEY (`sku`) REFERENCES `products` (`sku`)
) ENGINE=InnoDB;
"#,
    );
    let lines = db.table("order_lines").unwrap();
    assert_eq!(lines.foreign_keys().count(), 1);
    assert!(verify_round_trip(&db).is_ok());
}

// ── SQL Server ──────────────────────────────────────────────────────────

#[test]
fn test_sqlserver_round_trip() {
    let db = read(
        Dialect::SqlServer,
        r#"
CREATE TABLE [dbo].[Region] (
    [RegionId] INT NOT NULL,
    [Name] NVARCHAR(50) NULL,
    CONSTRAINT [PK_Region] PRIMARY KEY CLUSTERED ([RegionId] ASC)
)
GO
CREATE TABLE [dbo].[Store] (
    [StoreId] INT NOT NULL PRIMARY KEY,
    [RegionId] INT NULL
)
GO
ALTER TABLE [dbo].[Store] WITH CHECK ADD CONSTRAINT [FK_Store_Region]
    FOREIGN KEY ([RegionId]) REFERENCES [dbo].[Region] ([RegionId])
GO
"#,
    );
    assert_eq!(db.table("Store").unwrap().foreign_keys().count(), 1);
    assert!(verify_round_trip(&db).is_ok());
}

// ── Oracle ──────────────────────────────────────────────────────────────

#[test]
fn test_oracle_round_trip_keeps_folded_names() {
    let db = read(
        Dialect::Oracle,
        r#"
CREATE TABLE dept (
    deptno NUMBER(4) NOT NULL,
    dname VARCHAR2(14),
    CONSTRAINT pk_dept PRIMARY KEY (deptno)
);
CREATE TABLE emp (
    empno NUMBER(4) NOT NULL,
    deptno NUMBER(4),
    hired DATE,
    CONSTRAINT pk_emp PRIMARY KEY (empno),
    CONSTRAINT fk_deptno FOREIGN KEY (deptno) REFERENCES dept (deptno)
);
"#,
    );
    assert!(db.table("DEPT").is_some());
    let text = TqlEmitter::default().emit(&db).text;
    assert!(text.contains("CREATE TABLE \"EMP\""));
    assert!(verify_round_trip(&db).is_ok());
}

// ── TQL itself ──────────────────────────────────────────────────────────

#[test]
fn test_tql_relationships_survive() {
    let db = read(
        Dialect::Tql,
        r#"
CREATE DATABASE "retail";
USE "retail";
CREATE TABLE "region" (
  "region" VARCHAR(0) NOT NULL,
  CONSTRAINT PRIMARY KEY ("region")
);
CREATE TABLE "sales" (
  "id" BIGINT NOT NULL,
  "ship_region" VARCHAR(0),
  CONSTRAINT PRIMARY KEY ("id")
) PARTITION BY HASH (16) KEY ("id");
ALTER TABLE "sales"
  ADD RELATIONSHIP "rel_region" WITH "region"
  AS "sales"."ship_region" = "region"."region";
"#,
    );
    assert_eq!(db.name(), "retail");
    let sales = db.table("sales").unwrap();
    assert_eq!(sales.sharding().map(|s| s.shard_count), Some(16));
    assert_eq!(sales.joins()[0].kind, JoinKind::Relationship);

    let again = read(Dialect::Tql, &TqlEmitter::default().emit(&db).text);
    assert_eq!(again.shape(), db.shape());
}
