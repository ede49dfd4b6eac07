use super::*;
use dt_core::{CanonicalType, IntBitWidth};

fn parse_ok(dialect: Dialect, sql: &str) -> ParseOutcome {
    parse(dialect, sql, &ParseOptions::default()).unwrap()
}

fn codes(outcome: &ParseOutcome) -> Vec<&'static str> {
    outcome.diagnostics.iter().map(|d| d.code.code()).collect()
}

fn int32() -> CanonicalType {
    CanonicalType::Integer {
        bits: IntBitWidth::I32,
    }
}

#[test]
fn test_empty_input_is_an_error() {
    assert!(matches!(
        parse(Dialect::Generic, "  \n\t", &ParseOptions::default()),
        Err(SqlError::EmptyInput)
    ));
}

#[test]
fn test_postgres_dump() {
    let sql = r#"
-- PostgreSQL database dump
CREATE TABLE public.authors (
    author_id integer NOT NULL,
    name character varying(100),
    CONSTRAINT authors_pkey PRIMARY KEY (author_id)
);
CREATE TABLE public.Books (
    book_id bigint NOT NULL,
    author_id integer REFERENCES authors,
    price numeric(10,2),
    tags text[],
    PRIMARY KEY (book_id)
);
CREATE INDEX books_author ON public.books (author_id);
"#;
    let outcome = parse_ok(Dialect::Auto, sql);
    assert_eq!(outcome.dialect, Dialect::Postgres);
    let db = &outcome.database;
    assert_eq!(db.name(), "main");
    assert_eq!(
        db.tables().iter().map(|t| t.name()).collect::<Vec<_>>(),
        vec!["authors", "books"]
    );

    let authors = db.table("authors").unwrap();
    assert_eq!(authors.primary_key_columns(), ["author_id".to_string()]);
    assert!(!authors.column("author_id").unwrap().nullable);
    assert_eq!(
        authors.column("name").unwrap().ty,
        CanonicalType::String {
            max_length: Some(100)
        }
    );

    let books = db.table("books").unwrap();
    assert_eq!(
        books.column("price").unwrap().ty,
        CanonicalType::Decimal {
            precision: Some(10),
            scale: Some(2)
        }
    );
    assert_eq!(books.column("tags").unwrap().ty, CanonicalType::Unknown);
    assert_eq!(books.column("tags").unwrap().raw_type, "text[]");

    let fk: Vec<_> = books.foreign_keys().collect();
    assert_eq!(fk.len(), 1);
    assert_eq!(fk[0].name, "FK_books_to_authors");
    assert_eq!(fk[0].pairs, vec![ColumnPair::new("author_id", "author_id")]);

    assert_eq!(codes(&outcome), vec!["P005", "P001"]);
    let unresolved = &outcome.diagnostics[0];
    assert_eq!(unresolved.table.as_deref(), Some("books"));
    assert_eq!(unresolved.column.as_deref(), Some("tags"));
    assert_eq!(unresolved.line, Some(12));
    assert_eq!(outcome.diagnostics[1].line, Some(15));
    assert!(!outcome.has_errors());
}

#[test]
fn test_mysql_dump() {
    let sql = r#"
-- MySQL dump 10.13
CREATE DATABASE IF NOT EXISTS `shop` DEFAULT CHARACTER SET utf8mb4;
USE `shop`;
# customers
CREATE TABLE `customers` (
  `id` int(11) unsigned NOT NULL AUTO_INCREMENT,
  `email` varchar(255) NOT NULL,
  `active` tinyint(1) NOT NULL DEFAULT '1',
  PRIMARY KEY (`id`),
  UNIQUE KEY `email` (`email`),
  KEY `idx_active` (`active`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;
CREATE TABLE `orders` (
  `id` bigint NOT NULL,
  `customer_id` int(11) unsigned NOT NULL,
  PRIMARY KEY (`id`),
  CONSTRAINT `fk_customer` FOREIGN KEY (`customer_id`) REFERENCES `customers` (`id`) ON DELETE CASCADE
) ENGINE=InnoDB;
"#;
    let outcome = parse_ok(Dialect::MySql, sql);
    let db = &outcome.database;
    assert_eq!(db.name(), "shop");
    assert_eq!(db.len(), 2);

    let customers = db.table("customers").unwrap();
    assert_eq!(
        customers.column("id").unwrap().ty,
        CanonicalType::WIDE_INTEGER
    );
    assert_eq!(
        customers.column("active").unwrap().ty,
        CanonicalType::Boolean
    );

    let orders = db.table("orders").unwrap();
    let fk: Vec<_> = orders.foreign_keys().collect();
    assert_eq!(fk.len(), 1);
    assert_eq!(fk[0].name, "fk_customer");
    assert_eq!(fk[0].target, "customers");

    assert_eq!(
        codes(&outcome),
        vec!["P002", "P001", "P003", "P003", "P002", "P002"]
    );
}

#[test]
fn test_sqlserver_script() {
    let sql = r#"
CREATE TABLE [dbo].[Region] (
    [RegionID] [int] IDENTITY(1,1) NOT NULL,
    [Name] [nvarchar](50) NULL,
    [Budget] [money] NULL,
 CONSTRAINT [PK_Region] PRIMARY KEY CLUSTERED ([RegionID] ASC)
) ON [PRIMARY]
GO
CREATE TABLE [dbo].[Territory] (
    [TerritoryID] [int] NOT NULL,
    [RegionID] [int] NOT NULL,
    CONSTRAINT [PK_Territory] PRIMARY KEY ([TerritoryID])
)
GO
ALTER TABLE [dbo].[Territory] WITH CHECK ADD CONSTRAINT [FK_Territory_Region] FOREIGN KEY([RegionID])
REFERENCES [dbo].[Region] ([RegionID])
GO
ALTER TABLE [dbo].[Territory] CHECK CONSTRAINT [FK_Territory_Region]
GO
"#;
    let outcome = parse_ok(Dialect::SqlServer, sql);
    let db = &outcome.database;

    let region = db.table("Region").unwrap();
    assert_eq!(region.primary_key_columns(), ["RegionID".to_string()]);
    assert_eq!(region.column("RegionID").unwrap().ty, int32());
    assert_eq!(
        region.column("Name").unwrap().ty,
        CanonicalType::String {
            max_length: Some(50)
        }
    );
    assert_eq!(
        region.column("Budget").unwrap().ty,
        CanonicalType::Decimal {
            precision: Some(19),
            scale: Some(4)
        }
    );

    let territory = db.table("Territory").unwrap();
    let fk: Vec<_> = territory.foreign_keys().collect();
    assert_eq!(fk.len(), 1);
    assert_eq!(fk[0].name, "FK_Territory_Region");
    assert_eq!(fk[0].target, "Region");

    assert_eq!(codes(&outcome), vec!["P002", "P001"]);
}

#[test]
fn test_oracle_folds_and_maps_numbers() {
    let sql = r#"
CREATE TABLE hr.departments (
  department_id NUMBER(4) NOT NULL,
  department_name VARCHAR2(30 BYTE),
  CONSTRAINT dept_id_pk PRIMARY KEY (department_id)
) TABLESPACE users;
CREATE TABLE hr.employees (
  employee_id NUMBER(6,0) PRIMARY KEY,
  salary NUMBER(8,2),
  budget NUMBER,
  hired DATE,
  department_id NUMBER(4) CONSTRAINT emp_dept_fk REFERENCES departments (department_id)
);
"#;
    let outcome = parse_ok(Dialect::Oracle, sql);
    let db = &outcome.database;
    assert_eq!(
        db.tables().iter().map(|t| t.name()).collect::<Vec<_>>(),
        vec!["DEPARTMENTS", "EMPLOYEES"]
    );

    let departments = db.table("DEPARTMENTS").unwrap();
    assert_eq!(departments.schema(), "HR");
    assert_eq!(departments.column("DEPARTMENT_ID").unwrap().ty, int32());
    assert_eq!(
        departments.column("DEPARTMENT_NAME").unwrap().ty,
        CanonicalType::String {
            max_length: Some(30)
        }
    );

    let employees = db.table("EMPLOYEES").unwrap();
    assert_eq!(employees.primary_key_columns(), ["EMPLOYEE_ID".to_string()]);
    assert_eq!(
        employees.column("SALARY").unwrap().ty,
        CanonicalType::WIDE_FLOAT
    );
    assert_eq!(
        employees.column("BUDGET").unwrap().ty,
        CanonicalType::WIDE_INTEGER
    );
    assert_eq!(
        employees.column("HIRED").unwrap().ty,
        CanonicalType::DateTime
    );
    let fk: Vec<_> = employees.foreign_keys().collect();
    assert_eq!(fk[0].name, "EMP_DEPT_FK");

    assert_eq!(codes(&outcome), vec!["P002", "P004"]);
    assert_eq!(outcome.diagnostics[1].severity, Severity::Warning);
}

#[test]
fn test_tql_script() {
    let sql = r#"
CREATE DATABASE "sales";
USE "sales";
CREATE TABLE "customers" (
  "id" BIGINT NOT NULL,
  "region" VARCHAR(20),
  CONSTRAINT PRIMARY KEY ("id")
) PARTITION BY HASH (32) KEY ("id");
CREATE TABLE "orders" (
  "id" BIGINT NOT NULL,
  "customer_id" BIGINT,
  "ship_region" VARCHAR(20),
  CONSTRAINT PRIMARY KEY ("id")
) PARTITION BY HASH (64);
ALTER TABLE "orders" ADD CONSTRAINT "fk_cust" FOREIGN KEY ("customer_id") REFERENCES "customers" ("id");
ALTER TABLE "orders" ADD RELATIONSHIP "rel_region" WITH "customers" AS "customers"."region" = "orders"."ship_region";
"#;
    let outcome = parse_ok(Dialect::Tql, sql);
    let db = &outcome.database;
    assert_eq!(db.name(), "sales");

    let customers = db.table("customers").unwrap();
    assert_eq!(
        customers.sharding(),
        Some(&ShardingSpec::hash(32, vec!["id".into()]))
    );
    let orders = db.table("orders").unwrap();
    assert_eq!(
        orders.sharding(),
        Some(&ShardingSpec::hash(64, vec!["id".into()]))
    );

    let rel: Vec<_> = orders.relationships().collect();
    assert_eq!(rel.len(), 1);
    assert_eq!(rel[0].name, "rel_region");
    assert_eq!(rel[0].pairs, vec![ColumnPair::new("ship_region", "region")]);
    assert_eq!(orders.foreign_keys().count(), 1);

    assert_eq!(codes(&outcome), vec!["P001"]);
}

#[test]
fn test_tql_set_partition() {
    let sql = "CREATE TABLE t (id INT, CONSTRAINT PRIMARY KEY (id));\n\
               ALTER TABLE t SET PARTITION BY HASH (8) KEY (id);";
    let outcome = parse_ok(Dialect::Tql, sql);
    assert_eq!(
        outcome.database.table("t").unwrap().sharding(),
        Some(&ShardingSpec::hash(8, vec!["id".into()]))
    );
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn test_forward_and_self_references() {
    let sql = "CREATE TABLE emp (id INT PRIMARY KEY, manager_id INT REFERENCES emp(id), dept_id INT REFERENCES dept);\n\
               CREATE TABLE dept (id INT PRIMARY KEY);";
    let outcome = parse_ok(Dialect::Generic, sql);
    let emp = outcome.database.table("emp").unwrap();
    let names: Vec<_> = emp.foreign_keys().map(|j| j.name.as_str()).collect();
    assert_eq!(names, vec!["FK_emp_to_emp", "FK_emp_to_dept"]);
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn test_foreign_key_to_non_key_is_demoted() {
    let sql = "CREATE TABLE a (id INT PRIMARY KEY, code VARCHAR(10));\n\
               CREATE TABLE b (id INT PRIMARY KEY, a_code VARCHAR(10), FOREIGN KEY (a_code) REFERENCES a (code));";
    let outcome = parse_ok(Dialect::Generic, sql);
    let b = outcome.database.table("b").unwrap();
    assert_eq!(b.foreign_keys().count(), 0);
    let rel: Vec<_> = b.relationships().collect();
    assert_eq!(rel[0].name, "REL_b_to_a");
    assert_eq!(rel[0].pairs, vec![ColumnPair::new("a_code", "code")]);
    assert_eq!(codes(&outcome), vec!["P009"]);
    assert!(!outcome.has_errors());
}

#[test]
fn test_bad_statements_are_dropped_and_parsing_continues() {
    let sql = "CREATE TABLE good (id INT);\n\
               CREATE TABLE bad (id INT,, x INT);\n\
               CREATE TABLE good (other INT);\n\
               CREATE TABLE t2 (id INT, FOREIGN KEY (id) REFERENCES missing (id));";
    let outcome = parse_ok(Dialect::Generic, sql);
    let db = &outcome.database;
    assert!(db.contains("good"));
    assert!(!db.contains("bad"));
    assert!(db.contains("t2"));
    assert!(db.table("good").unwrap().has_column("id"));
    assert_eq!(codes(&outcome), vec!["P006", "P008", "P008"]);
    assert_eq!(outcome.diagnostics[0].line, Some(2));
    assert!(outcome.has_errors());
    assert_eq!(outcome.count(Severity::Error), 3);
}

#[test]
fn test_tokenizer_error_is_local() {
    let sql = "CREATE TABLE ok (id INT);\nCREATE TABLE t (x INT DEFAULT 'abc)";
    let outcome = parse_ok(Dialect::Generic, sql);
    assert!(outcome.database.contains("ok"));
    assert_eq!(codes(&outcome), vec!["P007"]);
    assert_eq!(outcome.diagnostics[0].line, Some(2));
}

#[test]
fn test_alter_with_several_clauses() {
    let sql = "CREATE TABLE t (id integer);\n\
               ALTER TABLE ONLY public.t ADD CONSTRAINT t_pkey PRIMARY KEY (id), ADD COLUMN note text;";
    let outcome = parse_ok(Dialect::Postgres, sql);
    let t = outcome.database.table("t").unwrap();
    assert_eq!(t.primary_key_columns(), ["id".to_string()]);
    assert_eq!(t.column("note").unwrap().ty, CanonicalType::WIDE_STRING);
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn test_quoted_names_keep_case() {
    let sql = "CREATE TABLE \"MixedCase\" (\"Id\" int);\nCREATE TABLE Shouty (Id int);";
    let outcome = parse(
        Dialect::Postgres,
        sql,
        &ParseOptions {
            database_name: "db".into(),
            case: NameCase::Sensitive,
            ..ParseOptions::default()
        },
    )
    .unwrap();
    let db = &outcome.database;
    assert!(db.contains("MixedCase"));
    assert!(!db.contains("mixedcase"));
    assert!(db.table("MixedCase").unwrap().has_column("Id"));
    assert!(db.table("shouty").unwrap().has_column("id"));
}

#[test]
fn test_ambiguous_type_is_reported_with_location() {
    let sql = "CREATE TABLE m (\n  big numeric(30, 0)\n);";
    let outcome = parse_ok(Dialect::Postgres, sql);
    assert_eq!(codes(&outcome), vec!["P004"]);
    let d = &outcome.diagnostics[0];
    assert_eq!(d.line, Some(2));
    assert_eq!(d.table.as_deref(), Some("m"));
    assert_eq!(d.column.as_deref(), Some("big"));
    assert_eq!(
        outcome.database.table("m").unwrap().column("big").unwrap().ty,
        CanonicalType::WIDE_INTEGER
    );
}

#[test]
fn test_create_table_as_select_is_skipped() {
    let outcome = parse_ok(Dialect::Generic, "CREATE TABLE copy AS SELECT * FROM t;");
    assert!(outcome.database.is_empty());
    assert_eq!(codes(&outcome), vec!["P001"]);
    assert_eq!(outcome.diagnostics[0].table.as_deref(), Some("copy"));
}

#[test]
fn test_database_name_from_options() {
    let options = ParseOptions {
        database_name: "warehouse".into(),
        case: NameCase::Insensitive,
        ..ParseOptions::default()
    };
    let outcome = parse(Dialect::Generic, "CREATE TABLE t (id INT);", &options).unwrap();
    assert_eq!(outcome.database.name(), "warehouse");
}

#[test]
fn test_second_primary_key_from_alter_is_dropped() {
    let sql = "CREATE TABLE t (a INT PRIMARY KEY, b INT);
               ALTER TABLE t ADD PRIMARY KEY (b);";
    let out = parse_ok(Dialect::Generic, sql);
    let table = out.database.table("t").unwrap();
    assert_eq!(table.primary_key_columns(), ["a".to_string()]);
    assert_eq!(codes(&out), vec!["P008"]);
    assert_eq!(out.diagnostics[0].severity, Severity::Error);
    assert!(out.diagnostics[0].message.contains("already has primary key (a)"));
}

#[test]
fn test_schema_qualifier_is_kept() {
    let sql = "CREATE SCHEMA sales;
               CREATE TABLE sales.orders (id INT PRIMARY KEY);
               CREATE TABLE customers (id INT);";
    let out = parse_ok(Dialect::Generic, sql);
    assert!(out.diagnostics.is_empty());
    assert_eq!(out.database.table("orders").unwrap().schema(), "sales");
    assert_eq!(
        out.database.table("customers").unwrap().schema(),
        DEFAULT_SCHEMA
    );
}

#[test]
fn test_dialect_default_schema_means_the_configured_one() {
    let pg = parse_ok(Dialect::Postgres, "CREATE TABLE public.t (id int);");
    assert_eq!(pg.database.table("t").unwrap().schema(), DEFAULT_SCHEMA);

    let mssql = parse_ok(Dialect::SqlServer, "CREATE TABLE [shop].[dbo].[t] ([id] INT)");
    assert_eq!(mssql.database.table("t").unwrap().schema(), DEFAULT_SCHEMA);
}

#[test]
fn test_mysql_qualifier_names_a_database() {
    let out = parse_ok(Dialect::MySql, "CREATE TABLE shop.items (id INT);");
    assert_eq!(out.database.table("items").unwrap().schema(), DEFAULT_SCHEMA);
}

#[test]
fn test_mysql_create_schema_names_the_database() {
    let out = parse_ok(Dialect::MySql, "CREATE SCHEMA shop; CREATE TABLE t (id INT);");
    assert_eq!(out.database.name(), "shop");
}

#[test]
fn test_schema_name_from_options() {
    let options = ParseOptions {
        schema_name: "finance".into(),
        ..ParseOptions::default()
    };
    let sql = "CREATE TABLE ledger (id INT); CREATE TABLE audit.log (id INT);";
    let out = parse(Dialect::Generic, sql, &options).unwrap();
    assert_eq!(out.database.table("ledger").unwrap().schema(), "finance");
    assert_eq!(out.database.table("log").unwrap().schema(), "audit");
}

#[test]
fn test_same_table_in_two_schemas_is_dropped() {
    let sql = "CREATE TABLE a.t (id INT); CREATE TABLE b.t (id INT);";
    let out = parse_ok(Dialect::Generic, sql);
    assert_eq!(out.database.len(), 1);
    assert_eq!(out.database.table("t").unwrap().schema(), "a");
    assert_eq!(codes(&out), vec!["P008"]);
    assert!(out.diagnostics[0].message.contains("schema 'a'"));
}
