//! Canonical model to TQL DDL

use crate::diagnostic::{DiagnosticCode, ParseDiagnostic};
use crate::error::{SqlError, SqlResult};
use crate::parser::{parse, ParseOptions};
use dt_core::{
    is_default_schema, map_type_text, CanonicalType, Database, Dialect, EmitConfig,
    FloatBitWidth, IdentifierCase, IntBitWidth, JoinEdge, JoinKind, Severity, Table,
};

/// Output settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitOptions {
    /// Casing applied to table and column names
    pub name_case: IdentifierCase,
    /// Start with `CREATE DATABASE` and `CREATE SCHEMA` for every
    /// non-default schema
    pub create_database: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            name_case: IdentifierCase::Preserve,
            create_database: true,
        }
    }
}

impl EmitOptions {
    pub fn from_config(config: &EmitConfig) -> Self {
        Self {
            name_case: config.name_case,
            create_database: config.create_database,
        }
    }
}

/// TQL text plus notes on anything that could not be written exactly
#[derive(Debug, Clone)]
pub struct Emitted {
    pub text: String,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Writes a model as TQL.
///
/// Output order is fixed: database, schemas, tables in declaration order,
/// then foreign keys, then relationships, so forward references never
/// occur. Tables outside the default schema are written schema-qualified.
#[derive(Debug, Clone, Default)]
pub struct TqlEmitter {
    options: EmitOptions,
}

impl TqlEmitter {
    pub fn new(options: EmitOptions) -> Self {
        Self { options }
    }

    pub fn emit(&self, db: &Database) -> Emitted {
        let mut text = String::new();
        let mut diagnostics = Vec::new();

        let database = quote_ident(db.name());
        if self.options.create_database {
            text.push_str(&format!("CREATE DATABASE {database};\n"));
        }
        text.push_str(&format!("USE {database};\n"));
        if self.options.create_database {
            for schema in db.schemas() {
                if !is_default_schema(schema) {
                    text.push_str(&format!("CREATE SCHEMA {};\n", self.name(schema)));
                }
            }
        }

        for table in db.tables() {
            if table.columns().is_empty() {
                diagnostics.push(
                    ParseDiagnostic::new(
                        DiagnosticCode::EmptyTableSkipped,
                        format!("table '{}' has no columns and was not written", table.name()),
                    )
                    .on_table(table.name()),
                );
                continue;
            }
            text.push('\n');
            self.create_table(&mut text, table, &mut diagnostics);
        }

        let written = |table: &Table| !table.columns().is_empty();
        for kind in [JoinKind::ForeignKey, JoinKind::Relationship] {
            let joins: Vec<_> = db
                .joins()
                .filter(|(t, j)| j.kind == kind && written(t))
                .filter_map(|(t, j)| {
                    let target = db.table(&j.target).filter(|target| written(target))?;
                    Some((t, j, target))
                })
                .collect();
            if !joins.is_empty() {
                text.push('\n');
            }
            for (table, join, target) in joins {
                text.push_str(&self.alter_join(table, join, target));
            }
        }

        log::info!(
            "Emitted {} tables with {} diagnostics",
            db.len(),
            diagnostics.len()
        );
        Emitted { text, diagnostics }
    }

    fn name(&self, name: &str) -> String {
        quote_ident(&self.options.name_case.apply(name))
    }

    /// `"schema"."table"`, or just `"table"` in the default schema
    fn table_ref(&self, table: &Table) -> String {
        if is_default_schema(table.schema()) {
            self.name(table.name())
        } else {
            format!("{}.{}", self.name(table.schema()), self.name(table.name()))
        }
    }

    fn names<S: AsRef<str>>(&self, names: &[S]) -> String {
        names
            .iter()
            .map(|n| self.name(n.as_ref()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn create_table(
        &self,
        text: &mut String,
        table: &Table,
        diagnostics: &mut Vec<ParseDiagnostic>,
    ) {
        let mut elements = Vec::new();
        for column in table.columns() {
            let (ty, note) = tql_type(&column.ty);
            if let Some(code) = note {
                let message = match code {
                    DiagnosticCode::UnknownTypeEmitted => format!(
                        "{}.{}: '{}' has no TQL type, written as {ty}",
                        table.name(),
                        column.name,
                        column.raw_type
                    ),
                    _ => format!(
                        "{}.{}: {} written as {ty}",
                        table.name(),
                        column.name,
                        column.ty
                    ),
                };
                diagnostics.push(
                    ParseDiagnostic::new(code, message)
                        .on_table(table.name())
                        .on_column(&column.name),
                );
            }
            let null = if column.nullable { "" } else { " NOT NULL" };
            elements.push(format!("  {} {ty}{null}", self.name(&column.name)));
        }
        if table.has_primary_key() {
            elements.push(format!(
                "  CONSTRAINT PRIMARY KEY ({})",
                self.names(table.primary_key_columns())
            ));
        }

        text.push_str(&format!("CREATE TABLE {} (\n", self.table_ref(table)));
        text.push_str(&elements.join(",\n"));
        text.push_str("\n)");
        if let Some(sharding) = table.sharding() {
            text.push_str(&format!(
                " PARTITION BY HASH ({}) KEY ({})",
                sharding.shard_count,
                self.names(sharding.key.as_slice())
            ));
        }
        text.push_str(";\n");
    }

    fn alter_join(&self, table: &Table, join: &JoinEdge, target: &Table) -> String {
        let source_ref = self.table_ref(table);
        let target_ref = self.table_ref(target);
        match join.kind {
            JoinKind::ForeignKey => format!(
                "ALTER TABLE {source_ref}\n  ADD CONSTRAINT {} FOREIGN KEY ({})\n  REFERENCES {target_ref} ({});\n",
                quote_ident(&join.name),
                self.names(join.local_columns().as_slice()),
                self.names(join.remote_columns().as_slice()),
            ),
            JoinKind::Relationship => {
                let source = self.name(table.name());
                let target = self.name(target.name());
                let condition = join
                    .pairs
                    .iter()
                    .map(|p| {
                        format!(
                            "{source}.{} = {target}.{}",
                            self.name(&p.local),
                            self.name(&p.remote)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(" AND ");
                format!(
                    "ALTER TABLE {source_ref}\n  ADD RELATIONSHIP {} WITH {target_ref}\n  AS {condition};\n",
                    quote_ident(&join.name)
                )
            }
        }
    }
}

/// Quote an identifier, doubling embedded quotes
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// TQL spelling of a canonical type, with the diagnostic owed when the
/// spelling is not exact
pub fn tql_type(ty: &CanonicalType) -> (String, Option<DiagnosticCode>) {
    match ty {
        CanonicalType::Boolean => ("BOOL".into(), None),
        CanonicalType::Integer {
            bits: IntBitWidth::I64,
        } => ("BIGINT".into(), None),
        CanonicalType::Integer {
            bits: IntBitWidth::I32,
        } => ("INT".into(), None),
        CanonicalType::Integer { .. } => ("INT".into(), Some(DiagnosticCode::TypeWidened)),
        CanonicalType::Float {
            bits: FloatBitWidth::F32,
        } => ("FLOAT".into(), None),
        CanonicalType::Float {
            bits: FloatBitWidth::F64,
        } => ("DOUBLE".into(), None),
        CanonicalType::Decimal { .. } => ("DOUBLE".into(), Some(DiagnosticCode::TypeWidened)),
        CanonicalType::String {
            max_length: Some(n),
        } => (format!("VARCHAR({n})"), None),
        CanonicalType::String { max_length: None } => ("VARCHAR(0)".into(), None),
        CanonicalType::Date => ("DATE".into(), None),
        CanonicalType::Time => ("TIME".into(), None),
        CanonicalType::DateTime => ("DATETIME".into(), None),
        CanonicalType::Unknown => (
            "VARCHAR(0)".into(),
            Some(DiagnosticCode::UnknownTypeEmitted),
        ),
    }
}

/// Emit `db`, read the TQL back and list every structural difference.
///
/// Column types are compared after the lossy TQL spelling, so `DECIMAL`
/// coming back as `DOUBLE` is not a difference.
pub fn round_trip_differences(db: &Database) -> SqlResult<Vec<String>> {
    let emitted = TqlEmitter::new(EmitOptions::default()).emit(db);
    let options = ParseOptions {
        database_name: db.name().to_string(),
        case: db.case(),
        ..ParseOptions::default()
    };
    let outcome = parse(Dialect::Tql, &emitted.text, &options)?;

    let mut differences: Vec<String> = outcome
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .map(|d| format!("re-reading emitted TQL: {d}"))
        .collect();
    if outcome.database.name() != db.name() {
        differences.push(format!(
            "database '{}' became '{}'",
            db.name(),
            outcome.database.name()
        ));
    }

    let mut expected = db.shape();
    for table in expected.tables.values_mut() {
        for (ty, _) in table.columns.values_mut() {
            *ty = map_type_text(Dialect::Tql, &tql_type(ty).0).ty;
        }
    }
    differences.extend(expected.differences(&outcome.database.shape()));
    Ok(differences)
}

/// Fail with [`SqlError::RoundTrip`] unless `db` survives emit and re-parse
pub fn verify_round_trip(db: &Database) -> SqlResult<()> {
    let differences = round_trip_differences(db)?;
    if differences.is_empty() {
        log::info!("Round trip of '{}' verified", db.name());
        Ok(())
    } else {
        Err(SqlError::RoundTrip(differences.join("; ")))
    }
}

#[cfg(test)]
#[path = "emit_test.rs"]
mod tests;
