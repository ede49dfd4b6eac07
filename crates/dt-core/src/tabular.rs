//! Tabular (four-sheet) schema layout
//!
//! Mirrors the human-editable modeling workbook: one row per column, per
//! table, per foreign key and per relationship. Rows are plain serde data;
//! reading and writing spreadsheets is someone else's job.

use crate::dialect::Dialect;
use crate::error::ModelError;
use crate::model::{
    is_default_schema, Column, ColumnPair, Database, JoinKind, NameCase, ShardingSpec,
    DEFAULT_SCHEMA,
};
use crate::severity::Severity;
use crate::type_map::map_type_text;
use crate::validate::ValidationIssue;
use serde::{Deserialize, Serialize};

/// Columns sheet row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRow {
    pub table: String,
    pub column: String,
    /// Type text, e.g. `VARCHAR(40)` or `BIGINT`
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Tables sheet row; `schema` is left out when it is the default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub name: String,
    #[serde(default = "default_schema", skip_serializing_if = "is_default_schema")]
    pub schema: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shard_key: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
}

/// Foreign Keys sheet row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRow {
    pub name: String,
    pub from_table: String,
    pub from_columns: Vec<String>,
    pub to_table: String,
    pub to_columns: Vec<String>,
}

/// Relationships sheet row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRow {
    pub name: String,
    pub table_a: String,
    pub table_b: String,
    /// `a.x = b.y AND a.z = b.w`
    pub condition: String,
}

/// All four sheets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TabularModel {
    pub database: String,
    #[serde(default)]
    pub columns: Vec<ColumnRow>,
    #[serde(default)]
    pub tables: Vec<TableRow>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyRow>,
    #[serde(default)]
    pub relationships: Vec<RelationshipRow>,
}

fn default_true() -> bool {
    true
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

impl TabularModel {
    /// Flatten a model into sheet rows
    pub fn from_database(db: &Database) -> Self {
        let mut model = TabularModel {
            database: db.name().to_string(),
            ..Default::default()
        };

        for table in db.tables() {
            for column in table.columns() {
                model.columns.push(ColumnRow {
                    table: table.name().to_string(),
                    column: column.name.clone(),
                    data_type: column.ty.display_name(),
                    nullable: column.nullable,
                    notes: None,
                });
            }

            let (shard_key, shard_count) = match table.sharding() {
                Some(spec) => (spec.key.clone(), Some(spec.shard_count)),
                None => (Vec::new(), None),
            };
            model.tables.push(TableRow {
                name: table.name().to_string(),
                schema: table.schema().to_string(),
                primary_key: table.primary_key_columns().to_vec(),
                shard_key,
                shard_count,
                row_count: table.row_count(),
            });

            for join in table.joins() {
                match join.kind {
                    JoinKind::ForeignKey => model.foreign_keys.push(ForeignKeyRow {
                        name: join.name.clone(),
                        from_table: table.name().to_string(),
                        from_columns: join.pairs.iter().map(|p| p.local.clone()).collect(),
                        to_table: join.target.clone(),
                        to_columns: join.pairs.iter().map(|p| p.remote.clone()).collect(),
                    }),
                    JoinKind::Relationship => model.relationships.push(RelationshipRow {
                        name: join.name.clone(),
                        table_a: table.name().to_string(),
                        table_b: join.target.clone(),
                        condition: join
                            .pairs
                            .iter()
                            .map(|p| {
                                format!("{}.{} = {}.{}", table.name(), p.local, join.target, p.remote)
                            })
                            .collect::<Vec<_>>()
                            .join(" AND "),
                    }),
                }
            }
        }

        model
    }

    /// Build a model from sheet rows.
    ///
    /// Rows that break a model invariant are skipped and reported; the rest
    /// of the model is still built. Table order follows the Tables sheet,
    /// then any table only named in the Columns sheet.
    pub fn into_database(&self, case: NameCase) -> (Database, Vec<ValidationIssue>) {
        let mut db = Database::with_case(&self.database, case);
        let mut issues = Vec::new();

        let declared = self
            .tables
            .iter()
            .map(|t| (t.schema.as_str(), t.name.as_str()))
            .chain(
                self.columns
                    .iter()
                    .map(|c| (DEFAULT_SCHEMA, c.table.as_str())),
            );
        for (schema, name) in declared {
            if !db.contains(name) {
                if let Err(e) = db.add_table_in(schema, name) {
                    issues.push(model_issue(name, e));
                }
            }
        }

        for row in &self.columns {
            let mapping = map_type_text(Dialect::Tql, &row.data_type);
            let column = Column::new(&row.column, mapping.ty)
                .nullable(row.nullable)
                .with_raw_type(&row.data_type);
            if let Err(e) = db.add_column(&row.table, column) {
                issues.push(model_issue(&row.table, e));
            }
        }

        for row in &self.tables {
            if !row.primary_key.is_empty() {
                if let Err(e) = db.set_primary_key(&row.name, row.primary_key.clone()) {
                    issues.push(model_issue(&row.name, e));
                }
            }
            if let Some(count) = row.shard_count {
                let spec = ShardingSpec::hash(count, row.shard_key.clone());
                if let Err(e) = db.set_sharding(&row.name, spec) {
                    issues.push(model_issue(&row.name, e));
                }
            }
            if row.row_count.is_some() {
                if let Err(e) = db.set_row_count(&row.name, row.row_count) {
                    issues.push(model_issue(&row.name, e));
                }
            }
        }

        for row in &self.foreign_keys {
            if row.from_columns.len() != row.to_columns.len() {
                issues.push(row_issue(
                    "T002",
                    &row.from_table,
                    format!(
                        "foreign key '{}' has {} local and {} target columns",
                        row.name,
                        row.from_columns.len(),
                        row.to_columns.len()
                    ),
                ));
                continue;
            }
            let pairs = row
                .from_columns
                .iter()
                .zip(&row.to_columns)
                .map(|(l, r)| ColumnPair::new(l, r))
                .collect();
            if let Err(e) = db.add_foreign_key(&row.from_table, &row.name, &row.to_table, pairs) {
                issues.push(model_issue(&row.from_table, e));
            }
        }

        for row in &self.relationships {
            let pairs = match parse_condition(&row.condition, &row.table_a, &row.table_b, case) {
                Ok(pairs) => pairs,
                Err(message) => {
                    issues.push(row_issue(
                        "T002",
                        &row.table_a,
                        format!("relationship '{}': {message}", row.name),
                    ));
                    continue;
                }
            };
            if let Err(e) = db.add_relationship(&row.table_a, &row.name, &row.table_b, pairs) {
                issues.push(model_issue(&row.table_a, e));
            }
        }

        (db, issues)
    }
}

fn model_issue(table: &str, err: ModelError) -> ValidationIssue {
    let code = match err {
        ModelError::UnknownTable { .. } => "T001",
        _ => "T003",
    };
    row_issue(code, table, err.to_string())
}

fn row_issue(code: &str, table: &str, message: String) -> ValidationIssue {
    ValidationIssue {
        code: code.to_string(),
        severity: Severity::Error,
        table: table.to_string(),
        column: None,
        message,
    }
}

/// Parse `a.x = b.y AND ...` into pairs oriented `table_a` → `table_b`.
///
/// Unqualified columns are taken left = `table_a`. A qualified predicate
/// written the other way round is flipped.
pub fn parse_condition(
    condition: &str,
    table_a: &str,
    table_b: &str,
    case: NameCase,
) -> Result<Vec<ColumnPair>, String> {
    let mut pairs = Vec::new();
    for predicate in split_and(condition) {
        let Some((left, right)) = predicate.split_once('=') else {
            return Err(format!("'{predicate}' is not an equality"));
        };
        let pair = orient_pair(
            split_qualified(left),
            split_qualified(right),
            table_a,
            table_b,
            case,
        )?;
        pairs.push(pair);
    }
    if pairs.is_empty() {
        return Err("empty join condition".to_string());
    }
    Ok(pairs)
}

/// Orient one `left = right` equality so `local` belongs to `table_a`.
///
/// Each side is `(qualifier, column)`. Unqualified sides are taken in the
/// order written; a predicate qualified the other way round is flipped.
pub fn orient_pair(
    left: (Option<&str>, &str),
    right: (Option<&str>, &str),
    table_a: &str,
    table_b: &str,
    case: NameCase,
) -> Result<ColumnPair, String> {
    let ((lq, lc), (rq, rc)) = (left, right);
    if lc.is_empty() || rc.is_empty() {
        return Err(format!("'{lc} = {rc}' is missing a column"));
    }
    for q in [lq, rq].into_iter().flatten() {
        if !case.matches(q, table_a) && !case.matches(q, table_b) {
            return Err(format!("'{q}' is neither '{table_a}' nor '{table_b}'"));
        }
    }
    let flipped = match (lq, rq) {
        (Some(l), Some(r)) => {
            case.matches(l, table_b) && case.matches(r, table_a) && !case.matches(l, table_a)
        }
        (Some(l), None) => !case.matches(l, table_a),
        (None, Some(r)) => !case.matches(r, table_b),
        (None, None) => false,
    };
    if flipped {
        Ok(ColumnPair::new(rc, lc))
    } else {
        Ok(ColumnPair::new(lc, rc))
    }
}

fn split_and(condition: &str) -> Vec<&str> {
    let upper = condition.to_ascii_uppercase();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut search = 0;
    while let Some(pos) = upper[search..].find(" AND ") {
        let at = search + pos;
        parts.push(condition[start..at].trim());
        start = at + " AND ".len();
        search = start;
    }
    parts.push(condition[start..].trim());
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

fn unquote(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '`')
}

fn split_qualified(side: &str) -> (Option<&str>, &str) {
    let side = side.trim();
    match side.rsplit_once('.') {
        Some((qualifier, column)) => {
            let qualifier = qualifier.rsplit('.').next().unwrap_or(qualifier);
            (Some(unquote(qualifier)), unquote(column))
        }
        None => (None, unquote(side)),
    }
}

#[cfg(test)]
#[path = "tabular_test.rs"]
mod tests;
