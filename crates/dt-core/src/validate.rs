//! Whole-model validation
//!
//! The mutation API rejects invalid constraints one at a time. This pass
//! re-checks a finished model and also reports the softer problems the
//! mutation API accepts: UNKNOWN column types and shard keys outside the
//! primary key.

use crate::model::{Database, JoinKind, Table};
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// One problem found in a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Issue code (e.g. "V001")
    pub code: String,
    pub severity: Severity,
    /// Table the issue is reported against
    pub table: String,
    /// Optional column reference
    pub column: Option<String>,
    /// Human-readable message
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.severity, self.message)
    }
}

/// True if any issue is an error
pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

/// Validate every table of `db`, in declaration order
pub fn validate(db: &Database) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for table in db.tables() {
        check_columns(table, &mut issues);
        check_primary_key(table, &mut issues);
        check_sharding(table, &mut issues);
        check_joins(db, table, &mut issues);
    }
    issues
}

fn issue(
    code: &str,
    severity: Severity,
    table: &Table,
    column: Option<&str>,
    message: String,
) -> ValidationIssue {
    ValidationIssue {
        code: code.to_string(),
        severity,
        table: table.name().to_string(),
        column: column.map(str::to_string),
        message,
    }
}

fn check_columns(table: &Table, issues: &mut Vec<ValidationIssue>) {
    for column in table.columns() {
        if column.ty.is_unknown() {
            issues.push(issue(
                "V001",
                Severity::Warning,
                table,
                Some(&column.name),
                format!(
                    "{}.{} has UNKNOWN type (source type '{}')",
                    table.name(),
                    column.name,
                    column.raw_type
                ),
            ));
        }
    }
}

fn check_primary_key(table: &Table, issues: &mut Vec<ValidationIssue>) {
    for col in table.primary_key_columns() {
        if !table.has_column(col) {
            issues.push(issue(
                "V002",
                Severity::Error,
                table,
                Some(col),
                format!(
                    "primary key column '{col}' does not exist in table '{}'",
                    table.name()
                ),
            ));
        }
    }
}

fn check_sharding(table: &Table, issues: &mut Vec<ValidationIssue>) {
    let Some(spec) = table.sharding() else {
        return;
    };
    let pk = table.primary_key_columns();
    for col in &spec.key {
        if !table.has_column(col) {
            issues.push(issue(
                "V003",
                Severity::Error,
                table,
                Some(col),
                format!(
                    "shard key column '{col}' does not exist in table '{}'",
                    table.name()
                ),
            ));
        } else if !pk.is_empty() && !pk.iter().any(|p| table.case.matches(p, col)) {
            issues.push(issue(
                "V004",
                Severity::Warning,
                table,
                Some(col),
                format!(
                    "shard key column '{col}' is not part of the primary key of '{}'",
                    table.name()
                ),
            ));
        }
    }
}

fn check_joins(db: &Database, table: &Table, issues: &mut Vec<ValidationIssue>) {
    for join in table.joins() {
        let Some(target) = db.table(&join.target) else {
            issues.push(issue(
                "V005",
                Severity::Error,
                table,
                None,
                format!(
                    "{} '{}' targets table '{}', which does not exist",
                    join.kind,
                    join.name,
                    join.target
                ),
            ));
            continue;
        };

        for pair in &join.pairs {
            let local = table.column(&pair.local);
            let remote = target.column(&pair.remote);
            if local.is_none() {
                issues.push(issue(
                    "V006",
                    Severity::Error,
                    table,
                    Some(&pair.local),
                    format!(
                        "{} '{}' uses column '{}', which does not exist in '{}'",
                        join.kind,
                        join.name,
                        pair.local,
                        table.name()
                    ),
                ));
            }
            if remote.is_none() {
                issues.push(issue(
                    "V006",
                    Severity::Error,
                    table,
                    Some(&pair.remote),
                    format!(
                        "{} '{}' uses column '{}', which does not exist in '{}'",
                        join.kind,
                        join.name,
                        pair.remote,
                        target.name()
                    ),
                ));
            }
            if let (Some(l), Some(r)) = (local, remote) {
                if !l.ty.is_compatible_with(&r.ty) {
                    issues.push(issue(
                        "V008",
                        Severity::Error,
                        table,
                        Some(&l.name),
                        format!(
                            "{} '{}' joins {}.{} ({}) to {}.{} ({}) with incompatible types",
                            join.kind,
                            join.name,
                            table.name(),
                            l.name,
                            l.ty,
                            target.name(),
                            r.name,
                            r.ty
                        ),
                    ));
                }
            }
        }

        if join.kind == JoinKind::ForeignKey {
            let pk = target.primary_key_columns();
            let remote = join.remote_columns();
            let matches_pk = pk.len() == remote.len()
                && pk
                    .iter()
                    .zip(&remote)
                    .all(|(a, b)| db.case().matches(a, b));
            if !matches_pk {
                issues.push(issue(
                    "V007",
                    Severity::Error,
                    table,
                    None,
                    format!(
                        "foreign key '{}' references ({}) but the primary key of '{}' is ({})",
                        join.name,
                        remote.join(", "),
                        target.name(),
                        pk.join(", ")
                    ),
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
