//! PrimaryKeyPresence check: every table should have a primary key

use crate::check::StructuralCheck;
use crate::context::ReviewContext;
use crate::finding::{Finding, FindingCategory};

/// Primary key presence check
pub struct PrimaryKeyPresence;

impl StructuralCheck for PrimaryKeyPresence {
    fn name(&self) -> &'static str {
        "primary_keys"
    }

    fn description(&self) -> &'static str {
        "Flags tables without a primary key"
    }

    fn run(&self, ctx: &ReviewContext<'_>) -> Vec<Finding> {
        ctx.db()
            .tables()
            .iter()
            .filter(|t| !t.has_primary_key())
            .map(|t| {
                Finding::new(
                    self.name(),
                    FindingCategory::MissingPk,
                    vec![t.name().to_string()],
                    format!("table '{}' has no primary key", t.name()),
                )
                .with_evidence("columns", t.columns().len())
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "primary_keys_test.rs"]
mod tests;
