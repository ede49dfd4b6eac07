//! RelationshipPromotion check: relationships that could be foreign keys

use crate::check::StructuralCheck;
use crate::context::ReviewContext;
use crate::finding::{Finding, FindingCategory};
use dt_core::{JoinEdge, NameCase, Table};

/// Suggests redeclaring PK-backed relationships as foreign keys
pub struct RelationshipPromotion;

impl StructuralCheck for RelationshipPromotion {
    fn name(&self) -> &'static str {
        "relationship_promotion"
    }

    fn description(&self) -> &'static str {
        "Suggests foreign keys for relationships that join the target's full primary key"
    }

    fn run(&self, ctx: &ReviewContext<'_>) -> Vec<Finding> {
        let db = ctx.db();
        let mut findings = Vec::new();
        for (source, join) in db.joins() {
            if join.kind != dt_core::JoinKind::Relationship {
                continue;
            }
            let Some(target) = db.table(&join.target) else {
                continue;
            };
            let Some(locals) = promotable(source, join, target, db.case()) else {
                continue;
            };
            findings.push(
                Finding::new(
                    self.name(),
                    FindingCategory::PromoteToFk,
                    vec![source.name().to_string(), target.name().to_string()],
                    format!(
                        "relationship '{}' joins the primary key of '{}'; declare it as a foreign key",
                        join.name,
                        target.name()
                    ),
                )
                .with_evidence("relationship", &join.name)
                .with_evidence("columns", locals.join(", ")),
            );
        }
        findings
    }
}

/// Local columns in target-PK order, when the join covers exactly the PK
/// and each local column has the same type family as its PK column
fn promotable<'a>(
    source: &'a Table,
    join: &'a JoinEdge,
    target: &Table,
    case: NameCase,
) -> Option<Vec<&'a str>> {
    let pk = target.primary_key_columns();
    if pk.is_empty() || pk.len() != join.pairs.len() {
        return None;
    }
    let mut locals = Vec::with_capacity(pk.len());
    for pk_column in pk {
        let mut matching = join
            .pairs
            .iter()
            .filter(|p| case.matches(&p.remote, pk_column));
        let pair = matching.next()?;
        if matching.next().is_some() {
            return None;
        }
        let local = source.column(&pair.local)?;
        let remote = target.column(pk_column)?;
        if !local.ty.same_family(&remote.ty) {
            return None;
        }
        locals.push(pair.local.as_str());
    }
    Some(locals)
}

#[cfg(test)]
#[path = "promotion_test.rs"]
mod tests;
