//! CircularRelationships check: self-references and join cycles

use crate::check::StructuralCheck;
use crate::context::ReviewContext;
use crate::finding::{Finding, FindingCategory};

/// Cycle detection over the directed relationship graph
pub struct CircularRelationships;

impl StructuralCheck for CircularRelationships {
    fn name(&self) -> &'static str {
        "circular_relationships"
    }

    fn description(&self) -> &'static str {
        "Reports tables that join to themselves and cycles of joins between tables"
    }

    fn run(&self, ctx: &ReviewContext<'_>) -> Vec<Finding> {
        let graph = ctx.graph();
        let mut findings = Vec::new();

        let mut tables = graph.tables();
        tables.sort_unstable();
        for table in tables {
            if graph.has_self_loop(table) {
                findings.push(Finding::new(
                    self.name(),
                    FindingCategory::SelfReferencing,
                    vec![table.to_string()],
                    format!("table '{table}' joins to itself"),
                ));
            }
        }

        // Components come sorted, so the first name is the smallest
        for component in graph.strongly_connected_components() {
            if component.len() < 2 {
                continue;
            }
            let start = component[0];
            let Some(cycle) = graph.smallest_cycle_through(start) else {
                continue;
            };
            let mut path: Vec<&str> = cycle.clone();
            path.push(start);
            findings.push(
                Finding::new(
                    self.name(),
                    FindingCategory::Circular,
                    component.iter().map(|t| t.to_string()).collect(),
                    format!("circular relationship: {}", path.join(" -> ")),
                )
                .with_evidence("cycle_length", cycle.len())
                .with_evidence("component_size", component.len()),
            );
        }

        findings
    }
}

#[cfg(test)]
#[path = "circular_test.rs"]
mod tests;
