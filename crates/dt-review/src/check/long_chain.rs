//! LongChains check: tables joined only through a long path

use crate::check::StructuralCheck;
use crate::context::ReviewContext;
use crate::finding::{Finding, FindingCategory};
use std::collections::HashSet;

/// Long join chain detection (bounded BFS from every table)
pub struct LongChains;

impl StructuralCheck for LongChains {
    fn name(&self) -> &'static str {
        "long_chains"
    }

    fn description(&self) -> &'static str {
        "Reports table pairs reachable only through more joins than the configured threshold"
    }

    fn run(&self, ctx: &ReviewContext<'_>) -> Vec<Finding> {
        let graph = ctx.graph();
        let threshold = ctx.config().long_chain_threshold;
        let max_depth = ctx.config().max_chain_depth;

        let mut tables = graph.tables();
        tables.sort_unstable();

        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut findings = Vec::new();
        for from in tables {
            let mut reachable = graph.distances_bounded(from, max_depth);
            reachable.sort_by(|a, b| a.0.cmp(b.0));
            for (to, distance) in reachable {
                if distance <= threshold || from == to {
                    continue;
                }
                if graph.has_edge(from, to) || graph.has_edge(to, from) {
                    continue;
                }
                let pair = if from < to { (from, to) } else { (to, from) };
                if !seen.insert(pair) {
                    continue;
                }
                findings.push(
                    Finding::new(
                        self.name(),
                        FindingCategory::LongChain,
                        vec![from.to_string(), to.to_string()],
                        format!(
                            "'{from}' reaches '{to}' only through {distance} joins; \
                             consider a direct relationship"
                        ),
                    )
                    .with_evidence("distance", distance)
                    .with_evidence("threshold", threshold),
                );
            }
        }
        findings
    }
}

#[cfg(test)]
#[path = "long_chain_test.rs"]
mod tests;
