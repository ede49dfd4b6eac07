//! ManyToMany check: joins whose key repeats on both sides

use crate::check::DataCheck;
use crate::context::ReviewContext;
use crate::error::SamplerResult;
use crate::finding::{Finding, FindingCategory};
use crate::sampler::TimedSampler;
use async_trait::async_trait;
use futures::future::join_all;

/// Undeclared many-to-many detection from sampled key counts
pub struct ManyToMany;

/// Sampled counts for one side of a join
#[derive(Debug, Clone, Copy)]
struct SideCounts {
    rows: u64,
    distinct: u64,
}

impl SideCounts {
    /// Rows per distinct key; 1.0 means the key is unique
    fn ratio(&self) -> f64 {
        if self.distinct == 0 {
            return 1.0;
        }
        self.rows as f64 / self.distinct as f64
    }
}

async fn side_counts(
    sampler: &TimedSampler<'_>,
    table: &str,
    columns: &[String],
) -> SamplerResult<SideCounts> {
    let rows = sampler.row_count(table).await?;
    let distinct = sampler.distinct_key_count(table, columns).await?;
    Ok(SideCounts { rows, distinct })
}

#[async_trait]
impl DataCheck for ManyToMany {
    fn name(&self) -> &'static str {
        "many_to_many"
    }

    fn description(&self) -> &'static str {
        "Samples both sides of each non-PK join and flags keys duplicated on both"
    }

    async fn run(&self, ctx: &ReviewContext<'_>, sampler: &TimedSampler<'_>) -> Vec<Finding> {
        let db = ctx.db();
        let limit = ctx.config().duplication_ratio;

        let candidates: Vec<_> = db
            .joins()
            .filter_map(|(source, join)| {
                let target = db.table(&join.target)?;
                let local: Vec<String> = join.pairs.iter().map(|p| p.local.clone()).collect();
                let remote: Vec<String> = join.pairs.iter().map(|p| p.remote.clone()).collect();
                // A PK on either side makes the join 1:1 or 1:M by construction
                if source.is_primary_key(local.as_slice())
                    || target.is_primary_key(remote.as_slice())
                {
                    return None;
                }
                Some((source, join, target, local, remote))
            })
            .collect();

        let sampled = join_all(candidates.iter().map(
            |(source, _, target, local, remote)| async move {
                let left = side_counts(sampler, source.name(), local).await?;
                let right = side_counts(sampler, target.name(), remote).await?;
                Ok::<_, crate::error::SamplerError>((left, right))
            },
        ))
        .await;

        let mut findings = Vec::new();
        for ((source, join, target, _, _), counts) in candidates.iter().zip(sampled) {
            let tables = vec![source.name().to_string(), target.name().to_string()];
            let (left, right) = match counts {
                Ok(counts) => counts,
                Err(e) => {
                    findings.push(
                        Finding::unverified(self.name(), tables, e)
                            .with_evidence("join", &join.name),
                    );
                    continue;
                }
            };
            if left.ratio() > limit && right.ratio() > limit {
                findings.push(
                    Finding::new(
                        self.name(),
                        FindingCategory::ManyToMany,
                        tables,
                        format!(
                            "'{}' behaves as many-to-many: keys repeat on both '{}' and '{}'; \
                             model it through a bridge table",
                            join.name,
                            source.name(),
                            target.name()
                        ),
                    )
                    .with_evidence("join", &join.name)
                    .with_evidence("left_rows", left.rows)
                    .with_evidence("left_distinct", left.distinct)
                    .with_evidence("right_rows", right.rows)
                    .with_evidence("right_distinct", right.distinct),
                );
            } else {
                log::debug!(
                    "{}: '{}' is at most 1:M ({:.2} / {:.2})",
                    self.name(),
                    join.name,
                    left.ratio(),
                    right.ratio()
                );
            }
        }
        findings
    }
}

#[cfg(test)]
#[path = "many_to_many_test.rs"]
mod tests;
