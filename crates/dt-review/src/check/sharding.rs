//! ShardingReview check: shard sizing and key skew

use crate::check::DataCheck;
use crate::context::ReviewContext;
use crate::finding::{Finding, FindingCategory};
use crate::sampler::{KeyHistogram, TimedSampler};
use async_trait::async_trait;
use dt_core::{ReviewConfig, ShardingSpec, Table};
use futures::future::join_all;
use std::collections::HashMap;

/// Shard sizing and skew review for hash-partitioned tables.
///
/// Co-sharding of related tables is not analyzed.
pub struct ShardingReview;

#[async_trait]
impl DataCheck for ShardingReview {
    fn name(&self) -> &'static str {
        "sharding"
    }

    fn description(&self) -> &'static str {
        "Compares rows per shard with the configured bounds and samples key skew"
    }

    async fn run(&self, ctx: &ReviewContext<'_>, sampler: &TimedSampler<'_>) -> Vec<Finding> {
        let per_table = join_all(
            ctx.db()
                .tables()
                .iter()
                .map(|table| self.review_table(table, ctx.config(), sampler)),
        )
        .await;
        per_table.into_iter().flatten().collect()
    }
}

impl ShardingReview {
    async fn review_table(
        &self,
        table: &Table,
        config: &ReviewConfig,
        sampler: &TimedSampler<'_>,
    ) -> Vec<Finding> {
        let name = table.name();
        let rows = match sampler.row_count(name).await {
            Ok(rows) => rows,
            Err(e) => return vec![Finding::unverified(self.name(), vec![name.to_string()], e)],
        };

        let Some(spec) = table.sharding() else {
            if rows > config.max_rows_per_shard {
                return vec![Finding::new(
                    self.name(),
                    FindingCategory::LargeUnsharded,
                    vec![name.to_string()],
                    format!("table '{name}' has {rows} rows and is not partitioned"),
                )
                .with_evidence("rows", rows)];
            }
            return Vec::new();
        };

        let mut findings = Vec::new();
        if let Some(f) = self.sizing(name, spec, rows, config) {
            findings.push(f);
        }
        if spec.shard_count > 1 && rows > 0 {
            match sampler.key_histogram(name, &spec.key).await {
                Ok(histogram) => findings.extend(self.skew(name, spec, &histogram, config)),
                Err(e) => {
                    findings.push(Finding::unverified(self.name(), vec![name.to_string()], e))
                }
            }
        }
        findings
    }

    fn sizing(
        &self,
        name: &str,
        spec: &ShardingSpec,
        rows: u64,
        config: &ReviewConfig,
    ) -> Option<Finding> {
        let shards = u64::from(spec.shard_count.max(1));
        let per_shard = rows / shards;
        let category = if per_shard > config.max_rows_per_shard {
            FindingCategory::Undersharded
        } else if per_shard < config.min_rows_per_shard {
            FindingCategory::Oversharded
        } else {
            return None;
        };
        let advice = match category {
            FindingCategory::Undersharded => "more shards",
            _ => "fewer shards",
        };
        Some(
            Finding::new(
                self.name(),
                category,
                vec![name.to_string()],
                format!(
                    "table '{name}' holds ~{per_shard} rows per shard across {shards} shards; \
                     consider {advice}"
                ),
            )
            .with_evidence("rows", rows)
            .with_evidence("shards", shards)
            .with_evidence("rows_per_shard", per_shard),
        )
    }

    fn skew(
        &self,
        name: &str,
        spec: &ShardingSpec,
        histogram: &KeyHistogram,
        config: &ReviewConfig,
    ) -> Option<Finding> {
        let shards = u64::from(spec.shard_count);
        // Only buckets that received rows are stored; the shard count can be
        // far larger than the sample.
        let mut buckets: HashMap<u64, u64> = HashMap::new();
        for (hash, count) in histogram {
            *buckets.entry(hash % shards).or_insert(0) += count;
        }
        let total: u64 = buckets.values().sum();
        if total == 0 {
            return None;
        }
        let (largest, rows) = buckets
            .into_iter()
            .max_by_key(|&(bucket, count)| (count, std::cmp::Reverse(bucket)))?;
        let share = rows as f64 / total as f64;
        if share <= config.skew_ratio {
            return None;
        }
        Some(
            Finding::new(
                self.name(),
                FindingCategory::HighSkew,
                vec![name.to_string()],
                format!(
                    "shard {largest} of '{name}' holds {:.0}% of sampled rows (key: {})",
                    share * 100.0,
                    spec.key.join(", ")
                ),
            )
            .with_evidence("largest_bucket", largest)
            .with_evidence("bucket_rows", rows)
            .with_evidence("sampled_rows", total)
            .with_evidence("share", format!("{share:.3}")),
        )
    }
}

#[cfg(test)]
#[path = "sharding_test.rs"]
mod tests;
