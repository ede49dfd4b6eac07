//! Check infrastructure: structural and data checks and the manager that runs them

pub mod circular;
pub mod long_chain;
pub mod many_to_many;
pub mod primary_keys;
pub mod promotion;
pub mod sharding;

use crate::context::ReviewContext;
use crate::error::{ReviewError, ReviewResult};
use crate::finding::{Finding, ReviewReport};
use crate::sampler::{DataSampler, TimedSampler};
use async_trait::async_trait;
use futures::future::join_all;

/// Check over the model and graph alone
pub trait StructuralCheck: Send + Sync {
    /// Check name (used for filtering and display)
    fn name(&self) -> &'static str;
    /// Human-readable description
    fn description(&self) -> &'static str;
    /// Run the check
    fn run(&self, ctx: &ReviewContext<'_>) -> Vec<Finding>;
}

/// Check that needs live row statistics
#[async_trait]
pub trait DataCheck: Send + Sync {
    /// Check name
    fn name(&self) -> &'static str;
    /// Human-readable description
    fn description(&self) -> &'static str;
    /// Run the check; sampler failures become `sampler-unavailable` findings
    async fn run(&self, ctx: &ReviewContext<'_>, sampler: &TimedSampler<'_>) -> Vec<Finding>;
}

/// Manages and runs review checks
pub struct CheckManager {
    structural: Vec<Box<dyn StructuralCheck>>,
    data: Vec<Box<dyn DataCheck>>,
}

impl CheckManager {
    /// Create a CheckManager with all built-in checks registered
    pub fn with_defaults() -> Self {
        Self {
            structural: vec![
                Box::new(primary_keys::PrimaryKeyPresence),
                Box::new(circular::CircularRelationships),
                Box::new(long_chain::LongChains),
                Box::new(promotion::RelationshipPromotion),
            ],
            data: vec![
                Box::new(many_to_many::ManyToMany),
                Box::new(sharding::ShardingReview),
            ],
        }
    }

    /// List all available check names, in registration order
    pub fn check_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.structural.iter().map(|c| c.name()).collect();
        names.extend(self.data.iter().map(|c| c.name()));
        names
    }

    /// Name and description of every check
    pub fn describe(&self) -> Vec<(&'static str, &'static str)> {
        let mut out: Vec<_> = self
            .structural
            .iter()
            .map(|c| (c.name(), c.description()))
            .collect();
        out.extend(self.data.iter().map(|c| (c.name(), c.description())));
        out
    }

    /// Reject filter entries that name no registered check
    pub fn validate_filter(&self, filter: &[String]) -> ReviewResult<()> {
        let names = self.check_names();
        match filter.iter().find(|f| !names.contains(&f.as_str())) {
            Some(unknown) => Err(ReviewError::UnknownCheck {
                name: unknown.clone(),
                available: names.join(", "),
            }),
            None => Ok(()),
        }
    }

    /// Run the selected checks and collect an ordered report.
    ///
    /// Structural checks run first, in order. Data checks then run
    /// concurrently and only when a sampler is given.
    pub async fn run(
        &self,
        ctx: &ReviewContext<'_>,
        sampler: Option<&dyn DataSampler>,
        check_filter: Option<&[String]>,
    ) -> ReviewReport {
        let selected = |name: &str| match check_filter {
            Some(filter) => filter.iter().any(|f| f == name),
            None => true,
        };
        let mut ran = Vec::new();
        let mut results: Vec<(usize, Vec<Finding>)> = Vec::new();

        for (order, check) in self.structural.iter().enumerate() {
            if !selected(check.name()) {
                continue;
            }
            let findings = check.run(ctx);
            log::info!("{}: {} findings", check.name(), findings.len());
            ran.push(check.name().to_string());
            results.push((order, findings));
        }

        let offset = self.structural.len();
        match sampler {
            Some(sampler) => {
                let timed = TimedSampler::new(sampler, ctx.config().sampler_timeout());
                let timed = &timed;
                let pending = self
                    .data
                    .iter()
                    .enumerate()
                    .filter(|(_, check)| selected(check.name()))
                    .map(|(i, check)| async move {
                        let findings = check.run(ctx, timed).await;
                        log::info!("{}: {} findings", check.name(), findings.len());
                        (offset + i, check.name(), findings)
                    });
                for (order, name, findings) in join_all(pending).await {
                    ran.push(name.to_string());
                    results.push((order, findings));
                }
            }
            None => {
                for check in self.data.iter().filter(|c| selected(c.name())) {
                    log::info!("{}: skipped, no data sampler", check.name());
                }
            }
        }

        let mut ordered: Vec<(usize, Finding)> = results
            .into_iter()
            .flat_map(|(order, findings)| findings.into_iter().map(move |f| (order, f)))
            .collect();
        ordered.sort_by(|(a_order, a), (b_order, b)| {
            a_order
                .cmp(b_order)
                .then_with(|| a.primary_table().cmp(b.primary_table()))
        });

        ReviewReport {
            findings: ordered.into_iter().map(|(_, f)| f).collect(),
            checks: ran,
        }
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
