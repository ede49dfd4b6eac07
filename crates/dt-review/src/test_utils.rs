//! Shared test utilities for dt-review

use crate::error::{SamplerError, SamplerResult};
use crate::sampler::{DataSampler, KeyHistogram};
use async_trait::async_trait;
use dt_core::{CanonicalType, Column, ColumnPair, Database};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// In-memory sampler serving canned statistics
#[derive(Debug, Default)]
pub struct FakeSampler {
    rows: HashMap<String, u64>,
    distinct: HashMap<(String, Vec<String>), u64>,
    histograms: HashMap<String, KeyHistogram>,
    failing: HashSet<String>,
    delay: Option<Duration>,
}

impl FakeSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(mut self, table: &str, rows: u64) -> Self {
        self.rows.insert(table.to_string(), rows);
        self
    }

    pub fn distinct(mut self, table: &str, columns: &[&str], count: u64) -> Self {
        let key = columns.iter().map(|c| c.to_string()).collect();
        self.distinct.insert((table.to_string(), key), count);
        self
    }

    pub fn histogram(mut self, table: &str, buckets: &[(u64, u64)]) -> Self {
        self.histograms
            .insert(table.to_string(), buckets.iter().copied().collect());
        self
    }

    /// Every call touching `table` fails
    pub fn failing(mut self, table: &str) -> Self {
        self.failing.insert(table.to_string());
        self
    }

    /// Every call sleeps this long first
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn enter(&self, table: &str) -> SamplerResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(table) {
            return Err(SamplerError::Unavailable(format!("no data for '{table}'")));
        }
        Ok(())
    }
}

#[async_trait]
impl DataSampler for FakeSampler {
    async fn row_count(&self, table: &str) -> SamplerResult<u64> {
        self.enter(table).await?;
        self.rows
            .get(table)
            .copied()
            .ok_or_else(|| SamplerError::Query(format!("no row count for '{table}'")))
    }

    async fn distinct_key_count(&self, table: &str, columns: &[String]) -> SamplerResult<u64> {
        self.enter(table).await?;
        self.distinct
            .get(&(table.to_string(), columns.to_vec()))
            .copied()
            .ok_or_else(|| SamplerError::Query(format!("no distinct count for '{table}'")))
    }

    async fn key_histogram(&self, table: &str, _columns: &[String]) -> SamplerResult<KeyHistogram> {
        self.enter(table).await?;
        Ok(self.histograms.get(table).cloned().unwrap_or_default())
    }

    fn sampler_name(&self) -> &'static str {
        "fake"
    }
}

/// Add a table of BIGINT columns, with `pk` as its primary key when non-empty
pub fn bigint_table(db: &mut Database, name: &str, columns: &[&str], pk: &[&str]) {
    db.add_table(name).unwrap();
    for column in columns {
        db.add_column(name, Column::new(*column, CanonicalType::WIDE_INTEGER))
            .unwrap();
    }
    if !pk.is_empty() {
        db.set_primary_key(name, pk.iter().map(|c| c.to_string()).collect())
            .unwrap();
    }
}

/// Add a single-column relationship `from.local = to.remote` named `rel_<from>_<to>`
pub fn relate(db: &mut Database, from: &str, local: &str, to: &str, remote: &str) {
    let name = format!("rel_{from}_{to}");
    db.add_relationship(from, &name, to, vec![ColumnPair::new(local, remote)])
        .unwrap();
}
