//! Data sampler boundary
//!
//! The review engine never talks to a database directly. Data checks go
//! through a [`DataSampler`], wrapped in a [`TimedSampler`] so every call
//! is bounded by the configured timeout.

use crate::error::{SamplerError, SamplerResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// Row counts keyed by a hash of the key value
pub type KeyHistogram = HashMap<u64, u64>;

/// Source of live row statistics.
///
/// Implementations must be safe to call concurrently.
#[async_trait]
pub trait DataSampler: Send + Sync {
    /// Total rows in `table`
    async fn row_count(&self, table: &str) -> SamplerResult<u64>;

    /// Distinct values of the (possibly composite) key
    async fn distinct_key_count(&self, table: &str, columns: &[String]) -> SamplerResult<u64>;

    /// Rows per key-value hash
    async fn key_histogram(&self, table: &str, columns: &[String]) -> SamplerResult<KeyHistogram>;

    /// Backend name for logging
    fn sampler_name(&self) -> &'static str;
}

/// A sampler with a per-call timeout
#[derive(Clone, Copy)]
pub struct TimedSampler<'a> {
    inner: &'a dyn DataSampler,
    timeout: Duration,
}

impl<'a> TimedSampler<'a> {
    pub fn new(inner: &'a dyn DataSampler, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub async fn row_count(&self, table: &str) -> SamplerResult<u64> {
        self.bounded(format!("row_count({table})"), self.inner.row_count(table))
            .await
    }

    pub async fn distinct_key_count(&self, table: &str, columns: &[String]) -> SamplerResult<u64> {
        self.bounded(
            format!("distinct_key_count({table}, {})", columns.join(", ")),
            self.inner.distinct_key_count(table, columns),
        )
        .await
    }

    pub async fn key_histogram(
        &self,
        table: &str,
        columns: &[String],
    ) -> SamplerResult<KeyHistogram> {
        self.bounded(
            format!("key_histogram({table}, {})", columns.join(", ")),
            self.inner.key_histogram(table, columns),
        )
        .await
    }

    async fn bounded<T, F>(&self, call: String, fut: F) -> SamplerResult<T>
    where
        F: Future<Output = SamplerResult<T>>,
    {
        let result = match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(SamplerError::Timeout {
                call: call.clone(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        };
        match &result {
            Ok(_) => log::debug!("{} {call} ok", self.inner.sampler_name()),
            Err(e) => log::warn!("{} {call} failed: {e}", self.inner.sampler_name()),
        }
        result
    }
}

#[cfg(test)]
#[path = "sampler_test.rs"]
mod tests;
