//! Error types for dt-review

use thiserror::Error;

/// Data sampler failures. A failed call never aborts a review; the check
/// that needed it reports the table as unverified instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SamplerError {
    /// R001: no connection or the table is not there
    #[error("[R001] Sampler unavailable: {0}")]
    Unavailable(String),

    /// R002: call exceeded the configured timeout
    #[error("[R002] Sampler call '{call}' timed out after {timeout_ms}ms")]
    Timeout { call: String, timeout_ms: u64 },

    /// R003: the sampling query itself failed
    #[error("[R003] Sampler query failed: {0}")]
    Query(String),
}

/// Result type alias for SamplerError
pub type SamplerResult<T> = Result<T, SamplerError>;

/// Review setup errors
#[derive(Error, Debug)]
pub enum ReviewError {
    /// R010: check filter names a check that does not exist
    #[error("[R010] Unknown check '{name}' (available: {available})")]
    UnknownCheck { name: String, available: String },
}

/// Result type alias for ReviewError
pub type ReviewResult<T> = Result<T, ReviewError>;
