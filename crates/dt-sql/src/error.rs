//! Error types for dt-sql

use thiserror::Error;

/// Failures that stop a whole parse or emit run.
///
/// Problems inside a statement are [`crate::ParseDiagnostic`]s, not errors.
#[derive(Error, Debug)]
pub enum SqlError {
    /// Empty or whitespace-only input (S001)
    #[error("[S001] DDL input is empty")]
    EmptyInput,

    /// No grammar for the requested dialect (S002)
    #[error("[S002] No grammar for dialect '{0}'; resolve 'auto' before parsing")]
    UnknownDialect(String),

    /// Emitted TQL could not be read back (S003)
    #[error("[S003] Round trip failed: {0}")]
    RoundTrip(String),
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
