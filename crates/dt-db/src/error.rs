//! Error types for dt-db

use dt_review::SamplerError;
use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table or view not found: {0}")]
    TableNotFound(String),

    /// Mutex poisoned (D004)
    #[error("[D004] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Blocking query task panicked or was cancelled (D005)
    #[error("[D005] Query task failed: {0}")]
    TaskFailed(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants for catalog
        // errors, so missing tables are recognised by message.
        let msg = err.to_string();
        if msg.contains("Table with name")
            || msg.contains("Table or view with name")
            || (msg.contains("Catalog Error") && msg.contains("does not exist"))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}

impl From<DbError> for SamplerError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ExecutionError(_) => SamplerError::Query(err.to_string()),
            DbError::ConnectionError(_)
            | DbError::TableNotFound(_)
            | DbError::MutexPoisoned(_)
            | DbError::TaskFailed(_) => SamplerError::Unavailable(err.to_string()),
        }
    }
}
