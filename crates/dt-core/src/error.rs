//! Error types for dt-core

use thiserror::Error;

/// Core error type for dt
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: Unknown dialect name
    #[error("[C004] Unknown dialect '{name}' (expected one of: {expected})")]
    UnknownDialect { name: String, expected: String },

    /// C005: IO error with file path context
    #[error("[C005] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C006: IO error
    #[error("[C006] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// C007: YAML parse error
    #[error("[C007] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Schema model invariant violations.
///
/// Returned by the mutation API of [`crate::model::Database`]; callers that
/// build a model from untrusted input turn these into diagnostics and keep
/// going with the offending constraint dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// M001: Table declared twice
    #[error("[M001] Duplicate table '{table}' (already declared in schema '{schema}')")]
    DuplicateTable { table: String, schema: String },

    /// M002: Column declared twice in one table
    #[error("[M002] Duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// M003: Table does not exist
    #[error("[M003] Unknown table '{table}'")]
    UnknownTable { table: String },

    /// M004: Column does not exist in the table it is referenced from
    #[error("[M004] Column '{column}' does not exist in table '{table}' (referenced by {context})")]
    UnknownColumn {
        table: String,
        column: String,
        context: String,
    },

    /// M005: Key has no columns
    #[error("[M005] {context} on table '{table}' has no columns")]
    EmptyKey { table: String, context: String },

    /// M006: FK target columns are not the target table's primary key
    #[error("[M006] Foreign key '{name}' targets ({target_columns}) on '{target}', which is not its primary key ({primary_key})")]
    ForeignKeyNotPrimaryKey {
        name: String,
        target: String,
        target_columns: String,
        primary_key: String,
    },

    /// M007: Join column types are incompatible
    #[error("[M007] {context} '{name}' joins {local} ({local_type}) to {remote} ({remote_type}) with incompatible types")]
    IncompatibleTypes {
        context: String,
        name: String,
        local: String,
        local_type: String,
        remote: String,
        remote_type: String,
    },

    /// M008: Constraint name already used on this table
    #[error("[M008] Duplicate constraint '{name}' on table '{table}'")]
    DuplicateConstraint { table: String, name: String },

    /// M009: Hash partitioning with zero shards
    #[error("[M009] Table '{table}' is partitioned into zero shards")]
    ZeroShards { table: String },
}

/// Result type alias for ModelError
pub type ModelResult<T> = Result<T, ModelError>;
