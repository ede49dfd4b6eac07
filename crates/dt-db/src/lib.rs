//! dt-db - Data sampling backends for dt
//!
//! This crate provides a DuckDB-backed implementation of the review
//! engine's `DataSampler`.

pub mod duckdb;
pub mod error;

pub use duckdb::DuckDbSampler;
pub use error::{DbError, DbResult};
