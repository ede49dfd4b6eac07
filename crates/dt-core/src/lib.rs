//! dt-core - Core library for dt
//!
//! This crate provides the canonical schema model, the vendor type mapper,
//! the relationship graph, model validation, the tabular layout and
//! configuration parsing used across all dt components.

pub mod config;
pub mod dialect;
pub mod error;
pub mod graph;
pub mod model;
pub mod severity;
pub mod tabular;
pub mod type_map;
pub mod types;
pub mod validate;

pub use config::{Config, EmitConfig, IdentifierCase, ReviewConfig};
pub use dialect::Dialect;
pub use error::{CoreError, CoreResult, ModelError, ModelResult};
pub use graph::{GraphEdge, RelationshipGraph};
pub use model::{
    is_default_schema, Column, ColumnPair, Database, JoinEdge, JoinKind, NameCase,
    PartitionKind, PrimaryKey, SchemaShape, ShardingSpec, Table, TableId, DEFAULT_SCHEMA,
};
pub use severity::Severity;
pub use tabular::TabularModel;
pub use type_map::{map_type, map_type_text, TypeMapping};
pub use types::{CanonicalType, Confidence, FloatBitWidth, IntBitWidth};
pub use validate::{validate, ValidationIssue};
