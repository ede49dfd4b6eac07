//! dt-sql - DDL layer for dt
//!
//! This crate reads vendor DDL (PostgreSQL, MySQL, SQL Server, Oracle,
//! generic ANSI and TQL itself) into the canonical model through
//! per-dialect grammar tables, and writes the model back out as TQL.

pub mod diagnostic;
pub mod emit;
pub mod error;
pub mod grammar;
pub mod parser;
pub mod splitter;
mod tokens;

pub use diagnostic::{DiagnosticCode, ParseDiagnostic};
pub use emit::{
    quote_ident, round_trip_differences, tql_type, verify_round_trip, EmitOptions, Emitted,
    TqlEmitter,
};
pub use error::{SqlError, SqlResult};
pub use grammar::{grammar_for, DialectGrammar, GrammarCaps};
pub use parser::{parse, ParseOptions, ParseOutcome};
pub use splitter::{split_statements, RawStatement, SplitRules};
pub use tokens::{IdentCase, Malformed};
