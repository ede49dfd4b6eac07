//! Parse and emit diagnostics

use dt_core::Severity;
use serde::{Deserialize, Serialize};

/// Diagnostic codes produced while reading DDL or writing TQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// P001: statement kind not modeled, skipped
    StatementSkipped,
    /// P002: vendor table options dropped
    TableOptionsDropped,
    /// P003: clause inside a statement ignored (UNIQUE, CHECK, INDEX, ...)
    ClauseIgnored,
    /// P004: ambiguous type resolved to a wide default
    AmbiguousType,
    /// P005: type not recognised, column is UNKNOWN
    UnresolvedType,
    /// P006: statement could not be parsed
    MalformedStatement,
    /// P007: statement could not be tokenized
    TokenizeFailed,
    /// P008: constraint or table violates a model invariant and was dropped
    ConstraintDropped,
    /// P009: foreign key does not target a primary key, kept as a relationship
    ForeignKeyDemoted,
    /// E001: UNKNOWN column emitted with the fallback type
    UnknownTypeEmitted,
    /// E002: type has no exact TQL equivalent and was widened
    TypeWidened,
    /// E003: table without columns left out of the output
    EmptyTableSkipped,
}

impl DiagnosticCode {
    /// Short code, e.g. "P001"
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticCode::StatementSkipped => "P001",
            DiagnosticCode::TableOptionsDropped => "P002",
            DiagnosticCode::ClauseIgnored => "P003",
            DiagnosticCode::AmbiguousType => "P004",
            DiagnosticCode::UnresolvedType => "P005",
            DiagnosticCode::MalformedStatement => "P006",
            DiagnosticCode::TokenizeFailed => "P007",
            DiagnosticCode::ConstraintDropped => "P008",
            DiagnosticCode::ForeignKeyDemoted => "P009",
            DiagnosticCode::UnknownTypeEmitted => "E001",
            DiagnosticCode::TypeWidened => "E002",
            DiagnosticCode::EmptyTableSkipped => "E003",
        }
    }

    /// Severity every diagnostic with this code carries
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticCode::StatementSkipped
            | DiagnosticCode::TableOptionsDropped
            | DiagnosticCode::ClauseIgnored
            | DiagnosticCode::TypeWidened => Severity::Info,
            DiagnosticCode::AmbiguousType
            | DiagnosticCode::UnresolvedType
            | DiagnosticCode::ForeignKeyDemoted
            | DiagnosticCode::UnknownTypeEmitted
            | DiagnosticCode::EmptyTableSkipped => Severity::Warning,
            DiagnosticCode::MalformedStatement
            | DiagnosticCode::TokenizeFailed
            | DiagnosticCode::ConstraintDropped => Severity::Error,
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A diagnostic with enough context to act on without re-parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// 1-based source line, when known
    pub line: Option<usize>,
    pub table: Option<String>,
    pub column: Option<String>,
}

impl ParseDiagnostic {
    /// Create a diagnostic with the code's default severity
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            message: message.into(),
            line: None,
            table: None,
            column: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn on_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn on_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

impl std::fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.severity)?;
        if let Some(line) = self.line {
            write!(f, " (line {line})")?;
        }
        write!(f, ": {}", self.message)
    }
}
