//! Source dialect identification

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// DDL dialects the parsers and type mapper understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Detect from the DDL text
    #[default]
    Auto,
    /// ANSI-ish SQL with no vendor extensions
    Generic,
    /// PostgreSQL / pg_dump output
    Postgres,
    /// MySQL / MariaDB / mysqldump output
    MySql,
    /// Microsoft SQL Server (T-SQL)
    SqlServer,
    /// Oracle
    Oracle,
    /// ThoughtSpot TQL, the emit target
    Tql,
}

impl Dialect {
    /// Every concrete (non-auto) dialect
    pub const ALL: [Dialect; 6] = [
        Dialect::Generic,
        Dialect::Postgres,
        Dialect::MySql,
        Dialect::SqlServer,
        Dialect::Oracle,
        Dialect::Tql,
    ];

    /// Parse a dialect from its CLI/config name
    pub fn from_name(name: &str) -> CoreResult<Self> {
        match name.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "generic" | "ansi" => Ok(Self::Generic),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlserver" | "mssql" | "tsql" => Ok(Self::SqlServer),
            "oracle" => Ok(Self::Oracle),
            "tql" | "thoughtspot" => Ok(Self::Tql),
            _ => Err(CoreError::UnknownDialect {
                name: name.to_string(),
                expected: "auto, generic, postgres, mysql, sqlserver, oracle, tql".to_string(),
            }),
        }
    }

    /// Dialect name used in diagnostics and config
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Auto => "auto",
            Dialect::Generic => "generic",
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::SqlServer => "sqlserver",
            Dialect::Oracle => "oracle",
            Dialect::Tql => "tql",
        }
    }

    /// Detect a dialect from DDL content.
    ///
    /// Header comments written by dump tools win; otherwise the first
    /// vendor-only construct found decides. Falls back to `Generic`.
    pub fn detect(content: &str) -> Self {
        let lower = content.to_lowercase();

        if lower.contains("postgresql database dump") || lower.contains("pg_dump") {
            return Self::Postgres;
        }
        if lower.contains("mysql dump") || lower.contains("mysqldump") {
            return Self::MySql;
        }

        if lower.contains("add relationship") || lower.contains("partition by hash") {
            return Self::Tql;
        }
        if lower.contains("serial")
            || lower.contains("timestamptz")
            || lower.contains("::")
            || lower.contains("alter table only")
        {
            return Self::Postgres;
        }
        if lower.contains("auto_increment") || lower.contains("engine=") || lower.contains('`') {
            return Self::MySql;
        }
        if lower.contains("nvarchar")
            || lower.contains("identity(")
            || lower.contains("\ngo\n")
            || lower.contains("[dbo]")
        {
            return Self::SqlServer;
        }
        if lower.contains("varchar2") || lower.contains("number(") || lower.contains("tablespace")
        {
            return Self::Oracle;
        }

        Self::Generic
    }

    /// Resolve `Auto` to a concrete dialect
    pub fn resolve(self, content: &str) -> Self {
        match self {
            Self::Auto => Self::detect(content),
            other => other,
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
