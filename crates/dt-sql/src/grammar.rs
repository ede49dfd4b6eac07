//! Per-dialect grammar tables
//!
//! A dialect is a list of statement rules plus the lexical and structural
//! capabilities its DDL uses. The parser walks the rules in order and hands
//! the statement to the first whose keywords match.

use crate::error::{SqlError, SqlResult};
use crate::parser::{alter_table, create_database, create_schema, create_table, ParseState};
use crate::splitter::SplitRules;
use crate::tokens::{Cursor, IdentCase, Step, TokenizerKind};
use dt_core::{Dialect, DEFAULT_SCHEMA};

pub(crate) type Handler = fn(&mut ParseState, &mut Cursor) -> Step<()>;

/// One statement form, recognised by its leading keywords
pub(crate) struct GrammarRule {
    pub(crate) keywords: &'static [&'static str],
    pub(crate) handler: Handler,
}

/// Words allowed between the leading keywords, e.g. `CREATE OR REPLACE TABLE`
pub(crate) const MODIFIERS: &[&str] = &[
    "OR",
    "REPLACE",
    "TEMP",
    "TEMPORARY",
    "GLOBAL",
    "LOCAL",
    "UNLOGGED",
    "EXTERNAL",
    "TRANSIENT",
];

/// What a dialect's DDL can contain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrammarCaps {
    /// `ALTER TABLE .. ADD RELATIONSHIP`
    pub relationships: bool,
    /// `PARTITION BY HASH (n) KEY (..)`
    pub partitioning: bool,
    /// `KEY`/`INDEX` entries inside `CREATE TABLE`
    pub inline_indexes: bool,
    /// The qualifier in `x.table` names a schema rather than a database
    pub schema_qualifiers: bool,
    pub go_batches: bool,
    pub bracket_identifiers: bool,
    pub dollar_quotes: bool,
    pub hash_comments: bool,
    pub backslash_escapes: bool,
}

impl GrammarCaps {
    pub(crate) fn split_rules(&self) -> SplitRules {
        SplitRules {
            go_batches: self.go_batches,
            bracket_identifiers: self.bracket_identifiers,
            dollar_quotes: self.dollar_quotes,
            hash_comments: self.hash_comments,
            backslash_escapes: self.backslash_escapes,
        }
    }
}

/// Grammar for one dialect
pub struct DialectGrammar {
    pub dialect: Dialect,
    pub caps: GrammarCaps,
    /// Folding applied to unquoted identifiers
    pub ident_case: IdentCase,
    /// Schema that unqualified names resolve to in this dialect; tables
    /// qualified with it land in the configured schema
    pub default_schema: Option<&'static str>,
    pub(crate) tokenizer: TokenizerKind,
    pub(crate) rules: &'static [GrammarRule],
}

const CREATE_TABLE: GrammarRule = GrammarRule {
    keywords: &["CREATE", "TABLE"],
    handler: create_table,
};

const CREATE_DATABASE: GrammarRule = GrammarRule {
    keywords: &["CREATE", "DATABASE"],
    handler: create_database,
};

const CREATE_SCHEMA: GrammarRule = GrammarRule {
    keywords: &["CREATE", "SCHEMA"],
    handler: create_schema,
};

const ALTER_TABLE: GrammarRule = GrammarRule {
    keywords: &["ALTER", "TABLE"],
    handler: alter_table,
};

const ANSI_RULES: &[GrammarRule] = &[CREATE_TABLE, CREATE_DATABASE, CREATE_SCHEMA, ALTER_TABLE];

// SCHEMA is a synonym for DATABASE in MySQL
const MYSQL_RULES: &[GrammarRule] = &[
    CREATE_TABLE,
    CREATE_DATABASE,
    GrammarRule {
        keywords: &["CREATE", "SCHEMA"],
        handler: create_database,
    },
    ALTER_TABLE,
];

// CREATE DATABASE in Oracle creates an instance, not a namespace
const ORACLE_RULES: &[GrammarRule] = &[CREATE_TABLE, ALTER_TABLE];

static GENERIC: DialectGrammar = DialectGrammar {
    dialect: Dialect::Generic,
    caps: GrammarCaps {
        relationships: false,
        partitioning: false,
        schema_qualifiers: true,
        inline_indexes: false,
        go_batches: false,
        bracket_identifiers: false,
        dollar_quotes: false,
        hash_comments: false,
        backslash_escapes: false,
    },
    ident_case: IdentCase::Preserve,
    default_schema: None,
    tokenizer: TokenizerKind::Generic,
    rules: ANSI_RULES,
};

static POSTGRES: DialectGrammar = DialectGrammar {
    dialect: Dialect::Postgres,
    caps: GrammarCaps {
        relationships: false,
        partitioning: false,
        schema_qualifiers: true,
        inline_indexes: false,
        go_batches: false,
        bracket_identifiers: false,
        dollar_quotes: true,
        hash_comments: false,
        backslash_escapes: false,
    },
    ident_case: IdentCase::Lower,
    default_schema: Some("public"),
    tokenizer: TokenizerKind::Postgres,
    rules: ANSI_RULES,
};

static MYSQL: DialectGrammar = DialectGrammar {
    dialect: Dialect::MySql,
    caps: GrammarCaps {
        relationships: false,
        partitioning: false,
        schema_qualifiers: false,
        inline_indexes: true,
        go_batches: false,
        bracket_identifiers: false,
        dollar_quotes: false,
        hash_comments: true,
        backslash_escapes: true,
    },
    ident_case: IdentCase::Preserve,
    default_schema: None,
    tokenizer: TokenizerKind::MySql,
    rules: MYSQL_RULES,
};

static SQLSERVER: DialectGrammar = DialectGrammar {
    dialect: Dialect::SqlServer,
    caps: GrammarCaps {
        relationships: false,
        partitioning: false,
        schema_qualifiers: true,
        inline_indexes: false,
        go_batches: true,
        bracket_identifiers: true,
        dollar_quotes: false,
        hash_comments: false,
        backslash_escapes: false,
    },
    ident_case: IdentCase::Preserve,
    default_schema: Some("dbo"),
    tokenizer: TokenizerKind::MsSql,
    rules: ANSI_RULES,
};

static ORACLE: DialectGrammar = DialectGrammar {
    dialect: Dialect::Oracle,
    caps: GrammarCaps {
        relationships: false,
        partitioning: false,
        schema_qualifiers: true,
        inline_indexes: false,
        go_batches: false,
        bracket_identifiers: false,
        dollar_quotes: false,
        hash_comments: false,
        backslash_escapes: false,
    },
    ident_case: IdentCase::Upper,
    default_schema: None,
    tokenizer: TokenizerKind::Generic,
    rules: ORACLE_RULES,
};

static TQL: DialectGrammar = DialectGrammar {
    dialect: Dialect::Tql,
    caps: GrammarCaps {
        relationships: true,
        partitioning: true,
        schema_qualifiers: true,
        inline_indexes: false,
        go_batches: false,
        bracket_identifiers: false,
        dollar_quotes: false,
        hash_comments: false,
        backslash_escapes: false,
    },
    ident_case: IdentCase::Preserve,
    default_schema: Some(DEFAULT_SCHEMA),
    tokenizer: TokenizerKind::Generic,
    rules: ANSI_RULES,
};

/// Grammar table for a concrete dialect.
///
/// `Auto` has no grammar; resolve it against the input first.
pub fn grammar_for(dialect: Dialect) -> SqlResult<&'static DialectGrammar> {
    match dialect {
        Dialect::Generic => Ok(&GENERIC),
        Dialect::Postgres => Ok(&POSTGRES),
        Dialect::MySql => Ok(&MYSQL),
        Dialect::SqlServer => Ok(&SQLSERVER),
        Dialect::Oracle => Ok(&ORACLE),
        Dialect::Tql => Ok(&TQL),
        Dialect::Auto => Err(SqlError::UnknownDialect(dialect.to_string())),
    }
}

impl DialectGrammar {
    /// Find the rule whose keywords open the statement and consume them
    pub(crate) fn match_rule(&self, cursor: &mut Cursor) -> Option<&'static GrammarRule> {
        let start = cursor.mark();
        for rule in self.rules {
            if match_keywords(cursor, rule.keywords) {
                return Some(rule);
            }
            cursor.reset(start);
        }
        None
    }
}

fn match_keywords(cursor: &mut Cursor, keywords: &[&str]) -> bool {
    for (i, keyword) in keywords.iter().enumerate() {
        if i > 0 {
            while cursor.peek_any_keyword(MODIFIERS) {
                cursor.advance();
            }
        }
        if !cursor.eat_keyword(keyword) {
            return false;
        }
    }
    true
}

#[cfg(test)]
#[path = "grammar_test.rs"]
mod tests;
