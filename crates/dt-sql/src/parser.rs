//! DDL to canonical model
//!
//! Statements are read one at a time; a statement that cannot be read is
//! reported and dropped, never fatal. Foreign keys and relationships are
//! collected while reading and attached once every table exists, so forward
//! references and self references work.

use crate::diagnostic::{DiagnosticCode, ParseDiagnostic};
use crate::error::{SqlError, SqlResult};
use crate::grammar::{grammar_for, DialectGrammar};
use crate::splitter::{split_statements, RawStatement};
use crate::tokens::{Cursor, Malformed, Step};
use dt_core::tabular::orient_pair;
use dt_core::{
    map_type, Column, ColumnPair, Config, Confidence, Database, Dialect, JoinEdge, JoinKind,
    ModelError, NameCase, Severity, ShardingSpec, DEFAULT_SCHEMA,
};
use sqlparser::tokenizer::Token;

/// Settings for one parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Database name used when the DDL has no `CREATE DATABASE`
    pub database_name: String,
    /// Schema for tables whose names carry no schema qualifier
    pub schema_name: String,
    pub case: NameCase,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            database_name: "main".to_string(),
            schema_name: DEFAULT_SCHEMA.to_string(),
            case: NameCase::Insensitive,
        }
    }
}

impl ParseOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            database_name: config.database.clone(),
            schema_name: config.schema.clone(),
            case: config.name_case(),
        }
    }
}

/// Model built from DDL plus everything noticed on the way
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub database: Database,
    pub diagnostics: Vec<ParseDiagnostic>,
    /// Dialect the text was read as (resolved when `auto` was requested)
    pub dialect: Dialect,
}

impl ParseOutcome {
    /// Whether any statement or constraint was dropped
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Parse DDL text into a canonical model.
///
/// Only empty input is an error; everything else is reported through
/// diagnostics on the outcome.
pub fn parse(dialect: Dialect, text: &str, options: &ParseOptions) -> SqlResult<ParseOutcome> {
    if text.trim().is_empty() {
        return Err(SqlError::EmptyInput);
    }
    let dialect = dialect.resolve(text);
    let grammar = grammar_for(dialect)?;
    log::info!("Parsing DDL as {dialect}");

    let statements = split_statements(text, grammar.caps.split_rules());
    log::debug!("Split input into {} statements", statements.len());

    let mut state = ParseState::new(grammar, options);
    for statement in &statements {
        state.statement(statement);
    }
    state.resolve_joins();

    log::info!(
        "Read {} tables with {} diagnostics",
        state.db.len(),
        state.diagnostics.len()
    );
    Ok(ParseOutcome {
        database: state.db,
        diagnostics: state.diagnostics,
        dialect,
    })
}

/// A foreign key or relationship waiting for every table to exist
#[derive(Debug, Clone)]
struct PendingJoin {
    table: String,
    name: Option<String>,
    target: String,
    local: Vec<String>,
    /// `None` means the target's primary key
    remote: Option<Vec<String>>,
    kind: JoinKind,
    line: Option<usize>,
}

#[derive(Debug, Clone)]
struct PartitionClause {
    shard_count: u32,
    /// `None` means the table's primary key
    key: Option<Vec<String>>,
    line: Option<usize>,
}

/// A `CREATE TABLE` read in full before anything touches the model
struct TableDraft {
    schema: String,
    name: String,
    columns: Vec<(Column, Option<usize>)>,
    primary_key: Option<(Vec<String>, Option<usize>)>,
    partition: Option<PartitionClause>,
    joins: Vec<PendingJoin>,
}

struct ColumnDef {
    column: Column,
    primary_key: bool,
    references: Option<PendingJoin>,
}

struct TypeSpec {
    /// Name handed to the type mapper, e.g. `INT UNSIGNED` or `TEXT[]`
    base: String,
    /// Type as written, e.g. `NUMBER(10, 2)`
    raw: String,
    precision: Option<u32>,
    scale: Option<u32>,
}

enum Constraint {
    PrimaryKey(Vec<String>),
    ForeignKey(PendingJoin),
    /// Kept out of the model; holds the keyword that opened it
    Ignored(String),
}

/// Mutable state shared by the statement handlers
pub(crate) struct ParseState {
    grammar: &'static DialectGrammar,
    db: Database,
    diagnostics: Vec<ParseDiagnostic>,
    pending: Vec<PendingJoin>,
    database_named: bool,
    /// Schema for unqualified table names
    schema: String,
    /// First line of the statement being read
    line: usize,
}

impl ParseState {
    fn new(grammar: &'static DialectGrammar, options: &ParseOptions) -> Self {
        Self {
            grammar,
            db: Database::with_case(&options.database_name, options.case),
            diagnostics: Vec::new(),
            pending: Vec::new(),
            database_named: false,
            schema: options.schema_name.clone(),
            line: 1,
        }
    }

    fn report(&mut self, diagnostic: ParseDiagnostic) {
        match diagnostic.severity {
            Severity::Error => log::warn!("{diagnostic}"),
            _ => log::debug!("{diagnostic}"),
        }
        self.diagnostics.push(diagnostic);
    }

    fn report_at(
        &mut self,
        code: DiagnosticCode,
        line: Option<usize>,
        table: &str,
        message: impl Into<String>,
    ) {
        let line = line.unwrap_or(self.line);
        self.report(
            ParseDiagnostic::new(code, message)
                .at_line(line)
                .on_table(table),
        );
    }

    fn statement(&mut self, statement: &RawStatement) {
        log::debug!("Reading statement at line {}", statement.line);
        self.line = statement.line;

        let tokens = match self
            .grammar
            .tokenizer
            .tokenize(&statement.text, statement.line)
        {
            Ok(tokens) => tokens,
            Err(message) => {
                self.report(
                    ParseDiagnostic::new(DiagnosticCode::TokenizeFailed, message)
                        .at_line(statement.line),
                );
                return;
            }
        };

        let mut cursor = Cursor::new(tokens, self.grammar.ident_case);
        let Some(rule) = self.grammar.match_rule(&mut cursor) else {
            let preview = cursor.preview(3);
            self.report(
                ParseDiagnostic::new(
                    DiagnosticCode::StatementSkipped,
                    format!("'{preview} ...' is not modeled, skipped"),
                )
                .at_line(statement.line),
            );
            return;
        };

        if let Err(Malformed(message)) = (rule.handler)(self, &mut cursor) {
            let line = cursor.line().unwrap_or(statement.line);
            self.report(
                ParseDiagnostic::new(
                    DiagnosticCode::MalformedStatement,
                    format!("{message}; statement dropped"),
                )
                .at_line(line),
            );
        }
    }

    /// Schema a table lands in. The dialect's own default schema, and
    /// qualifiers in dialects where they name a database, both mean the
    /// configured schema.
    fn table_schema(&self, qualifier: Option<String>) -> String {
        match qualifier {
            Some(q)
                if self.grammar.caps.schema_qualifiers
                    && !self
                        .grammar
                        .default_schema
                        .is_some_and(|d| q.eq_ignore_ascii_case(d)) =>
            {
                q
            }
            _ => self.schema.clone(),
        }
    }

    fn commit_table(&mut self, draft: TableDraft) {
        let name = draft.name;
        if let Err(e) = self.db.add_table_in(&draft.schema, &name) {
            self.report_at(DiagnosticCode::ConstraintDropped, None, &name, e.to_string());
            return;
        }
        for (column, line) in draft.columns {
            let column_name = column.name.clone();
            if let Err(e) = self.db.add_column(&name, column) {
                self.report(
                    ParseDiagnostic::new(DiagnosticCode::ConstraintDropped, e.to_string())
                        .at_line(line.unwrap_or(self.line))
                        .on_table(&name)
                        .on_column(column_name),
                );
            }
        }
        if let Some((columns, line)) = draft.primary_key {
            self.set_primary_key(&name, columns, line);
        }
        if let Some(partition) = draft.partition {
            self.set_partition(&name, partition);
        }
        self.pending.extend(draft.joins);
        log::debug!("Read table {name}");
    }

    /// The first primary key declared for a table wins
    fn set_primary_key(&mut self, table: &str, columns: Vec<String>, line: Option<usize>) {
        let existing = self
            .db
            .table(table)
            .filter(|t| t.has_primary_key())
            .map(|t| t.primary_key_columns().join(", "));
        if let Some(existing) = existing {
            log::warn!("Dropping second primary key on {table}");
            self.report_at(
                DiagnosticCode::ConstraintDropped,
                line,
                table,
                format!(
                    "table '{table}' already has primary key ({existing}); \
                     PRIMARY KEY ({}) dropped",
                    columns.join(", ")
                ),
            );
            return;
        }
        if let Err(e) = self.db.set_primary_key(table, columns) {
            self.report_at(DiagnosticCode::ConstraintDropped, line, table, e.to_string());
        }
    }

    fn set_partition(&mut self, table: &str, partition: PartitionClause) {
        let key = match partition.key {
            Some(key) => key,
            None => self
                .db
                .table(table)
                .map(|t| t.primary_key_columns().to_vec())
                .unwrap_or_default(),
        };
        let spec = ShardingSpec::hash(partition.shard_count, key);
        if let Err(e) = self.db.set_sharding(table, spec) {
            self.report_at(
                DiagnosticCode::ConstraintDropped,
                partition.line,
                table,
                e.to_string(),
            );
        }
    }

    fn add_column_def(&mut self, table: &str, def: ColumnDef, line: Option<usize>) {
        let column_name = def.column.name.clone();
        if let Err(e) = self.db.add_column(table, def.column) {
            self.report(
                ParseDiagnostic::new(DiagnosticCode::ConstraintDropped, e.to_string())
                    .at_line(line.unwrap_or(self.line))
                    .on_table(table)
                    .on_column(column_name),
            );
            return;
        }
        if def.primary_key {
            self.set_primary_key(table, vec![column_name], line);
        }
        if let Some(join) = def.references {
            self.pending.push(join);
        }
    }

    /// Attach every collected join, demoting foreign keys that do not
    /// target a primary key to relationships
    fn resolve_joins(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        log::info!("Resolving {} foreign keys and relationships", pending.len());
        for join in pending {
            self.resolve_join(join);
        }
    }

    fn resolve_join(&mut self, join: PendingJoin) {
        let Some(table) = self.db.table(&join.table).map(|t| t.name().to_string()) else {
            self.report_at(
                DiagnosticCode::ConstraintDropped,
                join.line,
                &join.table,
                format!("{} on unknown table '{}' dropped", join.kind, join.table),
            );
            return;
        };
        let Some(target) = self.db.table(&join.target) else {
            self.report_at(
                DiagnosticCode::ConstraintDropped,
                join.line,
                &table,
                format!(
                    "{} from '{table}' references unknown table '{}', dropped",
                    join.kind, join.target
                ),
            );
            return;
        };
        let target_name = target.name().to_string();
        let remote = match join.remote {
            Some(remote) => remote,
            None if target.has_primary_key() => target.primary_key_columns().to_vec(),
            None => {
                self.report_at(
                    DiagnosticCode::ConstraintDropped,
                    join.line,
                    &table,
                    format!(
                        "{} from '{table}' references '{target_name}', which has no primary key; dropped",
                        join.kind
                    ),
                );
                return;
            }
        };
        if remote.len() != join.local.len() {
            self.report_at(
                DiagnosticCode::ConstraintDropped,
                join.line,
                &table,
                format!(
                    "{} from '{table}' to '{target_name}' pairs {} columns with {}; dropped",
                    join.kind,
                    join.local.len(),
                    remote.len()
                ),
            );
            return;
        }

        let pairs: Vec<ColumnPair> = join
            .local
            .iter()
            .zip(&remote)
            .map(|(l, r)| ColumnPair::new(l, r))
            .collect();
        let name = join
            .name
            .clone()
            .unwrap_or_else(|| self.db.unique_join_name(&table, join.kind, &target_name));
        let edge = JoinEdge {
            name,
            target: target_name.clone(),
            kind: join.kind,
            pairs,
        };

        match self.db.add_join(&table, edge.clone()) {
            Ok(()) => {}
            Err(ModelError::ForeignKeyNotPrimaryKey { .. }) => {
                let name = match join.name {
                    Some(_) => edge.name,
                    None => {
                        self.db
                            .unique_join_name(&table, JoinKind::Relationship, &target_name)
                    }
                };
                let demoted = JoinEdge {
                    name: name.clone(),
                    kind: JoinKind::Relationship,
                    ..edge
                };
                match self.db.add_join(&table, demoted) {
                    Ok(()) => self.report_at(
                        DiagnosticCode::ForeignKeyDemoted,
                        join.line,
                        &table,
                        format!(
                            "foreign key '{name}' does not target the primary key of '{target_name}'; kept as a relationship"
                        ),
                    ),
                    Err(e) => self.report_at(
                        DiagnosticCode::ConstraintDropped,
                        join.line,
                        &table,
                        e.to_string(),
                    ),
                }
            }
            Err(e) => self.report_at(
                DiagnosticCode::ConstraintDropped,
                join.line,
                &table,
                e.to_string(),
            ),
        }
    }
}

/// `CREATE [modifiers] TABLE [IF NOT EXISTS] name (elements) [options]`
pub(crate) fn create_table(state: &mut ParseState, cursor: &mut Cursor) -> Step<()> {
    cursor.eat_keywords(&["IF", "NOT", "EXISTS"]);
    let (qualifier, name) = cursor.parse_qualified_name()?;
    if !cursor.eat_token(&Token::LParen) {
        let line = cursor.line();
        state.report_at(
            DiagnosticCode::StatementSkipped,
            line,
            &name,
            format!("CREATE TABLE {name} has no column list, skipped"),
        );
        return Ok(());
    }

    let mut draft = TableDraft {
        schema: state.table_schema(qualifier),
        name,
        columns: Vec::new(),
        primary_key: None,
        partition: None,
        joins: Vec::new(),
    };
    let mut inline_key = Vec::new();

    loop {
        let line = cursor.line();
        if starts_table_constraint(state.grammar, cursor) {
            table_constraint(state, cursor, &mut draft)?;
        } else {
            let def = column_def(state, cursor, &draft.name)?;
            if def.primary_key {
                inline_key.push(def.column.name.clone());
            }
            if let Some(join) = def.references {
                draft.joins.push(join);
            }
            draft.columns.push((def.column, line));
        }
        if cursor.eat_token(&Token::Comma) {
            continue;
        }
        cursor.expect_token(&Token::RParen)?;
        break;
    }

    if !inline_key.is_empty() {
        draft_primary_key(state, &mut draft, inline_key, None);
    }

    if state.grammar.caps.partitioning && cursor.peek_keyword("PARTITION") {
        draft.partition = Some(partition_clause(cursor)?);
    }
    if !cursor.is_at_end() {
        let line = cursor.line();
        let preview = cursor.preview(4);
        state.report_at(
            DiagnosticCode::TableOptionsDropped,
            line,
            &draft.name,
            format!("table options '{preview} ...' dropped"),
        );
    }

    state.commit_table(draft);
    Ok(())
}

/// `CREATE DATABASE [IF NOT EXISTS] name [options]`
pub(crate) fn create_database(state: &mut ParseState, cursor: &mut Cursor) -> Step<()> {
    cursor.eat_keywords(&["IF", "NOT", "EXISTS"]);
    let name = cursor.parse_object_name()?;
    let line = Some(state.line);
    if state.database_named {
        let current = state.db.name().to_string();
        state.report_at(
            DiagnosticCode::StatementSkipped,
            line,
            &name,
            format!("second CREATE DATABASE '{name}' ignored, keeping '{current}'"),
        );
        return Ok(());
    }
    state.db.set_name(&name);
    state.database_named = true;
    if !cursor.is_at_end() {
        state.report_at(
            DiagnosticCode::TableOptionsDropped,
            line,
            &name,
            format!("database options '{} ...' dropped", cursor.preview(4)),
        );
    }
    Ok(())
}

/// `CREATE SCHEMA [IF NOT EXISTS] name [AUTHORIZATION ..]`
///
/// Schemas come into the model with their tables, so the statement itself
/// only gets logged.
pub(crate) fn create_schema(state: &mut ParseState, cursor: &mut Cursor) -> Step<()> {
    cursor.eat_keywords(&["IF", "NOT", "EXISTS"]);
    let name = cursor.parse_object_name()?;
    log::debug!("Schema {name} declared at line {}", state.line);
    Ok(())
}

/// `ALTER TABLE [IF EXISTS] [ONLY] name clause[, clause ...]`
pub(crate) fn alter_table(state: &mut ParseState, cursor: &mut Cursor) -> Step<()> {
    cursor.eat_keywords(&["IF", "EXISTS"]);
    cursor.eat_keyword("ONLY");
    let table = cursor.parse_object_name()?;
    if cursor.eat_keyword("WITH") {
        let _ = cursor.eat_keyword("CHECK") || cursor.eat_keyword("NOCHECK");
    }

    loop {
        let line = cursor.line();
        if cursor.eat_keyword("ADD") {
            add_clause(state, cursor, &table, line)?;
        } else if state.grammar.caps.partitioning && cursor.eat_keyword("SET") {
            let partition = partition_clause(cursor)?;
            state.set_partition(&table, partition);
        } else {
            let preview = cursor.preview(3);
            state.report_at(
                DiagnosticCode::StatementSkipped,
                line,
                &table,
                format!("ALTER TABLE {table} '{preview} ...' is not modeled, skipped"),
            );
            return Ok(());
        }
        // ON DELETE, NOT VALID, ...
        cursor.skip_to_element_end();
        if cursor.eat_token(&Token::Comma) {
            continue;
        }
        if cursor.is_at_end() {
            return Ok(());
        }
        return Err(cursor.unexpected("',' or end of statement"));
    }
}

fn add_clause(
    state: &mut ParseState,
    cursor: &mut Cursor,
    table: &str,
    line: Option<usize>,
) -> Step<()> {
    if state.grammar.caps.relationships && cursor.eat_keyword("RELATIONSHIP") {
        let join = relationship(state, cursor, table, line)?;
        state.pending.push(join);
        return Ok(());
    }

    if cursor.peek_keyword("CONSTRAINT") || starts_table_constraint(state.grammar, cursor) {
        let name = constraint_name(cursor)?;
        match constraint_body(cursor, table, name, line)? {
            Constraint::PrimaryKey(columns) => state.set_primary_key(table, columns, line),
            Constraint::ForeignKey(join) => state.pending.push(join),
            Constraint::Ignored(keyword) => state.report_at(
                DiagnosticCode::ClauseIgnored,
                line,
                table,
                format!("{keyword} constraint on '{table}' is not modeled"),
            ),
        }
        return Ok(());
    }

    cursor.eat_keyword("COLUMN");
    cursor.eat_keywords(&["IF", "NOT", "EXISTS"]);
    let def = column_def(state, cursor, table)?;
    state.add_column_def(table, def, line);
    Ok(())
}

/// `RELATIONSHIP [name] WITH target AS a.x = b.y [AND ...]`
fn relationship(
    state: &ParseState,
    cursor: &mut Cursor,
    table: &str,
    line: Option<usize>,
) -> Step<PendingJoin> {
    let name = if cursor.peek_keyword("WITH") {
        None
    } else {
        Some(cursor.parse_ident()?)
    };
    cursor.expect_keyword("WITH")?;
    let target = cursor.parse_object_name()?;
    cursor.expect_keyword("AS")?;
    let wrapped = cursor.eat_token(&Token::LParen);

    let case = state.db.case();
    let mut local = Vec::new();
    let mut remote = Vec::new();
    loop {
        let (lq, lc) = cursor.parse_qualified_column()?;
        cursor.expect_token(&Token::Eq)?;
        let (rq, rc) = cursor.parse_qualified_column()?;
        let pair = orient_pair(
            (lq.as_deref(), lc.as_str()),
            (rq.as_deref(), rc.as_str()),
            table,
            &target,
            case,
        )
        .map_err(Malformed)?;
        local.push(pair.local);
        remote.push(pair.remote);
        if !cursor.eat_keyword("AND") {
            break;
        }
    }
    if wrapped {
        cursor.expect_token(&Token::RParen)?;
    }

    Ok(PendingJoin {
        table: table.to_string(),
        name,
        target,
        local,
        remote: Some(remote),
        kind: JoinKind::Relationship,
        line,
    })
}

/// `PARTITION BY HASH (n) [KEY (cols)]`
fn partition_clause(cursor: &mut Cursor) -> Step<PartitionClause> {
    let line = cursor.line();
    cursor.expect_keyword("PARTITION")?;
    cursor.expect_keyword("BY")?;
    cursor.expect_keyword("HASH")?;
    cursor.expect_token(&Token::LParen)?;
    let shard_count = cursor.parse_u32()?;
    cursor.expect_token(&Token::RParen)?;
    let key = if cursor.eat_keyword("KEY") {
        Some(cursor.parse_column_list()?)
    } else {
        None
    };
    Ok(PartitionClause {
        shard_count,
        key,
        line,
    })
}

fn starts_table_constraint(grammar: &DialectGrammar, cursor: &Cursor) -> bool {
    cursor.peek_keyword("CONSTRAINT")
        || cursor.peek_keywords(&["PRIMARY", "KEY"])
        || cursor.peek_keywords(&["FOREIGN", "KEY"])
        || cursor.peek_any_keyword(&["UNIQUE", "CHECK"])
        || (grammar.caps.inline_indexes
            && cursor.peek_any_keyword(&["KEY", "INDEX", "FULLTEXT", "SPATIAL"]))
}

/// `[CONSTRAINT [name]]`; TQL writes `CONSTRAINT PRIMARY KEY` with no name
fn constraint_name(cursor: &mut Cursor) -> Step<Option<String>> {
    if !cursor.eat_keyword("CONSTRAINT") {
        return Ok(None);
    }
    if cursor.peek_any_keyword(&["PRIMARY", "FOREIGN", "UNIQUE", "CHECK"]) {
        return Ok(None);
    }
    cursor.parse_ident().map(Some)
}

fn constraint_body(
    cursor: &mut Cursor,
    table: &str,
    name: Option<String>,
    line: Option<usize>,
) -> Step<Constraint> {
    if cursor.eat_keywords(&["PRIMARY", "KEY"]) {
        let _ = cursor.eat_keyword("CLUSTERED") || cursor.eat_keyword("NONCLUSTERED");
        return Ok(Constraint::PrimaryKey(cursor.parse_column_list()?));
    }
    if cursor.eat_keywords(&["FOREIGN", "KEY"]) {
        // MySQL allows an index name here
        let name = if cursor.peek() == &Token::LParen {
            name
        } else {
            let index = cursor.parse_ident()?;
            name.or(Some(index))
        };
        let local = cursor.parse_column_list()?;
        cursor.expect_keyword("REFERENCES")?;
        let (target, remote) = references_target(cursor)?;
        return Ok(Constraint::ForeignKey(PendingJoin {
            table: table.to_string(),
            name,
            target,
            local,
            remote,
            kind: JoinKind::ForeignKey,
            line,
        }));
    }
    let keyword = match cursor.peek() {
        Token::EOF => "empty".to_string(),
        other => other.to_string().to_uppercase(),
    };
    Ok(Constraint::Ignored(keyword))
}

fn table_constraint(
    state: &mut ParseState,
    cursor: &mut Cursor,
    draft: &mut TableDraft,
) -> Step<()> {
    let line = cursor.line();
    let name = constraint_name(cursor)?;
    match constraint_body(cursor, &draft.name, name, line)? {
        Constraint::PrimaryKey(columns) => draft_primary_key(state, draft, columns, line),
        Constraint::ForeignKey(join) => draft.joins.push(join),
        Constraint::Ignored(keyword) => state.report_at(
            DiagnosticCode::ClauseIgnored,
            line,
            &draft.name,
            format!("{keyword} constraint on '{}' is not modeled", draft.name),
        ),
    }
    cursor.skip_to_element_end();
    Ok(())
}

fn draft_primary_key(
    state: &mut ParseState,
    draft: &mut TableDraft,
    columns: Vec<String>,
    line: Option<usize>,
) {
    if draft.primary_key.is_some() {
        state.report_at(
            DiagnosticCode::ConstraintDropped,
            line,
            &draft.name,
            format!(
                "'{}' declares more than one primary key; keeping the first",
                draft.name
            ),
        );
        return;
    }
    draft.primary_key = Some((columns, line));
}

fn references_target(cursor: &mut Cursor) -> Step<(String, Option<Vec<String>>)> {
    let target = cursor.parse_object_name()?;
    let remote = if cursor.peek() == &Token::LParen {
        Some(cursor.parse_column_list()?)
    } else {
        None
    };
    Ok((target, remote))
}

/// `name type [constraints]`
fn column_def(state: &mut ParseState, cursor: &mut Cursor, table: &str) -> Step<ColumnDef> {
    let line = cursor.line();
    let name = cursor.parse_ident()?;
    let spec = column_type(cursor)?;

    let mapping = map_type(state.grammar.dialect, &spec.base, spec.precision, spec.scale);
    match mapping.confidence {
        Confidence::Exact => {}
        Confidence::Inferred => state.report(
            ParseDiagnostic::new(
                DiagnosticCode::AmbiguousType,
                format!(
                    "{table}.{name}: '{}' is ambiguous, using {}",
                    spec.raw, mapping.ty
                ),
            )
            .at_line(line.unwrap_or(state.line))
            .on_table(table)
            .on_column(&name),
        ),
        Confidence::Unresolved => state.report(
            ParseDiagnostic::new(
                DiagnosticCode::UnresolvedType,
                format!("{table}.{name}: '{}' has no equivalent, using UNKNOWN", spec.raw),
            )
            .at_line(line.unwrap_or(state.line))
            .on_table(table)
            .on_column(&name),
        ),
    }

    let mut def = ColumnDef {
        column: Column::new(&name, mapping.ty).with_raw_type(&spec.raw),
        primary_key: false,
        references: None,
    };
    let mut constraint = None;
    while !cursor.is_at_end() && !matches!(cursor.peek(), Token::Comma | Token::RParen) {
        if cursor.eat_keywords(&["NOT", "NULL"]) {
            def.column.nullable = false;
        } else if cursor.eat_keyword("NULL") {
            def.column.nullable = true;
        } else if cursor.eat_keywords(&["PRIMARY", "KEY"]) {
            def.primary_key = true;
            def.column.nullable = false;
        } else if cursor.eat_keyword("CONSTRAINT") {
            constraint = Some(cursor.parse_ident()?);
        } else if cursor.eat_keyword("REFERENCES") {
            let (target, remote) = references_target(cursor)?;
            def.references = Some(PendingJoin {
                table: table.to_string(),
                name: constraint.take(),
                target,
                local: vec![name.clone()],
                remote,
                kind: JoinKind::ForeignKey,
                line,
            });
        } else {
            // DEFAULT, IDENTITY(1,1), COLLATE, CHECK (...), ...
            cursor.skip_group();
        }
    }
    Ok(def)
}

/// Type name with arguments and modifiers, e.g.
/// `DOUBLE PRECISION`, `NUMBER(10, 2)`, `TIMESTAMP(3) WITH TIME ZONE`,
/// `INT(11) UNSIGNED`, `text[]`
fn column_type(cursor: &mut Cursor) -> Step<TypeSpec> {
    let first = match cursor.peek() {
        Token::Word(w) => w.value.clone(),
        _ => return Err(cursor.unexpected("a column type")),
    };
    cursor.advance();

    let mut words = vec![first];
    loop {
        let previous = words.last().map(|w| w.to_ascii_uppercase()).unwrap_or_default();
        let next = match cursor.peek() {
            Token::Word(w) if w.quote_style.is_none() => w.value.to_ascii_uppercase(),
            _ => break,
        };
        if continues_type_name(&previous, &next) {
            words.push(next);
            cursor.advance();
        } else if !eat_type_modifier(cursor, &mut words) {
            break;
        }
    }

    let mut raw = words.join(" ");
    let mut precision = None;
    let mut scale = None;
    if cursor.peek() == &Token::LParen {
        let (args, text) = type_args(cursor)?;
        precision = args.first().copied().flatten();
        scale = args.get(1).copied().flatten();
        raw.push_str(&format!("({text})"));
    }

    let mut modifiers = Vec::new();
    while eat_type_modifier(cursor, &mut modifiers) {}
    let mut array = false;
    while cursor.peek() == &Token::LBracket {
        cursor.skip_group();
        array = true;
    }

    words.extend(modifiers.iter().cloned());
    let mut base = words.join(" ");
    if !modifiers.is_empty() {
        raw.push(' ');
        raw.push_str(&modifiers.join(" "));
    }
    if array {
        base.push_str("[]");
        raw.push_str("[]");
    }
    Ok(TypeSpec {
        base,
        raw,
        precision,
        scale,
    })
}

fn continues_type_name(previous: &str, next: &str) -> bool {
    match next {
        "VARYING" => true,
        "PRECISION" => previous == "DOUBLE",
        "CHAR" | "CHARACTER" | "VARCHAR" => previous == "NATIONAL",
        "RAW" => previous == "LONG",
        _ => false,
    }
}

/// `UNSIGNED`, `ZEROFILL`, `WITH [LOCAL] TIME ZONE`, ...
fn eat_type_modifier(cursor: &mut Cursor, words: &mut Vec<String>) -> bool {
    for keyword in ["UNSIGNED", "SIGNED", "ZEROFILL"] {
        if cursor.eat_keyword(keyword) {
            words.push(keyword.to_string());
            return true;
        }
    }
    for phrase in [
        &["WITH", "TIME", "ZONE"][..],
        &["WITH", "LOCAL", "TIME", "ZONE"][..],
        &["WITHOUT", "TIME", "ZONE"][..],
    ] {
        if cursor.eat_keywords(phrase) {
            words.extend(phrase.iter().map(|w| w.to_string()));
            return true;
        }
    }
    false
}

/// `(10, 2)`, `(MAX)`, `(20 CHAR)`, `('a', 'b')`: leading numbers become
/// arguments, anything else is `None`
fn type_args(cursor: &mut Cursor) -> Step<(Vec<Option<u32>>, String)> {
    cursor.expect_token(&Token::LParen)?;
    let mut args = Vec::new();
    let mut parts = Vec::new();
    loop {
        let mut value = None;
        let mut text = Vec::new();
        while !cursor.is_at_end() && !matches!(cursor.peek(), Token::Comma | Token::RParen) {
            if text.is_empty() {
                if let Token::Number(n, _) = cursor.peek() {
                    value = n.parse::<u32>().ok();
                }
            }
            text.push(cursor.peek().to_string());
            cursor.skip_group();
        }
        args.push(value);
        parts.push(text.join(" "));
        if !cursor.eat_token(&Token::Comma) {
            break;
        }
    }
    cursor.expect_token(&Token::RParen)?;
    Ok((args, parts.join(", ")))
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
