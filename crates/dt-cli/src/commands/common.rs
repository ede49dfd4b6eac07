//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use dt_core::{Config, Dialect, Severity};
use dt_sql::{parse, ParseDiagnostic, ParseOptions, ParseOutcome};
use std::fmt;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; the command already printed why it failed.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load `--config`, else `./dt.yml`, else defaults
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let path = global.config.as_deref().map(Path::new);
    let config = Config::load_or_default(path).context("Failed to load configuration")?;
    if global.verbose {
        eprintln!(
            "[verbose] Config: database '{}', dialect {}",
            config.database, config.dialect
        );
    }
    Ok(config)
}

/// `--dialect` if given, else the configured one
pub(crate) fn resolve_dialect(flag: Option<&str>, config: &Config) -> Result<Dialect> {
    match flag {
        Some(name) => Dialect::from_name(name).context("Invalid --dialect"),
        None => Ok(config.dialect),
    }
}

/// Read and parse a DDL file, printing diagnostics to stderr
pub(crate) fn read_ddl(
    path: &str,
    dialect: Dialect,
    options: &ParseOptions,
    global: &GlobalArgs,
) -> Result<ParseOutcome> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read DDL file {path}"))?;
    let outcome =
        parse(dialect, &text, options).with_context(|| format!("Failed to parse {path}"))?;
    if global.verbose {
        eprintln!(
            "[verbose] Parsed {} as {}: {} tables",
            path,
            outcome.dialect,
            outcome.database.len()
        );
    }
    print_diagnostics(&outcome.diagnostics, global);
    Ok(outcome)
}

/// Print warnings and errors; info only with `--verbose`
pub(crate) fn print_diagnostics(diagnostics: &[ParseDiagnostic], global: &GlobalArgs) {
    for d in diagnostics {
        if d.severity > Severity::Info || global.verbose {
            eprintln!("{d}");
        }
    }
}

/// Parse options from config with optional database and schema overrides
pub(crate) fn parse_options(
    config: &Config,
    database: Option<&str>,
    schema: Option<&str>,
) -> ParseOptions {
    let mut options = ParseOptions::from_config(config);
    if let Some(name) = database {
        options.database_name = name.to_string();
    }
    if let Some(name) = schema {
        options.schema_name = name.to_string();
    }
    options
}
