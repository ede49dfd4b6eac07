//! CLI argument definitions using clap derive API

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

/// dt - convert vendor DDL to TQL and review schema models
#[derive(Parser, Debug)]
#[command(name = "dt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ./dt.yml when present)
    #[arg(short, long, global = true, env = "DT_CONFIG")]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert DDL or a tabular model to TQL and/or a tabular model
    Convert(ConvertArgs),

    /// Review a schema for structural and data problems
    Review(ReviewArgs),

    /// Parse DDL and report model validation issues
    Validate(ValidateArgs),
}

/// Arguments for the convert command
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("input").required(true).args(["from_ddl", "from_json"])))]
#[command(group(ArgGroup::new("case").args(["uppercase", "lowercase", "camelcase"])))]
pub struct ConvertArgs {
    /// DDL file to read
    #[arg(long)]
    pub from_ddl: Option<String>,

    /// Tabular model (JSON) to read
    #[arg(long)]
    pub from_json: Option<String>,

    /// Source dialect (auto, generic, postgres, mysql, sqlserver, oracle, tql)
    #[arg(short, long)]
    pub dialect: Option<String>,

    /// Database name when the DDL declares none
    #[arg(long)]
    pub database: Option<String>,

    /// Schema for tables the DDL leaves unqualified [default: falcon_default_schema]
    #[arg(long, value_parser = clap::builder::NonEmptyStringValueParser::new())]
    pub schema: Option<String>,

    /// Write TQL here ("-" for stdout; the default when no output is given)
    #[arg(long)]
    pub to_tql: Option<String>,

    /// Write the tabular model (JSON) here
    #[arg(long)]
    pub to_json: Option<String>,

    /// Upper-case table and column names
    #[arg(long)]
    pub uppercase: bool,

    /// Lower-case table and column names
    #[arg(long)]
    pub lowercase: bool,

    /// CamelCase table and column names
    #[arg(long)]
    pub camelcase: bool,

    /// Emit CREATE DATABASE before USE
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub create_db: Option<bool>,

    /// Run model validation and fail on errors
    #[arg(long)]
    pub validate: bool,

    /// Re-parse the emitted TQL and fail unless it matches the model
    #[arg(long)]
    pub check_round_trip: bool,
}

/// Arguments for the review command
#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// DDL file to review
    #[arg(long)]
    pub ddl: String,

    /// Source dialect
    #[arg(short, long)]
    pub dialect: Option<String>,

    /// DuckDB file to sample live data from
    #[arg(long)]
    pub sample_db: Option<String>,

    /// Checks to run (comma-separated, default: all)
    #[arg(long)]
    pub checks: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// DDL file to validate
    #[arg(long)]
    pub ddl: String,

    /// Source dialect
    #[arg(short, long)]
    pub dialect: Option<String>,
}

/// Report output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// JSON report
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
