//! Validate command implementation

use anyhow::Result;
use dt_core::validate::{has_errors, validate};

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common::{self, ExitCode};

/// Execute the validate command
pub async fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let dialect = common::resolve_dialect(args.dialect.as_deref(), &config)?;
    let options = common::parse_options(&config, None, None);
    let outcome = common::read_ddl(&args.ddl, dialect, &options, global)?;

    let issues = validate(&outcome.database);
    for issue in &issues {
        println!("{issue}");
    }

    let parse_errors = outcome.has_errors();
    println!(
        "\n{} tables, {} parse diagnostics, {} validation issues",
        outcome.database.len(),
        outcome.diagnostics.len(),
        issues.len()
    );

    if parse_errors || has_errors(&issues) {
        return Err(ExitCode(1).into());
    }
    println!("Validation passed");
    Ok(())
}
