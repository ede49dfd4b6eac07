//! Convert command implementation

use anyhow::{Context, Result};
use dt_core::{validate, Config, Database, IdentifierCase, Severity, TabularModel};
use dt_sql::{verify_round_trip, EmitOptions, TqlEmitter};

use crate::cli::{ConvertArgs, GlobalArgs};
use crate::commands::common::{self, ExitCode};

/// Execute the convert command
pub async fn execute(args: &ConvertArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let mut failed = false;

    let db = match (&args.from_ddl, &args.from_json) {
        (Some(path), _) => {
            let dialect = common::resolve_dialect(args.dialect.as_deref(), &config)?;
            let options = common::parse_options(
                &config,
                args.database.as_deref(),
                args.schema.as_deref(),
            );
            let outcome = common::read_ddl(path, dialect, &options, global)?;
            failed |= outcome.has_errors();
            outcome.database
        }
        (None, Some(path)) => read_tabular(path, &config, args.database.as_deref())?,
        (None, None) => anyhow::bail!("one of --from-ddl or --from-json is required"),
    };

    if args.validate {
        let issues = validate(&db);
        for issue in &issues {
            eprintln!("{issue}");
        }
        failed |= dt_core::validate::has_errors(&issues);
    }

    let options = emit_options(args, &config);
    let emitted = TqlEmitter::new(options).emit(&db);
    common::print_diagnostics(&emitted.diagnostics, global);

    if args.check_round_trip {
        verify_round_trip(&db).context("Round trip check failed")?;
        if global.verbose {
            eprintln!("[verbose] Round trip verified");
        }
    }

    let to_stdout = args.to_tql.as_deref() == Some("-")
        || (args.to_tql.is_none() && args.to_json.is_none());
    match args.to_tql.as_deref() {
        Some(path) if path != "-" => {
            std::fs::write(path, &emitted.text)
                .with_context(|| format!("Failed to write TQL to {path}"))?;
            if global.verbose {
                eprintln!("[verbose] Wrote TQL to {path}");
            }
        }
        _ if to_stdout => print!("{}", emitted.text),
        _ => {}
    }

    if let Some(path) = &args.to_json {
        let model = TabularModel::from_database(&db);
        let json = serde_json::to_string_pretty(&model).context("Failed to serialize model")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write model to {path}"))?;
        if global.verbose {
            eprintln!("[verbose] Wrote tabular model to {path}");
        }
    }

    if failed {
        eprintln!("Conversion finished with errors");
        return Err(ExitCode(1).into());
    }
    Ok(())
}

fn read_tabular(path: &str, config: &Config, database: Option<&str>) -> Result<Database> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tabular model {path}"))?;
    let mut model: TabularModel =
        serde_json::from_str(&text).with_context(|| format!("Invalid tabular model {path}"))?;
    if let Some(name) = database {
        model.database = name.to_string();
    }
    let (db, issues) = model.into_database(config.name_case());
    for issue in &issues {
        eprintln!("{issue}");
    }
    if issues.iter().any(|i| i.severity == Severity::Error) {
        eprintln!("{} rows were skipped", issues.len());
    }
    Ok(db)
}

/// Config emit settings with the command-line overrides applied
fn emit_options(args: &ConvertArgs, config: &Config) -> EmitOptions {
    let mut options = EmitOptions::from_config(&config.emit);
    if args.uppercase {
        options.name_case = IdentifierCase::Upper;
    } else if args.lowercase {
        options.name_case = IdentifierCase::Lower;
    } else if args.camelcase {
        options.name_case = IdentifierCase::Camel;
    }
    if let Some(create) = args.create_db {
        options.create_database = create;
    }
    options
}
