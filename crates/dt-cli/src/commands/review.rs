//! Review command implementation

use anyhow::{Context, Result};
use dt_core::Severity;
use dt_db::DuckDbSampler;
use dt_review::{CheckManager, DataSampler, ReviewContext, ReviewReport};

use crate::cli::{GlobalArgs, OutputFormat, ReviewArgs};
use crate::commands::common;

/// Execute the review command
pub async fn execute(args: &ReviewArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let dialect = common::resolve_dialect(args.dialect.as_deref(), &config)?;
    let options = common::parse_options(&config, None, None);
    let outcome = common::read_ddl(&args.ddl, dialect, &options, global)?;

    let manager = CheckManager::with_defaults();
    let filter: Vec<String> = match &args.checks {
        Some(list) => list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => config.review.checks.clone(),
    };
    manager.validate_filter(&filter)?;
    let filter = (!filter.is_empty()).then_some(filter);

    let sampler = match &args.sample_db {
        Some(path) => Some(
            DuckDbSampler::new(path)
                .with_context(|| format!("Failed to open sample database {path}"))?,
        ),
        None => None,
    };
    if global.verbose && sampler.is_none() {
        eprintln!("[verbose] No --sample-db; data checks are skipped");
    }

    let ctx = ReviewContext::new(&outcome.database, config.review.clone());
    let report = manager
        .run(
            &ctx,
            sampler.as_ref().map(|s| s as &dyn DataSampler),
            filter.as_deref(),
        )
        .await;

    match args.output {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            println!("{json}");
        }
        OutputFormat::Text => print_text(&report),
    }
    Ok(())
}

fn print_text(report: &ReviewReport) {
    let mut check = "";
    for finding in &report.findings {
        if finding.check != check {
            check = &finding.check;
            println!("{check}:");
        }
        println!("  {finding}");
    }
    println!(
        "\n{} findings ({} warnings, {} info) from {} checks",
        report.len(),
        report.count(Severity::Warning),
        report.count(Severity::Info),
        report.checks.len()
    );
}
