//! Statement Import CLI
//!
//! Command-line interface for importing password-protected bank statement
//! archives.
//!
//! # Usage
//!
//! ```bash
//! STATEMENT_IMPORT_PDF_PASSWORD=... cargo run -- statement.zip > report.json
//! cargo run -- --history imported.jsonl inbox/*.zip > report.json
//! cargo run -- --strategy async --max-concurrent 8 --timeout-secs 30 inbox/*.zip
//! cargo run -- --format csv --dry-run statement.zip > transactions.csv
//! ```
//!
//! The report goes to stdout and logs go to stderr (`RUST_LOG` overrides the
//! default `statement_import=info`).
//!
//! # Exit Codes
//!
//! - 0: Every input imported with balanced statements (duplicates included)
//! - 1: Configuration error, report error, or any input failed or was unbalanced

use statement_import::cli::{self, OutputFormat};
use statement_import::config::ImportConfig;
use statement_import::io::{self, BatchReport};
use statement_import::strategy::{self, ImportContext, SharedIdentityStore};
use statement_import::ImportPipeline;
use std::process;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "statement_import=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}

/// Run the import; `Ok(false)` when some input needs attention
fn run() -> Result<bool, String> {
    let args = cli::parse_args();
    let config = ImportConfig::from_env().map_err(|e| format!("Invalid configuration: {}", e))?;

    let history = match &args.history {
        Some(path) => io::load_history(path).map_err(|e| e.to_string())?,
        None => Vec::new(),
    };
    info!(known = history.len(), inputs = args.inputs.len(), "starting import");

    let context = ImportContext {
        pipeline: Arc::new(ImportPipeline::new(
            config.pipeline_config(),
            io::default_extractor(),
        )),
        max_input_bytes: config.max_input_bytes(),
        password: Arc::new(config.pdf_password),
        store: Arc::new(SharedIdentityStore::with_history(history)),
        dry_run: args.dry_run,
    };

    let strategy = strategy::create_strategy(args.strategy, args.to_batch_config());
    let entries = strategy
        .import(&args.inputs, &context)
        .map_err(|e| e.to_string())?;

    // Record before reporting so a broken stdout does not lose identities
    if let Some(path) = &args.history {
        if !args.dry_run {
            io::append_history(path, &context.store.fresh_identities())
                .map_err(|e| e.to_string())?;
        }
    }

    let report = BatchReport::new(entries);
    let mut output = std::io::stdout().lock();
    match args.format {
        OutputFormat::Json => io::write_json_report(&report, &mut output),
        OutputFormat::Csv => io::write_transactions_csv(&report.entries, &mut output),
    }
    .map_err(|e| e.to_string())?;

    let summary = report.summary;
    info!(
        total = summary.total,
        imported = summary.imported,
        duplicates = summary.duplicates,
        invalid = summary.invalid,
        failed = summary.failed,
        gaps = report.gaps.len(),
        "import finished"
    );

    Ok(!report.has_problems())
}
