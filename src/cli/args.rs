use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Import password-protected bank statement archives
#[derive(Parser, Debug)]
#[command(name = "statement-import")]
#[command(about = "Import password-protected bank statement archives", long_about = None)]
pub struct CliArgs {
    /// Input files: ZIP archives or already extracted statements
    #[arg(
        value_name = "INPUT",
        required = true,
        help = "Paths of ZIP archives or extracted statement documents"
    )]
    pub inputs: Vec<PathBuf>,

    /// Import strategy to use for the batch
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Import strategy: 'sync' for one at a time or 'async' for concurrent imports"
    )]
    pub strategy: StrategyType,

    /// Maximum number of concurrent imports (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of imports running at once (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,

    /// Per-input timeout in seconds (async mode only)
    #[arg(
        long = "timeout-secs",
        value_name = "SECONDS",
        help = "Wall-clock limit for a single import (default: 60)"
    )]
    pub timeout_secs: Option<u64>,

    /// Identity history file
    #[arg(
        long = "history",
        value_name = "FILE",
        help = "JSON Lines file of recorded identities; read before and appended after the run"
    )]
    pub history: Option<PathBuf>,

    /// Report format written to stdout
    #[arg(
        long = "format",
        value_name = "FORMAT",
        default_value = "json",
        help = "Report format: 'json' for the batch report or 'csv' for transactions"
    )]
    pub format: OutputFormat,

    /// Check inputs without recording identities
    #[arg(long = "dry-run", help = "Import and report without recording identities")]
    pub dry_run: bool,
}

/// Available import strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

/// Available report formats
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Unset values fall back to the defaults; zero values are replaced by
    /// `BatchConfig::new` with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.max_concurrent.is_none() && self.timeout_secs.is_none() {
            return BatchConfig::default();
        }

        let default = BatchConfig::default();
        BatchConfig::new(
            self.max_concurrent.unwrap_or(default.max_concurrent),
            self.timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(default.item_timeout),
        )
    }
}
