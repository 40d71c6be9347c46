//! Batch import strategy module
//!
//! This module defines the Strategy pattern for importing a batch of input
//! files through the pipeline. Both strategies read each input, run it through
//! the shared [`ImportPipeline`] and record new identities in one
//! [`SharedIdentityStore`]; they differ only in scheduling.

use crate::cli::StrategyType;
use crate::core::{IdentityStore, ImportPipeline};
use crate::io::{read_input, ImportInput, ReportEntry};
use crate::types::{ImportOutcome, PipelineResult, Stage};
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

pub mod r#async;
pub mod store;
pub mod sync;

pub use self::r#async::{AsyncImportStrategy, BatchConfig};
pub use store::SharedIdentityStore;
pub use sync::SyncImportStrategy;

/// Everything an import needs besides the input itself
///
/// Cheap to clone; the async strategy hands a copy to every task.
#[derive(Clone)]
pub struct ImportContext {
    pub pipeline: Arc<ImportPipeline>,
    pub password: Arc<SecretString>,
    pub store: Arc<SharedIdentityStore>,
    /// Largest input file that will be read into memory
    pub max_input_bytes: u64,
    /// Check for duplicates without recording anything
    pub dry_run: bool,
}

impl ImportContext {
    /// Read `path` and run it through the pipeline
    ///
    /// Read failures are reported as a `Host` stage failure so one unreadable
    /// file does not abort the batch. Nothing is recorded here.
    pub fn run(&self, path: &Path) -> PipelineResult {
        let input = match read_input(path, self.max_input_bytes) {
            Ok(input) => input,
            Err(e) => {
                error!(input = %path.display(), "{}", e);
                return PipelineResult::failure(Stage::Host, &e);
            }
        };

        let known = self.store.as_ref();
        match &input {
            ImportInput::Archive(archive) => self.pipeline.run(archive, &self.password, known),
            ImportInput::Document { name, bytes } => self.pipeline.run_document(name, bytes, known),
        }
    }

    /// Record the identity of a balanced, non-duplicate outcome
    ///
    /// When another import recorded the same statement first the outcome is
    /// turned into a duplicate. Unbalanced statements stay unrecorded so a
    /// corrected copy can still be imported. A store error becomes a `Host`
    /// failure, since the outcome would otherwise claim a record that was
    /// never written.
    pub fn record(&self, result: PipelineResult) -> PipelineResult {
        match result {
            PipelineResult::Success(outcome) if !self.dry_run => {
                record_outcome(self.store.as_ref(), outcome)
            }
            other => other,
        }
    }

    /// Run and record one input
    pub fn import(&self, path: &Path) -> ReportEntry {
        ReportEntry::new(path.display().to_string(), self.record(self.run(path)))
    }
}

fn record_outcome(store: &dyn IdentityStore, mut outcome: Box<ImportOutcome>) -> PipelineResult {
    if outcome.is_duplicate || !outcome.validation.valid {
        return PipelineResult::Success(outcome);
    }

    match store.record_if_absent(&outcome.identity) {
        Ok(true) => info!(statement_id = %outcome.identity.statement_id, "identity recorded"),
        Ok(false) => {
            warn!(
                semantic_key = %outcome.identity.semantic_key,
                "statement recorded concurrently, marking as duplicate"
            );
            outcome.is_duplicate = true;
        }
        Err(e) => {
            error!(statement_id = %outcome.identity.statement_id, "failed to record identity: {}", e);
            return PipelineResult::failure(Stage::Host, &e);
        }
    }
    PipelineResult::Success(outcome)
}

/// Batch import strategy trait
///
/// This trait defines the interface for the different ways of scheduling a
/// batch of imports.
pub trait ImportStrategy: Send + Sync {
    /// Import every input and report on each, in input order
    ///
    /// # Arguments
    ///
    /// * `inputs` - Paths of ZIP archives or extracted documents
    /// * `context` - Pipeline, password and identity store to import with
    ///
    /// # Returns
    ///
    /// One [`ReportEntry`] per input. Per-input failures are entries, not
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns an error only if the strategy itself cannot run (for example
    /// the async runtime fails to start).
    fn import(
        &self,
        inputs: &[PathBuf],
        context: &ImportContext,
    ) -> Result<Vec<ReportEntry>, crate::types::ImportError>;
}

/// Create an import strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of strategy to create (Sync or Async)
/// * `config` - Concurrency settings, ignored by the sync strategy
///
/// # Returns
///
/// A boxed trait object implementing the ImportStrategy trait
pub fn create_strategy(strategy_type: StrategyType, config: BatchConfig) -> Box<dyn ImportStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncImportStrategy),
        StrategyType::Async => Box::new(AsyncImportStrategy::new(config)),
    }
}
