//! Synchronous import strategy
//!
//! Imports inputs one at a time on the calling thread. Each import sees every
//! identity recorded by the ones before it, so duplicates within a batch are
//! detected by the pipeline itself rather than by a lost race.

use crate::io::ReportEntry;
use crate::strategy::{ImportContext, ImportStrategy};
use crate::types::ImportError;
use std::path::PathBuf;

/// Sequential import strategy
#[derive(Debug, Clone, Copy)]
pub struct SyncImportStrategy;

impl ImportStrategy for SyncImportStrategy {
    fn import(
        &self,
        inputs: &[PathBuf],
        context: &ImportContext,
    ) -> Result<Vec<ReportEntry>, ImportError> {
        Ok(inputs.iter().map(|path| context.import(path)).collect())
    }
}
