//! Asynchronous import strategy
//!
//! Runs imports concurrently on a tokio multi-threaded runtime.
//!
//! # Architecture
//!
//! ```text
//! AsyncImportStrategy
//!     ├── BatchConfig (max_concurrent, item_timeout)
//!     ├── buffered stream of inputs (bounded concurrency, input order kept)
//!     ├── spawn_blocking per input (decompression, extraction, parsing)
//!     └── SharedIdentityStore (atomic record_if_absent across workers)
//! ```
//!
//! The pipeline is CPU bound and synchronous, so every import runs on the
//! blocking pool. Identities are recorded back on the async side once the
//! import returns, which means an import that times out never records
//! anything even if its blocking task later finishes.
//!
//! A timed-out blocking task cannot be cancelled, so each one holds a
//! semaphore permit until it actually returns. At most `max_concurrent`
//! imports occupy the blocking pool; the next input waits for a permit
//! before its own deadline starts.

use crate::io::ReportEntry;
use crate::strategy::{ImportContext, ImportStrategy};
use crate::types::{ImportError, PipelineResult, Stage};
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{error, warn};

/// Concurrency settings for batch imports
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Maximum number of imports running at once
    pub max_concurrent: usize,
    /// Wall-clock budget for a single import
    pub item_timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: num_cpus::get(),
            item_timeout: Duration::from_secs(60),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig, replacing zero values with the defaults
    pub fn new(max_concurrent: usize, item_timeout: Duration) -> Self {
        let default = Self::default();

        let max_concurrent = if max_concurrent == 0 {
            warn!(
                "Invalid max_concurrent ({}), using default ({})",
                max_concurrent, default.max_concurrent
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        let item_timeout = if item_timeout.is_zero() {
            warn!(
                "Invalid item_timeout ({:?}), using default ({:?})",
                item_timeout, default.item_timeout
            );
            default.item_timeout
        } else {
            item_timeout
        };

        Self {
            max_concurrent,
            item_timeout,
        }
    }
}

/// Concurrent import strategy
#[derive(Debug, Clone)]
pub struct AsyncImportStrategy {
    config: BatchConfig,
    /// Held by every running blocking import
    permits: Arc<Semaphore>,
}

impl AsyncImportStrategy {
    pub fn new(config: BatchConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
        Self { config, permits }
    }

    /// Import `inputs` on the current tokio runtime
    ///
    /// Results come back in input order regardless of completion order.
    pub async fn import_all(&self, inputs: &[PathBuf], context: &ImportContext) -> Vec<ReportEntry> {
        stream::iter(inputs.iter().cloned())
            .map(|path| self.import_one(path, context.clone()))
            .buffered(self.config.max_concurrent.max(1))
            .collect()
            .await
    }

    async fn import_one(&self, path: PathBuf, context: ImportContext) -> ReportEntry {
        let input = path.display().to_string();

        let permit = match Arc::clone(&self.permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                let e = ImportError::Io {
                    message: format!("import slots closed: {}", e),
                };
                error!(input = %input, "{}", e);
                return ReportEntry::new(input, PipelineResult::failure(Stage::Host, &e));
            }
        };

        let started = Instant::now();
        let task = {
            let context = context.clone();
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                context.run(&path)
            })
        };

        let result = match tokio::time::timeout(self.config.item_timeout, task).await {
            Ok(Ok(result)) => context.record(result),
            Ok(Err(join_error)) => {
                let e = ImportError::Io {
                    message: format!("import task failed: {}", join_error),
                };
                error!(input = %input, "{}", e);
                PipelineResult::failure(Stage::Host, &e)
            }
            Err(_) => {
                let e = ImportError::timeout("import", started.elapsed().as_millis() as u64);
                error!(input = %input, "{}", e);
                PipelineResult::failure(Stage::Host, &e)
            }
        };

        ReportEntry::new(input, result)
    }
}

impl ImportStrategy for AsyncImportStrategy {
    fn import(
        &self,
        inputs: &[PathBuf],
        context: &ImportContext,
    ) -> Result<Vec<ReportEntry>, ImportError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent.max(1))
            .enable_time()
            .build()
            .map_err(|e| ImportError::Io {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        Ok(runtime.block_on(self.import_all(inputs, context)))
    }
}
