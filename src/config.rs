//! Environment configuration
//!
//! Settings are read from `STATEMENT_IMPORT_*` environment variables, after
//! loading a `.env` file from the working directory if there is one. Only the
//! archive password is required.

use crate::core::{ArchiveLimits, PipelineConfig, Tolerance};
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Prefix of every configuration variable
pub const ENV_PREFIX: &str = "STATEMENT_IMPORT_";

#[derive(Debug, Deserialize)]
pub struct ImportConfig {
    /// Password of the statement archives
    pub pdf_password: SecretString,
    #[serde(default = "default_max_archive_bytes")]
    pub max_archive_bytes: u64,
    #[serde(default = "default_max_uncompressed_bytes")]
    pub max_uncompressed_bytes: u64,
    #[serde(default = "default_max_compression_ratio")]
    pub max_compression_ratio: u64,
    #[serde(default = "default_max_archive_entries")]
    pub max_archive_entries: usize,
    #[serde(default = "default_decompression_timeout_secs")]
    pub decompression_timeout_secs: u64,
    #[serde(default = "default_document_extension")]
    pub document_extension: String,
    #[serde(default = "default_eur_tolerance")]
    pub eur_tolerance_minor_units: u32,
    #[serde(default = "default_bgn_tolerance")]
    pub bgn_tolerance_minor_units: u32,
}

fn default_max_archive_bytes() -> u64 {
    ArchiveLimits::default().max_archive_bytes
}

fn default_max_uncompressed_bytes() -> u64 {
    ArchiveLimits::default().max_uncompressed_bytes
}

fn default_max_compression_ratio() -> u64 {
    ArchiveLimits::default().max_compression_ratio
}

fn default_max_archive_entries() -> usize {
    ArchiveLimits::default().max_entries
}

fn default_decompression_timeout_secs() -> u64 {
    ArchiveLimits::default().decompression_timeout.as_secs()
}

fn default_document_extension() -> String {
    ArchiveLimits::default().document_extension
}

fn default_eur_tolerance() -> u32 {
    Tolerance::default().eur_minor_units
}

fn default_bgn_tolerance() -> u32 {
    Tolerance::default().bgn_minor_units
}

impl ImportConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, envy::Error> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("no .env loaded: {}", e);
        }
        envy::prefixed(ENV_PREFIX).from_env()
    }

    /// Read the configuration from explicit `(name, value)` pairs
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX).from_iter(vars)
    }

    /// The limits and tolerances the pipeline runs with
    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut document_extension = self.document_extension.to_lowercase();
        if !document_extension.starts_with('.') {
            document_extension.insert(0, '.');
        }

        PipelineConfig {
            limits: ArchiveLimits {
                max_archive_bytes: self.max_archive_bytes,
                max_uncompressed_bytes: self.max_uncompressed_bytes,
                max_compression_ratio: self.max_compression_ratio,
                max_entries: self.max_archive_entries,
                decompression_timeout: Duration::from_secs(self.decompression_timeout_secs),
                document_extension,
            },
            tolerance: Tolerance {
                eur_minor_units: self.eur_tolerance_minor_units,
                bgn_minor_units: self.bgn_tolerance_minor_units,
            },
        }
    }

    /// Largest input file worth reading
    ///
    /// Extracted documents may be as large as the uncompressed ceiling, so
    /// that is the bound for any input.
    pub fn max_input_bytes(&self) -> u64 {
        self.max_archive_bytes.max(self.max_uncompressed_bytes)
    }
}
