//! Import orchestrator
//!
//! Sequences archive guard → text extractor → parser → validator → dedup for
//! one archive and folds the outcome into a [`PipelineResult`]. The first
//! failing stage ends the run; the failure carries its stage, kind and
//! message. The pipeline holds no mutable state, so one instance can serve
//! any number of concurrent runs.

use crate::core::archive_guard::{sanitize_filename, ArchiveGuard, ArchiveLimits};
use crate::core::dedup;
use crate::core::parser;
use crate::core::traits::{IdentityLookup, TextExtractor};
use crate::core::validator::{BalanceValidator, Tolerance};
use crate::types::{
    DocumentMeta, ExtractedDocument, ImportError, ImportOutcome, PipelineResult, Stage,
};
use chrono::Utc;
use secrecy::SecretString;
use tracing::{debug, error, info, warn};

/// Limits and tolerances the pipeline runs with
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineConfig {
    pub limits: ArchiveLimits,
    pub tolerance: Tolerance,
}

/// An archive as received from the host, before any validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArchive {
    /// Name the host received the archive under; used for logging only
    pub name: String,
    pub bytes: Vec<u8>,
}

impl RawArchive {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        RawArchive {
            name: name.into(),
            bytes,
        }
    }
}

/// The statement import pipeline
pub struct ImportPipeline {
    guard: ArchiveGuard,
    validator: BalanceValidator,
    extractor: Box<dyn TextExtractor>,
}

impl ImportPipeline {
    pub fn new(config: PipelineConfig, extractor: Box<dyn TextExtractor>) -> Self {
        ImportPipeline {
            guard: ArchiveGuard::new(config.limits),
            validator: BalanceValidator::new(config.tolerance),
            extractor,
        }
    }

    /// Import one password-protected archive
    ///
    /// # Arguments
    ///
    /// * `archive` - The untrusted archive payload
    /// * `password` - Decryption password configured by the host
    /// * `known` - Identities recorded by earlier imports; only read
    ///
    /// # Returns
    ///
    /// `Success` with the parsed statement, its validation result, identity
    /// and duplicate flag, or `Failure` tagged with the stage that failed.
    pub fn run(
        &self,
        archive: &RawArchive,
        password: &SecretString,
        known: &dyn IdentityLookup,
    ) -> PipelineResult {
        let span = tracing::info_span!("import", archive = %archive.name.escape_default());
        let _guard = span.enter();

        debug!(bytes = archive.bytes.len(), "opening archive");
        let document = match self.guard.open(&archive.bytes, password) {
            Ok(document) => document,
            Err(e) => return fail(Stage::Archive, e),
        };

        self.import_document(document.name, &document.bytes, known)
    }

    /// Import a document that is already decompressed, skipping the archive stage
    ///
    /// `name` is sanitized before it is recorded.
    pub fn run_document(
        &self,
        name: &str,
        bytes: &[u8],
        known: &dyn IdentityLookup,
    ) -> PipelineResult {
        let span = tracing::info_span!("import", document = %name.escape_default());
        let _guard = span.enter();

        let file_name = match sanitize_filename(name) {
            Ok(file_name) => file_name,
            Err(e) => return fail(Stage::Archive, e),
        };

        self.import_document(file_name, bytes, known)
    }

    fn import_document(
        &self,
        file_name: String,
        bytes: &[u8],
        known: &dyn IdentityLookup,
    ) -> PipelineResult {
        debug!(file = %file_name, bytes = bytes.len(), "extracting text");
        let text = match self.extractor.extract_text(bytes) {
            Ok(text) => text,
            Err(e) => return fail(Stage::Extraction, e),
        };
        let document = ExtractedDocument {
            text,
            meta: DocumentMeta {
                file_name,
                byte_size: bytes.len() as u64,
                extracted_at: Utc::now(),
            },
        };

        debug!(chars = document.text.len(), "parsing statement");
        let statement = match parser::parse(&document.text) {
            Ok(statement) => statement,
            Err(e) => return fail(Stage::Parsing, e),
        };

        let validation = self.validator.validate(&statement);
        for discrepancy in &validation.discrepancies {
            warn!(iban = %statement.header.iban, "{}", discrepancy);
        }
        for warning in &validation.warnings {
            warn!(iban = %statement.header.iban, "reported turnover differs: {}", warning);
        }

        let identity = match dedup::identify(&statement, bytes) {
            Ok(identity) => identity,
            Err(e) => return fail(Stage::Dedup, e),
        };
        let is_duplicate = dedup::is_duplicate(&identity, known);
        if is_duplicate {
            warn!(semantic_key = %identity.semantic_key, "statement already imported");
        }

        info!(
            iban = %statement.header.iban,
            period_start = %statement.header.period.start,
            period_end = %statement.header.period.end,
            transactions = statement.transactions.len(),
            opening_eur = %statement.header.opening_balance.eur,
            closing_eur = %statement.header.closing_balance.eur,
            valid = validation.valid,
            duplicate = is_duplicate,
            "statement imported"
        );

        PipelineResult::Success(Box::new(ImportOutcome {
            document: document.meta,
            statement,
            validation,
            identity,
            is_duplicate,
        }))
    }
}

fn fail(stage: Stage, e: ImportError) -> PipelineResult {
    error!(%stage, kind = ?e.kind(), retryable = e.is_retryable(), "{}", e);
    PipelineResult::failure(stage, &e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ErrorKind, IdentityKey};
    use std::collections::HashSet;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::{AesMode, CompressionMethod, ZipWriter};

    const STATEMENT: &str = include_str!("../../tests/fixtures/statement_jan_2024.txt");
    const PASSWORD: &str = "s3cret";

    struct Utf8Extractor;

    impl TextExtractor for Utf8Extractor {
        fn extract_text(&self, document: &[u8]) -> Result<String, ImportError> {
            String::from_utf8(document.to_vec())
                .map_err(|e| ImportError::extraction_failed(e.to_string(), false))
        }
    }

    struct BusyExtractor;

    impl TextExtractor for BusyExtractor {
        fn extract_text(&self, _document: &[u8]) -> Result<String, ImportError> {
            Err(ImportError::extraction_failed("engine busy", true))
        }
    }

    fn nothing_known() -> HashSet<IdentityKey> {
        HashSet::new()
    }

    fn pipeline() -> ImportPipeline {
        ImportPipeline::new(PipelineConfig::default(), Box::new(Utf8Extractor))
    }

    fn password() -> SecretString {
        SecretString::new(PASSWORD.to_string())
    }

    fn archive(name: &str, content: &[u8]) -> RawArchive {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .with_aes_encryption(AesMode::Aes256, PASSWORD);
        writer.start_file(name, options).unwrap();
        writer.write_all(content).unwrap();
        RawArchive::new("attachment.zip", writer.finish().unwrap().into_inner())
    }

    #[test]
    fn test_successful_run() {
        let result = pipeline().run(
            &archive("statement.pdf", STATEMENT.as_bytes()),
            &password(),
            &nothing_known(),
        );

        let outcome = result.outcome().unwrap();
        assert_eq!(outcome.document.file_name, "statement.pdf");
        assert_eq!(outcome.document.byte_size, STATEMENT.len() as u64);
        assert_eq!(outcome.statement.transactions.len(), 2);
        assert!(outcome.validation.valid);
        assert!(!outcome.is_duplicate);
    }

    #[test]
    fn test_second_run_is_duplicate_with_equal_identity() {
        let pipeline = pipeline();
        let archive = archive("statement.pdf", STATEMENT.as_bytes());

        let first = pipeline.run(&archive, &password(), &nothing_known());
        let first = first.outcome().unwrap();
        let known: HashSet<IdentityKey> = first.identity.keys().into_iter().collect();
        let second = pipeline.run(&archive, &password(), &known);
        let second = second.outcome().unwrap();

        assert!(!first.is_duplicate);
        assert!(second.is_duplicate);
        assert_eq!(first.identity, second.identity);
    }

    #[test]
    fn test_archive_failure_is_tagged() {
        let result = pipeline().run(
            &archive("statement.pdf", STATEMENT.as_bytes()),
            &SecretString::new("wrong".to_string()),
            &nothing_known(),
        );

        let failure = result.failure_details().unwrap();
        assert_eq!(failure.stage, Stage::Archive);
        assert_eq!(failure.kind, ErrorKind::InvalidPassword);
        assert!(!failure.retryable);
    }

    #[test]
    fn test_extraction_failure_is_retryable() {
        let pipeline = ImportPipeline::new(PipelineConfig::default(), Box::new(BusyExtractor));

        let result = pipeline.run(
            &archive("statement.pdf", STATEMENT.as_bytes()),
            &password(),
            &nothing_known(),
        );

        let failure = result.failure_details().unwrap();
        assert_eq!(failure.stage, Stage::Extraction);
        assert_eq!(failure.kind, ErrorKind::ExtractionFailed);
        assert!(failure.retryable);
    }

    #[test]
    fn test_parse_failure_is_tagged() {
        let text = STATEMENT.replace("Начално салдо", "Салдо");
        let result = pipeline().run_document("statement.pdf", text.as_bytes(), &nothing_known());

        let failure = result.failure_details().unwrap();
        assert_eq!(failure.stage, Stage::Parsing);
        assert_eq!(failure.kind, ErrorKind::HeaderFieldMissing);
        assert_eq!(
            failure.message,
            "Required header field 'opening_balance' is missing"
        );
    }

    #[test]
    fn test_invalid_balance_still_succeeds() {
        let text = STATEMENT.replace("Крайно салдо: 800.00", "Крайно салдо: 850.00");
        let result = pipeline().run_document("statement.pdf", text.as_bytes(), &nothing_known());

        let outcome = result.outcome().unwrap();
        assert!(!outcome.validation.valid);
        assert_eq!(outcome.validation.discrepancies.len(), 1);
    }

    #[test]
    fn test_run_document_sanitizes_name() {
        let result =
            pipeline().run_document("inbox/../statement.pdf", STATEMENT.as_bytes(), &nothing_known());
        assert_eq!(result.outcome().unwrap().document.file_name, "statement.pdf");
    }
}
