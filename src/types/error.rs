//! Error types for the statement import pipeline
//!
//! This module defines every failure the pipeline can report to its caller.
//! Errors are designed to be classified: each variant maps to an [`ErrorKind`]
//! so the host can decide whether a failed import is worth retrying.
//!
//! # Error Categories
//!
//! - **Archive Errors**: oversized payloads, ZIP bombs, path traversal, bad passwords
//! - **Extraction Errors**: the text extractor could not read the document
//! - **Parse Errors**: missing header fields, malformed numbers or dates, unreadable blocks
//! - **Identity Errors**: a statement lacks the fields needed for its dedup key
//! - **Host Errors**: timeouts and I/O performed by the CLI around the core

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Main error type for the import pipeline
///
/// Each variant includes the context needed for audit logging by the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
    /// The payload exceeds a configured size limit
    ///
    /// Raised before decompression for the compressed payload, and during
    /// decompression for the uncompressed ceiling.
    #[error("Archive too large: {actual} {measure} bytes exceeds limit of {limit}")]
    ArchiveTooLarge {
        /// Which size was measured ("compressed" or "uncompressed")
        measure: String,
        /// Observed size in bytes
        actual: u64,
        /// Configured maximum in bytes
        limit: u64,
    },

    /// An entry expands disproportionately to its compressed size
    #[error("Compression ratio {ratio}:1 for entry '{entry}' exceeds maximum {limit}:1")]
    CompressionRatioExceeded {
        /// Entry name as stored in the archive
        entry: String,
        /// Observed ratio (rounded down)
        ratio: u64,
        /// Configured maximum ratio
        limit: u64,
    },

    /// An entry name tries to escape the extraction root
    #[error("Path traversal attempt in archive entry '{entry}'")]
    PathTraversalAttempt {
        /// Entry name with control characters escaped
        entry: String,
    },

    /// The configured password does not decrypt the document
    #[error("Invalid password for archive entry '{entry}'")]
    InvalidPassword {
        /// Entry that failed to decrypt
        entry: String,
    },

    /// The payload is not a readable ZIP archive
    #[error("Invalid archive: {message}")]
    InvalidArchive {
        /// Description of the structural problem
        message: String,
    },

    /// The archive holds more entries than allowed
    #[error("Too many entries in archive: {count} (max: {limit})")]
    TooManyEntries {
        /// Number of entries found
        count: usize,
        /// Configured maximum
        limit: usize,
    },

    /// No entry with the expected document extension exists
    #[error("No '{extension}' document found in archive")]
    DocumentNotFound {
        /// Extension that was searched for
        extension: String,
    },

    /// The text extractor failed on the document bytes
    #[error("Text extraction failed: {message}")]
    ExtractionFailed {
        /// Extractor-provided description
        message: String,
        /// Whether the same input may succeed on a later attempt
        retryable: bool,
    },

    /// A required header field matched none of its patterns
    #[error("Required header field '{field}' is missing")]
    HeaderFieldMissing {
        /// Name of the missing field
        field: String,
    },

    /// A numeric token is malformed or ambiguous
    #[error("Malformed numeric value '{value}' in {field}")]
    MalformedNumericValue {
        /// Field or context the token belongs to
        field: String,
        /// The raw token
        value: String,
    },

    /// A date token could not be interpreted
    #[error("Malformed date '{value}' in {field}")]
    MalformedDate {
        /// Field or context the token belongs to
        field: String,
        /// The raw token
        value: String,
    },

    /// The account IBAN does not match the expected structure
    #[error("Invalid IBAN '{value}'")]
    InvalidIban {
        /// The extracted value
        value: String,
    },

    /// The statement period ends before it starts
    #[error("Invalid statement period: {start} is after {end}")]
    InvalidPeriod {
        /// Period start as written in the document
        start: String,
        /// Period end as written in the document
        end: String,
    },

    /// A date-led block carries no amount
    #[error("Unrecognized transaction block at line {line}: '{text}'")]
    UnrecognizedTransactionBlock {
        /// 1-based line number of the block start
        line: usize,
        /// First line of the block
        text: String,
    },

    /// A statement lacks a field needed for its identity key
    #[error("Cannot build import identity: '{field}' is empty")]
    MissingIdentityField {
        /// Name of the empty field
        field: String,
    },

    /// A bounded operation ran out of time
    #[error("Timed out after {elapsed_ms} ms during {operation}")]
    Timeout {
        /// What was running
        operation: String,
        /// Elapsed time in milliseconds
        elapsed_ms: u64,
    },

    /// I/O error outside the pure core (reading inputs, writing reports)
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },
}

/// Error classification, independent of the context carried by [`ImportError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    ArchiveTooLarge,
    CompressionRatioExceeded,
    PathTraversalAttempt,
    InvalidPassword,
    InvalidArchive,
    TooManyEntries,
    DocumentNotFound,
    ExtractionFailed,
    HeaderFieldMissing,
    MalformedNumericValue,
    MalformedDate,
    InvalidIban,
    InvalidPeriod,
    UnrecognizedTransactionBlock,
    MissingIdentityField,
    Timeout,
    Io,
}

/// Pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Archive,
    Extraction,
    Parsing,
    Validation,
    Dedup,
    /// Work done by the host around the core (timeouts, file reads)
    Host,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Archive => "archive",
            Stage::Extraction => "extraction",
            Stage::Parsing => "parsing",
            Stage::Validation => "validation",
            Stage::Dedup => "dedup",
            Stage::Host => "host",
        };
        f.write_str(name)
    }
}

impl ImportError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::ArchiveTooLarge { .. } => ErrorKind::ArchiveTooLarge,
            ImportError::CompressionRatioExceeded { .. } => ErrorKind::CompressionRatioExceeded,
            ImportError::PathTraversalAttempt { .. } => ErrorKind::PathTraversalAttempt,
            ImportError::InvalidPassword { .. } => ErrorKind::InvalidPassword,
            ImportError::InvalidArchive { .. } => ErrorKind::InvalidArchive,
            ImportError::TooManyEntries { .. } => ErrorKind::TooManyEntries,
            ImportError::DocumentNotFound { .. } => ErrorKind::DocumentNotFound,
            ImportError::ExtractionFailed { .. } => ErrorKind::ExtractionFailed,
            ImportError::HeaderFieldMissing { .. } => ErrorKind::HeaderFieldMissing,
            ImportError::MalformedNumericValue { .. } => ErrorKind::MalformedNumericValue,
            ImportError::MalformedDate { .. } => ErrorKind::MalformedDate,
            ImportError::InvalidIban { .. } => ErrorKind::InvalidIban,
            ImportError::InvalidPeriod { .. } => ErrorKind::InvalidPeriod,
            ImportError::UnrecognizedTransactionBlock { .. } => {
                ErrorKind::UnrecognizedTransactionBlock
            }
            ImportError::MissingIdentityField { .. } => ErrorKind::MissingIdentityField,
            ImportError::Timeout { .. } => ErrorKind::Timeout,
            ImportError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Whether the same input may succeed if submitted again
    ///
    /// Structural archive violations and content errors always fail the same
    /// way; only timeouts and transient extractor failures are retry candidates.
    pub fn is_retryable(&self) -> bool {
        match self {
            ImportError::Timeout { .. } => true,
            ImportError::ExtractionFailed { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(error: std::io::Error) -> Self {
        ImportError::Io {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl ImportError {
    /// Create an ArchiveTooLarge error
    pub fn archive_too_large(measure: &str, actual: u64, limit: u64) -> Self {
        ImportError::ArchiveTooLarge {
            measure: measure.to_string(),
            actual,
            limit,
        }
    }

    /// Create a CompressionRatioExceeded error
    pub fn compression_ratio_exceeded(entry: &str, ratio: u64, limit: u64) -> Self {
        ImportError::CompressionRatioExceeded {
            entry: entry.to_string(),
            ratio,
            limit,
        }
    }

    /// Create a PathTraversalAttempt error, escaping control characters in the name
    pub fn path_traversal(entry: &str) -> Self {
        ImportError::PathTraversalAttempt {
            entry: entry.escape_default().to_string(),
        }
    }

    /// Create an InvalidPassword error
    pub fn invalid_password(entry: &str) -> Self {
        ImportError::InvalidPassword {
            entry: entry.to_string(),
        }
    }

    /// Create an InvalidArchive error
    pub fn invalid_archive(message: impl Into<String>) -> Self {
        ImportError::InvalidArchive {
            message: message.into(),
        }
    }

    /// Create an ExtractionFailed error
    pub fn extraction_failed(message: impl Into<String>, retryable: bool) -> Self {
        ImportError::ExtractionFailed {
            message: message.into(),
            retryable,
        }
    }

    /// Create a HeaderFieldMissing error
    pub fn header_field_missing(field: &str) -> Self {
        ImportError::HeaderFieldMissing {
            field: field.to_string(),
        }
    }

    /// Create a MalformedNumericValue error
    pub fn malformed_number(field: &str, value: &str) -> Self {
        ImportError::MalformedNumericValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Create a MalformedDate error
    pub fn malformed_date(field: &str, value: &str) -> Self {
        ImportError::MalformedDate {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an UnrecognizedTransactionBlock error
    pub fn unrecognized_block(line: usize, text: &str) -> Self {
        ImportError::UnrecognizedTransactionBlock {
            line,
            text: text.trim().to_string(),
        }
    }

    /// Create a MissingIdentityField error
    pub fn missing_identity_field(field: &str) -> Self {
        ImportError::MissingIdentityField {
            field: field.to_string(),
        }
    }

    /// Create a Timeout error
    pub fn timeout(operation: &str, elapsed_ms: u64) -> Self {
        ImportError::Timeout {
            operation: operation.to_string(),
            elapsed_ms,
        }
    }
}
