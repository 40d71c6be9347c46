//! Statement Import Library
//! # Overview
//!
//! This library imports password-protected bank statement archives. Each
//! archive is decompressed under strict limits, its statement text is parsed
//! into a header and classified transactions, the balances are checked, and
//! an identity is derived so re-delivered statements are recognised.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Domain data (statement, transaction, money) and the error enum
//! - [`core`] - Pure pipeline stages:
//!   - [`core::archive_guard`] - Safe decompression of untrusted archives
//!   - [`core::parser`] - Statement text to structured statement
//!   - [`core::validator`] - Balance consistency checks
//!   - [`core::dedup`] - Import identities and duplicate detection
//!   - [`core::pipeline`] - Stage orchestration into a `PipelineResult`
//!   - [`core::gaps`] - Missing statements between imports
//! - [`io`] - Text extractors, input files, identity history and reports
//! - [`strategy`] - Sequential or concurrent batch imports
//! - [`cli`] - CLI argument parsing
//! - [`config`] - Environment configuration
//!
//! # Outcomes
//!
//! Every import ends in exactly one of:
//!
//! - **Success**: parsed statement, validation result, identity and whether
//!   the identity was already known. An unbalanced statement is still a
//!   success; `validation.valid` tells the caller it needs review.
//! - **Failure**: the stage that failed, the error kind, a message and
//!   whether retrying the same input could help.

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use config::ImportConfig;
pub use crate::core::{ImportPipeline, PipelineConfig, RawArchive};
pub use io::{BatchReport, ReportEntry};
pub use types::{
    ErrorKind, ImportError, ImportIdentity, ImportOutcome, ParsedStatement, PipelineFailure,
    PipelineResult, Stage, Transaction, TransactionType,
};
