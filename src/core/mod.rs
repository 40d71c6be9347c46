//! Core import pipeline
//!
//! This module contains the pure pipeline stages and their orchestration:
//! - `archive_guard` - Safe decompression of password-protected archives
//! - `parser` - Statement text to structured statement
//! - `validator` - Balance consistency checks
//! - `dedup` - Import identities and duplicate detection
//! - `pipeline` - Stage sequencing into a single result
//! - `gaps` - Missing-statement detection across imports
//! - `traits` - Seams for text extraction and identity storage
//!
//! Nothing in here performs filesystem or network I/O.

pub mod archive_guard;
pub mod dedup;
pub mod gaps;
pub mod parser;
pub mod pipeline;
pub mod traits;
pub mod validator;

pub use archive_guard::{sanitize_filename, ArchiveDocument, ArchiveGuard, ArchiveLimits};
pub use dedup::{identify, is_duplicate, transaction_id};
pub use gaps::{detect_gaps, Gap, StatementSummary};
pub use parser::parse;
pub use pipeline::{ImportPipeline, PipelineConfig, RawArchive};
pub use traits::{IdentityLookup, IdentityStore, TextExtractor};
pub use validator::{BalanceValidator, Tolerance};
