//! I/O module
//!
//! Everything that touches files or external decoders lives here, keeping
//! `core` free of I/O.
//!
//! # Components
//!
//! - `extractor` - Text extractor adapters for the pipeline
//! - `input` - Reading input files and telling archives from documents
//! - `history` - Append-only identity history (JSON Lines)
//! - `report` - JSON batch report and transaction CSV export

pub mod extractor;
pub mod history;
pub mod input;
pub mod report;

#[cfg(feature = "pdf")]
pub use extractor::PdfTextExtractor;
pub use extractor::{default_extractor, PlainTextExtractor};
pub use history::{append_history, load_history};
pub use input::{looks_like_zip, read_input, ImportInput};
pub use report::{
    write_json_report, write_transactions_csv, BatchReport, BatchSummary, ReportEntry,
};
