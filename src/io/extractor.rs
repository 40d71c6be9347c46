//! Text extractor adapters
//!
//! The pipeline only sees the [`TextExtractor`] trait. [`PlainTextExtractor`]
//! accepts documents that already are text (test fixtures, statements saved
//! from the bank portal as `.txt`); [`PdfTextExtractor`] is available with the
//! `pdf` feature.

use crate::core::TextExtractor;
use crate::types::ImportError;

/// Extractor for UTF-8 text documents
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, document: &[u8]) -> Result<String, ImportError> {
        let text = std::str::from_utf8(document).map_err(|e| {
            ImportError::extraction_failed(format!("document is not UTF-8 text: {}", e), false)
        })?;
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }
}

/// Extractor for PDF documents
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

#[cfg(feature = "pdf")]
impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, document: &[u8]) -> Result<String, ImportError> {
        let text = pdf_extract::extract_text_from_mem(document)
            .map_err(|e| ImportError::extraction_failed(format!("failed to read PDF: {}", e), false))?;
        if text.trim().is_empty() {
            // Scanned statements have no text layer
            return Err(ImportError::extraction_failed(
                "PDF contains no extractable text",
                false,
            ));
        }
        Ok(text)
    }
}

/// The extractor matching the enabled features
pub fn default_extractor() -> Box<dyn TextExtractor> {
    #[cfg(feature = "pdf")]
    {
        Box::new(PdfTextExtractor)
    }
    #[cfg(not(feature = "pdf"))]
    {
        Box::new(PlainTextExtractor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;

    #[test]
    fn test_plain_text_passes_through() {
        let text = PlainTextExtractor
            .extract_text("Начално салдо: 1.00".as_bytes())
            .unwrap();
        assert_eq!(text, "Начално салдо: 1.00");
    }

    #[test]
    fn test_byte_order_mark_is_dropped() {
        let text = PlainTextExtractor
            .extract_text("\u{feff}Обороти:".as_bytes())
            .unwrap();
        assert_eq!(text, "Обороти:");
    }

    #[test]
    fn test_binary_document_is_not_retryable() {
        let err = PlainTextExtractor
            .extract_text(&[0x25, 0x50, 0x44, 0x46, 0xff, 0xfe])
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ExtractionFailed);
        assert!(!err.is_retryable());
    }
}
