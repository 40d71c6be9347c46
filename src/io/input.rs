//! Input files
//!
//! The CLI accepts password-protected ZIP attachments as well as documents
//! that were extracted by hand. Which one a file is gets decided by its
//! leading bytes, not its name.

use crate::core::RawArchive;
use crate::types::ImportError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Local file header and empty-archive signatures
const ZIP_SIGNATURES: [&[u8]; 2] = [b"PK\x03\x04", b"PK\x05\x06"];

/// A file read from disk, ready for the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportInput {
    Archive(RawArchive),
    Document { name: String, bytes: Vec<u8> },
}

impl ImportInput {
    pub fn name(&self) -> &str {
        match self {
            ImportInput::Archive(archive) => &archive.name,
            ImportInput::Document { name, .. } => name,
        }
    }
}

/// Whether `bytes` start like a ZIP archive
pub fn looks_like_zip(bytes: &[u8]) -> bool {
    ZIP_SIGNATURES
        .iter()
        .any(|signature| bytes.starts_with(signature))
}

/// Read an input file, refusing to buffer more than `max_bytes`
///
/// # Errors
///
/// `Io` when the file cannot be read, `ArchiveTooLarge` when it exceeds the
/// limit. Oversized files are rejected without being read to the end.
pub fn read_input(path: &Path, max_bytes: u64) -> Result<ImportInput, ImportError> {
    let file = File::open(path).map_err(|e| ImportError::Io {
        message: format!("failed to open '{}': {}", path.display(), e),
    })?;

    let mut bytes = Vec::new();
    file.take(max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)?;
    if bytes.len() as u64 > max_bytes {
        return Err(ImportError::archive_too_large(
            "input",
            bytes.len() as u64,
            max_bytes,
        ));
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if looks_like_zip(&bytes) {
        Ok(ImportInput::Archive(RawArchive::new(name, bytes)))
    } else {
        Ok(ImportInput::Document { name, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[rstest]
    #[case::local_header(b"PK\x03\x04rest", true)]
    #[case::empty_archive(b"PK\x05\x06rest", true)]
    #[case::pdf(b"%PDF-1.4", false)]
    #[case::text("Извлечение".as_bytes(), false)]
    #[case::empty(b"", false)]
    fn test_zip_detection(#[case] bytes: &[u8], #[case] expected: bool) {
        assert_eq!(looks_like_zip(bytes), expected);
    }

    #[test]
    fn test_text_file_is_a_document() {
        let file = temp_file("Крайно салдо".as_bytes());

        let input = read_input(file.path(), 1024).unwrap();

        match input {
            ImportInput::Document { bytes, .. } => assert_eq!(bytes, "Крайно салдо".as_bytes()),
            other => panic!("Expected document, got {:?}", other),
        }
    }

    #[test]
    fn test_zip_file_is_an_archive() {
        let file = temp_file(b"PK\x05\x06\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0");

        let input = read_input(file.path(), 1024).unwrap();

        assert!(matches!(input, ImportInput::Archive(_)));
        assert!(!input.name().is_empty());
    }

    #[test]
    fn test_oversized_file_is_rejected() {
        let file = temp_file(&[b'x'; 64]);

        let err = read_input(file.path(), 63).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ArchiveTooLarge);
    }

    #[test]
    fn test_missing_file() {
        let err = read_input(Path::new("nonexistent.zip"), 1024).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("failed to open"));
    }
}
