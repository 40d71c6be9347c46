//! Identity history file
//!
//! Stores the identities of recorded imports as JSON Lines, one
//! [`ImportIdentity`] per line. The file is only ever appended to, so a run
//! that dies half way leaves every earlier line intact.

use crate::types::{ImportError, ImportIdentity};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

/// Load every identity recorded in `path`
///
/// A missing file is an empty history. Blank lines are skipped.
///
/// # Errors
///
/// `Io` when the file cannot be read or a line is not a valid identity; the
/// message names the line.
pub fn load_history(path: &Path) -> Result<Vec<ImportIdentity>, ImportError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut identities = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let identity = serde_json::from_str(&line).map_err(|e| ImportError::Io {
            message: format!("{}:{}: invalid history entry: {}", path.display(), index + 1, e),
        })?;
        identities.push(identity);
    }
    Ok(identities)
}

/// Append `identities` to the history in `path`, creating it if needed
pub fn append_history(path: &Path, identities: &[ImportIdentity]) -> Result<(), ImportError> {
    if identities.is_empty() {
        return Ok(());
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    for identity in identities {
        serde_json::to_writer(&mut writer, identity).map_err(|e| ImportError::Io {
            message: format!("failed to serialize identity: {}", e),
        })?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind as ImportErrorKind;
    use tempfile::TempDir;

    fn identity(n: u8) -> ImportIdentity {
        ImportIdentity {
            content_checksum: format!("{:064x}", n),
            semantic_key: format!("BG00UBBS0000123456789{}|2024-01-01|2024-01-31", n),
            statement_id: format!("{:032x}", n),
        }
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let dir = TempDir::new().unwrap();
        let history = load_history(&dir.path().join("history.jsonl")).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn test_appends_accumulate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.jsonl");

        append_history(&path, &[identity(1)]).unwrap();
        append_history(&path, &[identity(2), identity(3)]).unwrap();

        let history = load_history(&path).unwrap();
        assert_eq!(history, vec![identity(1), identity(2), identity(3)]);
    }

    #[test]
    fn test_empty_append_does_not_create_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.jsonl");

        append_history(&path, &[]).unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.jsonl");
        append_history(&path, &[identity(1)]).unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(b"\n  \n")
            .unwrap();

        assert_eq!(load_history(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_line_names_its_position() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.jsonl");
        append_history(&path, &[identity(1)]).unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(b"{not json}\n")
            .unwrap();

        let err = load_history(&path).unwrap_err();

        assert_eq!(err.kind(), ImportErrorKind::Io);
        assert!(err.to_string().contains(":2: invalid history entry"));
    }
}
