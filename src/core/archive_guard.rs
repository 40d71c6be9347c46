//! Archive guard
//!
//! Opens a password-protected ZIP attachment and returns the raw bytes of the
//! single statement document it carries. Nothing inside the archive is trusted
//! until it has passed every check:
//!
//! - the compressed payload must fit `max_archive_bytes` (checked before parsing)
//! - entry names must not contain null bytes, absolute paths or `..` components
//! - declared sizes must respect the uncompressed ceiling and the ratio limit
//! - while decompressing, the running ratio of produced bytes to consumed
//!   compressed bytes, the uncompressed ceiling and the wall-clock budget are
//!   enforced on every chunk, so a header that lies about sizes cannot get
//!   past the limits even momentarily
//!
//! The guard never touches the filesystem. The returned name is sanitized and
//! is metadata only.

use crate::types::ImportError;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::cell::Cell;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::rc::Rc;
use std::time::{Duration, Instant};
use zip::result::ZipError;
use zip::ZipArchive;

const CHUNK_SIZE: usize = 8 * 1024;

/// Resource limits applied while opening an archive
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveLimits {
    /// Maximum size of the compressed payload
    pub max_archive_bytes: u64,
    /// Maximum number of bytes any decompression may produce
    pub max_uncompressed_bytes: u64,
    /// Maximum ratio of uncompressed to compressed bytes
    pub max_compression_ratio: u64,
    /// Maximum number of entries in the archive
    pub max_entries: usize,
    /// Wall-clock budget for decompressing the document
    pub decompression_timeout: Duration,
    /// Extension (including the dot) identifying the statement document
    pub document_extension: String,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        ArchiveLimits {
            max_archive_bytes: 10 * 1024 * 1024,
            max_uncompressed_bytes: 50 * 1024 * 1024,
            max_compression_ratio: 100,
            max_entries: 10,
            decompression_timeout: Duration::from_secs(30),
            document_extension: ".pdf".to_string(),
        }
    }
}

/// The statement document taken out of an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDocument {
    /// Sanitized entry name
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Validates and decompresses statement archives
#[derive(Debug, Clone, Default)]
pub struct ArchiveGuard {
    limits: ArchiveLimits,
}

impl ArchiveGuard {
    pub fn new(limits: ArchiveLimits) -> Self {
        ArchiveGuard { limits }
    }

    pub fn limits(&self) -> &ArchiveLimits {
        &self.limits
    }

    /// Open an archive and return its statement document
    ///
    /// # Errors
    ///
    /// - `ArchiveTooLarge` when the payload or its content exceeds a size limit
    /// - `CompressionRatioExceeded` when an entry expands more than allowed
    /// - `PathTraversalAttempt` for unsafe entry names
    /// - `InvalidPassword` when the password does not decrypt the document
    /// - `TooManyEntries`, `DocumentNotFound`, `InvalidArchive` for structural problems
    /// - `Timeout` when decompression exceeds its wall-clock budget
    pub fn open(&self, raw: &[u8], password: &SecretString) -> Result<ArchiveDocument, ImportError> {
        let started = Instant::now();
        let limits = &self.limits;

        let payload_size = raw.len() as u64;
        if payload_size > limits.max_archive_bytes {
            return Err(ImportError::archive_too_large(
                "compressed",
                payload_size,
                limits.max_archive_bytes,
            ));
        }

        let consumed = Rc::new(Cell::new(0u64));
        let reader = CountingReader {
            inner: Cursor::new(raw),
            consumed: Rc::clone(&consumed),
        };
        let mut archive = ZipArchive::new(reader).map_err(|e| map_zip_error(e, ""))?;

        let entry_count = archive.len();
        if entry_count == 0 {
            return Err(ImportError::invalid_archive("archive is empty"));
        }
        if entry_count > limits.max_entries {
            return Err(ImportError::TooManyEntries {
                count: entry_count,
                limit: limits.max_entries,
            });
        }

        // Inspect every entry before decompressing anything
        let mut declared_total: u64 = 0;
        let mut document: Option<(usize, String, bool)> = None;
        for index in 0..entry_count {
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| map_zip_error(e, ""))?;
            let name = validate_entry_name(entry.name_raw())?;
            if entry.is_dir() {
                continue;
            }

            declared_total = declared_total.saturating_add(entry.size());
            check_ratio(&name, entry.size(), entry.compressed_size(), limits)?;

            if document.is_none() && has_extension(&name, &limits.document_extension) {
                document = Some((index, name, entry.encrypted()));
            }
        }

        if declared_total > limits.max_uncompressed_bytes {
            return Err(ImportError::archive_too_large(
                "uncompressed",
                declared_total,
                limits.max_uncompressed_bytes,
            ));
        }

        let (index, name, encrypted) = document.ok_or_else(|| ImportError::DocumentNotFound {
            extension: limits.document_extension.clone(),
        })?;

        let entry = if encrypted {
            archive.by_index_decrypt(index, password.expose_secret().as_bytes())
        } else {
            archive.by_index(index)
        }
        .map_err(|e| map_zip_error(e, &name))?;

        let baseline = consumed.get();
        let bytes = drain_bounded(
            entry,
            || consumed.get().saturating_sub(baseline),
            &name,
            limits,
            started,
        )?;

        tracing::debug!(
            entry = %name.escape_default(),
            compressed = consumed.get().saturating_sub(baseline),
            uncompressed = bytes.len(),
            "decompressed statement document"
        );

        Ok(ArchiveDocument {
            name: sanitize_filename(&name)?,
            bytes,
        })
    }
}

/// Reader wrapper counting the bytes pulled from the archive payload
struct CountingReader<R> {
    inner: R,
    consumed: Rc<Cell<u64>>,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed.set(self.consumed.get() + n as u64);
        Ok(n)
    }
}

impl<R: Seek> Seek for CountingReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.inner.seek(pos)
    }
}

/// Decompress `reader` chunk by chunk, enforcing every limit after each chunk
///
/// `compressed_consumed` reports how many compressed bytes the decompressor
/// has pulled so far. The ratio check is skipped while it reports zero.
pub(crate) fn drain_bounded<R, F>(
    mut reader: R,
    compressed_consumed: F,
    entry: &str,
    limits: &ArchiveLimits,
    started: Instant,
) -> Result<Vec<u8>, ImportError>
where
    R: Read,
    F: Fn() -> u64,
{
    let mut output = Vec::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(ImportError::invalid_archive(format!(
                    "failed to decompress '{}': {}",
                    entry.escape_default(),
                    e
                )))
            }
        };

        let produced = output.len() as u64 + n as u64;
        if produced > limits.max_uncompressed_bytes {
            return Err(ImportError::archive_too_large(
                "uncompressed",
                produced,
                limits.max_uncompressed_bytes,
            ));
        }

        let consumed = compressed_consumed();
        if consumed > 0 && produced / consumed > limits.max_compression_ratio {
            return Err(ImportError::compression_ratio_exceeded(
                entry,
                produced / consumed,
                limits.max_compression_ratio,
            ));
        }

        let elapsed = started.elapsed();
        if elapsed >= limits.decompression_timeout {
            return Err(ImportError::timeout(
                "decompression",
                elapsed.as_millis() as u64,
            ));
        }

        output.extend_from_slice(&buffer[..n]);
    }

    Ok(output)
}

/// Reject entry names that could escape an extraction root
///
/// Returns the (lossily decoded) name when it is safe to keep as metadata.
pub fn validate_entry_name(raw: &[u8]) -> Result<String, ImportError> {
    let name = String::from_utf8_lossy(raw).into_owned();

    if raw.contains(&0) {
        return Err(ImportError::path_traversal(&name));
    }

    let normalized = name.replace('\\', "/");
    let bytes = normalized.as_bytes();
    let has_drive_prefix = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if normalized.starts_with('/') || has_drive_prefix {
        return Err(ImportError::path_traversal(&name));
    }

    if normalized.split('/').any(|component| component == "..") {
        return Err(ImportError::path_traversal(&name));
    }

    Ok(name)
}

/// Reduce an untrusted file name to a safe base name
///
/// Directory parts, null bytes and `..` sequences are stripped. Names left
/// with characters outside `[A-Za-z0-9_.-]` are replaced by a hash of the
/// name, keeping a safe extension when there is one.
pub fn sanitize_filename(name: &str) -> Result<String, ImportError> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned = base.replace('\0', "").replace("..", "");

    if cleaned.is_empty() || cleaned == "." {
        return Err(ImportError::path_traversal(name));
    }

    if cleaned.chars().all(is_safe_filename_char) {
        return Ok(cleaned);
    }

    let digest = hex::encode(Sha256::digest(cleaned.as_bytes()));
    let extension = cleaned
        .rfind('.')
        .map(|dot| &cleaned[dot..])
        .filter(|ext| ext.len() > 1 && ext.len() <= 9 && ext[1..].chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("");

    Ok(format!("{}{}", &digest[..16], extension.to_ascii_lowercase()))
}

fn is_safe_filename_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn has_extension(name: &str, extension: &str) -> bool {
    name.to_lowercase().ends_with(&extension.to_lowercase())
}

fn check_ratio(
    entry: &str,
    uncompressed: u64,
    compressed: u64,
    limits: &ArchiveLimits,
) -> Result<(), ImportError> {
    if compressed == 0 {
        return Ok(());
    }
    let ratio = uncompressed / compressed;
    if ratio > limits.max_compression_ratio {
        return Err(ImportError::compression_ratio_exceeded(
            entry,
            ratio,
            limits.max_compression_ratio,
        ));
    }
    Ok(())
}

fn map_zip_error(error: ZipError, entry: &str) -> ImportError {
    match error {
        ZipError::InvalidPassword => ImportError::invalid_password(entry),
        other => ImportError::invalid_archive(other.to_string()),
    }
}
