//! The user's chosen input file and its validation.
//!
//! A [`SelectedFile`] mirrors what a browser hands over on selection or
//! drop: a name, a size, a MIME type, and a reference to the content. For
//! on-disk files the bytes are read lazily at upload time, so a rejected
//! oversized file is never loaded into memory.

use crate::config::ClientConfig;
use crate::error::ExtractError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Where the file's bytes come from.
#[derive(Clone)]
pub enum FileSource {
    /// Content already in memory (drag-and-drop payloads, tests).
    Memory(Arc<[u8]>),
    /// Content on disk, read when the upload starts.
    Disk(PathBuf),
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSource::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
            FileSource::Disk(path) => f.debug_tuple("Disk").field(path).finish(),
        }
    }
}

/// A file chosen through the picker or dropped onto the drop target.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    size: u64,
    mime: String,
    source: FileSource,
}

impl SelectedFile {
    /// Wrap in-memory content. `size` is the byte length.
    pub fn from_bytes(
        name: impl Into<String>,
        mime: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let bytes: Arc<[u8]> = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            mime: mime.into(),
            source: FileSource::Memory(bytes),
        }
    }

    /// Resolve a local path without reading its content.
    ///
    /// The MIME type is guessed from the extension; unknown extensions get
    /// an empty type, which validation then rejects.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let path = path.as_ref().to_path_buf();

        let meta = match std::fs::metadata(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(ExtractError::PermissionDenied { path });
            }
            Err(_) => return Err(ExtractError::FileNotFound { path }),
        };
        if !meta.is_file() {
            return Err(ExtractError::FileNotFound { path });
        }

        let mime = mime_guess::from_path(&path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!("Resolved {} ({} bytes, '{}')", path.display(), meta.len(), mime);
        Ok(Self {
            name,
            size: meta.len(),
            mime,
            source: FileSource::Disk(path),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// MIME type; empty when unknown.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// Check the file against the allow-list, then the size limit.
    pub fn validate(&self, config: &ClientConfig) -> Result<(), ExtractError> {
        if !config.allows_type(&self.mime) {
            return Err(ExtractError::UnsupportedType {
                name: self.name.clone(),
                mime: self.mime.clone(),
            });
        }
        if self.size > config.max_file_size {
            return Err(ExtractError::FileTooLarge {
                name: self.name.clone(),
                size: self.size,
                max: config.max_file_size,
                max_display: size_limit_text(config.max_file_size),
            });
        }
        Ok(())
    }

    /// Load the content for upload.
    pub async fn read_bytes(&self) -> Result<Vec<u8>, ExtractError> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.to_vec()),
            FileSource::Disk(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| ExtractError::ReadFailed {
                        path: path.clone(),
                        source,
                    })
            }
        }
    }
}

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size with base-1024 units and trailing zeros trimmed.
///
/// ```rust
/// use invoice_extract::file::format_bytes;
///
/// assert_eq!(format_bytes(0, 2), "0 Bytes");
/// assert_eq!(format_bytes(1536, 2), "1.5 KB");
/// assert_eq!(format_bytes(10 * 1024 * 1024, 2), "10 MB");
/// ```
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    while unit + 1 < UNITS.len() && bytes >= 1024u64.pow(unit as u32 + 1) {
        unit += 1;
    }

    let value = bytes as f64 / 1024f64.powi(unit as i32);
    let mut text = format!("{value:.decimals$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    format!("{} {}", text, UNITS[unit])
}

/// Size limit as written in the rejection toast: `10MB`, `512KB`.
fn size_limit_text(bytes: u64) -> String {
    let text = format_bytes(bytes, 2);
    if text.ends_with(" Bytes") {
        text
    } else {
        text.replacen(' ', "", 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn pdf_of_size(size: usize) -> SelectedFile {
        SelectedFile::from_bytes("invoice.pdf", "application/pdf", vec![0u8; size])
    }

    #[test]
    fn format_bytes_matches_preview_text() {
        assert_eq!(format_bytes(0, 2), "0 Bytes");
        assert_eq!(format_bytes(500, 2), "500 Bytes");
        assert_eq!(format_bytes(1024, 2), "1 KB");
        assert_eq!(format_bytes(1536, 2), "1.5 KB");
        assert_eq!(format_bytes(1_234_567, 2), "1.18 MB");
        assert_eq!(format_bytes(10_485_760, 2), "10 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024, 2), "3 GB");
        assert_eq!(format_bytes(1536, 0), "2 KB");
    }

    #[test]
    fn format_bytes_caps_at_gigabytes() {
        assert_eq!(format_bytes(2048 * 1024 * 1024 * 1024, 2), "2048 GB");
    }

    #[test]
    fn size_limit_text_has_no_unit_space() {
        assert_eq!(size_limit_text(10_485_760), "10MB");
        assert_eq!(size_limit_text(512 * 1024), "512KB");
        assert_eq!(size_limit_text(500), "500 Bytes");

        let err = pdf_of_size(10_485_761)
            .validate(&ClientConfig::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "File is too large. Max 10MB allowed.");
    }

    #[test]
    fn size_limit_is_inclusive() {
        let config = ClientConfig::default();
        assert!(pdf_of_size(10_485_760).validate(&config).is_ok());

        let err = pdf_of_size(10_485_761).validate(&config).unwrap_err();
        assert!(matches!(err, ExtractError::FileTooLarge { size: 10_485_761, .. }));
    }

    #[test]
    fn type_checked_before_size() {
        let config = ClientConfig::default();
        let gif = SelectedFile::from_bytes("anim.gif", "image/gif", vec![0u8; 11 * 1024 * 1024]);
        let err = gif.validate(&config).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedType { .. }));
    }

    #[test]
    fn from_path_guesses_mime_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.PNG");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(&[0x89, b'P', b'N', b'G', 0, 0]).unwrap();

        let file = SelectedFile::from_path(&path).unwrap();
        assert_eq!(file.name(), "receipt.PNG");
        assert_eq!(file.mime(), "image/png");
        assert_eq!(file.size(), 6);
        assert!(matches!(file.source(), FileSource::Disk(_)));
    }

    #[test]
    fn from_path_unknown_extension_has_empty_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.zzz-unknown");
        std::fs::write(&path, b"hello").unwrap();

        let file = SelectedFile::from_path(&path).unwrap();
        assert_eq!(file.mime(), "");
        assert!(file.validate(&ClientConfig::default()).is_err());
    }

    #[test]
    fn from_path_missing_file() {
        let err = SelectedFile::from_path("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[test]
    fn from_path_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = SelectedFile::from_path(dir.path()).unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn read_bytes_from_disk_and_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let on_disk = SelectedFile::from_path(&path).unwrap();
        assert_eq!(on_disk.read_bytes().await.unwrap(), b"%PDF-1.7");

        std::fs::remove_file(&path).unwrap();
        let err = on_disk.read_bytes().await.unwrap_err();
        assert!(matches!(err, ExtractError::ReadFailed { .. }));

        let in_memory = SelectedFile::from_bytes("a.pdf", "application/pdf", b"abc".to_vec());
        assert_eq!(in_memory.read_bytes().await.unwrap(), b"abc");
    }
}
