//! Error types for the invoice-extract library.
//!
//! Every failure the upload flow can hit is a variant of [`ExtractError`].
//! None of them are fatal: [`crate::controller::UploadController`] catches
//! each one where it happens, turns it into an error toast, and leaves its
//! state consistent. The error is still returned so a front end can pick an
//! exit status or log it.
//!
//! [`ErrorKind`] groups the variants into the broad classes a UI cares about:
//! validation (nothing was sent), transport, application and clipboard.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the invoice-extract library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// MIME type is not on the allow-list.
    #[error("Only JPG, PNG, and PDF files are allowed.")]
    UnsupportedType { name: String, mime: String },

    /// File exceeds the configured size limit.
    #[error("File is too large. Max {max_display} allowed.")]
    FileTooLarge {
        name: String,
        size: u64,
        max: u64,
        max_display: String,
    },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The file was selected but could not be read at upload time.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Transport errors ──────────────────────────────────────────────────
    /// The request never produced an HTTP response.
    #[error("Could not reach extraction service at '{endpoint}': {reason}")]
    Transport { endpoint: String, reason: String },

    /// No response arrived within the configured timeout.
    #[error("Extraction service at '{endpoint}' did not respond within {secs}s")]
    Timeout { endpoint: String, secs: u64 },

    // ── Application errors ────────────────────────────────────────────────
    /// The service answered with a non-2xx status or an explicit `error` field.
    ///
    /// Displays as the service's message alone so it can be shown verbatim.
    #[error("{message}")]
    Application { status: Option<u16>, message: String },

    /// The service answered 2xx but the body was not a usable result.
    #[error("Unexpected response from extraction service: {reason}")]
    InvalidResponse { reason: String },

    // ── Clipboard errors ──────────────────────────────────────────────────
    /// Copying the JSON view failed.
    #[error("Failed to copy: {0}")]
    Clipboard(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Broad class of an [`ExtractError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any network call.
    Validation,
    /// The selected file could not be opened or read.
    Input,
    /// Network failure or timeout.
    Transport,
    /// The service reported a failure or sent something unusable.
    Application,
    /// Clipboard write failed.
    Clipboard,
    /// Invalid client configuration.
    Config,
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedType { .. } | Self::FileTooLarge { .. } => ErrorKind::Validation,
            Self::FileNotFound { .. } | Self::PermissionDenied { .. } | Self::ReadFailed { .. } => {
                ErrorKind::Input
            }
            Self::Transport { .. } | Self::Timeout { .. } => ErrorKind::Transport,
            Self::Application { .. } | Self::InvalidResponse { .. } => ErrorKind::Application,
            Self::Clipboard(_) => ErrorKind::Clipboard,
            Self::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    /// True for errors raised before anything was sent.
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}
