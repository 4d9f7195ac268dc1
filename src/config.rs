//! Configuration for the upload client and controller.
//!
//! Everything tunable lives in [`ClientConfig`], built through
//! [`ClientConfigBuilder`] so callers only set what they care about and keep
//! the documented defaults for the rest.

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};

/// Default extraction endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/upload";

/// Default multipart field name carrying the file.
pub const DEFAULT_FIELD_NAME: &str = "file";

/// Default upload size limit: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// MIME types accepted by default.
pub const DEFAULT_ALLOWED_TYPES: [&str; 3] = ["image/jpeg", "image/png", "application/pdf"];

/// Configuration for an upload session.
///
/// # Example
/// ```rust
/// use invoice_extract::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .endpoint("https://extract.example.com/api/upload")
///     .request_timeout_secs(Some(30))
///     .build()
///     .unwrap();
/// assert_eq!(config.max_file_size, 10 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Extraction service URL receiving the POST. Default: [`DEFAULT_ENDPOINT`].
    pub endpoint: String,

    /// Multipart field name for the file. Default: `file`.
    pub field_name: String,

    /// Largest accepted file in bytes, inclusive. Default: 10 485 760.
    pub max_file_size: u64,

    /// MIME types accepted by validation. Default: JPEG, PNG, PDF.
    pub allowed_types: Vec<String>,

    /// Upper bound on one upload/response exchange. Default: 120 s.
    ///
    /// `None` waits forever; a hung service then leaves the controller in
    /// the Submitting phase until the future is dropped.
    pub request_timeout_secs: Option<u64>,

    /// How long a toast stays visible, in milliseconds. Default: 3000.
    pub toast_duration_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            field_name: DEFAULT_FIELD_NAME.to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_types: DEFAULT_ALLOWED_TYPES.iter().map(|s| s.to_string()).collect(),
            request_timeout_secs: Some(120),
            toast_duration_ms: 3000,
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Whether `mime` is on the allow-list. Comparison ignores ASCII case.
    pub fn allows_type(&self, mime: &str) -> bool {
        self.allowed_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(mime))
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn field_name(mut self, name: impl Into<String>) -> Self {
        self.config.field_name = name.into();
        self
    }

    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    pub fn allowed_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.allowed_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn request_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn toast_duration_ms(mut self, ms: u64) -> Self {
        self.config.toast_duration_ms = ms;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, ExtractError> {
        let c = &self.config;
        match reqwest::Url::parse(&c.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ExtractError::InvalidConfig(format!(
                    "endpoint must be http or https, got '{}'",
                    url.scheme()
                )))
            }
            Err(e) => {
                return Err(ExtractError::InvalidConfig(format!(
                    "endpoint '{}' is not a valid URL: {}",
                    c.endpoint, e
                )))
            }
        }
        if c.field_name.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "multipart field name must not be empty".into(),
            ));
        }
        if c.max_file_size == 0 {
            return Err(ExtractError::InvalidConfig(
                "max file size must be ≥ 1 byte".into(),
            ));
        }
        if c.allowed_types.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "at least one MIME type must be allowed".into(),
            ));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(ExtractError::InvalidConfig(
                "request timeout must be ≥ 1s (use None to disable)".into(),
            ));
        }
        Ok(self.config)
    }
}
