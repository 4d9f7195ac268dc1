//! # invoice-extract
//!
//! Upload an invoice (PDF, JPEG or PNG) to an extraction service and render
//! the structured result: vendor, invoice number, line items, and the raw
//! JSON.
//!
//! ## Flow
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Select    validate MIME type and size (no network yet)
//!  ├─ 2. Submit    multipart POST to the extraction endpoint
//!  ├─ 3. Parse     { data: … } or { error: "…" }
//!  └─ 4. Render    summary with placeholders, item table, pretty JSON
//! ```
//!
//! All of it is driven by [`UploadController`], an explicit state machine
//! (Idle → FileSelected → Submitting → Results) that knows nothing about any
//! UI toolkit. Front ends read its accessors and call its transition methods.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use invoice_extract::{ClientConfig, HttpExtractor, SelectedFile, UploadController};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::default();
//!     let extractor = Arc::new(HttpExtractor::new(&config)?);
//!     let mut controller = UploadController::new(config, extractor);
//!
//!     controller.select_file(SelectedFile::from_path("invoice.pdf")?)?;
//!     controller.submit().await?;
//!
//!     if let Some(view) = controller.view() {
//!         println!("{view}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature     | Default | Description |
//! |-------------|---------|-------------|
//! | `cli`       | on      | Enables the `invoice-extract` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `clipboard` | on      | System clipboard for the copy-JSON control (arboard) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod error;
pub mod file;
pub mod notify;
pub mod output;
pub mod render;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{parse_response, Extractor, HttpExtractor};
pub use clipboard::{ClipboardSink, SystemClipboard};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use controller::{FilePreview, Phase, UploadController};
pub use error::{ErrorKind, ExtractError};
pub use file::SelectedFile;
pub use notify::{Notification, NotificationKind, Notifier};
pub use output::{ExtractionResult, FieldValue, LineItem};
pub use render::{ItemRow, ItemsTable, ResultView, Summary};
