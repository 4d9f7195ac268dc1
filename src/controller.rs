//! The upload state machine.
//!
//! [`UploadController`] owns the single piece of user state (the selected
//! file) and moves through four phases:
//!
//! ```text
//! Idle ──select_file──▶ FileSelected ──submit──▶ Submitting ──ok──▶ Results
//!  ▲                        │  ▲                      │                 │
//!  └──── clear_selection ───┘  └────────── err ───────┘                 │
//!  └───────────────────────────── reset ────────────────────────────────┘
//! ```
//!
//! Every operation catches its own failures: the error becomes an error
//! toast, the controller stays in a consistent phase, and the error is also
//! returned for callers that want it. Nothing here knows about a UI toolkit;
//! a front end renders from the accessors and forwards user actions to the
//! transition methods.

use crate::client::SharedExtractor;
use crate::clipboard::{SharedClipboard, SystemClipboard};
use crate::config::ClientConfig;
use crate::error::ExtractError;
use crate::file::{format_bytes, SelectedFile};
use crate::notify::{
    NoopNotifier, Notification, NotificationKind, SharedNotifier, ToastSlot,
};
use crate::output::ExtractionResult;
use crate::render::ResultView;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Toast shown after a successful extraction.
pub const EXTRACTION_SUCCESS: &str = "Extraction successful!";
/// Toast shown after the JSON was copied.
pub const COPY_SUCCESS: &str = "JSON copied to clipboard";

/// Which screen the controller is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Phase {
    /// Drop target shown, submit disabled.
    #[default]
    Idle,
    /// File preview shown, submit enabled.
    FileSelected,
    /// Upload in flight, loading indicator shown.
    Submitting,
    /// Extraction result shown.
    Results,
}

/// What the file preview displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePreview {
    pub name: String,
    /// Human-readable size, e.g. `1.5 MB`.
    pub size: String,
}

/// Drives selection, upload and result display for one user.
pub struct UploadController {
    config: ClientConfig,
    extractor: SharedExtractor,
    notifier: SharedNotifier,
    clipboard: SharedClipboard,
    phase: Phase,
    selected: Option<SelectedFile>,
    drag_active: bool,
    result: Option<(ExtractionResult, ResultView)>,
    toast: ToastSlot,
}

impl UploadController {
    /// Create a controller in the Idle phase.
    ///
    /// Notifications go nowhere and copies use the system clipboard until
    /// replaced with [`Self::with_notifier`] / [`Self::with_clipboard`].
    pub fn new(config: ClientConfig, extractor: SharedExtractor) -> Self {
        Self {
            config,
            extractor,
            notifier: Arc::new(NoopNotifier),
            clipboard: Arc::new(SystemClipboard::new()),
            phase: Phase::Idle,
            selected: None,
            drag_active: false,
            result: None,
            toast: ToastSlot::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: SharedNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_clipboard(mut self, clipboard: SharedClipboard) -> Self {
        self.clipboard = clipboard;
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        self.phase == Phase::FileSelected && self.selected.is_some()
    }

    /// Whether the drop target or the file preview is on screen.
    pub fn shows_upload_surface(&self) -> bool {
        matches!(self.phase, Phase::Idle | Phase::FileSelected)
    }

    /// Whether a drag is hovering over the drop target.
    pub fn is_drag_active(&self) -> bool {
        self.drag_active
    }

    pub fn file_preview(&self) -> Option<FilePreview> {
        self.selected.as_ref().map(|f| FilePreview {
            name: f.name().to_string(),
            size: format_bytes(f.size(), 2),
        })
    }

    /// The last successful extraction, while it is displayed.
    pub fn result(&self) -> Option<&ExtractionResult> {
        self.result.as_ref().map(|(r, _)| r)
    }

    /// The rendered results screen, while it is displayed.
    pub fn view(&self) -> Option<&ResultView> {
        self.result.as_ref().map(|(_, v)| v)
    }

    /// The toast currently visible, if it has not been dismissed yet.
    pub fn toast(&self) -> Option<&Notification> {
        self.toast.visible()
    }

    /// The most recent toast, visible or not.
    pub fn last_toast(&self) -> Option<&Notification> {
        self.toast.last()
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// Validate and store `file`.
    ///
    /// On failure the stored file and phase are untouched. Selecting while
    /// results are shown starts over with the new file. Ignored while an
    /// upload is in flight.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), ExtractError> {
        if self.phase == Phase::Submitting {
            debug!("Ignoring selection of '{}' during upload", file.name());
            return Ok(());
        }
        if let Err(e) = file.validate(&self.config) {
            return Err(self.fail(e));
        }

        info!(
            "Selected '{}' ({}, {})",
            file.name(),
            format_bytes(file.size(), 2),
            file.mime()
        );
        self.selected = Some(file);
        self.result = None;
        self.transition(Phase::FileSelected);
        Ok(())
    }

    /// Select the first of several files; an empty list does nothing.
    pub fn select_files<I>(&mut self, files: I) -> Result<(), ExtractError>
    where
        I: IntoIterator<Item = SelectedFile>,
    {
        match files.into_iter().next() {
            Some(file) => self.select_file(file),
            None => Ok(()),
        }
    }

    /// A drag entered or moved over the drop target.
    pub fn drag_over(&mut self) {
        self.drag_active = true;
    }

    /// The drag left the drop target without dropping.
    pub fn drag_leave(&mut self) {
        self.drag_active = false;
    }

    /// Files were dropped onto the drop target.
    pub fn drop_files<I>(&mut self, files: I) -> Result<(), ExtractError>
    where
        I: IntoIterator<Item = SelectedFile>,
    {
        self.drag_active = false;
        self.select_files(files)
    }

    /// Discard the selected file and show the drop target again.
    pub fn clear_selection(&mut self) {
        if let Some(file) = self.selected.take() {
            debug!("Removed '{}'", file.name());
        }
        self.result = None;
        self.transition(Phase::Idle);
    }

    /// Return to Idle from any phase, dropping the file and any result.
    pub fn reset(&mut self) {
        self.selected = None;
        self.result = None;
        self.drag_active = false;
        self.transition(Phase::Idle);
    }

    /// Upload the selected file and show the result.
    ///
    /// Only acts in FileSelected; anywhere else (no file, results already
    /// shown) it does nothing. On failure the controller goes back to
    /// FileSelected with the file kept, so the user can retry.
    pub async fn submit(&mut self) -> Result<(), ExtractError> {
        let file = match &self.selected {
            Some(file) if self.can_submit() => file.clone(),
            _ => {
                debug!("Submit ignored in phase {:?}", self.phase);
                return Ok(());
            }
        };

        self.transition(Phase::Submitting);
        let extractor = Arc::clone(&self.extractor);
        let outcome = match self.config.request_timeout_secs {
            Some(secs) => {
                match tokio::time::timeout(Duration::from_secs(secs), extractor.extract(&file))
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => Err(ExtractError::Timeout {
                        endpoint: extractor.endpoint().to_string(),
                        secs,
                    }),
                }
            }
            None => extractor.extract(&file).await,
        };

        match outcome {
            Ok(result) => {
                info!(
                    "Extracted '{}': {} line items",
                    file.name(),
                    result.line_items.len()
                );
                let view = ResultView::from_result(&result);
                self.result = Some((result, view));
                self.transition(Phase::Results);
                self.show(EXTRACTION_SUCCESS, NotificationKind::Success);
                Ok(())
            }
            Err(e) => {
                self.transition(Phase::FileSelected);
                Err(self.fail(e))
            }
        }
    }

    /// Copy the displayed JSON to the clipboard.
    pub fn copy_result_json(&mut self) -> Result<(), ExtractError> {
        let displayed = match self.view() {
            Some(view) if self.phase == Phase::Results => Some(view.json.clone()),
            _ => None,
        };
        let Some(json) = displayed else {
            return Err(self.fail(ExtractError::Clipboard(
                "no extraction result is displayed".into(),
            )));
        };

        match self.clipboard.write_text(&json) {
            Ok(()) => {
                debug!("Copied {} bytes of JSON", json.len());
                self.show(COPY_SUCCESS, NotificationKind::Success);
                Ok(())
            }
            Err(reason) => Err(self.fail(ExtractError::Clipboard(reason))),
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn transition(&mut self, to: Phase) {
        let from = self.phase;
        if from == to {
            return;
        }
        debug!("Phase {:?} → {:?}", from, to);
        self.phase = to;
        self.notifier.on_transition(from, to);
    }

    fn show(&mut self, message: impl Into<String>, kind: NotificationKind) {
        let notification = Notification::new(
            message,
            kind,
            Duration::from_millis(self.config.toast_duration_ms),
        );
        self.notifier.notify(&notification);
        self.toast.show_at(notification, Instant::now());
    }

    /// Report `err` as an error toast and hand it back.
    fn fail(&mut self, err: ExtractError) -> ExtractError {
        warn!("{}", err);
        self.show(err.to_string(), NotificationKind::Error);
        err
    }
}
