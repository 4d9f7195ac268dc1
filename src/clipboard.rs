//! Write-only clipboard access for the copy-JSON control.

use std::sync::Arc;

/// Destination for copied text.
pub trait ClipboardSink: Send + Sync {
    /// Replace the clipboard content with `text`.
    fn write_text(&self, text: &str) -> Result<(), String>;
}

/// Convenience alias for the type held by the controller.
pub type SharedClipboard = Arc<dyn ClipboardSink>;

/// The operating-system clipboard.
///
/// A fresh handle is opened per copy; on headless hosts the open itself
/// fails and the copy is reported as failed.
///
/// On Linux (X11 and Wayland) the copying process owns the clipboard
/// content: once it exits, the text is gone unless a clipboard manager
/// took it over. A long-running front end can use [`SystemClipboard::new`].
/// A process that exits right after copying should use
/// [`SystemClipboard::holding`], which blocks in `write_text` until another
/// program replaces the content.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SystemClipboard {
    hold_until_replaced: bool,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep serving the copied text until something else is copied.
    ///
    /// Only changes behaviour on Linux; elsewhere the OS keeps the text.
    pub fn holding() -> Self {
        Self {
            hold_until_replaced: true,
        }
    }

    /// Whether `write_text` blocks until the content is replaced.
    pub fn holds_until_replaced(&self) -> bool {
        self.hold_until_replaced && cfg!(target_os = "linux")
    }
}

#[cfg(feature = "clipboard")]
impl ClipboardSink for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), String> {
        let mut clipboard = arboard::Clipboard::new().map_err(|err| err.to_string())?;

        #[cfg(target_os = "linux")]
        if self.hold_until_replaced {
            use arboard::SetExtLinux;
            return clipboard
                .set()
                .wait()
                .text(text.to_owned())
                .map_err(|err| err.to_string());
        }

        clipboard
            .set_text(text.to_owned())
            .map_err(|err| err.to_string())
    }
}

#[cfg(not(feature = "clipboard"))]
impl ClipboardSink for SystemClipboard {
    fn write_text(&self, _text: &str) -> Result<(), String> {
        Err("built without clipboard support".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_does_not_hold() {
        assert_eq!(SystemClipboard::new(), SystemClipboard::default());
        assert!(!SystemClipboard::new().holds_until_replaced());
    }

    #[test]
    fn holding_blocks_only_on_linux() {
        assert_eq!(
            SystemClipboard::holding().holds_until_replaced(),
            cfg!(target_os = "linux")
        );
    }
}
