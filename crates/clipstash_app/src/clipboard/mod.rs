//! Clipboard I/O boundary plus the retrying copy path.

mod copy_worker;
mod retry;

pub use copy_worker::{spawn_copy_worker, CopyHandle, CopyOutcome, CopyRequest};
pub use retry::{write_with_retry, RetryPolicy};

use crate::error::HistoryError;
use arboard::Clipboard;

/// Trait for clipboard operations (allows fakes in tests).
pub trait ClipboardIo: Send {
    /// Current clipboard text. `Ok(None)` when the clipboard holds no text.
    fn read_text(&mut self) -> Result<Option<String>, HistoryError>;

    fn write_text(&mut self, text: &str) -> Result<(), HistoryError>;
}

/// Real clipboard implementation using arboard.
pub struct SystemClipboard {
    clipboard: Clipboard,
}

impl SystemClipboard {
    /// # Errors
    /// [`HistoryError::ClipboardApiUnavailable`] when no clipboard backend can
    /// be reached (headless session, missing display server).
    pub fn new() -> Result<Self, HistoryError> {
        let clipboard = Clipboard::new()
            .map_err(|err| HistoryError::ClipboardApiUnavailable(err.to_string()))?;
        Ok(Self { clipboard })
    }
}

impl ClipboardIo for SystemClipboard {
    fn read_text(&mut self) -> Result<Option<String>, HistoryError> {
        match self.clipboard.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(err) => Err(HistoryError::ClipboardAccess(err.to_string())),
        }
    }

    fn write_text(&mut self, text: &str) -> Result<(), HistoryError> {
        self.clipboard
            .set_text(text)
            .map_err(|err| HistoryError::ClipboardAccess(err.to_string()))
    }
}
