//! Clipboard change detection and the capture loop feeding the writer.

mod writer;

pub use writer::{CaptureOutcome, DedupWriter, SkipReason, WatcherSignal};

use crate::clipboard::ClipboardIo;
use crate::error::HistoryError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Source of clipboard text changes.
pub trait ClipboardWatcher: Send {
    /// Block until the clipboard holds text different from the last reading,
    /// or return `None` once `stop` is raised.
    fn next_change(&mut self, stop: &AtomicBool) -> Option<String>;

    /// Drop the last reading so the same text is reported again.
    fn forget_last(&mut self);
}

/// Watcher that reads the clipboard on a fixed interval.
pub struct PollingWatcher {
    clipboard: Box<dyn ClipboardIo>,
    interval: Duration,
    last_seen: Option<String>,
}

impl PollingWatcher {
    pub fn new(clipboard: Box<dyn ClipboardIo>, interval: Duration) -> Self {
        Self {
            clipboard,
            interval,
            last_seen: None,
        }
    }

    /// Read once and report text that differs from the previous reading.
    ///
    /// Read failures are logged and treated as "no change"; the next tick
    /// tries again.
    pub fn poll_once(&mut self) -> Option<String> {
        match self.clipboard.read_text() {
            Ok(Some(text)) if !text.is_empty() => {
                if self.last_seen.as_deref() == Some(text.as_str()) {
                    return None;
                }
                debug!(text_len = text.len(), "clipboard changed");
                self.last_seen = Some(text.clone());
                Some(text)
            }
            Ok(_) => None,
            Err(err) => {
                warn!("clipboard poll failed: {}", err);
                None
            }
        }
    }
}

impl ClipboardWatcher for PollingWatcher {
    fn next_change(&mut self, stop: &AtomicBool) -> Option<String> {
        loop {
            if stop.load(Ordering::Relaxed) {
                return None;
            }
            let started = Instant::now();
            if let Some(text) = self.poll_once() {
                return Some(text);
            }
            let elapsed = started.elapsed();
            if elapsed < self.interval {
                thread::sleep(self.interval - elapsed);
            }
        }
    }

    fn forget_last(&mut self) {
        self.last_seen = None;
    }
}

/// Hand one change to the writer. A failed capture is retried on the next tick.
fn capture_change(watcher: &mut dyn ClipboardWatcher, writer: &DedupWriter, text: &str) {
    if let Err(err) = writer.capture(text) {
        warn!("capture failed, retrying next tick: {}", err);
        watcher.forget_last();
    }
}

/// Run the capture loop on its own thread until `stop` is raised.
///
/// `open` builds the watcher inside the thread; if it fails the loop logs and
/// exits without capturing.
///
/// # Errors
/// Returns an error if the thread cannot be spawned.
pub fn spawn_watcher<F>(
    open: F,
    writer: DedupWriter,
    stop: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>>
where
    F: FnOnce() -> Result<Box<dyn ClipboardWatcher>, HistoryError> + Send + 'static,
{
    thread::Builder::new()
        .name("clipstash-watcher".to_string())
        .spawn(move || {
            let mut watcher = match open() {
                Ok(watcher) => watcher,
                Err(err) => {
                    error!("clipboard monitor could not start: {}", err);
                    return;
                }
            };
            info!("clipboard monitor started");
            while let Some(text) = watcher.next_change(&stop) {
                capture_change(watcher.as_mut(), &writer, &text);
            }
            info!("clipboard monitor stopping");
        })
}
