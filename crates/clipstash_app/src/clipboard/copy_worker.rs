//! Dedicated thread for clipboard writes so retry backoff never blocks the cache loop.

use super::{write_with_retry, ClipboardIo, RetryPolicy};
use crate::error::HistoryError;
use clipstash_core::EntryId;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread;
use tracing::{info, warn};

/// Copy an entry's text back to the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    pub entry_id: EntryId,
    pub text: String,
}

/// Result of a [`CopyRequest`], after retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutcome {
    pub entry_id: EntryId,
    pub result: Result<(), HistoryError>,
}

pub struct CopyHandle {
    pub tx: Sender<CopyRequest>,
    pub rx: Receiver<CopyOutcome>,
}

impl CopyHandle {
    pub fn from_test_channels(tx: Sender<CopyRequest>, rx: Receiver<CopyOutcome>) -> Self {
        Self { tx, rx }
    }
}

fn ensure_open<'a, F>(
    slot: &'a mut Option<Box<dyn ClipboardIo>>,
    open: &mut F,
) -> Result<&'a mut (dyn ClipboardIo + 'static), HistoryError>
where
    F: FnMut() -> Result<Box<dyn ClipboardIo>, HistoryError>,
{
    if slot.is_none() {
        *slot = Some(open()?);
    }
    slot.as_deref_mut().ok_or_else(|| {
        HistoryError::ClipboardApiUnavailable("clipboard was not initialized".to_string())
    })
}

/// Spawn the copy thread.
///
/// `open` builds the clipboard inside the thread (some platforms bind the
/// handle to the creating thread). A failed open is reported on the request
/// that triggered it and retried on the next one.
///
/// # Errors
/// Returns an error if the thread cannot be spawned.
pub fn spawn_copy_worker<F>(mut open: F, policy: RetryPolicy) -> std::io::Result<CopyHandle>
where
    F: FnMut() -> Result<Box<dyn ClipboardIo>, HistoryError> + Send + 'static,
{
    let (tx, request_rx) = unbounded::<CopyRequest>();
    let (outcome_tx, rx) = unbounded();

    thread::Builder::new()
        .name("clipstash-copy".to_string())
        .spawn(move || {
            let mut clipboard: Option<Box<dyn ClipboardIo>> = None;
            for request in request_rx.iter() {
                let result = ensure_open(&mut clipboard, &mut open)
                    .and_then(|clipboard| write_with_retry(clipboard, &request.text, policy));
                match &result {
                    Ok(()) => info!(entry_id = request.entry_id, "copied entry to clipboard"),
                    Err(err) => warn!(entry_id = request.entry_id, "copy failed: {}", err),
                }
                let outcome = CopyOutcome {
                    entry_id: request.entry_id,
                    result,
                };
                if outcome_tx.send(outcome).is_err() {
                    break;
                }
            }
        })?;

    Ok(CopyHandle { tx, rx })
}
