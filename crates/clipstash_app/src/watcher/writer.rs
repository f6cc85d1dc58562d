//! Deduplicating writer: turns clipboard changes into store inserts.

use crate::context::StoreSlot;
use crate::error::HistoryError;
use clipstash_core::text::is_same_capture;
use clipstash_core::{Config, EntryId};
use crossbeam_channel::Sender;
use tracing::{debug, info, warn};

/// Invalidation signal consumed by the cache layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherSignal {
    /// A new row was stored (and `pruned` old rows were dropped by retention).
    Captured { entry_id: EntryId, pruned: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    TooLarge { bytes: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Inserted { entry_id: EntryId, pruned: usize },
    /// Same text as the newest stored row, exactly or after whitespace normalization.
    Duplicate,
    Skipped(SkipReason),
}

/// Inserts genuinely new captures and signals the cache.
///
/// Dedup compares against the store's newest row at insert time, not the
/// watcher's last reading: once the newest row is deleted, copying the same
/// text again stores it again.
pub struct DedupWriter {
    store: StoreSlot,
    signal_tx: Sender<WatcherSignal>,
    max_content_bytes: usize,
    max_entries: usize,
}

impl DedupWriter {
    pub fn new(store: StoreSlot, signal_tx: Sender<WatcherSignal>, config: &Config) -> Self {
        Self::with_limits(
            store,
            signal_tx,
            config.max_content_bytes,
            config.max_entries,
        )
    }

    /// `max_entries == 0` disables retention pruning.
    pub fn with_limits(
        store: StoreSlot,
        signal_tx: Sender<WatcherSignal>,
        max_content_bytes: usize,
        max_entries: usize,
    ) -> Self {
        Self {
            store,
            signal_tx,
            max_content_bytes,
            max_entries,
        }
    }

    /// Store `text` unless it is blank, oversized, or a repeat of the newest row.
    ///
    /// # Errors
    /// [`HistoryError::StoreNotReady`] before the store opens, or
    /// [`HistoryError::QueryFailed`] when reading the newest row or inserting fails.
    pub fn capture(&self, text: &str) -> Result<CaptureOutcome, HistoryError> {
        if text.trim().is_empty() {
            return Ok(CaptureOutcome::Skipped(SkipReason::Blank));
        }
        if text.len() > self.max_content_bytes {
            debug!(
                bytes = text.len(),
                max = self.max_content_bytes,
                "skipping oversized capture"
            );
            return Ok(CaptureOutcome::Skipped(SkipReason::TooLarge { bytes: text.len() }));
        }

        let store = self.store.get()?;
        let latest = store
            .latest()
            .map_err(|err| HistoryError::store("Read latest entry", err))?;
        if latest.is_some_and(|entry| is_same_capture(&entry.content, text)) {
            debug!(text_len = text.len(), "skipping duplicate capture");
            return Ok(CaptureOutcome::Duplicate);
        }

        let entry = store
            .insert(text)
            .map_err(|err| HistoryError::store("Insert", err))?;
        let pruned = if self.max_entries > 0 {
            store.prune_to(self.max_entries).unwrap_or_else(|err| {
                warn!("retention prune failed: {}", err);
                0
            })
        } else {
            0
        };
        info!(entry_id = entry.id, pruned, "captured clipboard entry");

        let _ = self.signal_tx.send(WatcherSignal::Captured {
            entry_id: entry.id,
            pruned,
        });
        Ok(CaptureOutcome::Inserted {
            entry_id: entry.id,
            pruned,
        })
    }
}
