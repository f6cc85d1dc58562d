//! Presentation-facing state: the surface a shell renders and forwards intents to.
//!
//! `HistoryApp` is driven from a single loop. Each [`HistoryApp::poll`] drains
//! backend replies, writer signals and copy results, then re-derives the
//! selection from whatever the cache changed.

use crate::backend::{BackendHandle, CoreEvent, MutationAck};
use crate::clipboard::{CopyHandle, CopyOutcome, CopyRequest};
use crate::history::{CacheUpdate, HistoryCache, MutationIntent};
use crate::selection::Selection;
use crate::watcher::WatcherSignal;
use clipstash_core::{Config, Entry, EntryId, Filters};
use crossbeam_channel::Receiver;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

const STATUS_TTL: Duration = Duration::from_secs(4);

/// Keyboard entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Up,
    Down,
    Enter,
    Escape,
}

/// What the shell should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellRequest {
    None,
    Hide,
}

#[derive(Debug)]
struct StatusMessage {
    text: String,
    expires_at: Instant,
}

/// Clipboard history state exposed to the presentation shell.
pub struct HistoryApp {
    backend: BackendHandle,
    cache: HistoryCache,
    selection: Selection,
    copy: Option<CopyHandle>,
    signals: Option<Receiver<WatcherSignal>>,
    search_query: String,
    favorites_only: bool,
    store_ready: bool,
    error: Option<String>,
    status: Option<StatusMessage>,
}

impl HistoryApp {
    /// Build the app over a backend and dispatch the initial reset.
    pub fn new(backend: BackendHandle, config: &Config) -> Self {
        let cache = HistoryCache::new(
            backend.cmd_tx.clone(),
            config.page_size,
            config.load_more_size,
        );
        let mut app = Self {
            backend,
            cache,
            selection: Selection::new(),
            copy: None,
            signals: None,
            search_query: String::new(),
            favorites_only: false,
            store_ready: false,
            error: None,
            status: None,
        };
        app.reset_view();
        app
    }

    /// Route "copy to clipboard" through a copy worker.
    pub fn with_copy_worker(mut self, copy: CopyHandle) -> Self {
        self.copy = Some(copy);
        self
    }

    /// Refresh whenever the writer stores something new.
    pub fn with_watcher_signals(mut self, signals: Receiver<WatcherSignal>) -> Self {
        self.signals = Some(signals);
        self
    }

    /// Drain every pending reply and signal, then apply the resulting updates.
    pub fn poll(&mut self) {
        while let Ok(event) = self.backend.evt_rx.try_recv() {
            self.apply_event(event);
        }

        let mut captured = false;
        if let Some(signals) = &self.signals {
            for WatcherSignal::Captured { entry_id, pruned } in signals.try_iter() {
                info!(entry_id, pruned, "history invalidated by capture");
                captured = true;
            }
        }
        if captured {
            self.cache.refresh();
        }

        let outcomes: Vec<CopyOutcome> = self
            .copy
            .as_ref()
            .map(|copy| copy.rx.try_iter().collect())
            .unwrap_or_default();
        for outcome in outcomes {
            self.apply_copy_outcome(outcome);
        }

        self.apply_cache_updates();
    }

    pub fn search(&mut self, query: &str) {
        if self.search_query == query {
            return;
        }
        self.search_query = query.to_string();
        self.reset_view();
    }

    pub fn set_favorites_only(&mut self, favorites_only: bool) {
        if self.favorites_only == favorites_only {
            return;
        }
        self.favorites_only = favorites_only;
        self.reset_view();
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn favorites_only(&self) -> bool {
        self.favorites_only
    }

    pub fn flattened_items(&self) -> Vec<Entry> {
        self.cache.flattened_items()
    }

    pub fn has_more(&self) -> bool {
        self.cache.has_more()
    }

    pub fn is_loading_more(&self) -> bool {
        self.cache.is_loading_more()
    }

    /// Returns `true` when a page fetch was dispatched.
    pub fn load_more(&mut self) -> bool {
        self.cache.load_more()
    }

    pub fn delete_item(&mut self, id: EntryId) {
        self.cache.delete(id);
        self.apply_cache_updates();
    }

    pub fn toggle_favorite(&mut self, id: EntryId) {
        self.cache.toggle_favorite(id);
        self.apply_cache_updates();
    }

    pub fn clear_all(&mut self) {
        self.cache.clear_all();
        self.apply_cache_updates();
    }

    pub fn selected_index(&self) -> usize {
        self.selection.index()
    }

    pub fn selected_entry(&self) -> Option<Entry> {
        self.cache.snapshot().get(self.selection.index()).cloned()
    }

    pub fn handle_key(&mut self, key: KeyAction) -> ShellRequest {
        let len = self.cache.len();
        match key {
            KeyAction::Down => {
                self.selection.move_down(len);
                ShellRequest::None
            }
            KeyAction::Up => {
                self.selection.move_up(len);
                ShellRequest::None
            }
            KeyAction::Enter => {
                if let Some(entry) = self.selected_entry() {
                    self.copy_entry(entry);
                }
                self.selection.reset();
                ShellRequest::Hide
            }
            KeyAction::Escape => {
                self.selection.reset();
                ShellRequest::Hide
            }
        }
    }

    /// Current dismissible error banner.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Transient status line; `None` once expired.
    pub fn status(&self) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|status| status.expires_at > Instant::now())
            .map(|status| status.text.as_str())
    }

    pub fn is_store_ready(&self) -> bool {
        self.store_ready
    }

    pub fn cache(&self) -> &HistoryCache {
        &self.cache
    }

    fn filters(&self) -> Filters {
        Filters::new(self.search_query.clone(), self.favorites_only)
    }

    fn reset_view(&mut self) {
        self.selection.reset();
        let filters = self.filters();
        self.cache.reset(filters);
        self.apply_cache_updates();
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            expires_at: Instant::now() + STATUS_TTL,
        });
    }

    fn apply_event(&mut self, event: CoreEvent) {
        match event {
            CoreEvent::StoreReady => {
                info!("history store ready");
                self.store_ready = true;
            }
            CoreEvent::StoreUnavailable { message } => {
                error!("history store unavailable: {}", message);
                self.store_ready = false;
                self.error = Some(format!("History store unavailable: {}", message));
            }
            other => self.cache.apply_event(other),
        }
    }

    fn copy_entry(&mut self, entry: Entry) {
        let request = CopyRequest {
            entry_id: entry.id,
            text: entry.content,
        };
        let sent = self
            .copy
            .as_ref()
            .is_some_and(|copy| copy.tx.send(request).is_ok());
        if !sent {
            warn!(entry_id = entry.id, "no clipboard writer available");
            self.error = Some("Clipboard is unavailable".to_string());
        }
    }

    fn apply_copy_outcome(&mut self, outcome: CopyOutcome) {
        match outcome.result {
            Ok(()) => self.set_status("Copied to clipboard"),
            Err(err) => {
                self.error = Some(err.to_string());
                // Keep the failed row selected so the user can retry.
                if let Some(index) = self.cache.snapshot().position_of(outcome.entry_id) {
                    self.selection.select(index);
                }
            }
        }
    }

    fn apply_cache_updates(&mut self) {
        for update in self.cache.take_updates() {
            let len = self.cache.len();
            match update {
                CacheUpdate::Replaced => self.selection.reset(),
                CacheUpdate::Refreshed | CacheUpdate::Appended => self.selection.clamp_to(len),
                CacheUpdate::Optimistic {
                    intent: MutationIntent::Delete(_),
                    old_len,
                } => {
                    if len < old_len {
                        self.selection.after_delete(old_len);
                    }
                }
                CacheUpdate::Optimistic {
                    intent: MutationIntent::ClearAll,
                    ..
                } => self.selection.reset(),
                CacheUpdate::Optimistic { .. } => {}
                CacheUpdate::Committed { ack } => match ack {
                    MutationAck::Cleared { removed } => {
                        self.set_status(format!("Cleared {} entries", removed))
                    }
                    MutationAck::Deleted { existed: false, .. } => {
                        self.set_status("Entry was already deleted")
                    }
                    MutationAck::Deleted { .. } | MutationAck::FavoriteToggled { .. } => {}
                },
                CacheUpdate::RolledBack { error, .. }
                | CacheUpdate::MutationFailed { error, .. } => {
                    self.error = Some(error.to_string());
                    self.selection.clamp_to(len);
                }
                CacheUpdate::ReadFailed { error, .. } => {
                    self.set_status(format!("Could not load history: {}", error));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
