//! Optimistic cache layer: the single in-memory source of truth for the list.
//!
//! The cache owns the [`CacheSnapshot`] and talks to the backend worker only
//! through [`CoreCmd`]s and [`CoreEvent`]s. Store results are tagged with a
//! generation (bumped on every filter reset) and checked against the snapshot
//! version they were issued on, so a stale reply is discarded instead of
//! overwriting newer state.

mod snapshot;

pub use snapshot::CacheSnapshot;

use crate::backend::{CoreCmd, CoreEvent, MutationAck, MutationId, QueryRequest, RequestId};
use crate::error::HistoryError;
use crate::query::{Page, PageRequest};
use clipstash_core::{Entry, EntryId, Filters};
use crossbeam_channel::Sender;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Which operation a page fetch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Reset,
    Refresh,
    LoadMore,
}

/// A user mutation routed through the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationIntent {
    Delete(EntryId),
    ToggleFavorite(EntryId),
    ClearAll,
}

impl MutationIntent {
    fn apply(self, snapshot: &CacheSnapshot) -> CacheSnapshot {
        match self {
            Self::Delete(id) => snapshot.without_entry(id),
            Self::ToggleFavorite(id) => snapshot.with_favorite_toggled(id),
            Self::ClearAll => CacheSnapshot::empty(),
        }
    }

    fn command(self, mutation_id: MutationId) -> CoreCmd {
        match self {
            Self::Delete(id) => CoreCmd::DeleteEntry { mutation_id, id },
            Self::ToggleFavorite(id) => CoreCmd::ToggleFavorite { mutation_id, id },
            Self::ClearAll => CoreCmd::ClearAll { mutation_id },
        }
    }
}

/// Coarse lifecycle state, derived from what is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePhase {
    Empty,
    Loading,
    Loaded,
    LoadingMore,
    Mutating,
}

/// Snapshot changes the selection state and banner react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheUpdate {
    /// A reset landed; the list was replaced wholesale.
    Replaced,
    /// A same-filter refresh landed.
    Refreshed,
    /// A load-more page was appended.
    Appended,
    /// An optimistic transform was installed over a list of `old_len` rows.
    Optimistic {
        intent: MutationIntent,
        old_len: usize,
    },
    Committed {
        ack: MutationAck,
    },
    /// The store rejected a mutation and the prior snapshot was restored.
    RolledBack {
        intent: MutationIntent,
        error: HistoryError,
    },
    /// The store rejected a mutation whose snapshot was already superseded by a
    /// filter change, so there was nothing to restore.
    MutationFailed {
        intent: MutationIntent,
        error: HistoryError,
    },
    /// A read failed; the last good snapshot stays in place.
    ReadFailed {
        kind: QueryKind,
        error: HistoryError,
    },
}

#[derive(Debug, Clone, Copy)]
struct InFlightQuery {
    request_id: RequestId,
    kind: QueryKind,
    generation: u64,
    base_version: u64,
}

#[derive(Debug)]
struct PendingMutation {
    mutation_id: MutationId,
    intent: MutationIntent,
    saved: Arc<CacheSnapshot>,
    generation: u64,
}

/// Paginated, optimistic view over the Content Store.
pub struct HistoryCache {
    cmd_tx: Sender<CoreCmd>,
    page_size: usize,
    load_more_size: usize,
    filters: Filters,
    generation: u64,
    version: u64,
    snapshot: Arc<CacheSnapshot>,
    loaded: bool,
    in_flight: Option<InFlightQuery>,
    refresh_queued: bool,
    load_more_queued: bool,
    pending: Option<PendingMutation>,
    queued: VecDeque<MutationIntent>,
    next_request_id: RequestId,
    next_mutation_id: MutationId,
    updates: Vec<CacheUpdate>,
}

impl HistoryCache {
    /// Create an empty cache. Nothing is fetched until [`HistoryCache::reset`].
    pub fn new(cmd_tx: Sender<CoreCmd>, page_size: usize, load_more_size: usize) -> Self {
        Self {
            cmd_tx,
            page_size: page_size.max(1),
            load_more_size: load_more_size.max(1),
            filters: Filters::default(),
            generation: 0,
            version: 0,
            snapshot: Arc::new(CacheSnapshot::empty()),
            loaded: false,
            in_flight: None,
            refresh_queued: false,
            load_more_queued: false,
            pending: None,
            queued: VecDeque::new(),
            next_request_id: 1,
            next_mutation_id: 1,
            updates: Vec::new(),
        }
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Shared handle to the current snapshot.
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn flattened_items(&self) -> Vec<Entry> {
        self.snapshot.flattened()
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.snapshot.has_more()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// `true` while a requested page is in flight or waiting to be re-issued.
    pub fn is_loading_more(&self) -> bool {
        self.load_more_queued
            || matches!(
                self.in_flight,
                Some(InFlightQuery {
                    kind: QueryKind::LoadMore,
                    ..
                })
            )
    }

    pub fn is_mutating(&self) -> bool {
        self.pending.is_some()
    }

    pub fn phase(&self) -> CachePhase {
        if self.pending.is_some() {
            return CachePhase::Mutating;
        }
        match self.in_flight.map(|flight| flight.kind) {
            Some(QueryKind::LoadMore) => CachePhase::LoadingMore,
            Some(_) => CachePhase::Loading,
            None if self.loaded => CachePhase::Loaded,
            None => CachePhase::Empty,
        }
    }

    /// Drain snapshot changes since the last call.
    pub fn take_updates(&mut self) -> Vec<CacheUpdate> {
        std::mem::take(&mut self.updates)
    }

    /// Discard the snapshot and fetch the first page under `filters`.
    ///
    /// Any in-flight read for the previous filters is superseded; its reply
    /// will be ignored.
    pub fn reset(&mut self, filters: Filters) {
        self.generation += 1;
        self.filters = filters;
        self.loaded = false;
        self.refresh_queued = false;
        self.load_more_queued = false;
        self.in_flight = None;
        self.install(Arc::new(CacheSnapshot::empty()));
        self.issue_query(QueryKind::Reset, 0, self.page_size);
    }

    /// Re-fetch everything currently loaded in a single call.
    ///
    /// Deferred while a mutation or another read is in flight; the queued
    /// refresh runs once those settle.
    pub fn refresh(&mut self) {
        if self.pending.is_some() || self.in_flight.is_some() {
            self.refresh_queued = true;
            return;
        }
        self.refresh_queued = false;
        let loaded = self.snapshot.len();
        let limit = if loaded == 0 { self.page_size } else { loaded };
        self.issue_query(QueryKind::Refresh, 0, limit);
    }

    /// Fetch the next page. Returns `false` (no store call) when a read or
    /// mutation is in flight or the last page was short.
    pub fn load_more(&mut self) -> bool {
        if self.in_flight.is_some() || self.pending.is_some() || self.load_more_queued {
            return false;
        }
        let Some(offset) = self.snapshot.next_offset() else {
            return false;
        };
        self.issue_query(QueryKind::LoadMore, offset, self.load_more_size);
        true
    }

    pub fn delete(&mut self, id: EntryId) {
        self.enqueue(MutationIntent::Delete(id));
    }

    pub fn toggle_favorite(&mut self, id: EntryId) {
        self.enqueue(MutationIntent::ToggleFavorite(id));
    }

    pub fn clear_all(&mut self) {
        self.enqueue(MutationIntent::ClearAll);
    }

    /// Apply a backend reply. Lifecycle events are ignored here.
    pub fn apply_event(&mut self, event: CoreEvent) {
        match event {
            CoreEvent::PageLoaded {
                request_id,
                generation,
                page,
            } => {
                if let Some(flight) = self.take_matching_flight(request_id, generation) {
                    self.apply_page(flight, page);
                }
                self.flush_deferred();
            }
            CoreEvent::QueryFailed {
                request_id,
                generation,
                error,
            } => {
                if let Some(flight) = self.take_matching_flight(request_id, generation) {
                    warn!(kind = ?flight.kind, "history read failed: {}", error);
                    self.updates.push(CacheUpdate::ReadFailed {
                        kind: flight.kind,
                        error,
                    });
                }
                self.flush_deferred();
            }
            CoreEvent::MutationSettled {
                mutation_id,
                result,
            } => self.settle_mutation(mutation_id, result),
            CoreEvent::StoreReady | CoreEvent::StoreUnavailable { .. } => {}
        }
    }

    fn install(&mut self, snapshot: Arc<CacheSnapshot>) {
        self.snapshot = snapshot;
        self.version += 1;
    }

    fn issue_query(&mut self, kind: QueryKind, offset: usize, limit: usize) {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        let filters = self.filters.clone();
        let page = match kind {
            // A refresh re-reads rows that are already shown, however many.
            QueryKind::Refresh => PageRequest::covering(filters, offset, limit),
            QueryKind::Reset | QueryKind::LoadMore => PageRequest::new(filters, offset, limit),
        };
        let request = QueryRequest {
            request_id,
            generation: self.generation,
            page,
        };
        if self.cmd_tx.send(CoreCmd::FetchPage { request }).is_err() {
            error!("backend worker is gone; dropping {:?} query", kind);
            self.updates.push(CacheUpdate::ReadFailed {
                kind,
                error: HistoryError::BackendDisconnected,
            });
            return;
        }
        self.in_flight = Some(InFlightQuery {
            request_id,
            kind,
            generation: self.generation,
            base_version: self.version,
        });
    }

    fn take_matching_flight(
        &mut self,
        request_id: RequestId,
        generation: u64,
    ) -> Option<InFlightQuery> {
        match self.in_flight {
            Some(flight) if flight.request_id == request_id && generation == self.generation => {
                self.in_flight = None;
                Some(flight)
            }
            _ => {
                debug!(request_id, generation, "ignoring superseded query reply");
                None
            }
        }
    }

    fn apply_page(&mut self, flight: InFlightQuery, page: Page) {
        if flight.base_version != self.version {
            // The snapshot changed underneath this read; fetch again on top of it.
            debug!(kind = ?flight.kind, "discarding page issued on an older snapshot");
            self.refresh_queued = true;
            if flight.kind == QueryKind::LoadMore {
                self.load_more_queued = true;
            }
            return;
        }
        let (next, update) = match flight.kind {
            QueryKind::Reset => (CacheSnapshot::from_page(page), CacheUpdate::Replaced),
            QueryKind::Refresh => (CacheSnapshot::from_page(page), CacheUpdate::Refreshed),
            QueryKind::LoadMore => (
                self.snapshot.with_page_appended(page),
                CacheUpdate::Appended,
            ),
        };
        self.loaded = true;
        self.install(Arc::new(next));
        self.updates.push(update);
    }

    /// Run deferred reads once nothing is in flight: the reconcile refresh
    /// first, then any page that was dropped for landing on a stale snapshot.
    fn flush_deferred(&mut self) {
        if self.pending.is_some() || self.in_flight.is_some() {
            return;
        }
        if self.refresh_queued {
            self.refresh();
        } else if self.load_more_queued {
            self.load_more_queued = false;
            if !self.load_more() {
                debug!("dropped page has no continuation after reconcile");
            }
        }
    }

    fn enqueue(&mut self, intent: MutationIntent) {
        self.queued.push_back(intent);
        self.start_next_mutation();
    }

    fn start_next_mutation(&mut self) {
        while self.pending.is_none() {
            let Some(intent) = self.queued.pop_front() else {
                return;
            };

            let mutation_id = self.next_mutation_id;
            self.next_mutation_id += 1;
            let saved = Arc::clone(&self.snapshot);
            let old_len = saved.len();
            self.install(Arc::new(intent.apply(&saved)));
            self.updates.push(CacheUpdate::Optimistic { intent, old_len });

            if self.cmd_tx.send(intent.command(mutation_id)).is_err() {
                error!("backend worker is gone; rolling back {:?}", intent);
                self.install(saved);
                self.updates.push(CacheUpdate::RolledBack {
                    intent,
                    error: HistoryError::BackendDisconnected,
                });
                continue;
            }
            self.pending = Some(PendingMutation {
                mutation_id,
                intent,
                saved,
                generation: self.generation,
            });
        }
    }

    fn settle_mutation(
        &mut self,
        mutation_id: MutationId,
        result: Result<MutationAck, HistoryError>,
    ) {
        let pending = match self.pending.take() {
            Some(pending) if pending.mutation_id == mutation_id => pending,
            other => {
                debug!(mutation_id, "ignoring settlement for unknown mutation");
                self.pending = other;
                return;
            }
        };

        match result {
            Ok(ack) => self.updates.push(CacheUpdate::Committed { ack }),
            Err(error) if pending.generation == self.generation => {
                warn!(intent = ?pending.intent, "mutation rejected, restoring snapshot: {}", error);
                self.install(pending.saved);
                self.updates.push(CacheUpdate::RolledBack {
                    intent: pending.intent,
                    error,
                });
            }
            Err(error) => {
                warn!(
                    intent = ?pending.intent,
                    "mutation rejected after filter change: {}", error
                );
                self.updates.push(CacheUpdate::MutationFailed {
                    intent: pending.intent,
                    error,
                });
            }
        }

        // Reconcile regardless of outcome, after any queued mutation has its turn.
        self.refresh_queued = true;
        self.start_next_mutation();
        self.flush_deferred();
    }
}
