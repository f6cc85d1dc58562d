//! Protocol types for the history backend worker.

use crate::error::HistoryError;
use crate::query::{Page, PageRequest};
use clipstash_core::EntryId;

/// Correlates a query with its reply.
pub type RequestId = u64;
/// Correlates a mutation with its settlement.
pub type MutationId = u64;

/// A page fetch tagged with the cache generation it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub request_id: RequestId,
    pub generation: u64,
    pub page: PageRequest,
}

/// Commands issued by the cache layer for the backend worker to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCmd {
    /// Fetch one page for the given filters.
    FetchPage { request: QueryRequest },
    /// Delete a single entry.
    DeleteEntry { mutation_id: MutationId, id: EntryId },
    /// Flip an entry's favorite flag.
    ToggleFavorite { mutation_id: MutationId, id: EntryId },
    /// Delete every entry.
    ClearAll { mutation_id: MutationId },
}

/// Store confirmation for a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationAck {
    /// `existed` is false when the row was already gone.
    Deleted { id: EntryId, existed: bool },
    FavoriteToggled { id: EntryId, is_favorite: bool },
    Cleared { removed: usize },
}

/// Events produced by the backend worker and drained by the cache layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// The store opened; commands will now be served.
    StoreReady,
    /// The store failed to open. Every command will answer `StoreNotReady`.
    StoreUnavailable { message: String },
    PageLoaded {
        request_id: RequestId,
        generation: u64,
        page: Page,
    },
    QueryFailed {
        request_id: RequestId,
        generation: u64,
        error: HistoryError,
    },
    MutationSettled {
        mutation_id: MutationId,
        result: Result<MutationAck, HistoryError>,
    },
}
