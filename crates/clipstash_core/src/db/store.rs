//! Content Store interface consumed by the writer and the backend worker.

use crate::error::AppError;
use crate::models::entry::{Entry, EntryId, Filters};

/// Durable clipboard history store.
///
/// Implementations must order query results by `created_at` descending with a
/// stable tiebreak, and must never reuse ids.
pub trait HistoryStore: Send + Sync {
    /// Persist a new capture and return the stored row.
    fn insert(&self, content: &str) -> Result<Entry, AppError>;

    /// Return up to `limit` rows matching `filters`, skipping the first `offset` matches.
    fn query(&self, filters: &Filters, limit: usize, offset: usize)
        -> Result<Vec<Entry>, AppError>;

    /// Delete a row. `Ok(false)` when it was already gone.
    fn delete_by_id(&self, id: EntryId) -> Result<bool, AppError>;

    /// Flip the favorite flag and return the new value.
    ///
    /// # Errors
    /// [`AppError::NotFound`] when the row does not exist.
    fn toggle_favorite(&self, id: EntryId) -> Result<bool, AppError>;

    /// Delete every row and return how many were removed.
    fn delete_all(&self) -> Result<usize, AppError>;

    /// Most recent row, used for capture dedup.
    fn latest(&self) -> Result<Option<Entry>, AppError>;

    /// Remove the oldest non-favorite rows beyond `max_entries`.
    fn prune_to(&self, max_entries: usize) -> Result<usize, AppError>;
}
