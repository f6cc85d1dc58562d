//! Helper functions shared by entry storage operations.

use crate::error::AppError;
use crate::models::entry::{Entry, EntryId};
use chrono::{DateTime, Utc};

pub(crate) fn reverse_timestamp_key(created_at: DateTime<Utc>) -> u64 {
    // Pre-epoch timestamps are clamped to keep the key total-ordered without
    // negative->u64 underflow.
    let millis = created_at.timestamp_millis().max(0) as u64;
    u64::MAX.saturating_sub(millis)
}

/// Recency index key for `entry`; see [`crate::db::tables::ENTRIES_BY_CREATED`].
pub(crate) fn recency_key(entry: &Entry) -> (u64, u64) {
    (
        reverse_timestamp_key(entry.created_at),
        u64::MAX - entry.id,
    )
}

pub(crate) fn id_from_recency_key(key: (u64, u64)) -> EntryId {
    u64::MAX - key.1
}

pub(crate) fn deserialize_entry(bytes: &[u8]) -> Result<Entry, AppError> {
    Ok(bincode::deserialize(bytes)?)
}
