//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// Canonical entry rows (`Entry`, bincode-encoded) keyed by id.
pub const ENTRIES: TableDefinition<u64, &[u8]> = TableDefinition::new("entries");

/// Recency index keyed by `(reverse created_at millis, reverse id)`.
///
/// Forward iteration yields newest-first; equal timestamps fall back to the
/// newer id first, so page boundaries are stable across repeated queries.
pub const ENTRIES_BY_CREATED: TableDefinition<(u64, u64), ()> =
    TableDefinition::new("entries_by_created");

/// Store bookkeeping (id sequence).
pub const STORE_META: TableDefinition<&str, u64> = TableDefinition::new("store_meta");

/// Key in [`STORE_META`] holding the next id to assign.
pub const NEXT_ENTRY_ID_KEY: &str = "next_entry_id";
