//! Data models shared by the store, the writer and the cache layer.

/// Clipboard entries and query filters.
pub mod entry;
