//! Core domain library for ClipStash (config, storage, models).

/// Configuration loading and defaults.
pub mod config;
/// Shared default values.
pub mod constants;
/// Clipboard history storage backed by redb.
pub mod db;
/// Store-level error type.
pub mod error;
/// Clipboard entry and filter models.
pub mod models;
/// Text normalization helpers used for dedup and search.
pub mod text;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::{DEFAULT_LOAD_MORE_SIZE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use db::{Database, HistoryStore};
pub use error::AppError;
pub use models::entry::{Entry, EntryId, EntryKind, Filters};
