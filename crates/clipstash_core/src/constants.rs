//! Shared constants used across ClipStash crates.

/// Rows fetched for the first page after a filter change.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Rows fetched per "load more" request.
pub const DEFAULT_LOAD_MORE_SIZE: usize = 50;

/// Upper bound for configured page sizes.
pub const MAX_PAGE_SIZE: usize = 200;

/// Upper bound for a single store query, including full-depth refreshes.
pub const MAX_QUERY_LIMIT: usize = 1_000;

/// Default clipboard poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Default history length before the oldest non-favorite rows are pruned.
pub const DEFAULT_MAX_ENTRIES: usize = 1_000;

/// Captures larger than this are skipped by the writer.
pub const DEFAULT_MAX_CONTENT_BYTES: usize = 1024 * 1024;

/// Total clipboard write attempts before a copy is reported as failed.
pub const DEFAULT_COPY_RETRIES: u32 = 3;

/// Backoff base for clipboard write retries in milliseconds.
pub const DEFAULT_COPY_BASE_DELAY_MS: u64 = 1_000;

/// How long startup waits for the store to open, in milliseconds.
pub const DEFAULT_STARTUP_TIMEOUT_MS: u64 = 5_000;

/// File name for the redb database within the configured DB directory.
pub const DB_FILE_NAME: &str = "history.redb";
