//! ClipStash application layer: backend worker, optimistic history cache,
//! clipboard capture and the headless shell.

/// Presentation-facing state.
pub mod app;
/// Backend worker + protocol types used by the cache and headless tests.
pub mod backend;
pub mod cli;
/// Clipboard I/O with retrying writes.
pub mod clipboard;
pub mod context;
pub mod error;
/// Optimistic cache layer.
pub mod history;
/// Paginated Query Engine.
pub mod query;
pub mod selection;
pub mod startup;
/// Clipboard change detection and the deduplicating writer.
pub mod watcher;

#[cfg(test)]
pub(crate) mod test_support;

pub use app::{HistoryApp, KeyAction, ShellRequest};
pub use context::{AppContext, StoreSlot};
pub use error::HistoryError;

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "clipstash=warn,clipstash_app=info,clipstash_core=info";

/// Install the global tracing subscriber. Later calls are no-ops.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
