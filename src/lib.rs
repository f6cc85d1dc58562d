//! Root crate facade for ClipStash.

pub use clipstash_app::{
    app, backend, clipboard, context, history, query, selection, startup, watcher, AppContext,
    HistoryApp, HistoryError, KeyAction, ShellRequest, StoreSlot,
};
pub use clipstash_core::{
    config, db, models, text, AppError, Config, Database, Entry, EntryId, EntryKind, Filters,
    HistoryStore,
};
