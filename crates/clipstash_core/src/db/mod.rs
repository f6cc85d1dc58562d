//! Database layer for ClipStash.

/// Entry storage operations.
pub mod entry;
/// Content Store trait.
pub mod store;
/// redb table definitions.
pub mod tables;

pub use entry::EntryDb;
pub use store::HistoryStore;

use crate::constants::DB_FILE_NAME;
use crate::error::AppError;
use std::path::Path;
use std::sync::Arc;

/// Database handle with access to the entry tables.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub entries: Arc<EntryDb>,
}

impl Database {
    /// Open (or create) the history database inside directory `path`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or redb fails to
    /// open the file or initialize tables.
    pub fn open(path: &str) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to create database directory '{}': {}",
                dir.display(),
                err
            ))
        })?;

        let file = dir.join(DB_FILE_NAME);
        let db = match redb::Database::create(&file) {
            Ok(db) => Arc::new(db),
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                return Err(AppError::StorageMessage(format!(
                    "History database '{}' is already open in another process.\n\
                    Close the other ClipStash instance or set CLIPSTASH_DB_PATH to a different directory.",
                    file.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };
        tracing::info!(path = %file.display(), "opened history database");

        Ok(Self {
            entries: Arc::new(EntryDb::new(db.clone())?),
            db,
        })
    }

    /// Shared handle to the entry store for another subsystem in this process.
    pub fn store(&self) -> Arc<dyn HistoryStore> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests;
