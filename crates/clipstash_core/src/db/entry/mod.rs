//! Entry storage operations backed by redb.

mod helpers;

use crate::db::store::HistoryStore;
use crate::db::tables::*;
use crate::error::AppError;
use crate::models::entry::{Entry, EntryId, Filters};
use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable, ReadableTableMetadata};
use std::sync::Arc;

use self::helpers::{deserialize_entry, id_from_recency_key, recency_key};

/// Accessor for entry-related redb tables.
pub struct EntryDb {
    db: Arc<redb::Database>,
}

impl EntryDb {
    /// Initialize entry tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(ENTRIES)?;
        write_txn.open_table(ENTRIES_BY_CREATED)?;
        write_txn.open_table(STORE_META)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Fetch an entry by id.
    ///
    /// # Returns
    /// `Ok(Some(entry))` when found, `Ok(None)` when missing.
    pub fn get(&self, id: EntryId) -> Result<Option<Entry>, AppError> {
        let read_txn = self.db.begin_read()?;
        let entries = read_txn.open_table(ENTRIES)?;
        match entries.get(id)? {
            Some(value) => Ok(Some(deserialize_entry(value.value())?)),
            None => Ok(None),
        }
    }

    /// Number of stored rows.
    pub fn count(&self) -> Result<usize, AppError> {
        let read_txn = self.db.begin_read()?;
        let entries = read_txn.open_table(ENTRIES)?;
        Ok(entries.len()? as usize)
    }
}

impl HistoryStore for EntryDb {
    fn insert(&self, content: &str) -> Result<Entry, AppError> {
        let write_txn = self.db.begin_write()?;
        let entry = {
            let mut meta = write_txn.open_table(STORE_META)?;
            let mut entries = write_txn.open_table(ENTRIES)?;
            let mut by_created = write_txn.open_table(ENTRIES_BY_CREATED)?;

            let id = meta
                .get(NEXT_ENTRY_ID_KEY)?
                .map(|guard| guard.value())
                .unwrap_or(1);
            if entries.get(id)?.is_some() {
                return Err(AppError::StorageMessage(format!(
                    "Entry id {} already exists; id sequence is corrupt",
                    id
                )));
            }

            let entry = Entry::new_text(id, content.to_string(), Utc::now());
            let encoded = bincode::serialize(&entry)?;
            entries.insert(id, encoded.as_slice())?;
            by_created.insert(recency_key(&entry), ())?;
            meta.insert(NEXT_ENTRY_ID_KEY, id + 1)?;
            entry
        };
        write_txn.commit()?;
        Ok(entry)
    }

    fn query(
        &self,
        filters: &Filters,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Entry>, AppError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let read_txn = self.db.begin_read()?;
        let by_created = read_txn.open_table(ENTRIES_BY_CREATED)?;
        let entries_table = read_txn.open_table(ENTRIES)?;

        let mut skipped = 0usize;
        let mut entries = Vec::with_capacity(limit.min(256));
        for item in by_created.iter()? {
            let (key, _) = item?;
            let id = id_from_recency_key(key.value());
            let Some(guard) = entries_table.get(id)? else {
                tracing::warn!(id, "recency index references a missing entry");
                continue;
            };
            let entry = deserialize_entry(guard.value())?;
            if !filters.matches(&entry) {
                continue;
            }
            if skipped < offset {
                skipped += 1;
                continue;
            }
            entries.push(entry);
            if entries.len() >= limit {
                break;
            }
        }

        Ok(entries)
    }

    fn delete_by_id(&self, id: EntryId) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut entries = write_txn.open_table(ENTRIES)?;
            let mut by_created = write_txn.open_table(ENTRIES_BY_CREATED)?;

            let Some(guard) = entries.get(id)? else {
                return Ok(false);
            };
            let entry = deserialize_entry(guard.value())?;
            drop(guard);

            by_created.remove(recency_key(&entry))?;
            entries.remove(id)?;
        }
        write_txn.commit()?;
        Ok(true)
    }

    fn toggle_favorite(&self, id: EntryId) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let is_favorite = {
            let mut entries = write_txn.open_table(ENTRIES)?;
            let Some(guard) = entries.get(id)? else {
                return Err(AppError::NotFound);
            };
            let entry = deserialize_entry(guard.value())?.with_favorite_toggled();
            drop(guard);

            let encoded = bincode::serialize(&entry)?;
            entries.insert(id, encoded.as_slice())?;
            entry.is_favorite
        };
        write_txn.commit()?;
        Ok(is_favorite)
    }

    fn delete_all(&self) -> Result<usize, AppError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let entries = write_txn.open_table(ENTRIES)?;
            entries.len()? as usize
        };
        // The id sequence in STORE_META survives so ids are never reused.
        write_txn.delete_table(ENTRIES)?;
        write_txn.delete_table(ENTRIES_BY_CREATED)?;
        write_txn.open_table(ENTRIES)?;
        write_txn.open_table(ENTRIES_BY_CREATED)?;
        write_txn.commit()?;
        Ok(removed)
    }

    fn latest(&self) -> Result<Option<Entry>, AppError> {
        let read_txn = self.db.begin_read()?;
        let by_created = read_txn.open_table(ENTRIES_BY_CREATED)?;
        let entries = read_txn.open_table(ENTRIES)?;
        let Some((key, _)) = by_created.first()? else {
            return Ok(None);
        };
        let id = id_from_recency_key(key.value());
        match entries.get(id)? {
            Some(guard) => Ok(Some(deserialize_entry(guard.value())?)),
            None => Ok(None),
        }
    }

    fn prune_to(&self, max_entries: usize) -> Result<usize, AppError> {
        if max_entries == 0 {
            return Ok(0);
        }

        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut entries = write_txn.open_table(ENTRIES)?;
            let mut by_created = write_txn.open_table(ENTRIES_BY_CREATED)?;

            let mut seen = 0usize;
            let mut victims = Vec::new();
            for item in by_created.iter()? {
                let (key, _) = item?;
                seen += 1;
                if seen <= max_entries {
                    continue;
                }
                let key = key.value();
                let id = id_from_recency_key(key);
                let Some(guard) = entries.get(id)? else {
                    victims.push((key, id));
                    continue;
                };
                if !deserialize_entry(guard.value())?.is_favorite {
                    victims.push((key, id));
                }
            }

            for (key, id) in &victims {
                by_created.remove(*key)?;
                entries.remove(*id)?;
            }
            victims.len()
        };
        write_txn.commit()?;
        if removed > 0 {
            tracing::debug!(removed, max_entries, "pruned history beyond retention cap");
        }
        Ok(removed)
    }
}
