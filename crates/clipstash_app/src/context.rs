//! Explicitly constructed handles shared by the worker, writer and UI state.

use crate::error::HistoryError;
use clipstash_core::{Config, HistoryStore};
use std::sync::{Arc, OnceLock};

/// Late-bound handle to the Content Store.
///
/// The backend worker opens the database and fills the slot; anything that
/// reads it earlier gets [`HistoryError::StoreNotReady`].
#[derive(Clone, Default)]
pub struct StoreSlot(Arc<OnceLock<Arc<dyn HistoryStore>>>);

impl StoreSlot {
    /// A slot that has not been filled yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A slot that already holds `store`.
    pub fn ready(store: Arc<dyn HistoryStore>) -> Self {
        let slot = Self::empty();
        slot.fill(store);
        slot
    }

    /// Install the store. Returns `false` when the slot was already filled.
    pub fn fill(&self, store: Arc<dyn HistoryStore>) -> bool {
        self.0.set(store).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.0.get().is_some()
    }

    /// # Errors
    /// [`HistoryError::StoreNotReady`] until [`StoreSlot::fill`] has run.
    pub fn get(&self) -> Result<Arc<dyn HistoryStore>, HistoryError> {
        self.0.get().cloned().ok_or(HistoryError::StoreNotReady)
    }
}

impl std::fmt::Debug for StoreSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSlot")
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// Startup context passed to every subsystem instead of process-wide globals.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Config,
    pub store: StoreSlot,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store: StoreSlot::empty(),
        }
    }
}
