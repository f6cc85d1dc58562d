//! Background worker thread for store access.

mod mutation;
mod query;

use crate::backend::{CoreCmd, CoreEvent};
use crate::context::StoreSlot;
use clipstash_core::config::env_flag_enabled;
use clipstash_core::{AppError, HistoryStore};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use tracing::{error, info};

/// Handle for sending commands to, and receiving events from, the backend worker.
pub struct BackendHandle {
    pub cmd_tx: Sender<CoreCmd>,
    pub evt_rx: Receiver<CoreEvent>,
}

impl BackendHandle {
    /// Wrap caller-owned channels, letting tests script the worker side.
    pub fn from_test_channels(cmd_tx: Sender<CoreCmd>, evt_rx: Receiver<CoreEvent>) -> Self {
        Self { cmd_tx, evt_rx }
    }
}

pub(super) struct WorkerState {
    pub(super) store: StoreSlot,
    pub(super) evt_tx: Sender<CoreEvent>,
    pub(super) perf_log_enabled: bool,
}

impl WorkerState {
    fn handle(&mut self, cmd: CoreCmd) {
        match cmd {
            CoreCmd::FetchPage { request } => query::handle_fetch_page(self, request),
            CoreCmd::DeleteEntry { mutation_id, id } => {
                mutation::handle_delete(self, mutation_id, id)
            }
            CoreCmd::ToggleFavorite { mutation_id, id } => {
                mutation::handle_toggle_favorite(self, mutation_id, id)
            }
            CoreCmd::ClearAll { mutation_id } => mutation::handle_clear_all(self, mutation_id),
        }
    }
}

/// Spawn the backend worker thread that performs blocking store access.
///
/// The worker runs `open` first and installs the result into `store`, so the
/// writer thread sharing the slot sees the same handle. Commands are served
/// strictly in arrival order; until the store is open they fail with
/// `StoreNotReady`.
///
/// # Returns
/// A [`BackendHandle`] containing the command sender and event receiver.
///
/// # Errors
/// Returns an error if the worker thread cannot be spawned.
pub fn spawn_backend<F>(store: StoreSlot, open: F) -> std::io::Result<BackendHandle>
where
    F: FnOnce() -> Result<Arc<dyn HistoryStore>, AppError> + Send + 'static,
{
    let (cmd_tx, cmd_rx) = unbounded();
    let (evt_tx, evt_rx) = unbounded();

    thread::Builder::new()
        .name("clipstash-backend".to_string())
        .spawn(move || {
            match open() {
                Ok(opened) => {
                    if !store.fill(opened) {
                        info!("store slot already filled; keeping existing handle");
                    }
                    let _ = evt_tx.send(CoreEvent::StoreReady);
                }
                Err(err) => {
                    error!("backend failed to open store: {}", err);
                    let _ = evt_tx.send(CoreEvent::StoreUnavailable {
                        message: err.to_string(),
                    });
                }
            }

            let mut state = WorkerState {
                store,
                evt_tx,
                perf_log_enabled: env_flag_enabled("CLIPSTASH_BACKEND_PERF_LOG"),
            };
            for cmd in cmd_rx.iter() {
                state.handle(cmd);
            }
        })?;

    Ok(BackendHandle { cmd_tx, evt_rx })
}

/// Spawn a worker over an already-open store.
///
/// # Errors
/// Returns an error if the worker thread cannot be spawned.
pub fn spawn_backend_with_store(store: Arc<dyn HistoryStore>) -> std::io::Result<BackendHandle> {
    spawn_backend(StoreSlot::empty(), move || Ok(store))
}
