//! Mutation handlers for the backend worker.
//!
//! Mutations are never retried here; a failure settles the command and the
//! cache layer rolls back its optimistic snapshot.

use super::WorkerState;
use crate::backend::{CoreEvent, MutationAck, MutationId};
use crate::error::HistoryError;
use clipstash_core::EntryId;
use tracing::{error, info};

fn settle(state: &WorkerState, mutation_id: MutationId, result: Result<MutationAck, HistoryError>) {
    let _ = state.evt_tx.send(CoreEvent::MutationSettled {
        mutation_id,
        result,
    });
}

pub(super) fn handle_delete(state: &mut WorkerState, mutation_id: MutationId, id: EntryId) {
    let result = state.store.get().and_then(|store| {
        store
            .delete_by_id(id)
            .map(|existed| MutationAck::Deleted { id, existed })
            .map_err(|err| {
                error!("backend delete failed: {}", err);
                HistoryError::store("Delete", err)
            })
    });
    settle(state, mutation_id, result);
}

pub(super) fn handle_toggle_favorite(
    state: &mut WorkerState,
    mutation_id: MutationId,
    id: EntryId,
) {
    let result = state.store.get().and_then(|store| {
        store
            .toggle_favorite(id)
            .map(|is_favorite| MutationAck::FavoriteToggled { id, is_favorite })
            .map_err(|err| {
                error!("backend toggle favorite failed: {}", err);
                HistoryError::store("Toggle favorite", err)
            })
    });
    settle(state, mutation_id, result);
}

pub(super) fn handle_clear_all(state: &mut WorkerState, mutation_id: MutationId) {
    let result = state.store.get().and_then(|store| {
        store
            .delete_all()
            .map(|removed| {
                info!(removed, "cleared history");
                MutationAck::Cleared { removed }
            })
            .map_err(|err| {
                error!("backend clear failed: {}", err);
                HistoryError::store("Clear history", err)
            })
    });
    settle(state, mutation_id, result);
}
