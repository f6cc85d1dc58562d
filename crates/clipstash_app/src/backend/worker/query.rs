//! Page fetch handler for the backend worker.

use super::WorkerState;
use crate::backend::{CoreEvent, QueryRequest};
use crate::error::HistoryError;
use crate::query::fetch_page;
use std::time::Instant;
use tracing::{error, info};

fn log_query_perf(enabled: bool, request: &QueryRequest, elapsed_ms: f64, items: usize) {
    if !enabled {
        return;
    }
    info!(
        target: "clipstash_app::backend_perf",
        request_id = request.request_id,
        generation = request.generation,
        offset = request.page.offset,
        limit = request.page.limit,
        search = !request.page.filters.search_query.trim().is_empty(),
        favorites_only = request.page.filters.favorites_only,
        elapsed_ms = elapsed_ms,
        items = items,
        "backend page fetch perf"
    );
}

pub(super) fn handle_fetch_page(state: &mut WorkerState, request: QueryRequest) {
    let started = Instant::now();
    let result = state.store.get().and_then(|store| {
        fetch_page(store.as_ref(), &request.page).map_err(|err| {
            error!("backend query failed: {}", err);
            HistoryError::store("Query", err)
        })
    });

    let event = match result {
        Ok(page) => {
            log_query_perf(
                state.perf_log_enabled,
                &request,
                started.elapsed().as_secs_f64() * 1000.0,
                page.items.len(),
            );
            CoreEvent::PageLoaded {
                request_id: request.request_id,
                generation: request.generation,
                page,
            }
        }
        Err(error) => CoreEvent::QueryFailed {
            request_id: request.request_id,
            generation: request.generation,
            error,
        },
    };
    let _ = state.evt_tx.send(event);
}
