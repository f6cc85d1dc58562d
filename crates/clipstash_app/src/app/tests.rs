//! State/event flow tests for the presentation-facing app.

use super::*;
use crate::backend::{CoreCmd, QueryRequest};
use crate::error::HistoryError;
use crate::query::Page;
use chrono::Utc;
use clipstash_core::EntryKind;
use crossbeam_channel::{unbounded, Sender, TryRecvError};

struct TestHarness {
    app: HistoryApp,
    cmd_rx: Receiver<CoreCmd>,
    evt_tx: Sender<CoreEvent>,
    copy_rx: Receiver<CopyRequest>,
    outcome_tx: Sender<CopyOutcome>,
    signal_tx: Sender<WatcherSignal>,
}

fn test_config() -> Config {
    Config {
        page_size: 3,
        load_more_size: 2,
        ..Config::default()
    }
}

fn entry(id: EntryId) -> Entry {
    Entry {
        id,
        content: format!("clip {}", id),
        kind: EntryKind::Text,
        created_at: Utc::now(),
        is_favorite: false,
    }
}

fn make_app() -> TestHarness {
    let (cmd_tx, cmd_rx) = unbounded();
    let (evt_tx, evt_rx) = unbounded();
    let (copy_tx, copy_rx) = unbounded();
    let (outcome_tx, outcome_rx) = unbounded();
    let (signal_tx, signal_rx) = unbounded();
    let app = HistoryApp::new(
        BackendHandle::from_test_channels(cmd_tx, evt_rx),
        &test_config(),
    )
    .with_copy_worker(CopyHandle::from_test_channels(copy_tx, outcome_rx))
    .with_watcher_signals(signal_rx);
    TestHarness {
        app,
        cmd_rx,
        evt_tx,
        copy_rx,
        outcome_tx,
        signal_tx,
    }
}

impl TestHarness {
    fn expect_fetch(&self) -> QueryRequest {
        match self.cmd_rx.try_recv() {
            Ok(CoreCmd::FetchPage { request }) => request,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    fn expect_mutation(&self) -> CoreCmd {
        match self.cmd_rx.try_recv() {
            Ok(cmd @ (CoreCmd::DeleteEntry { .. }
            | CoreCmd::ToggleFavorite { .. }
            | CoreCmd::ClearAll { .. })) => cmd,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    fn assert_no_cmd(&self) {
        assert!(matches!(self.cmd_rx.try_recv(), Err(TryRecvError::Empty)));
    }

    fn deliver(&mut self, request: &QueryRequest, rows: &[EntryId]) {
        let page = Page::from_items(
            request.page.offset,
            request.page.limit,
            rows.iter().copied().map(entry).collect(),
        );
        self.evt_tx
            .send(CoreEvent::PageLoaded {
                request_id: request.request_id,
                generation: request.generation,
                page,
            })
            .expect("send page");
        self.app.poll();
    }

    fn settle(&mut self, cmd: CoreCmd, result: Result<MutationAck, HistoryError>) {
        let mutation_id = match cmd {
            CoreCmd::DeleteEntry { mutation_id, .. }
            | CoreCmd::ToggleFavorite { mutation_id, .. }
            | CoreCmd::ClearAll { mutation_id } => mutation_id,
            other => panic!("not a mutation: {:?}", other),
        };
        self.evt_tx
            .send(CoreEvent::MutationSettled {
                mutation_id,
                result,
            })
            .expect("send settlement");
        self.app.poll();
    }
}

fn loaded_app(rows: &[EntryId]) -> TestHarness {
    let mut harness = make_app();
    let request = harness.expect_fetch();
    harness.deliver(&request, rows);
    harness
}

fn ids(app: &HistoryApp) -> Vec<EntryId> {
    app.flattened_items().iter().map(|e| e.id).collect()
}

#[test]
fn new_app_dispatches_initial_reset() {
    let harness = make_app();
    let request = harness.expect_fetch();
    assert_eq!((request.page.offset, request.page.limit), (0, 3));
    assert_eq!(request.page.filters, Filters::default());
}

#[test]
fn store_lifecycle_events_update_readiness_and_banner() {
    let mut harness = make_app();
    harness.evt_tx.send(CoreEvent::StoreReady).expect("send");
    harness.app.poll();
    assert!(harness.app.is_store_ready());

    harness
        .evt_tx
        .send(CoreEvent::StoreUnavailable {
            message: "locked".to_string(),
        })
        .expect("send");
    harness.app.poll();
    assert!(!harness.app.is_store_ready());
    assert_eq!(harness.app.error(), Some("History store unavailable: locked"));
}

#[test]
fn search_resets_selection_and_refetches_once() {
    let mut harness = loaded_app(&[3, 2, 1]);
    harness.app.handle_key(KeyAction::Down);
    harness.app.handle_key(KeyAction::Down);
    assert_eq!(harness.app.selected_index(), 2);

    harness.app.search("foo");
    assert_eq!(harness.app.selected_index(), 0);
    assert!(harness.app.flattened_items().is_empty());
    let request = harness.expect_fetch();
    assert_eq!(request.page.filters, Filters::new("foo", false));

    harness.app.search("foo");
    harness.app.set_favorites_only(false);
    harness.assert_no_cmd();

    harness.deliver(&request, &[]);
    assert!(harness.app.flattened_items().is_empty());
    assert!(!harness.app.has_more());
}

#[test]
fn favorites_toggle_filter_resets_view() {
    let mut harness = loaded_app(&[3, 2, 1]);
    harness.app.set_favorites_only(true);
    let request = harness.expect_fetch();
    assert!(request.page.filters.favorites_only);
    assert!(harness.app.favorites_only());
}

#[test]
fn deleting_last_row_moves_selection_to_new_last() {
    let mut harness = loaded_app(&[3, 2, 1]);
    harness.app.handle_key(KeyAction::Up);
    assert_eq!(harness.app.selected_index(), 2);

    harness.app.delete_item(1);
    assert_eq!(ids(&harness.app), vec![3, 2]);
    assert_eq!(harness.app.selected_index(), 1);
}

#[test]
fn deleting_other_row_keeps_selection() {
    let mut harness = loaded_app(&[3, 2, 1]);
    harness.app.delete_item(2);
    assert_eq!(harness.app.selected_index(), 0);
    assert_eq!(ids(&harness.app), vec![3, 1]);
}

#[test]
fn rejected_delete_restores_rows_and_shows_dismissible_error() {
    let mut harness = loaded_app(&[3, 2, 1]);
    harness.app.delete_item(3);
    let cmd = harness.expect_mutation();
    assert_eq!(ids(&harness.app), vec![2, 1]);

    harness.settle(
        cmd,
        Err(HistoryError::QueryFailed {
            operation: "Delete".to_string(),
            message: "disk full".to_string(),
        }),
    );
    assert_eq!(ids(&harness.app), vec![3, 2, 1]);
    assert_eq!(harness.app.error(), Some("Delete failed: disk full"));

    harness.app.dismiss_error();
    assert_eq!(harness.app.error(), None);
}

#[test]
fn clear_all_reports_removed_count() {
    let mut harness = loaded_app(&[3, 2, 1]);
    harness.app.handle_key(KeyAction::Down);
    harness.app.clear_all();
    assert!(harness.app.flattened_items().is_empty());
    assert_eq!(harness.app.selected_index(), 0);

    let cmd = harness.expect_mutation();
    harness.settle(cmd, Ok(MutationAck::Cleared { removed: 3 }));
    assert_eq!(harness.app.status(), Some("Cleared 3 entries"));
}

#[test]
fn enter_copies_selection_then_hides_and_resets() {
    let mut harness = loaded_app(&[3, 2, 1]);
    harness.app.handle_key(KeyAction::Down);

    assert_eq!(harness.app.handle_key(KeyAction::Enter), ShellRequest::Hide);
    assert_eq!(harness.app.selected_index(), 0);
    assert_eq!(
        harness.copy_rx.try_recv().expect("copy request"),
        CopyRequest {
            entry_id: 2,
            text: "clip 2".to_string(),
        }
    );

    harness
        .outcome_tx
        .send(CopyOutcome {
            entry_id: 2,
            result: Ok(()),
        })
        .expect("send outcome");
    harness.app.poll();
    assert_eq!(harness.app.status(), Some("Copied to clipboard"));
}

#[test]
fn failed_copy_reselects_the_entry_and_shows_error() {
    let mut harness = loaded_app(&[3, 2, 1]);
    harness.app.handle_key(KeyAction::Up);
    harness.app.handle_key(KeyAction::Enter);
    assert_eq!(harness.app.selected_index(), 0);

    let failure = HistoryError::ClipboardWriteFailed {
        attempts: 3,
        last_error: "busy".to_string(),
    };
    harness
        .outcome_tx
        .send(CopyOutcome {
            entry_id: 1,
            result: Err(failure.clone()),
        })
        .expect("send outcome");
    harness.app.poll();

    assert_eq!(harness.app.selected_index(), 2);
    let expected = failure.to_string();
    assert_eq!(harness.app.error(), Some(expected.as_str()));
}

#[test]
fn escape_hides_and_resets_selection() {
    let mut harness = loaded_app(&[3, 2, 1]);
    harness.app.handle_key(KeyAction::Down);
    assert_eq!(harness.app.handle_key(KeyAction::Escape), ShellRequest::Hide);
    assert_eq!(harness.app.selected_index(), 0);
    assert!(harness.copy_rx.try_recv().is_err());
}

#[test]
fn navigation_on_empty_list_does_nothing() {
    let mut harness = loaded_app(&[]);
    assert_eq!(harness.app.handle_key(KeyAction::Down), ShellRequest::None);
    assert_eq!(harness.app.handle_key(KeyAction::Up), ShellRequest::None);
    assert_eq!(harness.app.selected_index(), 0);
    assert_eq!(harness.app.selected_entry(), None);
}

#[test]
fn capture_signal_refreshes_loaded_depth() {
    let mut harness = loaded_app(&[3, 2, 1]);
    assert!(harness.app.load_more());
    let more = harness.expect_fetch();
    harness.deliver(&more, &[0]);
    assert!(!harness.app.has_more());

    for entry_id in [4, 5] {
        harness
            .signal_tx
            .send(WatcherSignal::Captured { entry_id, pruned: 0 })
            .expect("send signal");
    }
    harness.app.poll();

    let refresh = harness.expect_fetch();
    assert_eq!((refresh.page.offset, refresh.page.limit), (0, 4));
    harness.assert_no_cmd();

    harness.deliver(&refresh, &[5, 4, 3, 2]);
    assert_eq!(ids(&harness.app), vec![5, 4, 3, 2]);
}
