//! End-to-end cache workflows over a real redb store and backend worker.

use clipstash_app::backend::spawn_backend_with_store;
use clipstash_app::context::StoreSlot;
use clipstash_app::query::{fetch_page, PageRequest};
use clipstash_app::startup::wait_until;
use clipstash_app::watcher::{CaptureOutcome, DedupWriter};
use clipstash_app::{HistoryApp, KeyAction};
use clipstash_core::{AppError, Config, Database, Entry, EntryId, Filters, HistoryStore};
use crossbeam_channel::unbounded;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Store wrapper whose mutations can be made to fail on demand.
struct FlakyStore {
    inner: Arc<dyn HistoryStore>,
    fail_mutations: AtomicBool,
}

impl FlakyStore {
    fn check(&self) -> Result<(), AppError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(AppError::StorageMessage("injected failure".to_string()));
        }
        Ok(())
    }
}

impl HistoryStore for FlakyStore {
    fn insert(&self, content: &str) -> Result<Entry, AppError> {
        self.inner.insert(content)
    }

    fn query(&self, filters: &Filters, limit: usize, offset: usize) -> Result<Vec<Entry>, AppError> {
        self.inner.query(filters, limit, offset)
    }

    fn delete_by_id(&self, id: EntryId) -> Result<bool, AppError> {
        self.check()?;
        self.inner.delete_by_id(id)
    }

    fn toggle_favorite(&self, id: EntryId) -> Result<bool, AppError> {
        self.check()?;
        self.inner.toggle_favorite(id)
    }

    fn delete_all(&self) -> Result<usize, AppError> {
        self.check()?;
        self.inner.delete_all()
    }

    fn latest(&self) -> Result<Option<Entry>, AppError> {
        self.inner.latest()
    }

    fn prune_to(&self, max_entries: usize) -> Result<usize, AppError> {
        self.inner.prune_to(max_entries)
    }
}

struct Fixture {
    _dir: TempDir,
    store: Arc<FlakyStore>,
}

fn fixture(contents: &[&str]) -> Fixture {
    let dir = TempDir::new().expect("temp dir");
    let db = Database::open(dir.path().join("db").to_str().expect("path")).expect("db");
    let store = Arc::new(FlakyStore {
        inner: db.store(),
        fail_mutations: AtomicBool::new(false),
    });
    for content in contents {
        store.insert(content).expect("insert");
    }
    Fixture { _dir: dir, store }
}

fn config() -> Config {
    Config {
        page_size: 3,
        load_more_size: 3,
        ..Config::default()
    }
}

fn start_app(fixture: &Fixture) -> HistoryApp {
    let backend = spawn_backend_with_store(fixture.store.clone()).expect("spawn backend");
    let mut app = HistoryApp::new(backend, &config());
    settle(&mut app);
    app
}

fn settle(app: &mut HistoryApp) {
    wait_until(
        "history cache to settle",
        Duration::from_secs(5),
        Duration::from_millis(2),
        || {
            app.poll();
            app.is_store_ready() && !app.cache().is_loading() && !app.cache().is_mutating()
        },
    )
    .expect("cache settled");
}

fn contents(app: &HistoryApp) -> Vec<String> {
    app.flattened_items()
        .into_iter()
        .map(|entry| entry.content)
        .collect()
}

#[test]
fn first_page_lists_newest_first_and_matches_store() {
    let fixture = fixture(&["a", "b", "c"]);
    let app = start_app(&fixture);

    assert_eq!(contents(&app), vec!["c", "b", "a"]);
    let direct = fetch_page(
        fixture.store.as_ref(),
        &PageRequest::new(Filters::default(), 0, config().page_size),
    )
    .expect("direct page");
    assert_eq!(app.flattened_items(), direct.items);
}

#[test]
fn confirmed_delete_stays_deleted_after_reconcile() {
    let fixture = fixture(&["a", "b", "c"]);
    let mut app = start_app(&fixture);
    let target = app.flattened_items()[1].id;

    app.delete_item(target);
    assert!(app.flattened_items().iter().all(|entry| entry.id != target));

    settle(&mut app);
    assert!(app.flattened_items().iter().all(|entry| entry.id != target));
    assert_eq!(contents(&app), vec!["c", "a"]);
    assert_eq!(app.error(), None);
}

#[test]
fn rejected_delete_rolls_back_and_surfaces_error() {
    let fixture = fixture(&["a", "b", "c"]);
    let mut app = start_app(&fixture);
    let before = app.flattened_items();
    fixture.store.fail_mutations.store(true, Ordering::SeqCst);

    app.delete_item(before[0].id);
    assert_eq!(app.flattened_items().len(), 2);

    settle(&mut app);
    assert_eq!(app.flattened_items(), before);
    let error = app.error().expect("error banner");
    assert!(error.contains("injected failure"), "banner: {}", error);
}

#[test]
fn favorite_toggle_is_optimistic_and_reverts_on_rejection() {
    let fixture = fixture(&["a"]);
    let mut app = start_app(&fixture);
    let id = app.flattened_items()[0].id;

    app.toggle_favorite(id);
    assert!(app.flattened_items()[0].is_favorite);
    settle(&mut app);
    assert!(app.flattened_items()[0].is_favorite);

    fixture.store.fail_mutations.store(true, Ordering::SeqCst);
    app.toggle_favorite(id);
    assert!(!app.flattened_items()[0].is_favorite);
    settle(&mut app);
    assert!(app.flattened_items()[0].is_favorite);
}

#[test]
fn unmatched_search_is_empty_without_more() {
    let fixture = fixture(&["alpha", "beta"]);
    let mut app = start_app(&fixture);

    app.search("foo");
    settle(&mut app);
    assert!(app.flattened_items().is_empty());
    assert!(!app.has_more());
    assert!(!app.load_more());
}

#[test]
fn load_more_walks_every_row_once() {
    let rows: Vec<String> = (0..7).map(|n| format!("row {}", n)).collect();
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let fixture = fixture(&refs);
    let mut app = start_app(&fixture);

    let mut loads = 0;
    while app.has_more() {
        assert!(app.load_more());
        assert!(app.is_loading_more());
        assert!(!app.load_more());
        settle(&mut app);
        loads += 1;
    }

    assert_eq!(loads, 2);
    let mut ids: Vec<EntryId> = app.flattened_items().iter().map(|e| e.id).collect();
    assert_eq!(ids.len(), 7);
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 7);
    assert_eq!(contents(&app)[0], "row 6");
}

#[test]
fn captured_text_appears_after_writer_signal() {
    let fixture = fixture(&["old"]);
    let (signal_tx, signal_rx) = unbounded();
    let backend = spawn_backend_with_store(fixture.store.clone()).expect("spawn backend");
    let mut app = HistoryApp::new(backend, &config()).with_watcher_signals(signal_rx);
    settle(&mut app);

    let writer = DedupWriter::with_limits(StoreSlot::ready(fixture.store.clone()), signal_tx, 1024, 0);
    assert!(matches!(
        writer.capture("fresh").expect("capture"),
        CaptureOutcome::Inserted { .. }
    ));
    assert_eq!(writer.capture("fresh\n").expect("capture"), CaptureOutcome::Duplicate);

    settle(&mut app);
    assert_eq!(contents(&app), vec!["fresh"]);
    assert!(app.has_more());

    assert!(app.load_more());
    settle(&mut app);
    assert_eq!(contents(&app), vec!["fresh", "old"]);
}

#[test]
fn deleting_the_selected_last_row_keeps_a_neighbour_selected() {
    let fixture = fixture(&["a", "b", "c"]);
    let mut app = start_app(&fixture);

    app.handle_key(KeyAction::Up);
    let last = app.selected_entry().expect("selected");
    assert_eq!(last.content, "a");

    app.delete_item(last.id);
    settle(&mut app);
    assert_eq!(app.selected_index(), 1);
    assert_eq!(app.selected_entry().map(|entry| entry.content), Some("b".to_string()));
}
