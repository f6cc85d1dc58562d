use clipstash::query::{fetch_page, PageRequest};
use clipstash::{Database, Filters, HistoryStore};
use tempfile::TempDir;

#[test]
fn facade_exposes_store_and_query_engine() {
    let dir = TempDir::new().expect("temp dir");
    let db = Database::open(dir.path().join("db").to_str().expect("path")).expect("db");
    let store = db.store();
    store.insert("first").expect("insert");
    store.insert("second").expect("insert");

    let page = fetch_page(store.as_ref(), &PageRequest::new(Filters::default(), 0, 1))
        .expect("page");
    assert_eq!(page.items[0].content, "second");
    assert_eq!(page.next_offset, Some(1));
}
