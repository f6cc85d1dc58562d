use super::*;

#[test]
fn insert_assigns_monotonic_ids_and_defaults() {
    let (db, _dir) = setup_temp_db();
    let inserted = insert_all(db.entries.as_ref(), &["a", "b", "c"]);

    let ids: Vec<EntryId> = inserted.iter().map(|entry| entry.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(inserted.iter().all(|entry| !entry.is_favorite));
    assert!(inserted.iter().all(|entry| entry.kind == EntryKind::Text));
}

#[test]
fn query_returns_newest_first() {
    let (db, _dir) = setup_temp_db();
    insert_all(db.entries.as_ref(), &["a", "b", "c"]);

    let page = db
        .entries
        .query(&Filters::default(), 10, 0)
        .expect("query");
    assert_eq!(contents(&page), vec!["c", "b", "a"]);
}

#[test]
fn delete_removes_row_and_reports_missing() {
    let (db, _dir) = setup_temp_db();
    let inserted = insert_all(db.entries.as_ref(), &["keep", "drop"]);

    assert!(db.entries.delete_by_id(inserted[1].id).expect("delete"));
    assert!(!db.entries.delete_by_id(inserted[1].id).expect("delete again"));
    assert!(db.entries.get(inserted[1].id).expect("get").is_none());

    let page = db
        .entries
        .query(&Filters::default(), 10, 0)
        .expect("query");
    assert_eq!(contents(&page), vec!["keep"]);
}

#[test]
fn ids_are_never_reused_after_delete_or_clear() {
    let (db, _dir) = setup_temp_db();
    let first = insert_all(db.entries.as_ref(), &["one", "two"]);
    db.entries.delete_by_id(first[1].id).expect("delete newest");
    let third = db.entries.insert("three").expect("insert");
    assert_eq!(third.id, 3);

    assert_eq!(db.entries.delete_all().expect("clear"), 2);
    assert_eq!(db.entries.count().expect("count"), 0);
    let fourth = db.entries.insert("four").expect("insert");
    assert_eq!(fourth.id, 4);
}

#[test]
fn toggle_favorite_flips_and_persists() {
    let (db, _dir) = setup_temp_db();
    let entry = db.entries.insert("fav").expect("insert");

    assert!(db.entries.toggle_favorite(entry.id).expect("toggle on"));
    assert!(db.entries.get(entry.id).expect("get").expect("row").is_favorite);
    assert!(!db.entries.toggle_favorite(entry.id).expect("toggle off"));
}

#[test]
fn toggle_favorite_on_missing_row_is_not_found() {
    let (db, _dir) = setup_temp_db();
    let err = db.entries.toggle_favorite(99).expect_err("missing row");
    assert!(matches!(err, AppError::NotFound), "got {:?}", err);
}

#[test]
fn latest_tracks_newest_row_across_deletes() {
    let (db, _dir) = setup_temp_db();
    assert!(db.entries.latest().expect("latest").is_none());

    let inserted = insert_all(db.entries.as_ref(), &["old", "new"]);
    assert_eq!(
        db.entries.latest().expect("latest").map(|entry| entry.content),
        Some("new".to_string())
    );

    db.entries.delete_by_id(inserted[1].id).expect("delete");
    assert_eq!(
        db.entries.latest().expect("latest").map(|entry| entry.content),
        Some("old".to_string())
    );
}

#[test]
fn reopening_database_preserves_rows_and_sequence() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join("db");
    let path = path.to_str().expect("path");
    {
        let db = Database::open(path).expect("open");
        insert_all(db.entries.as_ref(), &["persisted"]);
    }
    let db = Database::open(path).expect("reopen");
    let entry = db.entries.insert("after reopen").expect("insert");
    assert_eq!(entry.id, 2);
    assert_eq!(db.entries.count().expect("count"), 2);
}
