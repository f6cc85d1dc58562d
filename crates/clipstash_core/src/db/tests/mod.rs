//! Database integration tests.

use super::*;
use crate::models::entry::*;
use crate::test_support::setup_temp_db;

fn contents(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(|entry| entry.content.as_str()).collect()
}

fn insert_all(store: &dyn HistoryStore, values: &[&str]) -> Vec<Entry> {
    values
        .iter()
        .map(|value| store.insert(value).expect("insert"))
        .collect()
}

mod basic_ops;
