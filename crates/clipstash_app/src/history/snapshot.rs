//! Immutable page sequence swapped wholesale by the cache layer.

use crate::query::Page;
use clipstash_core::{Entry, EntryId};

/// The materialized pages currently shown, in fetch order.
///
/// Every transform returns a new value; the cache swaps `Arc`s so a rollback
/// reinstalls the exact prior snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheSnapshot {
    pages: Vec<Page>,
}

impl CacheSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_page(page: Page) -> Self {
        Self { pages: vec![page] }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Entries across all pages, in page order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.pages.iter().flat_map(|page| page.items.iter())
    }

    /// Owned flattened projection handed to the shell.
    pub fn flattened(&self) -> Vec<Entry> {
        self.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.pages.iter().map(|page| page.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Continuation offset of the last page.
    pub fn next_offset(&self) -> Option<usize> {
        self.pages.last().and_then(|page| page.next_offset)
    }

    pub fn has_more(&self) -> bool {
        self.next_offset().is_some()
    }

    pub fn position_of(&self, id: EntryId) -> Option<usize> {
        self.iter().position(|entry| entry.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.iter().nth(index)
    }

    pub(crate) fn with_page_appended(&self, page: Page) -> Self {
        let mut pages = self.pages.clone();
        pages.push(page);
        Self { pages }
    }

    /// Snapshot without `id`.
    ///
    /// Store offsets past the removed row shift down by one, so later pages and
    /// every continuation at or after it are adjusted to keep "load more"
    /// from skipping a row.
    pub(crate) fn without_entry(&self, id: EntryId) -> Self {
        let Some(page_index) = self
            .pages
            .iter()
            .position(|page| page.items.iter().any(|entry| entry.id == id))
        else {
            return self.clone();
        };

        let pages = self
            .pages
            .iter()
            .enumerate()
            .map(|(index, page)| {
                if index < page_index {
                    return page.clone();
                }
                let items = if index == page_index {
                    page.items
                        .iter()
                        .filter(|entry| entry.id != id)
                        .cloned()
                        .collect()
                } else {
                    page.items.clone()
                };
                Page {
                    offset: if index == page_index {
                        page.offset
                    } else {
                        page.offset.saturating_sub(1)
                    },
                    items,
                    next_offset: page.next_offset.map(|next| next.saturating_sub(1)),
                }
            })
            .collect();
        Self { pages }
    }

    pub(crate) fn with_favorite_toggled(&self, id: EntryId) -> Self {
        let pages = self
            .pages
            .iter()
            .map(|page| Page {
                items: page
                    .items
                    .iter()
                    .map(|entry| {
                        if entry.id == id {
                            entry.with_favorite_toggled()
                        } else {
                            entry.clone()
                        }
                    })
                    .collect(),
                ..page.clone()
            })
            .collect();
        Self { pages }
    }
}
