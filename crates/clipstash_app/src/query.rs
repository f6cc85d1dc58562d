//! Paginated Query Engine: filter + offset/limit in, classified [`Page`] out.

use clipstash_core::config::parse_number_or;
use clipstash_core::constants::{MAX_PAGE_SIZE, MAX_QUERY_LIMIT};
use clipstash_core::{AppError, Entry, Filters, HistoryStore};

/// One fetched batch of entries plus its continuation offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Offset this page was fetched at.
    pub offset: usize,
    pub items: Vec<Entry>,
    /// Set iff the page came back full, so more rows may exist.
    pub next_offset: Option<usize>,
}

impl Page {
    /// Classify a store result fetched with `offset`/`limit`.
    ///
    /// A full page always reports a continuation, even when it happens to be
    /// the last one: an extra empty "load more" is acceptable, hiding rows is not.
    pub fn from_items(offset: usize, limit: usize, items: Vec<Entry>) -> Self {
        let next_offset = (items.len() == limit).then(|| offset + limit);
        Self {
            offset,
            items,
            next_offset,
        }
    }

    pub fn has_more(&self) -> bool {
        self.next_offset.is_some()
    }
}

/// Validated query parameters for one page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub filters: Filters,
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    /// Build a request, clamping `limit` into `1..=MAX_QUERY_LIMIT`.
    pub fn new(filters: Filters, offset: usize, limit: usize) -> Self {
        Self {
            filters,
            offset,
            limit: limit.clamp(1, MAX_QUERY_LIMIT),
        }
    }

    /// Build a request for exactly `limit` rows (at least one), with no upper cap.
    ///
    /// Used when re-reading rows that are already materialized in the cache.
    pub fn covering(filters: Filters, offset: usize, limit: usize) -> Self {
        Self {
            filters,
            offset,
            limit: limit.max(1),
        }
    }

    /// Build a request from untrusted caller input.
    ///
    /// Non-numeric values fall back to `0` / `default_limit`; negative offsets
    /// clamp to `0` and limits clamp into `1..=MAX_PAGE_SIZE`.
    pub fn from_raw(
        filters: Filters,
        offset: Option<&str>,
        limit: Option<&str>,
        default_limit: usize,
    ) -> Self {
        let offset = parse_number_or::<i64>(offset, 0).max(0);
        let limit =
            parse_number_or::<i64>(limit, default_limit as i64).clamp(1, MAX_PAGE_SIZE as i64);
        Self {
            filters,
            offset: usize::try_from(offset).unwrap_or(0),
            limit: usize::try_from(limit).unwrap_or(MAX_PAGE_SIZE),
        }
    }
}

/// Run `request` against the store and classify the result.
///
/// # Errors
/// Propagates store failures unchanged.
pub fn fetch_page(store: &dyn HistoryStore, request: &PageRequest) -> Result<Page, AppError> {
    let items = store.query(&request.filters, request.limit, request.offset)?;
    Ok(Page::from_items(request.offset, request.limit, items))
}
