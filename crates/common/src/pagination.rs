//! Cursor pagination primitives.
//!
//! Listing queries fetch `limit + 1` rows ordered by descending id and report
//! end-of-data explicitly through [`Page::has_more`], so callers never need an
//! extra empty-page fetch to detect termination.

use serde::Serialize;

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items in this page, in query order.
    pub items: Vec<T>,
    /// Cursor for the next page: the last returned item's id, present only
    /// when more data exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Whether more items exist past this page.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// An empty page with no continuation.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            has_more: false,
        }
    }

    /// Build a page from an overfetched result set.
    ///
    /// `rows` must have been queried with `limit + 1`; the extra row, when
    /// present, only proves more data exists and is discarded.
    pub fn from_overfetch(mut rows: Vec<T>, limit: u64, cursor: impl Fn(&T) -> String) -> Self {
        let has_more = rows.len() as u64 > limit;
        rows.truncate(limit as usize);
        let next_cursor = if has_more {
            rows.last().map(cursor)
        } else {
            None
        };
        Self {
            items: rows,
            next_cursor,
            has_more,
        }
    }

    /// Map the items into another type, keeping the cursor state.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
            has_more: self.has_more,
        }
    }
}
