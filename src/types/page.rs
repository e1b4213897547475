//! Cursor pagination
//!
//! Histories are listed newest first. A page holds every item whose key is at
//! or below the cursor, up to the page size; the key of the first item that did
//! not fit becomes the next cursor.

use serde::Serialize;

/// One page of a descending listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items in descending key order
    pub items: Vec<T>,

    /// Cursor of the following page, `None` when this is the last page
    pub next_cursor: Option<i64>,
}

impl<T> Page<T> {
    /// Build a page from rows fetched with a limit of `page_size + 1`
    ///
    /// # Arguments
    ///
    /// * `rows` - Rows in descending key order, at most `page_size + 1` of them
    /// * `page_size` - Number of items the page may hold
    /// * `key` - Extracts the cursor key of a row
    ///
    /// # Returns
    ///
    /// The first `page_size` rows, with the key of the surplus row as the next
    /// cursor when there is one
    pub fn from_overfetch(mut rows: Vec<T>, page_size: usize, key: impl Fn(&T) -> i64) -> Self {
        let next_cursor = if rows.len() > page_size {
            let cursor = rows.get(page_size).map(&key);
            rows.truncate(page_size);
            cursor
        } else {
            None
        };

        Page {
            items: rows,
            next_cursor,
        }
    }

    /// Whether the page is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
