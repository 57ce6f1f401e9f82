//! Collection payloads returned by the Events API

use serde::Deserialize;

/// Paginated envelope (`{items, totalCount, pageSize, ...}`)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page_size: i64,
    pub current_page: i64,
    pub total_pages: i64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            page_size: 0,
            current_page: 0,
            total_pages: 0,
            has_previous: false,
            has_next: false,
        }
    }
}

impl<T> Page<T> {
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn can_load_more(&self) -> bool {
        self.has_next && self.current_page < self.total_pages
    }
}

/// A collection endpoint may answer with a bare array or a paginated envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Plain(Vec<T>),
    Paged(Page<T>),
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Plain(items) => items,
            Listing::Paged(page) => page.items,
        }
    }
}
