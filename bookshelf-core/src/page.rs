//! Token-paged result pages.
//!
//! A [`Page`] carries one slice of an ordered listing plus the token that
//! resumes the listing after it. A `None` token means there is nothing more.

use serde::{Deserialize, Serialize};

/// A single page of results.
///
/// # Example
///
/// ```ignore
/// use bookshelf_core::page::Page;
///
/// let page = Page::builder(vec!["A", "B"])
///     .with_next_page_token(Some("B".to_string()))
///     .build();
///
/// assert!(page.has_next_page());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The items contained in this page, in listing order.
    pub items: Vec<T>,
    /// Cursor for the following page, or `None` on the last page.
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn builder(items: Vec<T>) -> PageBuilder<T> {
        PageBuilder::new(items)
    }

    pub fn has_next_page(&self) -> bool {
        self.next_page_token.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maps the items, keeping the token.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_page_token: self.next_page_token,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_page_token: None,
        }
    }
}

pub struct PageBuilder<T> {
    items: Vec<T>,
    next_page_token: Option<String>,
}

impl<T> PageBuilder<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: None,
        }
    }

    /// Sets the token for the following page (or `None` if this is the last page).
    pub fn with_next_page_token(mut self, token: Option<String>) -> Self {
        self.next_page_token = token;
        self
    }

    pub fn build(self) -> Page<T> {
        Page {
            items: self.items,
            next_page_token: self.next_page_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page_is_last_and_empty() {
        let page: Page<u8> = Page::default();

        assert!(page.is_empty());
        assert!(!page.has_next_page());
    }

    #[test]
    fn map_keeps_token() {
        let page = Page::builder(vec![1, 2])
            .with_next_page_token(Some("2".to_string()))
            .build()
            .map(|n| n * 10);

        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.next_page_token.as_deref(), Some("2"));
    }

    #[test]
    fn serializes_with_camel_case_token() {
        let page = Page::builder(vec!["A"]).build();
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json, serde_json::json!({ "items": ["A"], "nextPageToken": null }));
    }
}
