//! Page text types

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::text::normalize_for_search;

/// Normalized text of one book, keyed by 1-based page number.
///
/// Built fresh for every resolution run and dropped once the book's notes
/// are resolved. Iteration is always in ascending page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTextMap {
    pages: BTreeMap<u32, String>,
}

impl PageTextMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a page, normalizing its text for search.
    pub fn insert(&mut self, page: u32, raw_text: &str) {
        self.pages.insert(page, normalize_for_search(raw_text));
    }

    pub fn get(&self, page: u32) -> Option<&str> {
        self.pages.get(&page).map(String::as_str)
    }

    /// Number of pages with an entry (null pages have none)
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages in ascending page-number order
    pub fn iter(&self) -> Pages<'_> {
        Pages {
            inner: self.pages.iter(),
        }
    }
}

impl<S: AsRef<str>> FromIterator<(u32, S)> for PageTextMap {
    fn from_iter<I: IntoIterator<Item = (u32, S)>>(iter: I) -> Self {
        let mut map = PageTextMap::new();
        for (page, text) in iter {
            map.insert(page, text.as_ref());
        }
        map
    }
}

/// Ascending iterator over `(page, normalized_text)`
pub struct Pages<'a> {
    inner: btree_map::Iter<'a, u32, String>,
}

impl<'a> Iterator for Pages<'a> {
    type Item = (u32, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(page, text)| (*page, text.as_str()))
    }
}
