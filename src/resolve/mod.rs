//! Excerpt to page resolution
//!
//! Finds the first page of a book whose normalized text contains a note's
//! normalized excerpt. Pages are scanned in ascending order, so an excerpt
//! that appears on several pages resolves to the lowest one.

use serde::Serialize;

use crate::pdf::PageTextMap;
use crate::text::normalize_for_search;

/// Page number stored for a processed note whose excerpt matched no page
pub const UNRESOLVED_PAGE: i64 = 999;

/// Outcome of resolving one excerpt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "page", rename_all = "lowercase")]
pub enum PageResolution {
    /// 1-based page containing the excerpt
    Found(u32),
    /// No page contains the excerpt
    Unresolved,
}

impl PageResolution {
    /// Value persisted in the note's `page` column
    pub fn stored_page(self) -> i64 {
        match self {
            PageResolution::Found(page) => i64::from(page),
            PageResolution::Unresolved => UNRESOLVED_PAGE,
        }
    }

    /// Inverse of [`stored_page`](Self::stored_page)
    pub fn from_stored_page(page: i64) -> Option<Self> {
        match page {
            UNRESOLVED_PAGE => Some(PageResolution::Unresolved),
            p if p >= 1 => u32::try_from(p).ok().map(PageResolution::Found),
            _ => None,
        }
    }

    pub fn is_found(self) -> bool {
        matches!(self, PageResolution::Found(_))
    }
}

/// Resolve an excerpt against a book's pages.
///
/// A blank excerpt is always unresolved rather than matching page 1.
pub fn resolve_page(pages: &PageTextMap, excerpt: &str) -> PageResolution {
    let needle = normalize_for_search(excerpt);
    if needle.is_empty() {
        return PageResolution::Unresolved;
    }

    pages
        .iter()
        .find(|(_, text)| text.contains(needle.as_str()))
        .map(|(page, _)| PageResolution::Found(page))
        .unwrap_or(PageResolution::Unresolved)
}
