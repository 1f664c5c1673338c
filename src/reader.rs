//! Page reader
//!
//! Read path: locate a book's primary PDF, extract one page and split it
//! into paragraphs for display. Stateless, so requests can run concurrently.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::db::RecordStore;
use crate::error::{AppError, Result};
use crate::pdf::PageTextSource;
use crate::text::split_into_paragraphs;

/// One page prepared for display
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    pub page: u32,
    /// Paragraph chunks in reading order
    pub content: Vec<String>,
    /// Extracted page text with tabs replaced
    pub content_raw: String,
}

/// Reads single pages of a book's primary file
#[derive(Clone)]
pub struct PageReader {
    store: Arc<dyn RecordStore>,
    extractor: Arc<dyn PageTextSource>,
    storage_root: PathBuf,
}

impl PageReader {
    pub fn new(
        store: Arc<dyn RecordStore>,
        extractor: Arc<dyn PageTextSource>,
        storage_root: PathBuf,
    ) -> Self {
        Self {
            store,
            extractor,
            storage_root,
        }
    }

    /// Read a 1-based page of a book.
    ///
    /// Errors: `BadRequest` for page 0, `FileNotFound` when the book has no
    /// primary file, `Extraction` for out-of-range pages and unreadable files.
    pub async fn read(&self, book_id: &str, page: u32) -> Result<PageContent> {
        if page == 0 {
            return Err(AppError::BadRequest("Invalid page number".to_string()));
        }

        let file = self
            .store
            .primary_file(book_id)
            .await?
            .ok_or_else(|| AppError::FileNotFound(book_id.to_string()))?;

        let path = file.storage_path(&self.storage_root);
        let raw = self.extractor.extract_page(&path, page).await?;

        Ok(PageContent {
            page,
            content: split_into_paragraphs(&raw),
            content_raw: raw,
        })
    }
}
