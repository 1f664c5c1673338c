//! MuPDF-backed page text extraction
//!
//! MuPDF's fz_context is not thread-safe and its calls block, so every
//! extraction opens a fresh document on a blocking thread and is bounded
//! by a timeout. A hung document releases the caller once the timeout
//! elapses; the blocking thread itself may keep running until MuPDF returns,
//! and until it does, new extractions of that file are refused.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use mupdf::pdf::PdfDocument;
use tokio::time::timeout;

use super::error::ExtractError;
use super::types::PageTextMap;
use crate::text::normalize_tabs;

/// Source of per-page text for a stored document.
///
/// The note resolver and the page reader depend on this rather than on
/// MuPDF directly.
#[async_trait]
pub trait PageTextSource: Send + Sync {
    /// Extract and normalize every page of the document.
    ///
    /// Fails as a whole; a partial map is never returned.
    async fn extract_all_pages(&self, path: &Path) -> Result<PageTextMap, ExtractError>;

    /// Extract the raw (tab-normalized) text of one 1-based page.
    async fn extract_page(&self, path: &Path, page: u32) -> Result<String, ExtractError>;
}

/// Files whose timed-out extraction is still running on a blocking thread
#[derive(Debug, Clone, Default)]
struct StalledPaths(Arc<Mutex<HashSet<PathBuf>>>);

impl StalledPaths {
    fn lock(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn contains(&self, path: &Path) -> bool {
        self.lock().contains(path)
    }

    /// Mark `path` stalled unless its task has already finished
    fn hold(&self, path: &Path, finished: &AtomicBool) {
        let mut stalled = self.lock();
        if !finished.load(Ordering::SeqCst) {
            stalled.insert(path.to_path_buf());
        }
    }

    fn release(&self, path: &Path, finished: &AtomicBool) {
        let mut stalled = self.lock();
        finished.store(true, Ordering::SeqCst);
        stalled.remove(path);
    }
}

/// Clears a path's stalled mark when its blocking task ends, even on panic
struct ReleaseOnDrop {
    stalled: StalledPaths,
    path: PathBuf,
    finished: Arc<AtomicBool>,
}

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.stalled.release(&self.path, &self.finished);
    }
}

/// [`PageTextSource`] running MuPDF on the blocking pool
#[derive(Debug, Clone)]
pub struct MupdfTextExtractor {
    /// Limit for a whole-book extraction
    book_timeout: Duration,
    /// Limit for a single-page extraction
    page_timeout: Duration,
    stalled: StalledPaths,
}

impl MupdfTextExtractor {
    pub fn new(book_timeout: Duration, page_timeout: Duration) -> Self {
        Self {
            book_timeout,
            page_timeout,
            stalled: StalledPaths::default(),
        }
    }

    async fn run_blocking<T, F>(&self, path: &Path, limit: Duration, f: F) -> Result<T, ExtractError>
    where
        F: FnOnce(&Path) -> Result<T, ExtractError> + Send + 'static,
        T: Send + 'static,
    {
        if self.stalled.contains(path) {
            return Err(ExtractError::Stalled(path.display().to_string()));
        }

        let finished = Arc::new(AtomicBool::new(false));
        let release = ReleaseOnDrop {
            stalled: self.stalled.clone(),
            path: path.to_path_buf(),
            finished: finished.clone(),
        };
        let task = tokio::task::spawn_blocking(move || {
            let release = release;
            f(&release.path)
        });

        match timeout(limit, task).await {
            Ok(join_result) => join_result.map_err(|e| ExtractError::Task(e.to_string()))?,
            Err(_) => {
                self.stalled.hold(path, &finished);
                tracing::warn!(
                    "Extraction of {} timed out after {:?}; holding further attempts until it returns",
                    path.display(),
                    limit
                );
                Err(ExtractError::Timeout(limit.as_secs()))
            }
        }
    }
}

#[async_trait]
impl PageTextSource for MupdfTextExtractor {
    async fn extract_all_pages(&self, path: &Path) -> Result<PageTextMap, ExtractError> {
        self.run_blocking(path, self.book_timeout, read_all_pages).await
    }

    async fn extract_page(&self, path: &Path, page: u32) -> Result<String, ExtractError> {
        self.run_blocking(path, self.page_timeout, move |path| read_page(path, page))
            .await
    }
}

fn open_document(path: &Path) -> Result<PdfDocument, ExtractError> {
    let path_str = path.to_string_lossy();

    if !path.is_file() {
        return Err(ExtractError::Open {
            path: path_str.into_owned(),
            reason: "file does not exist".to_string(),
        });
    }

    PdfDocument::open(&*path_str).map_err(|e| ExtractError::Open {
        path: path_str.to_string(),
        reason: e.to_string(),
    })
}

/// A page whose page-tree object is null (or cannot be located) has no content.
fn is_null_page(doc: &PdfDocument, index: i32) -> Result<bool, ExtractError> {
    match doc.find_page(index) {
        Ok(obj) => Ok(obj.is_null()?),
        Err(e) => {
            tracing::debug!("Page object {} not found, treating as null: {}", index + 1, e);
            Ok(true)
        }
    }
}

/// Visit pages 1..=page_count in order; `read` returns `None` for a null page.
fn collect_pages<F>(page_count: u32, mut read: F) -> Result<PageTextMap, ExtractError>
where
    F: FnMut(i32) -> Result<Option<String>, ExtractError>,
{
    let mut pages = PageTextMap::new();
    for page_num in 1..=page_count {
        if let Some(text) = read((page_num - 1) as i32)? {
            pages.insert(page_num, &text);
        }
    }
    Ok(pages)
}

/// Read every page of a PDF into a [`PageTextMap`] (blocking).
///
/// Null pages get no entry.
pub fn read_all_pages(path: &Path) -> Result<PageTextMap, ExtractError> {
    let doc = open_document(path)?;
    let page_count = doc.page_count()?.max(0) as u32;

    let pages = collect_pages(page_count, |index| {
        if is_null_page(&doc, index)? {
            return Ok(None);
        }
        Ok(Some(doc.load_page(index)?.to_text()?))
    })?;

    tracing::debug!(
        "Extracted {} of {} pages from {}",
        pages.len(),
        page_count,
        path.display()
    );

    Ok(pages)
}

/// Read the raw text of one 1-based page (blocking).
///
/// Tabs become spaces; line breaks are kept for paragraph segmentation.
/// A null page reads as empty text.
pub fn read_page(path: &Path, page: u32) -> Result<String, ExtractError> {
    let doc = open_document(path)?;
    let page_count = doc.page_count()?.max(0) as u32;

    if page == 0 || page > page_count {
        return Err(ExtractError::PageOutOfRange { page, page_count });
    }

    let index = (page - 1) as i32;
    if is_null_page(&doc, index)? {
        return Ok(String::new());
    }

    let text = doc.load_page(index)?.to_text()?;
    Ok(normalize_tabs(&text))
}
