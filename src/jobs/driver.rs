//! Batch note resolution
//!
//! One sweep: fetch unprocessed notes, group them by book, extract each
//! book's text once, resolve every note of that book and persist each
//! result independently. Failures stay local to their book or note; a book
//! that cannot be read is left for the next sweep.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::db::{Note, RecordStore};
use crate::error::{AppError, Result};
use crate::pdf::PageTextSource;
use crate::resolve::{resolve_page, PageResolution};

/// Counts from one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Unprocessed notes fetched
    pub pending: usize,
    /// Notes dropped because they have no book reference
    pub without_book: usize,
    /// Books whose notes were resolved
    pub books_resolved: usize,
    /// Books skipped (no primary file, extraction failure); retried next sweep
    pub books_skipped: usize,
    /// Notes matched to a page
    pub resolved: usize,
    /// Notes processed without a match
    pub unresolved: usize,
    /// Notes whose update failed; retried next sweep
    pub persist_failures: usize,
}

#[derive(Debug, Default)]
struct BookStats {
    resolved: usize,
    unresolved: usize,
    persist_failures: usize,
}

impl SweepReport {
    fn absorb(&mut self, book: Option<BookStats>) {
        match book {
            Some(stats) => {
                self.books_resolved += 1;
                self.resolved += stats.resolved;
                self.unresolved += stats.unresolved;
                self.persist_failures += stats.persist_failures;
            }
            None => self.books_skipped += 1,
        }
    }
}

/// Partition notes by book id.
///
/// Notes with an empty book reference belong to no batch; only their count
/// is returned. Books come back in ascending id order and each book keeps
/// its notes in the order given.
pub fn group_by_book(notes: Vec<Note>) -> (BTreeMap<String, Vec<Note>>, usize) {
    let mut by_book: BTreeMap<String, Vec<Note>> = BTreeMap::new();
    let mut without_book = 0;

    for note in notes {
        if note.book_id.is_empty() {
            without_book += 1;
            continue;
        }
        by_book.entry(note.book_id.clone()).or_default().push(note);
    }

    (by_book, without_book)
}

/// Resolves unprocessed notes to pages of their book's primary PDF
pub struct NoteResolver {
    store: Arc<dyn RecordStore>,
    extractor: Arc<dyn PageTextSource>,
    storage_root: PathBuf,
    /// Books extracted at the same time within one sweep
    book_concurrency: usize,
}

impl NoteResolver {
    pub fn new(
        store: Arc<dyn RecordStore>,
        extractor: Arc<dyn PageTextSource>,
        storage_root: PathBuf,
        book_concurrency: usize,
    ) -> Self {
        Self {
            store,
            extractor,
            storage_root,
            book_concurrency: book_concurrency.max(1),
        }
    }

    /// Run one full sweep. Never fails; problems are logged and counted.
    pub async fn sweep(&self) -> SweepReport {
        tracing::info!("Checking for unprocessed notes...");

        let mut report = SweepReport::default();

        let notes = match self.store.unprocessed_notes().await {
            Ok(notes) => notes,
            Err(e) => {
                tracing::error!("Error fetching unprocessed notes: {}", e);
                return report;
            }
        };

        report.pending = notes.len();
        if notes.is_empty() {
            tracing::info!("No unprocessed notes found");
            return report;
        }
        tracing::info!("Found {} unprocessed notes", notes.len());

        let (batches, without_book) = group_by_book(notes);
        report.without_book = without_book;

        let outcomes: Vec<Option<BookStats>> = stream::iter(batches)
            .map(|(book_id, notes)| async move {
                match self.resolve_book(&book_id, &notes).await {
                    Ok(stats) => Some(stats),
                    Err(e) => {
                        tracing::warn!(
                            "Skipping {} notes for book {}: {}",
                            notes.len(),
                            book_id,
                            e
                        );
                        None
                    }
                }
            })
            .buffer_unordered(self.book_concurrency)
            .collect()
            .await;

        for outcome in outcomes {
            report.absorb(outcome);
        }

        tracing::info!(
            "Note sweep complete: {} resolved, {} unresolved, {} books skipped, {} save failures",
            report.resolved,
            report.unresolved,
            report.books_skipped,
            report.persist_failures
        );

        report
    }

    /// Resolve and persist every note of one book.
    ///
    /// Errors mean the whole book was skipped; per-note save failures are
    /// counted in the stats instead.
    async fn resolve_book(&self, book_id: &str, notes: &[Note]) -> Result<BookStats> {
        let file = self
            .store
            .primary_file(book_id)
            .await?
            .ok_or_else(|| AppError::FileNotFound(book_id.to_string()))?;

        let path = file.storage_path(&self.storage_root);
        let pages = self.extractor.extract_all_pages(&path).await?;
        tracing::debug!(
            "Loaded {} pages for book {} from {}",
            pages.len(),
            book_id,
            path.display()
        );

        let mut stats = BookStats::default();
        for note in notes {
            let resolution = resolve_page(&pages, &note.quote);
            match resolution {
                PageResolution::Found(page) => {
                    tracing::debug!("Matched note {} to page {}", note.id, page)
                }
                PageResolution::Unresolved => {
                    tracing::info!("Could not find text for note {}", note.id)
                }
            }

            if let Err(e) = self.store.mark_processed(&note.id, resolution).await {
                tracing::error!("Saving note {} failed: {}", note.id, e);
                stats.persist_failures += 1;
                continue;
            }

            if resolution.is_found() {
                stats.resolved += 1;
            } else {
                stats.unresolved += 1;
            }
        }

        Ok(stats)
    }
}
