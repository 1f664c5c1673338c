//! Record store seam
//!
//! The note resolver and page reader only need three record operations.
//! [`RecordStore`] names them so both can run against SQLite in production
//! and an in-memory store in tests.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::files::{FileRecord, FileRepository};
use super::notes::{Note, NoteRepository};
use crate::error::{AppError, Result};
use crate::resolve::PageResolution;

/// Record operations consumed by resolution and reading
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Notes with `processed = false`, newest first
    async fn unprocessed_notes(&self) -> Result<Vec<Note>>;

    /// The primary file of a book, if one is attached
    async fn primary_file(&self, book_id: &str) -> Result<Option<FileRecord>>;

    /// Persist `processed = true` and the resolved page as one write
    async fn mark_processed(&self, note_id: &str, resolution: PageResolution) -> Result<()>;
}

/// [`RecordStore`] backed by the SQLite pool
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn unprocessed_notes(&self) -> Result<Vec<Note>> {
        NoteRepository::new(&self.pool).list_unprocessed().await
    }

    async fn primary_file(&self, book_id: &str) -> Result<Option<FileRecord>> {
        FileRepository::new(&self.pool).find_primary(book_id).await
    }

    async fn mark_processed(&self, note_id: &str, resolution: PageResolution) -> Result<()> {
        let updated = NoteRepository::new(&self.pool)
            .mark_processed(note_id, resolution)
            .await?;

        if updated {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Note {} no longer exists", note_id)))
        }
    }
}
