//! Notes database operations

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::resolve::PageResolution;

/// Imported highlight note
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: String,
    /// Empty when the import could not attach a book
    pub book_id: String,
    pub user_id: Option<String>,
    /// Highlighted excerpt, matched against page text
    pub quote: String,
    pub note: Option<String>,
    pub processed: bool,
    /// Resolved page, or 999 when unresolved; unset until processed
    pub page: Option<i64>,
    /// Whether `page` is a real match; unset until processed
    pub page_found: Option<bool>,
    pub created_at: String,
    pub updated_at: String,
}

impl Note {
    /// Resolution recorded for this note, if it has been processed
    pub fn resolution(&self) -> Option<PageResolution> {
        if !self.processed {
            return None;
        }
        match (self.page_found, self.page) {
            (Some(false), _) => Some(PageResolution::Unresolved),
            (Some(true), Some(page)) => u32::try_from(page)
                .ok()
                .filter(|p| *p >= 1)
                .map(PageResolution::Found),
            // written before page_found was recorded
            (None, Some(page)) => PageResolution::from_stored_page(page),
            _ => None,
        }
    }
}

/// Create note request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateNote {
    pub book_id: String,
    pub user_id: Option<String>,
    pub quote: String,
    pub note: Option<String>,
    /// Highlight date from the annotation source, RFC 3339
    pub created_at: Option<String>,
}

/// Note repository
pub struct NoteRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> NoteRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a specific note
    pub async fn get(&self, id: &str) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, book_id, user_id, quote, note, processed, page, page_found,
                   created_at, updated_at
            FROM notes
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(note)
    }

    /// Insert a new, unprocessed note
    pub async fn create(&self, data: &CreateNote) -> Result<Note> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let created_at = data.created_at.as_deref().unwrap_or(&now);

        sqlx::query(
            r#"
            INSERT INTO notes (id, book_id, user_id, quote, note, processed, page, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 0, NULL, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&data.book_id)
        .bind(&data.user_id)
        .bind(&data.quote)
        .bind(&data.note)
        .bind(created_at)
        .bind(&now)
        .execute(self.pool)
        .await?;

        self.get(&id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to fetch created note".to_string()))
    }

    /// All notes awaiting resolution, newest first
    pub async fn list_unprocessed(&self) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, book_id, user_id, quote, note, processed, page, page_found,
                   created_at, updated_at
            FROM notes
            WHERE processed = 0
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(notes)
    }

    /// Notes for a book in reading order; unprocessed notes last
    pub async fn list_for_book(&self, book_id: &str) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, book_id, user_id, quote, note, processed, page, page_found,
                   created_at, updated_at
            FROM notes
            WHERE book_id = ?
            ORDER BY page IS NULL, page ASC, created_at ASC
            "#,
        )
        .bind(book_id)
        .fetch_all(self.pool)
        .await?;

        Ok(notes)
    }

    /// Record a resolution: `processed`, `page` and `page_found` in one update.
    ///
    /// Returns false if the note no longer exists.
    pub async fn mark_processed(&self, id: &str, resolution: PageResolution) -> Result<bool> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            UPDATE notes
            SET processed = 1, page = ?, page_found = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(resolution.stored_page())
        .bind(resolution.is_found())
        .bind(&now)
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
