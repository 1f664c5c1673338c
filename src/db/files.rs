//! File record database operations

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Stored file attached to a book
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FileRecord {
    pub id: String,
    pub collection_id: String,
    pub book_id: String,
    pub filename: String,
    pub primary_file: bool,
}

impl FileRecord {
    /// Location of the file's bytes: `root/collection_id/id/filename`
    pub fn storage_path(&self, root: &Path) -> PathBuf {
        root.join(&self.collection_id)
            .join(&self.id)
            .join(&self.filename)
    }
}

/// Create file request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFile {
    pub collection_id: String,
    pub book_id: String,
    pub filename: String,
    pub primary_file: bool,
}

/// File repository
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a specific file record
    pub async fn get(&self, id: &str) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(
            r#"
            SELECT id, collection_id, book_id, filename, primary_file
            FROM files
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(file)
    }

    /// The file flagged primary for a book, if any
    pub async fn find_primary(&self, book_id: &str) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(
            r#"
            SELECT id, collection_id, book_id, filename, primary_file
            FROM files
            WHERE book_id = ? AND primary_file = 1
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(book_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(file)
    }

    /// Register a stored file
    pub async fn create(&self, data: &CreateFile) -> Result<FileRecord> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO files (id, collection_id, book_id, filename, primary_file)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&data.collection_id)
        .bind(&data.book_id)
        .bind(&data.filename)
        .bind(data.primary_file)
        .execute(self.pool)
        .await?;

        self.get(&id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to fetch created file".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;

    fn file(book_id: &str, filename: &str, primary_file: bool) -> CreateFile {
        CreateFile {
            collection_id: "files_col".to_string(),
            book_id: book_id.to_string(),
            filename: filename.to_string(),
            primary_file,
        }
    }

    #[tokio::test]
    async fn test_find_primary_ignores_secondary_files() {
        let pool = create_pool("sqlite::memory:", 1).await.unwrap();
        let repo = FileRepository::new(&pool);

        repo.create(&file("book-1", "scan.epub", false)).await.unwrap();
        let primary = repo.create(&file("book-1", "book.pdf", true)).await.unwrap();
        repo.create(&file("book-2", "other.pdf", true)).await.unwrap();

        let found = repo.find_primary("book-1").await.unwrap().unwrap();
        assert_eq!(found.id, primary.id);
        assert_eq!(found.filename, "book.pdf");
    }

    #[tokio::test]
    async fn test_find_primary_missing() {
        let pool = create_pool("sqlite::memory:", 1).await.unwrap();
        let repo = FileRepository::new(&pool);

        repo.create(&file("book-1", "scan.epub", false)).await.unwrap();

        assert!(repo.find_primary("book-1").await.unwrap().is_none());
        assert!(repo.find_primary("book-9").await.unwrap().is_none());
    }

    #[test]
    fn test_storage_path() {
        let record = FileRecord {
            id: "rec123".to_string(),
            collection_id: "col456".to_string(),
            book_id: "book-1".to_string(),
            filename: "dune_x1y2.pdf".to_string(),
            primary_file: true,
        };

        assert_eq!(
            record.storage_path(Path::new("/data/storage")),
            PathBuf::from("/data/storage/col456/rec123/dune_x1y2.pdf")
        );
    }
}
