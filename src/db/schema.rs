//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    // Databases created before page_found existed
    let (has_page_found,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM pragma_table_info('notes') WHERE name = 'page_found'",
    )
    .fetch_one(pool)
    .await?;
    if has_page_found == 0 {
        sqlx::query("ALTER TABLE notes ADD COLUMN page_found INTEGER")
            .execute(pool)
            .await?;
    }

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Files attached to books; at most one is flagged primary
CREATE TABLE IF NOT EXISTS files (
    id TEXT PRIMARY KEY,
    collection_id TEXT NOT NULL,
    book_id TEXT NOT NULL,
    filename TEXT NOT NULL,
    primary_file INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_files_book_primary ON files(book_id, primary_file);

-- Imported highlight notes
CREATE TABLE IF NOT EXISTS notes (
    id TEXT PRIMARY KEY,
    book_id TEXT NOT NULL DEFAULT '',
    user_id TEXT,
    quote TEXT NOT NULL,
    note TEXT,
    processed INTEGER NOT NULL DEFAULT 0,
    page INTEGER,
    page_found INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_notes_processed ON notes(processed, created_at);
CREATE INDEX IF NOT EXISTS idx_notes_book_id ON notes(book_id);
"#;
