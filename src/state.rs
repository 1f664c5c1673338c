//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::db::{RecordStore, SqliteRecordStore};
use crate::jobs::{NoteResolver, ResolutionJob};
use crate::pdf::{MupdfTextExtractor, PageTextSource};
use crate::reader::PageReader;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    db: SqlitePool,
    reader: PageReader,
    resolution_job: ResolutionJob,
}

impl AppState {
    /// Create state backed by SQLite and MuPDF
    pub fn new(config: Config, db: SqlitePool) -> Self {
        let store: Arc<dyn RecordStore> = Arc::new(SqliteRecordStore::new(db.clone()));
        let extractor: Arc<dyn PageTextSource> = Arc::new(MupdfTextExtractor::new(
            config.resolver.extraction_timeout(),
            config.resolver.page_timeout(),
        ));

        Self::with_parts(config, db, store, extractor)
    }

    /// Create state with an explicit record store and text source
    pub fn with_parts(
        config: Config,
        db: SqlitePool,
        store: Arc<dyn RecordStore>,
        extractor: Arc<dyn PageTextSource>,
    ) -> Self {
        let storage_root = config.storage.root.clone();

        let reader = PageReader::new(store.clone(), extractor.clone(), storage_root.clone());
        let resolution_job = ResolutionJob::new(NoteResolver::new(
            store,
            extractor,
            storage_root,
            config.resolver.book_concurrency,
        ));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                reader,
                resolution_job,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    /// Get the page reader
    pub fn reader(&self) -> &PageReader {
        &self.inner.reader
    }

    /// Get the note resolution job
    pub fn resolution_job(&self) -> &ResolutionJob {
        &self.inner.resolution_job
    }
}
