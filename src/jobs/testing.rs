//! In-memory store and extractor for resolution tests

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::db::{FileRecord, Note, RecordStore};
use crate::error::{AppError, Result};
use crate::pdf::{ExtractError, PageTextMap, PageTextSource};
use crate::resolve::PageResolution;

pub fn note(id: &str, book_id: &str, quote: &str) -> Note {
    Note {
        id: id.to_string(),
        book_id: book_id.to_string(),
        user_id: None,
        quote: quote.to_string(),
        note: None,
        processed: false,
        page: None,
        page_found: None,
        created_at: "2025-01-01T00:00:00Z".to_string(),
        updated_at: "2025-01-01T00:00:00Z".to_string(),
    }
}

#[derive(Default)]
pub struct MemoryStore {
    notes: Mutex<Vec<Note>>,
    files: Mutex<HashMap<String, FileRecord>>,
    failing_saves: Mutex<HashSet<String>>,
    pub unprocessed_queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_note(&self, note: Note) {
        self.notes.lock().unwrap().push(note);
    }

    pub fn add_primary_file(&self, book_id: &str) {
        let record = FileRecord {
            id: format!("file-{}", book_id),
            collection_id: "files".to_string(),
            book_id: book_id.to_string(),
            filename: format!("{}.pdf", book_id),
            primary_file: true,
        };
        self.files.lock().unwrap().insert(book_id.to_string(), record);
    }

    /// Storage path the resolver will ask for, under `/storage`
    pub fn path_for(&self, book_id: &str) -> PathBuf {
        Path::new("/storage")
            .join("files")
            .join(format!("file-{}", book_id))
            .join(format!("{}.pdf", book_id))
    }

    pub fn fail_saves_for(&self, note_id: &str) {
        self.failing_saves.lock().unwrap().insert(note_id.to_string());
    }

    pub fn note(&self, id: &str) -> Note {
        self.notes
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .unwrap()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn unprocessed_notes(&self) -> Result<Vec<Note>> {
        self.unprocessed_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .notes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| !n.processed)
            .cloned()
            .collect())
    }

    async fn primary_file(&self, book_id: &str) -> Result<Option<FileRecord>> {
        Ok(self.files.lock().unwrap().get(book_id).cloned())
    }

    async fn mark_processed(&self, note_id: &str, resolution: PageResolution) -> Result<()> {
        if self.failing_saves.lock().unwrap().contains(note_id) {
            return Err(AppError::Internal(format!("save rejected for {}", note_id)));
        }

        let mut notes = self.notes.lock().unwrap();
        let note = notes
            .iter_mut()
            .find(|n| n.id == note_id)
            .ok_or_else(|| AppError::NotFound(note_id.to_string()))?;
        note.processed = true;
        note.page = Some(resolution.stored_page());
        note.page_found = Some(resolution.is_found());
        Ok(())
    }
}

/// Serves prepared page text by path; unknown paths fail to open
#[derive(Default)]
pub struct FakeExtractor {
    books: HashMap<PathBuf, Vec<(u32, String)>>,
    extractions: AtomicUsize,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_book(mut self, path: &Path, pages: Vec<(u32, &str)>) -> Self {
        let pages = pages
            .into_iter()
            .map(|(page, text)| (page, text.to_string()))
            .collect();
        self.books.insert(path.to_path_buf(), pages);
        self
    }

    pub fn book_extractions(&self) -> usize {
        self.extractions.load(Ordering::SeqCst)
    }

    fn pages(&self, path: &Path) -> std::result::Result<&Vec<(u32, String)>, ExtractError> {
        self.books.get(path).ok_or_else(|| ExtractError::Open {
            path: path.display().to_string(),
            reason: "file does not exist".to_string(),
        })
    }
}

#[async_trait]
impl PageTextSource for FakeExtractor {
    async fn extract_all_pages(
        &self,
        path: &Path,
    ) -> std::result::Result<PageTextMap, ExtractError> {
        self.extractions.fetch_add(1, Ordering::SeqCst);
        Ok(self.pages(path)?.iter().map(|(p, t)| (*p, t.as_str())).collect())
    }

    async fn extract_page(
        &self,
        path: &Path,
        page: u32,
    ) -> std::result::Result<String, ExtractError> {
        let pages = self.pages(path)?;
        let page_count = pages.len() as u32;
        pages
            .iter()
            .find(|(p, _)| *p == page)
            .map(|(_, text)| text.clone())
            .ok_or(ExtractError::PageOutOfRange { page, page_count })
    }
}
