//! Notes API routes

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::db::{Note, NoteRepository};
use crate::error::{AppError, Result};
use crate::jobs::SweepReport;
use crate::resolve::PageResolution;
use crate::state::AppState;

/// Note with its decoded resolution
#[derive(Serialize)]
pub struct NoteView {
    #[serde(flatten)]
    pub note: Note,
    pub resolution: Option<PageResolution>,
}

impl From<Note> for NoteView {
    fn from(note: Note) -> Self {
        let resolution = note.resolution();
        Self { note, resolution }
    }
}

/// Create the notes router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/book/:book_id", get(list_book_notes))
        .route("/resolve", post(trigger_resolution))
}

/// List notes for a book in page order
async fn list_book_notes(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<Json<Vec<NoteView>>> {
    let repo = NoteRepository::new(state.db());
    let notes = repo.list_for_book(&book_id).await?;
    Ok(Json(notes.into_iter().map(NoteView::from).collect()))
}

/// Run a resolution sweep now
async fn trigger_resolution(State(state): State<AppState>) -> Result<Json<SweepReport>> {
    state
        .resolution_job()
        .run_once()
        .await
        .map(Json)
        .ok_or_else(|| AppError::Conflict("Note resolution is already running".to_string()))
}
