//! Page reading API
//!
//! `GET /book/:id/read/:page` returns one page of a book's primary PDF as
//! display paragraphs plus the raw extracted text.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::reader::PageContent;
use crate::state::AppState;

/// Create the reading router
pub fn router() -> Router<AppState> {
    Router::new().route("/:id/read/:page", get(read_page))
}

fn parse_page(raw: &str) -> Result<u32> {
    match raw.parse::<u32>() {
        Ok(page) if page >= 1 => Ok(page),
        _ => Err(AppError::BadRequest(format!("Invalid page number: {}", raw))),
    }
}

/// Read one page of a book
async fn read_page(
    State(state): State<AppState>,
    Path((book_id, page)): Path<(String, String)>,
) -> Result<Json<PageContent>> {
    let page = parse_page(&page)?;
    tracing::debug!("Reading page {} of book {}", page, book_id);

    let content = state.reader().read(&book_id, page).await?;
    Ok(Json(content))
}
