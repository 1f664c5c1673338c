//! Route modules for Slate Server

pub mod health;
pub mod notes;
pub mod read;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Build the application router without middleware layers
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/health", get(health::health_check))
        .nest("/book", read::router())
        .nest("/api/v1/notes", notes::router())
        .with_state(state)
}
