//! Extraction error types

use thiserror::Error;

/// PDF text extraction errors
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Document missing, corrupt or unreadable
    #[error("Failed to open {path}: {reason}")]
    Open { path: String, reason: String },

    /// Requested page is past the end of the document
    #[error("Page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },

    #[error("MuPDF error: {0}")]
    MuPdf(String),

    #[error("Extraction timed out after {0} seconds")]
    Timeout(u64),

    /// An earlier extraction of this file timed out and has not returned yet
    #[error("Extraction of {0} is still running from an earlier attempt")]
    Stalled(String),

    /// The blocking extraction task panicked or was cancelled
    #[error("Extraction task failed: {0}")]
    Task(String),
}

impl From<mupdf::Error> for ExtractError {
    fn from(e: mupdf::Error) -> Self {
        ExtractError::MuPdf(e.to_string())
    }
}
