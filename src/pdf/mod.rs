//! PDF text extraction
//!
//! Provides per-page plain text for a stored PDF using MuPDF.
//! Includes the page-text map, extraction errors, and the
//! [`PageTextSource`] seam consumed by the note resolver and the page reader.

mod error;
mod extractor;
mod types;

pub use error::ExtractError;
pub use extractor::{read_all_pages, read_page, MupdfTextExtractor, PageTextSource};
pub use types::PageTextMap;
