//! Text processing
//!
//! Whitespace normalization used on both sides of every excerpt comparison,
//! and the paragraph segmentation used by the page reader.

mod normalize;
mod segment;

pub use normalize::{normalize_for_search, normalize_tabs};
pub use segment::{split_into_paragraphs, CHUNK_PACK_LIMIT, LONG_PARAGRAPH_THRESHOLD};
