//! Slate Server Library
//!
//! Resolves imported highlight excerpts to the PDF page they appear on and
//! serves single pages as display paragraphs. The binary is in main.rs.
//!
//! # Modules
//!
//! - `text`: search normalization and paragraph segmentation
//! - `pdf`: per-page text extraction via MuPDF
//! - `resolve`: excerpt to page matching
//! - `jobs`: the batch resolution sweep and its schedule
//! - `reader`: the single-page read path

pub mod config;
pub mod db;
pub mod error;
pub mod jobs;
pub mod pdf;
pub mod reader;
pub mod resolve;
pub mod routes;
pub mod state;
pub mod text;
