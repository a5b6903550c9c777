//! PDF backend for document text extraction.
//!
//! Text comes from `pdf-extract`; the page count reported in verbose mode is
//! a raw-byte heuristic and may be off for unusual files.

pub mod extractor;

pub use extractor::{count_page_markers, PdfExtractor};
