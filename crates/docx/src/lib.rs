//! DOCX (Office Open XML) backend for document text extraction.

pub mod parser;

pub use parser::{DocxExtractor, DocxParser};
