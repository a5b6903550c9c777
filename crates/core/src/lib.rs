//! Core domain types, format resolution, and output routing for
//! document text extraction.

pub mod error;
pub mod extractor;
pub mod output;
pub mod resolve;
pub mod types;

pub use error::{Error, Result};
pub use extractor::{ExtractorRegistry, TextExtractor};
pub use output::{route, OutputTarget, WriteOutcome};
pub use resolve::resolve;
pub use types::{Document, DocumentFormat, ExtractStats, ExtractedSlide, ExtractedText, Presentation};
