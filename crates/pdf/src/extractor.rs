//! PDF text extractor.

use std::any::Any;
use std::panic;
use std::path::Path;
use xtotxt_core::{DocumentFormat, Error, ExtractStats, ExtractedText, Result, TextExtractor};

/// Byte pattern that opens a page object dictionary entry.
const PAGE_MARKER: &[u8] = b"/Page ";

/// Extractor for PDF files.
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract text and the approximate page count from PDF bytes.
    ///
    /// `pdf-extract` panics on some structurally valid but malformed files
    /// (a page without `/MediaBox`, for one). Those panics are returned as
    /// [`Error::PdfError`].
    pub fn extract_from_mem(&self, bytes: &[u8]) -> Result<ExtractedText> {
        let text = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
            .map_err(|payload| Error::PdfError(panic_message(payload.as_ref())))?
            .map_err(|e| Error::PdfError(e.to_string()))?;
        let pages = count_page_markers(bytes);
        log::debug!("Extracted {} chars, {} page markers", text.len(), pages);

        Ok(ExtractedText::new(text, ExtractStats::Pdf { pages }))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn extract(&self, path: &Path) -> Result<ExtractedText> {
        let bytes = std::fs::read(path)?;
        self.extract_from_mem(&bytes)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("PDF backend panicked: {}", detail)
}

/// Count raw lines (split on `\n`) that contain the `/Page ` marker.
///
/// Each line counts once however many markers it holds. `/Pages ` does not
/// match.
pub fn count_page_markers(bytes: &[u8]) -> usize {
    bytes
        .split(|&b| b == b'\n')
        .filter(|line| {
            line.windows(PAGE_MARKER.len())
                .any(|window| window == PAGE_MARKER)
        })
        .count()
}
