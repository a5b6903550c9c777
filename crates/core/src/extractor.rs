//! The extractor seam and the registry of compiled-in extractors.

use std::collections::HashMap;
use std::path::Path;

use crate::{DocumentFormat, Error, ExtractedText, Result};

/// A format-specific text extractor.
pub trait TextExtractor {
    /// The format this extractor handles.
    fn format(&self) -> DocumentFormat;

    /// Extract all text from the file at `path`.
    fn extract(&self, path: &Path) -> Result<ExtractedText>;
}

/// The set of extractors available to this process.
///
/// Built once at startup; a format without a registered extractor is
/// reported as [`Error::MissingDependency`] when requested.
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<DocumentFormat, Box<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extractor under the format it reports.
    pub fn register<E: TextExtractor + 'static>(&mut self, extractor: E) {
        self.extractors
            .insert(extractor.format(), Box::new(extractor));
    }

    /// Whether an extractor for `format` is available.
    pub fn supports(&self, format: DocumentFormat) -> bool {
        self.extractors.contains_key(&format)
    }

    /// Supported formats, in tag order.
    pub fn formats(&self) -> Vec<DocumentFormat> {
        DocumentFormat::ALL
            .into_iter()
            .filter(|f| self.supports(*f))
            .collect()
    }

    /// Get the extractor for `format`.
    pub fn get(&self, format: DocumentFormat) -> Result<&dyn TextExtractor> {
        self.extractors
            .get(&format)
            .map(|e| e.as_ref())
            .ok_or(Error::MissingDependency(format))
    }
}
