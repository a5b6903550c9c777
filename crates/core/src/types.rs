//! Domain types for representing extracted document content.

use std::fmt;

/// The format of a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Portable Document Format.
    Pdf,
    /// Word-processing document (Office Open XML).
    Docx,
    /// Slide deck (Office Open XML).
    Pptx,
}

impl DocumentFormat {
    /// All supported formats.
    pub const ALL: [DocumentFormat; 3] = [Self::Pdf, Self::Docx, Self::Pptx];

    /// Parse a format tag such as `pdf` or `DOCX`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            _ => None,
        }
    }

    /// Detect format from file extension, with or without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.strip_prefix('.').unwrap_or(ext).to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            _ => None,
        }
    }

    /// Lowercase tag, also used as the cargo feature name.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Pptx => "pptx",
        }
    }

    /// Uppercase label for user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Pptx => "PPTX",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Counts gathered while extracting a document, reported in verbose mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStats {
    /// Approximate page count from the raw page-marker scan.
    Pdf { pages: usize },
    /// Number of body paragraphs.
    Docx { paragraphs: usize },
    /// Number of slides and of text-bearing shapes across all slides.
    Pptx { slides: usize, text_shapes: usize },
}

impl ExtractStats {
    /// One-line summary naming the source file.
    pub fn summary(&self, source: &str) -> String {
        match self {
            Self::Pdf { pages } => {
                format!("Processed {} pages from PDF file: {}", pages, source)
            }
            Self::Docx { paragraphs } => {
                format!("Processed {} paragraphs from DOCX file: {}", paragraphs, source)
            }
            Self::Pptx {
                slides,
                text_shapes,
            } => format!(
                "Processed {} slides and {} text elements from PPTX file: {}",
                slides, text_shapes, source
            ),
        }
    }
}

/// Text produced by an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// The extracted plain text. May be empty for documents without text.
    pub text: String,

    /// Processing statistics.
    pub stats: ExtractStats,
}

impl ExtractedText {
    pub fn new(text: impl Into<String>, stats: ExtractStats) -> Self {
        Self {
            text: text.into(),
            stats,
        }
    }
}

/// A word-processing document reduced to its body paragraphs.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Paragraph text in document order. Empty paragraphs are kept.
    pub paragraphs: Vec<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a paragraph.
    pub fn add_paragraph(&mut self, text: impl Into<String>) {
        self.paragraphs.push(text.into());
    }

    /// Paragraphs joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }

    pub fn stats(&self) -> ExtractStats {
        ExtractStats::Docx {
            paragraphs: self.paragraphs.len(),
        }
    }
}

/// Represents an entire presentation with its extracted content.
#[derive(Debug, Clone)]
pub struct Presentation {
    /// Original filename (without path).
    pub filename: String,

    /// Slides in presentation order.
    pub slides: Vec<ExtractedSlide>,
}

impl Presentation {
    /// Create a new, empty presentation.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            slides: Vec::new(),
        }
    }

    /// Add a slide to the presentation.
    pub fn add_slide(&mut self, slide: ExtractedSlide) {
        self.slides.push(slide);
    }

    /// Total number of text-bearing shapes across all slides.
    pub fn text_shape_count(&self) -> usize {
        self.slides.iter().map(|s| s.shapes.len()).sum()
    }

    /// Render the presentation as plain text.
    ///
    /// Every slide with text contributes a `--- Slide N ---` header followed by
    /// one line per shape. Slides without text are skipped entirely.
    pub fn text(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        for slide in self.slides.iter().filter(|s| s.has_text()) {
            parts.push(format!("--- Slide {} ---", slide.number));
            parts.extend(slide.shapes.iter().cloned());
        }
        parts.join("\n")
    }

    pub fn stats(&self) -> ExtractStats {
        ExtractStats::Pptx {
            slides: self.slides.len(),
            text_shapes: self.text_shape_count(),
        }
    }
}

/// A single extracted slide.
#[derive(Debug, Clone)]
pub struct ExtractedSlide {
    /// 1-based slide number.
    pub number: usize,

    /// Text of each text-bearing shape, in shape-tree order.
    pub shapes: Vec<String>,
}

impl ExtractedSlide {
    /// Create a new slide with the given number.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            shapes: Vec::new(),
        }
    }

    /// Record a shape's text. Empty text is ignored.
    pub fn add_shape_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.shapes.push(text);
        }
    }

    pub fn has_text(&self) -> bool {
        !self.shapes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(number: usize, shapes: &[&str]) -> ExtractedSlide {
        let mut slide = ExtractedSlide::new(number);
        for shape in shapes {
            slide.add_shape_text(*shape);
        }
        slide
    }

    #[test]
    fn test_format_from_tag() {
        assert_eq!(DocumentFormat::from_tag("pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_tag("DOCX"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_tag(" PpTx "), Some(DocumentFormat::Pptx));
        assert_eq!(DocumentFormat::from_tag("txt"), None);
        assert_eq!(DocumentFormat::from_tag(""), None);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension(".pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("PPTX"), Some(DocumentFormat::Pptx));
        assert_eq!(DocumentFormat::from_extension("doc"), None);
        assert_eq!(DocumentFormat::from_extension(".docx.bak"), None);
    }

    #[test]
    fn test_presentation_text_skips_empty_slides() {
        let mut presentation = Presentation::new("deck.pptx");
        presentation.add_slide(slide(1, &["Hello"]));
        presentation.add_slide(slide(2, &[]));
        presentation.add_slide(slide(3, &["A", "B"]));

        assert_eq!(
            presentation.text(),
            "--- Slide 1 ---\nHello\n--- Slide 3 ---\nA\nB"
        );
        assert_eq!(
            presentation.stats(),
            ExtractStats::Pptx {
                slides: 3,
                text_shapes: 3
            }
        );
    }

    #[test]
    fn test_presentation_without_text_is_empty() {
        let mut presentation = Presentation::new("blank.pptx");
        presentation.add_slide(slide(1, &[""]));
        assert_eq!(presentation.text(), "");
        assert_eq!(presentation.text_shape_count(), 0);
    }

    #[test]
    fn test_document_keeps_empty_paragraphs() {
        let mut doc = Document::new();
        doc.add_paragraph("Title");
        doc.add_paragraph("");
        doc.add_paragraph("Body");

        assert_eq!(doc.text(), "Title\n\nBody");
        assert_eq!(doc.stats(), ExtractStats::Docx { paragraphs: 3 });
    }

    #[test]
    fn test_stats_summary() {
        let stats = ExtractStats::Pptx {
            slides: 4,
            text_shapes: 7,
        };
        assert_eq!(
            stats.summary("talk.pptx"),
            "Processed 4 slides and 7 text elements from PPTX file: talk.pptx"
        );
        assert_eq!(
            ExtractStats::Pdf { pages: 2 }.summary("a.pdf"),
            "Processed 2 pages from PDF file: a.pdf"
        );
    }
}
