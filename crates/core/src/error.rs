//! Error types for document text extraction.

use std::path::PathBuf;
use thiserror::Error;

use crate::DocumentFormat;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting text from a document.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The input path does not exist.
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// An explicit format was given that is not one of the supported tags.
    #[error("Invalid format specified: {0}")]
    InvalidFormat(String),

    /// The format could not be inferred from the file extension.
    #[error("Unsupported file format for {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// ZIP archive error (for DOCX and PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for DOCX and PPTX).
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// A required part is missing from an OOXML package.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// The PDF backend failed to extract text. Its message already names
    /// the failure, so it is shown as-is.
    #[error("{0}")]
    PdfError(String),

    /// The output file could not be created or written.
    #[error("{}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The extractor for this format was not compiled into the binary.
    #[error("{} support is not installed", .0.label())]
    MissingDependency(DocumentFormat),
}
