//! Format resolution from an explicit tag or the file extension.

use std::path::Path;

use crate::{DocumentFormat, Error, Result};

/// Decide which format a file should be extracted as.
///
/// An explicit tag always wins over the extension. Without one, the
/// extension must match a supported format exactly (case-insensitive).
pub fn resolve(path: &Path, explicit_format: Option<&str>) -> Result<DocumentFormat> {
    if let Some(tag) = explicit_format {
        return DocumentFormat::from_tag(tag)
            .ok_or_else(|| Error::InvalidFormat(tag.trim().to_lowercase()));
    }

    path.extension()
        .and_then(|e| e.to_str())
        .and_then(DocumentFormat::from_extension)
        .ok_or_else(|| Error::UnsupportedFormat(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_extension() {
        assert_eq!(resolve(Path::new("a.pdf"), None).unwrap(), DocumentFormat::Pdf);
        assert_eq!(resolve(Path::new("dir/b.DOCX"), None).unwrap(), DocumentFormat::Docx);
        assert_eq!(resolve(Path::new("c.PptX"), None).unwrap(), DocumentFormat::Pptx);
    }

    #[test]
    fn test_resolve_unsupported_extension() {
        for name in ["notes.txt", "legacy.doc", "README", "archive.pptx.zip", ".pdf"] {
            let err = resolve(Path::new(name), None).unwrap_err();
            assert!(
                matches!(err, Error::UnsupportedFormat(_)),
                "{} resolved unexpectedly",
                name
            );
        }
    }

    #[test]
    fn test_explicit_format_wins() {
        assert_eq!(
            resolve(Path::new("report.txt"), Some("pdf")).unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            resolve(Path::new("slides.pdf"), Some("PPTX")).unwrap(),
            DocumentFormat::Pptx
        );
    }

    #[test]
    fn test_invalid_explicit_format() {
        let err = resolve(Path::new("a.pdf"), Some(" RTF")).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(ref tag) if tag == "rtf"));
        assert_eq!(err.to_string(), "Invalid format specified: rtf");
    }
}
