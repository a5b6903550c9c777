//! DOCX file parser implementation.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use xtotxt_core::{Document, DocumentFormat, Error, ExtractedText, Result, TextExtractor};
use zip::ZipArchive;

const PACKAGE_RELS_PATH: &str = "_rels/.rels";
const DEFAULT_DOCUMENT_PATH: &str = "word/document.xml";

/// Parser for DOCX (Office Open XML) files.
pub struct DocxParser;

impl DocxParser {
    /// Create a new DOCX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a DOCX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<Document> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let document_path = self.get_document_path(&mut archive)?;
        log::debug!("Main document part: {}", document_path);

        let content = read_file_from_archive(&mut archive, &document_path)?;
        let mut document = Document::new();
        for paragraph in extract_paragraphs(&content)? {
            document.add_paragraph(paragraph);
        }

        Ok(document)
    }

    /// Locate the main document part through the package relationships.
    fn get_document_path<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<String> {
        let has_rels = archive.by_name(PACKAGE_RELS_PATH).is_ok();
        if !has_rels {
            return Ok(DEFAULT_DOCUMENT_PATH.to_string());
        }

        let rels = read_file_from_archive(archive, PACKAGE_RELS_PATH)?;
        let mut reader = Reader::from_str(&rels);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"Relationship" => {
                    if let Some(target) = office_document_target(e) {
                        return Ok(target.trim_start_matches('/').to_string());
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        log::warn!("No officeDocument relationship, assuming {}", DEFAULT_DOCUMENT_PATH);
        Ok(DEFAULT_DOCUMENT_PATH.to_string())
    }
}

impl Default for DocxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// [`TextExtractor`] for `.docx` files.
#[derive(Default)]
pub struct DocxExtractor {
    parser: DocxParser,
}

impl DocxExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextExtractor for DocxExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn extract(&self, path: &Path) -> Result<ExtractedText> {
        let reader = BufReader::new(File::open(path)?);
        let document = self.parser.parse(reader)?;
        Ok(ExtractedText::new(document.text(), document.stats()))
    }
}

fn office_document_target(e: &BytesStart) -> Option<String> {
    let mut rel_type = None;
    let mut target = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"Type" => rel_type = Some(String::from_utf8_lossy(&attr.value).to_string()),
            b"Target" => target = Some(String::from_utf8_lossy(&attr.value).to_string()),
            _ => {}
        }
    }
    match rel_type {
        Some(t) if t.ends_with("/officeDocument") => target,
        _ => None,
    }
}

/// Walks `document.xml` and collects body paragraphs.
///
/// Only paragraphs that sit directly in the body count. Table cells and text
/// boxes (paragraphs nested inside another paragraph's runs) are skipped.
#[derive(Default)]
struct ParagraphCollector {
    paragraphs: Vec<String>,
    current: String,
    paragraph_depth: usize,
    table_depth: usize,
    in_run: bool,
    in_text: bool,
}

impl ParagraphCollector {
    /// Inside a body-level paragraph (and not in a nested one).
    fn collecting(&self) -> bool {
        self.paragraph_depth == 1 && self.table_depth == 0
    }

    fn start(&mut self, name: &[u8]) {
        match name {
            b"p" => {
                self.paragraph_depth += 1;
                if self.collecting() {
                    self.current.clear();
                }
            }
            b"tbl" => self.table_depth += 1,
            b"r" if self.collecting() => self.in_run = true,
            b"t" if self.collecting() && self.in_run => self.in_text = true,
            _ => self.run_content(name),
        }
    }

    fn empty(&mut self, name: &[u8]) {
        match name {
            b"p" if self.paragraph_depth == 0 && self.table_depth == 0 => {
                self.paragraphs.push(String::new());
            }
            _ => self.run_content(name),
        }
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"p" => {
                if self.collecting() {
                    self.paragraphs.push(std::mem::take(&mut self.current));
                }
                self.paragraph_depth = self.paragraph_depth.saturating_sub(1);
            }
            b"tbl" => self.table_depth = self.table_depth.saturating_sub(1),
            b"r" if self.collecting() => self.in_run = false,
            b"t" => self.in_text = false,
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_text && self.collecting() {
            self.current.push_str(text);
        }
    }

    /// Tabs and breaks inside a run. Tab stops in paragraph properties are
    /// also named `tab`, hence the run check.
    fn run_content(&mut self, name: &[u8]) {
        if !(self.collecting() && self.in_run) {
            return;
        }
        match name {
            b"tab" => self.current.push('\t'),
            b"br" | b"cr" => self.current.push('\n'),
            _ => {}
        }
    }
}

/// Extract body paragraph text from the main document part, in order.
fn extract_paragraphs(xml_content: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml_content);
    let mut collector = ParagraphCollector::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => collector.start(local_name(e.name().as_ref())),
            Ok(Event::Empty(ref e)) => collector.empty(local_name(e.name().as_ref())),
            Ok(Event::End(ref e)) => collector.end(local_name(e.name().as_ref())),
            Ok(Event::Text(ref e)) if collector.in_text => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::XmlError(format!("Bad document text: {}", e)))?;
                collector.text(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing document: {}", e)));
            }
            _ => {}
        }
    }

    Ok(collector.paragraphs)
}

/// Read a file from the ZIP archive.
fn read_file_from_archive<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|_| Error::MissingPart(path.to_string()))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}
