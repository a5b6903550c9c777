//! PPTX file parser implementation.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use xtotxt_core::{
    DocumentFormat, Error, ExtractedSlide, ExtractedText, Presentation, Result, TextExtractor,
};
use zip::ZipArchive;

const PRESENTATION_PATH: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PATH: &str = "ppt/_rels/presentation.xml.rels";

/// Soft line break (`<a:br/>`) inside a paragraph. Paragraphs themselves are
/// separated by `\n`.
const LINE_BREAK: char = '\u{000B}';

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PPTX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R, filename: &str) -> Result<Presentation> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut presentation = Presentation::new(filename);

        let slide_order = self.get_slide_order(&mut archive)?;
        log::debug!("{}: {} slides", filename, slide_order.len());

        for (idx, slide_path) in slide_order.iter().enumerate() {
            let slide = self.parse_slide(&mut archive, slide_path, idx + 1)?;
            presentation.add_slide(slide);
        }

        Ok(presentation)
    }

    /// Get the ordered list of slide paths.
    ///
    /// The slide id list in `presentation.xml` is authoritative. Packages
    /// without one fall back to ordering slide relationships by number.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = read_file_from_archive(archive, PRESENTATION_RELS_PATH)?;
        let relationships = parse_relationships(&rels_content)?;

        let targets: HashMap<&str, &str> = relationships
            .iter()
            .filter(|r| is_slide_relationship(&r.rel_type))
            .map(|r| (r.id.as_str(), r.target.as_str()))
            .collect();

        let has_presentation = archive.by_name(PRESENTATION_PATH).is_ok();
        let listed = if has_presentation {
            let content = read_file_from_archive(archive, PRESENTATION_PATH)?;
            parse_slide_id_list(&content)?
        } else {
            Vec::new()
        };

        if !listed.is_empty() {
            return Ok(listed
                .iter()
                .filter_map(|id| {
                    let target = targets.get(id.as_str());
                    if target.is_none() {
                        log::warn!("Slide id {} has no relationship, skipping", id);
                    }
                    target.map(|t| resolve_target(t))
                })
                .collect());
        }

        let mut slides: Vec<(String, Option<usize>)> = relationships
            .iter()
            .filter(|r| is_slide_relationship(&r.rel_type))
            .map(|r| {
                let order_num = extract_slide_number(&r.target).or_else(|| extract_slide_number(&r.id));
                (resolve_target(&r.target), order_num)
            })
            .collect();

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Parse a single slide from the archive.
    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        slide_number: usize,
    ) -> Result<ExtractedSlide> {
        let content = read_file_from_archive(archive, slide_path)?;
        let mut slide = ExtractedSlide::new(slide_number);

        for text in extract_shape_texts(&content)? {
            slide.add_shape_text(text);
        }

        Ok(slide)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// [`TextExtractor`] for `.pptx` files.
#[derive(Default)]
pub struct PptxExtractor {
    parser: PptxParser,
}

impl PptxExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextExtractor for PptxExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pptx
    }

    fn extract(&self, path: &Path) -> Result<ExtractedText> {
        let reader = BufReader::new(File::open(path)?);
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");

        let presentation = self.parser.parse(reader, filename)?;
        Ok(ExtractedText::new(presentation.text(), presentation.stats()))
    }
}

/// One `<Relationship>` entry from a `.rels` part.
#[derive(Debug)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut relationships = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"Relationship" => {
                let mut rel = Relationship {
                    id: String::new(),
                    rel_type: String::new(),
                    target: String::new(),
                };
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"Id" => rel.id = value,
                        b"Type" => rel.rel_type = value,
                        b"Target" => rel.target = value,
                        _ => {}
                    }
                }
                relationships.push(rel);
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

    Ok(relationships)
}

/// Relationship ids of `<p:sldId>` entries, in presentation order.
fn parse_slide_id_list(xml: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"sldId" => {
                if let Some(id) = relationship_id(e) {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// The namespaced `r:id` attribute (the bare `id` is the numeric slide id).
fn relationship_id(e: &BytesStart) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        let key = attr.key.as_ref();
        if key.contains(&b':') && local_name(key) == b"id" {
            Some(String::from_utf8_lossy(&attr.value).to_string())
        } else {
            None
        }
    })
}

/// Text of each top-level shape in a slide, in shape-tree order.
///
/// Members of group shapes are not slide-level shapes and are skipped.
/// A shape's paragraphs are joined by newlines and soft line breaks become a
/// vertical tab; shapes without a text body yield an empty string.
fn extract_shape_texts(xml_content: &str) -> Result<Vec<String>> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);

    let mut group_depth = 0usize;
    let mut in_shape = false;
    let mut in_text_body = false;
    let mut in_text = false;
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"grpSp" => group_depth += 1,
                b"sp" if group_depth == 0 => {
                    in_shape = true;
                    paragraphs.clear();
                }
                b"txBody" if in_shape => in_text_body = true,
                b"p" if in_text_body => current = Some(String::new()),
                b"t" if current.is_some() => in_text = true,
                b"br" => push_to(&mut current, LINE_BREAK),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"p" if in_text_body => paragraphs.push(String::new()),
                b"br" => push_to(&mut current, LINE_BREAK),
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::XmlError(format!("Bad slide text: {}", e)))?;
                if let Some(ref mut p) = current {
                    p.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"grpSp" => group_depth = group_depth.saturating_sub(1),
                b"sp" if in_shape && group_depth == 0 => {
                    shapes.push(paragraphs.join("\n"));
                    paragraphs.clear();
                    in_shape = false;
                    in_text_body = false;
                }
                b"txBody" => in_text_body = false,
                b"p" => {
                    if let Some(p) = current.take() {
                        paragraphs.push(p);
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing slide: {}", e)));
            }
            _ => {}
        }
    }

    Ok(shapes)
}

fn push_to(current: &mut Option<String>, c: char) {
    if let Some(p) = current {
        p.push(c);
    }
}

/// Read a file from the ZIP archive.
fn read_file_from_archive<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

fn is_slide_relationship(rel_type: &str) -> bool {
    rel_type.ends_with("/slide")
}

/// Turn a relationship target into an archive path.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target),
    }
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slides/slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    const SLIDE_REL: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    const LAYOUT_REL: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

    fn text_shape(paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", p))
            .collect();
        format!(
            "<p:sp><p:nvSpPr><p:cNvPr id=\"2\" name=\"Box\"/></p:nvSpPr>\
             <p:txBody><a:bodyPr/>{}</p:txBody></p:sp>",
            body
        )
    }

    fn slide_xml(shapes: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <p:sld xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
             xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
             <p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>",
            shapes
        )
    }

    /// Build a package whose slide id list follows `order` (1-based slide numbers).
    fn build_pptx(slides: &[String], order: &[usize]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        let mut rels = String::from("<Relationships>");
        rels.push_str(&format!(
            "<Relationship Id=\"rId100\" Type=\"{}\" Target=\"slideLayouts/slideLayout1.xml\"/>",
            LAYOUT_REL
        ));
        for n in 1..=slides.len() {
            rels.push_str(&format!(
                "<Relationship Id=\"rId{}\" Type=\"{}\" Target=\"slides/slide{}.xml\"/>",
                n + 1,
                SLIDE_REL,
                n
            ));
        }
        rels.push_str("</Relationships>");

        let ids: String = order
            .iter()
            .enumerate()
            .map(|(i, n)| format!("<p:sldId id=\"{}\" r:id=\"rId{}\"/>", 256 + i, n + 1))
            .collect();
        let presentation = format!(
            "<p:presentation xmlns:p=\"p\" xmlns:r=\"r\"><p:sldIdLst>{}</p:sldIdLst></p:presentation>",
            ids
        );

        zip.start_file(PRESENTATION_RELS_PATH, options).unwrap();
        zip.write_all(rels.as_bytes()).unwrap();
        zip.start_file(PRESENTATION_PATH, options).unwrap();
        zip.write_all(presentation.as_bytes()).unwrap();
        for (i, slide) in slides.iter().enumerate() {
            zip.start_file(format!("ppt/slides/slide{}.xml", i + 1), options)
                .unwrap();
            zip.write_all(slide.as_bytes()).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slides/slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(resolve_target("/ppt/slides/slide2.xml"), "ppt/slides/slide2.xml");
    }

    #[test]
    fn test_shape_texts_in_tree_order() {
        let xml = slide_xml(&format!(
            "{}{}",
            text_shape(&["Title"]),
            text_shape(&["First", "Second"])
        ));
        let shapes = extract_shape_texts(&xml).unwrap();
        assert_eq!(shapes, vec!["Title", "First\nSecond"]);
    }

    #[test]
    fn test_group_members_and_pictures_are_skipped() {
        let xml = slide_xml(&format!(
            "<p:grpSp><p:grpSpPr/>{}</p:grpSp><p:pic><p:blipFill/></p:pic>{}",
            text_shape(&["Grouped"]),
            text_shape(&["Loose"])
        ));
        let shapes = extract_shape_texts(&xml).unwrap();
        assert_eq!(shapes, vec!["Loose"]);
    }

    #[test]
    fn test_line_breaks_entities_and_spacing() {
        let xml = slide_xml(
            "<p:sp><p:txBody><a:p><a:r><a:t>Fish &amp; </a:t></a:r><a:br/>\
             <a:r><a:t>Chips</a:t></a:r></a:p><a:p/></p:txBody></p:sp>",
        );
        let shapes = extract_shape_texts(&xml).unwrap();
        assert_eq!(shapes, vec!["Fish & \u{000B}Chips\n"]);
    }

    #[test]
    fn test_parse_presentation_text() {
        let slides = vec![
            slide_xml(&text_shape(&["Hello"])),
            slide_xml(""),
            slide_xml(&format!("{}{}", text_shape(&["A"]), text_shape(&["B"]))),
        ];
        let data = build_pptx(&slides, &[1, 2, 3]);

        let presentation = PptxParser::new()
            .parse(Cursor::new(data), "deck.pptx")
            .unwrap();

        assert_eq!(presentation.slides.len(), 3);
        assert_eq!(
            presentation.text(),
            "--- Slide 1 ---\nHello\n--- Slide 3 ---\nA\nB"
        );
        assert_eq!(presentation.text_shape_count(), 3);
    }

    #[test]
    fn test_slide_id_list_controls_order() {
        let slides = vec![
            slide_xml(&text_shape(&["one"])),
            slide_xml(&text_shape(&["two"])),
        ];
        let data = build_pptx(&slides, &[2, 1]);

        let presentation = PptxParser::new()
            .parse(Cursor::new(data), "swapped.pptx")
            .unwrap();

        assert_eq!(presentation.text(), "--- Slide 1 ---\ntwo\n--- Slide 2 ---\none");
    }

    #[test]
    fn test_not_a_zip() {
        let err = PptxParser::new()
            .parse(Cursor::new(b"plain text".to_vec()), "bad.pptx")
            .unwrap_err();
        assert!(matches!(err, Error::ZipError(_)));
    }

    #[test]
    fn test_extractor_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.pptx");
        let slides = vec![slide_xml(&text_shape(&["Only"]))];
        std::fs::write(&path, build_pptx(&slides, &[1])).unwrap();

        let extracted = PptxExtractor::new().extract(&path).unwrap();
        assert_eq!(extracted.text, "--- Slide 1 ---\nOnly");
        assert_eq!(
            extracted.stats,
            xtotxt_core::ExtractStats::Pptx {
                slides: 1,
                text_shapes: 1
            }
        );
    }
}
