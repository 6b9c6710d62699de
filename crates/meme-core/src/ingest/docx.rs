//! Word-processing document ingestion (Office Open XML).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use zip::ZipArchive;

use super::grammar::{parse_quote_lines, QuoteTrim};
use super::{Format, Ingestor, Result, extension_of, has_magic};
use crate::error::IngestError;
use crate::models::QuoteModel;

/// Archive member holding the main document body.
const DOCUMENT_PART: &str = "word/document.xml";

const WORD_NS: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const MARKUP_COMPAT_NS: &[u8] = b"http://schemas.openxmlformats.org/markup-compatibility/2006";

/// Local file header signature every docx (zip) starts with.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Ingestor for `.docx` documents with one quote per paragraph.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxIngestor;

impl Ingestor for DocxIngestor {
    fn can_ingest(&self, path: &Path) -> bool {
        extension_of(path) == Format::Docx.extension() && has_magic(path, ZIP_MAGIC)
    }

    fn parse(&self, path: &Path) -> Result<Vec<QuoteModel>> {
        let parse_error = |reason: String| IngestError::Parse {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut archive = ZipArchive::new(file).map_err(|e| parse_error(e.to_string()))?;

        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| parse_error(format!("{}: {}", DOCUMENT_PART, e)))?
            .read_to_string(&mut xml)
            .map_err(|e| parse_error(format!("{}: {}", DOCUMENT_PART, e)))?;

        let paragraphs = read_paragraphs(&xml).map_err(|e| parse_error(e.to_string()))?;
        parse_quote_lines(path, paragraphs.iter().map(String::as_str), QuoteTrim::Strip)
    }
}

/// Collect the text of every `<w:p>` in document order.
///
/// Runs are concatenated, `<w:tab/>` becomes a tab and `<w:br/>` a newline.
/// Paragraphs nested in text boxes are emitted as their own entries when they
/// close, without disturbing the enclosing paragraph. Only the
/// wordprocessingml namespace is read, and `mc:Fallback` content (a duplicate
/// of the preceding `mc:Choice`) is skipped.
fn read_paragraphs(xml: &str) -> std::result::Result<Vec<String>, quick_xml::Error> {
    let mut reader = NsReader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut in_text = false;
    let mut fallback_depth = 0usize;

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        match event {
            Event::Start(e) => {
                if fallback_depth > 0 || is_fallback(&ns, e.local_name().as_ref()) {
                    fallback_depth += 1;
                    continue;
                }
                match word_tag(&ns, e.local_name().as_ref()) {
                    Some(b"p") => open.push(String::new()),
                    Some(b"t") => in_text = true,
                    _ => {}
                }
            }
            Event::Empty(e) if fallback_depth == 0 => {
                match word_tag(&ns, e.local_name().as_ref()) {
                    Some(b"p") => paragraphs.push(String::new()),
                    Some(b"tab") => push_char(&mut open, '\t'),
                    Some(b"br") | Some(b"cr") => push_char(&mut open, '\n'),
                    _ => {}
                }
            }
            Event::Text(text) if in_text && fallback_depth == 0 => {
                if let Some(paragraph) = open.last_mut() {
                    paragraph.push_str(&text.unescape()?);
                }
            }
            Event::End(e) => {
                if fallback_depth > 0 {
                    fallback_depth -= 1;
                    continue;
                }
                match word_tag(&ns, e.local_name().as_ref()) {
                    Some(b"t") => in_text = false,
                    Some(b"p") => paragraphs.extend(open.pop()),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Local name of an element in the wordprocessingml namespace.
fn word_tag<'a>(ns: &ResolveResult, local_name: &'a [u8]) -> Option<&'a [u8]> {
    match ns {
        ResolveResult::Bound(Namespace(uri)) if *uri == WORD_NS => Some(local_name),
        _ => None,
    }
}

fn is_fallback(ns: &ResolveResult, local_name: &[u8]) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == MARKUP_COMPAT_NS)
        && local_name == b"Fallback"
}

fn push_char(open: &mut [String], c: char) {
    if let Some(paragraph) = open.last_mut() {
        paragraph.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::path::PathBuf;
    use zip::write::SimpleFileOptions;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

    /// Build a minimal docx whose body holds one paragraph per entry.
    fn write_docx(path: &Path, paragraphs: &[&str]) {
        let mut body = String::new();
        for paragraph in paragraphs {
            if paragraph.is_empty() {
                body.push_str("<w:p/>");
            } else {
                body.push_str(&format!(
                    r#"<w:p><w:pPr><w:jc w:val="left"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                    escape(paragraph)
                ));
            }
        }
        write_document_xml(path, &body);
    }

    fn write_document_xml(path: &Path, body: &str) {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );

        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        writer
            .start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(CONTENT_TYPES.as_bytes()).unwrap();
        writer
            .start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap();
    }

    fn escape(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }

    fn docx_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("quotes.docx")
    }

    #[test]
    fn test_parse_paragraphs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = docx_path(&dir);
        write_docx(
            &path,
            &[
                "\"Stay hungry, stay foolish\" - Steve Jobs",
                "",
                "\"Treat yo self\" - Fluffles",
                "   ",
                "\"Life is like peanut butter: crunchy\" - Peanut",
            ],
        );

        assert!(DocxIngestor.can_ingest(&path));
        let quotes = DocxIngestor.parse(&path).unwrap();
        assert_eq!(
            quotes,
            vec![
                QuoteModel::new("Stay hungry, stay foolish", "Steve Jobs"),
                QuoteModel::new("Treat yo self", "Fluffles"),
                QuoteModel::new("Life is like peanut butter: crunchy", "Peanut"),
            ]
        );
    }

    #[test]
    fn test_runs_are_joined_and_entities_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = docx_path(&dir);
        write_document_xml(
            &path,
            r#"<w:p><w:r><w:t>&quot;Sit &amp; </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>stay&quot;</w:t></w:r><w:r><w:t xml:space="preserve"> - Rex</w:t></w:r></w:p>"#,
        );

        let quotes = DocxIngestor.parse(&path).unwrap();
        assert_eq!(quotes, vec![QuoteModel::new("Sit & stay", "Rex")]);
    }

    #[test]
    fn test_paragraph_without_separator_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = docx_path(&dir);
        write_docx(&path, &["\"Woof\" - Rex", "A heading without author"]);

        let err = DocxIngestor.parse(&path).unwrap_err();
        assert!(matches!(err, IngestError::MalformedLine { line: 2, .. }), "{err:?}");
    }

    #[test]
    fn test_missing_document_part_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = docx_path(&dir);
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        writer
            .start_file("readme.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"hello").unwrap();
        writer.finish().unwrap();

        assert!(matches!(
            DocxIngestor.parse(&path),
            Err(IngestError::Parse { .. })
        ));
    }

    #[test]
    fn test_can_ingest_sniffs_zip_signature() {
        let dir = tempfile::tempdir().unwrap();
        let path = docx_path(&dir);
        std::fs::write(&path, "\"Woof\" - Rex").unwrap();

        assert!(!DocxIngestor.can_ingest(&path));
    }

    #[test]
    fn test_read_paragraphs_handles_tabs_and_breaks() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p><w:p/></w:body></w:document>"#;
        assert_eq!(read_paragraphs(xml).unwrap(), vec!["a\tb\nc".to_string(), String::new()]);
    }

    #[test]
    fn test_text_box_paragraph_keeps_outer_text() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><w:body>
<w:p><w:r><w:t>"Sit" - </w:t></w:r><w:r><mc:AlternateContent><mc:Choice Requires="wps"><w:drawing><w:txbxContent><w:p><w:r><w:t>"Boxed" - Fido</w:t></w:r></w:p></w:txbxContent></w:drawing></mc:Choice><mc:Fallback><w:pict><w:txbxContent><w:p><w:r><w:t>"Boxed" - Fido</w:t></w:r></w:p></w:txbxContent></w:pict></mc:Fallback></mc:AlternateContent></w:r><w:r><w:t>Rex</w:t></w:r></w:p>
<w:p><w:r><a:p><a:t>drawing text</a:t></a:p><w:t>"Stay" - Max</w:t></w:r></w:p>
</w:body></w:document>"#;

        assert_eq!(
            read_paragraphs(xml).unwrap(),
            vec![
                "\"Boxed\" - Fido".to_string(),
                "\"Sit\" - Rex".to_string(),
                "\"Stay\" - Max".to_string(),
            ]
        );
    }
}
