//! Plain-text ingestion.

use std::fs;
use std::path::Path;

use super::grammar::{parse_quote_lines, QuoteTrim};
use super::{Format, Ingestor, Result, extension_of};
use crate::error::IngestError;
use crate::models::QuoteModel;

/// Ingestor for `.txt` files with one quote per line.
///
/// Unlike docx and pdf, surrounding quote characters are kept in the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextIngestor;

impl Ingestor for TextIngestor {
    fn can_ingest(&self, path: &Path) -> bool {
        extension_of(path) == Format::Txt.extension()
    }

    fn parse(&self, path: &Path) -> Result<Vec<QuoteModel>> {
        let bytes = fs::read(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|e| IngestError::Parse {
            path: path.to_path_buf(),
            reason: format!("invalid UTF-8: {}", e.utf8_error()),
        })?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

        parse_quote_lines(path, text.lines(), QuoteTrim::Keep)
    }
}
