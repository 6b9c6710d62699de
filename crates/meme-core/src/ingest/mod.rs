//! Quote ingestion from csv, docx, pdf and txt sources.
//!
//! Every format is handled by one adapter implementing [`Ingestor`].
//! [`QuoteIngestor`] owns one adapter per [`Format`] and routes a path to
//! the adapter registered for its extension.

mod csv;
mod docx;
mod grammar;
mod pdf;
mod text;

pub use self::csv::CsvIngestor;
pub use docx::DocxIngestor;
pub use grammar::{parse_quote_line, parse_quote_lines, QuoteTrim, SEPARATOR};
pub use pdf::{CommandExtractor, PdfIngestor, TextExtractor};
pub use text::TextIngestor;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::IngestError;
use crate::models::config::IngestConfig;
use crate::models::QuoteModel;

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Capability shared by every quote source adapter.
pub trait Ingestor {
    /// Whether this ingestor is able to parse the given path.
    fn can_ingest(&self, path: &Path) -> bool;

    /// Parse all quotes from the path, in source order.
    fn parse(&self, path: &Path) -> Result<Vec<QuoteModel>>;
}

/// Lowercased text after the final `.` of the file name.
///
/// Returns an empty string when the file name has no `.`. Dots in parent
/// directories are never considered.
pub fn extension_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()))
        .unwrap_or_default()
}

/// Supported quote source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Header-driven delimited table.
    Csv,
    /// Office Open XML word-processing document.
    Docx,
    /// Page-description document, converted to text by an external tool.
    Pdf,
    /// Newline-delimited plain text.
    Txt,
}

/// Extension table; keys are unique and lowercase.
const FORMATS: &[(&str, Format)] = &[
    ("csv", Format::Csv),
    ("docx", Format::Docx),
    ("pdf", Format::Pdf),
    ("txt", Format::Txt),
];

impl Format {
    /// Look up the format registered for a lowercase extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        FORMATS
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, format)| *format)
    }

    /// Format registered for the path's extension.
    pub fn of(path: &Path) -> Option<Self> {
        Self::from_extension(&extension_of(path))
    }

    /// The extension this format is registered under.
    pub fn extension(self) -> &'static str {
        FORMATS
            .iter()
            .find(|(_, format)| *format == self)
            .map(|(ext, _)| *ext)
            .unwrap_or_default()
    }

    /// All registered formats.
    pub fn all() -> impl Iterator<Item = Format> {
        FORMATS.iter().map(|(_, format)| *format)
    }
}

/// Check whether the file starts with the given bytes.
///
/// Unreadable or short files never match.
pub(crate) fn has_magic(path: &Path, magic: &[u8]) -> bool {
    let mut header = vec![0u8; magic.len()];
    File::open(path)
        .and_then(|mut file| file.read_exact(&mut header))
        .map(|_| header == magic)
        .unwrap_or(false)
}

/// Dispatching ingestor over every supported [`Format`].
pub struct QuoteIngestor {
    csv: CsvIngestor,
    docx: DocxIngestor,
    pdf: PdfIngestor,
    text: TextIngestor,
}

impl QuoteIngestor {
    /// Create an ingestor with default adapters (`pdftotext` for pdf).
    pub fn new() -> Self {
        Self {
            csv: CsvIngestor,
            docx: DocxIngestor,
            pdf: PdfIngestor::new(),
            text: TextIngestor,
        }
    }

    /// Create an ingestor from configuration.
    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new().with_pdf_ingestor(PdfIngestor::from_config(config))
    }

    /// Replace the pdf adapter.
    pub fn with_pdf_ingestor(mut self, pdf: PdfIngestor) -> Self {
        self.pdf = pdf;
        self
    }

    fn adapter(&self, format: Format) -> &dyn Ingestor {
        match format {
            Format::Csv => &self.csv,
            Format::Docx => &self.docx,
            Format::Pdf => &self.pdf,
            Format::Txt => &self.text,
        }
    }

    /// Parse several sources into one list, preserving argument order.
    ///
    /// Stops at the first source that fails.
    pub fn parse_all<I, P>(&self, paths: I) -> Result<Vec<QuoteModel>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut quotes = Vec::new();
        for path in paths {
            quotes.extend(self.parse(path.as_ref())?);
        }
        Ok(quotes)
    }
}

impl Default for QuoteIngestor {
    fn default() -> Self {
        Self::new()
    }
}

impl Ingestor for QuoteIngestor {
    fn can_ingest(&self, path: &Path) -> bool {
        path.is_file()
            && Format::of(path).is_some_and(|format| self.adapter(format).can_ingest(path))
    }

    fn parse(&self, path: &Path) -> Result<Vec<QuoteModel>> {
        let not_ingestible = || IngestError::NotIngestible {
            path: path.to_path_buf(),
        };

        if !self.can_ingest(path) {
            return Err(not_ingestible());
        }
        let format = Format::of(path).ok_or_else(not_ingestible)?;

        let quotes = self.adapter(format).parse(path)?;
        debug!("Parsed {} quotes from {} ({:?})", quotes.len(), path.display(), format);
        Ok(quotes)
    }
}
