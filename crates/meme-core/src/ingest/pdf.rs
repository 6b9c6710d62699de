//! PDF ingestion through an external text extraction tool.
//!
//! The tool writes plain text into a file inside a per-call [`TempDir`];
//! the directory is removed when it goes out of scope, on success and on
//! every error path, so concurrent parses never share a transient file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::debug;

use super::grammar::{parse_quote_lines, QuoteTrim};
use super::{Format, Ingestor, Result, extension_of, has_magic};
use crate::error::IngestError;
use crate::models::config::IngestConfig;
use crate::models::QuoteModel;

/// Every PDF starts with this header.
const PDF_MAGIC: &[u8] = b"%PDF";

/// Name of the transient text file inside the scratch directory.
const EXTRACTED_FILE: &str = "extracted.txt";

/// Converts a binary document into a line-oriented text file.
pub trait TextExtractor {
    /// Populate `output` with the text of `input`.
    fn extract(&self, input: &Path, output: &Path) -> Result<()>;
}

impl<F> TextExtractor for F
where
    F: Fn(&Path, &Path) -> Result<()>,
{
    fn extract(&self, input: &Path, output: &Path) -> Result<()> {
        self(input, output)
    }
}

/// Runs an external program as `<program> <input> <output>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandExtractor {
    program: String,
}

impl CommandExtractor {
    /// Use the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Poppler's `pdftotext`.
    pub fn pdftotext() -> Self {
        Self::new("pdftotext")
    }

    /// The program this extractor runs.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for CommandExtractor {
    fn default() -> Self {
        Self::pdftotext()
    }
}

impl TextExtractor for CommandExtractor {
    fn extract(&self, input: &Path, output: &Path) -> Result<()> {
        let failed = |reason: String| IngestError::ExtractionFailed {
            path: input.to_path_buf(),
            reason,
        };

        debug!("Running {} on {}", self.program, input.display());
        let result = Command::new(&self.program).arg(input).arg(output).output();

        match result {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(failed(format!("'{}' is not installed or not on PATH", self.program)))
            }
            Err(e) => Err(failed(format!("could not run '{}': {}", self.program, e))),
            Ok(out) if !out.status.success() => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                Err(failed(format!(
                    "'{}' exited with {}: {}",
                    self.program,
                    out.status,
                    stderr.trim()
                )))
            }
            Ok(_) => Ok(()),
        }
    }
}

/// Ingestor for `.pdf` files with one quote per extracted line.
pub struct PdfIngestor {
    extractor: Box<dyn TextExtractor + Send + Sync>,
    temp_dir: Option<PathBuf>,
}

impl PdfIngestor {
    /// Create an ingestor backed by `pdftotext`.
    pub fn new() -> Self {
        Self::with_extractor(CommandExtractor::pdftotext())
    }

    /// Create an ingestor from configuration.
    pub fn from_config(config: &IngestConfig) -> Self {
        let mut ingestor =
            Self::with_extractor(CommandExtractor::new(config.extractor_program.clone()));
        ingestor.temp_dir = config.temp_dir.clone();
        ingestor
    }

    /// Create an ingestor with a custom extraction step.
    pub fn with_extractor(extractor: impl TextExtractor + Send + Sync + 'static) -> Self {
        Self {
            extractor: Box::new(extractor),
            temp_dir: None,
        }
    }

    /// Place transient files under `dir` instead of the system temp dir.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    fn scratch_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("meme-extract-");

        let created = match &self.temp_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        };
        created.map_err(|source| IngestError::Io {
            path: self.temp_dir.clone().unwrap_or_else(std::env::temp_dir),
            source,
        })
    }
}

impl Default for PdfIngestor {
    fn default() -> Self {
        Self::new()
    }
}

impl Ingestor for PdfIngestor {
    fn can_ingest(&self, path: &Path) -> bool {
        extension_of(path) == Format::Pdf.extension() && has_magic(path, PDF_MAGIC)
    }

    fn parse(&self, path: &Path) -> Result<Vec<QuoteModel>> {
        let scratch = self.scratch_dir()?;
        let text_path = scratch.path().join(EXTRACTED_FILE);

        self.extractor.extract(path, &text_path)?;

        let text = fs::read_to_string(&text_path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => IngestError::ExtractionFailed {
                path: path.to_path_buf(),
                reason: "extractor produced no output".to_string(),
            },
            _ => IngestError::Io {
                path: text_path.clone(),
                source,
            },
        })?;

        debug!("Extracted {} bytes of text from {}", text.len(), path.display());
        parse_quote_lines(path, text.lines(), QuoteTrim::Strip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    /// Extractor that writes fixed text and remembers where it wrote it.
    fn fake_extractor(
        text: &'static str,
        seen: Arc<Mutex<Option<PathBuf>>>,
    ) -> impl TextExtractor + Send + Sync + 'static {
        move |_: &Path, output: &Path| -> Result<()> {
            fs::write(output, text).unwrap();
            *seen.lock().unwrap() = Some(output.to_path_buf());
            Ok(())
        }
    }

    fn pdf_fixture(dir: &Path) -> PathBuf {
        let path = dir.join("quotes.pdf");
        fs::write(&path, b"%PDF-1.4\n%fake\n").unwrap();
        path
    }

    #[test]
    fn test_parse_extracted_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = pdf_fixture(dir.path());
        let seen = Arc::new(Mutex::new(None));

        let ingestor = PdfIngestor::with_extractor(fake_extractor(
            "\"Stay hungry, stay foolish\" - Steve Jobs\n\n\u{c}\"Bark\" - Rex\r\n",
            Arc::clone(&seen),
        ));

        assert!(ingestor.can_ingest(&path));
        let quotes = ingestor.parse(&path).unwrap();
        assert_eq!(
            quotes,
            vec![
                QuoteModel::new("Stay hungry, stay foolish", "Steve Jobs"),
                QuoteModel::new("Bark", "Rex"),
            ]
        );

        let transient = seen.lock().unwrap().clone().unwrap();
        assert!(!transient.exists());
        assert!(!transient.parent().unwrap().exists());
    }

    #[test]
    fn test_transient_file_removed_on_malformed_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = pdf_fixture(dir.path());
        let seen = Arc::new(Mutex::new(None));

        let ingestor = PdfIngestor::with_extractor(fake_extractor(
            "\"Woof\" - Rex\nPage 2 of 2\n",
            Arc::clone(&seen),
        ));

        let err = ingestor.parse(&path).unwrap_err();
        assert!(matches!(err, IngestError::MalformedLine { line: 2, .. }), "{err:?}");

        let transient = seen.lock().unwrap().clone().unwrap();
        assert!(!transient.exists());
    }

    #[test]
    fn test_transient_file_removed_when_extractor_fails() {
        let dir = tempfile::tempdir().unwrap();
        let scratch_root = dir.path().join("scratch");
        fs::create_dir(&scratch_root).unwrap();
        let path = pdf_fixture(dir.path());

        let extractor = |input: &Path, output: &Path| -> Result<()> {
            fs::write(output, "partial output").unwrap();
            Err(IngestError::ExtractionFailed {
                path: input.to_path_buf(),
                reason: "crashed halfway".to_string(),
            })
        };
        let ingestor = PdfIngestor::with_extractor(extractor).with_temp_dir(&scratch_root);

        let err = ingestor.parse(&path).unwrap_err();
        assert!(matches!(err, IngestError::ExtractionFailed { .. }));
        assert_eq!(fs::read_dir(&scratch_root).unwrap().count(), 0);
    }

    #[test]
    fn test_extractor_without_output_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = pdf_fixture(dir.path());

        let ingestor = PdfIngestor::with_extractor(|_: &Path, _: &Path| -> Result<()> { Ok(()) });
        let err = ingestor.parse(&path).unwrap_err();
        assert!(matches!(err, IngestError::ExtractionFailed { .. }), "{err:?}");
    }

    #[test]
    fn test_each_parse_uses_a_fresh_transient_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = pdf_fixture(dir.path());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);

        let ingestor = PdfIngestor::with_extractor(move |_: &Path, output: &Path| -> Result<()> {
            fs::write(output, "Woof - Rex\n").unwrap();
            recorder.lock().unwrap().push(output.to_path_buf());
            Ok(())
        });

        ingestor.parse(&path).unwrap();
        ingestor.parse(&path).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_ne!(seen[0], seen[1]);
    }

    #[test]
    fn test_missing_program_is_extraction_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = pdf_fixture(dir.path());

        let ingestor = PdfIngestor::with_extractor(CommandExtractor::new(
            "meme-definitely-not-an-installed-tool",
        ));
        let err = ingestor.parse(&path).unwrap_err();
        assert!(matches!(err, IngestError::ExtractionFailed { .. }), "{err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_extraction_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = pdf_fixture(dir.path());

        let err = CommandExtractor::new("false")
            .extract(&path, &dir.path().join("out.txt"))
            .unwrap_err();
        match err {
            IngestError::ExtractionFailed { reason, .. } => assert!(reason.contains("exited")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_can_ingest_requires_pdf_header() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("fake.pdf");
        fs::write(&fake, "\"Woof\" - Rex").unwrap();

        let ingestor = PdfIngestor::new();
        assert!(!ingestor.can_ingest(&fake));
        assert!(ingestor.can_ingest(&pdf_fixture(dir.path())));
    }

    #[test]
    fn test_from_config_places_scratch_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = IngestConfig {
            extractor_program: "meme-definitely-not-an-installed-tool".to_string(),
            temp_dir: Some(dir.path().to_path_buf()),
        };
        let ingestor = PdfIngestor::from_config(&config);
        assert_eq!(ingestor.temp_dir.as_deref(), Some(dir.path()));

        let scratch = ingestor.scratch_dir().unwrap();
        assert!(scratch.path().starts_with(dir.path()));
    }
}
