//! Header-driven delimited table ingestion.

use std::path::Path;

use ::csv::{ErrorKind, ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use super::{Format, Ingestor, Result, extension_of};
use crate::error::IngestError;
use crate::models::QuoteModel;

/// Ingestor for `.csv` files with `body` and `author` columns.
///
/// Columns are matched by exact header name in any order; extra columns are
/// ignored. Parsing is all-or-nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvIngestor;

impl Ingestor for CsvIngestor {
    fn can_ingest(&self, path: &Path) -> bool {
        extension_of(path) == Format::Csv.extension()
    }

    fn parse(&self, path: &Path) -> Result<Vec<QuoteModel>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_path(path)
            .map_err(|e| table_error(path, e))?;

        let headers = reader.headers().map_err(|e| table_error(path, e))?.clone();
        let body_column = column_index(path, &headers, "body")?;
        let author_column = column_index(path, &headers, "author")?;

        let mut quotes = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| table_error(path, e))?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or_default();

            let field = |index: usize, name: &str| match record.get(index) {
                Some(value) if !value.is_empty() => Ok(value),
                _ => Err(IngestError::MalformedLine {
                    path: path.to_path_buf(),
                    line,
                    reason: format!("empty '{}' field", name),
                }),
            };

            quotes.push(QuoteModel::new(
                field(body_column, "body")?,
                field(author_column, "author")?,
            ));
        }

        debug!("Read {} rows from {}", quotes.len(), path.display());
        Ok(quotes)
    }
}

fn column_index(path: &Path, headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or_else(|| IngestError::Schema {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
}

fn table_error(path: &Path, error: ::csv::Error) -> IngestError {
    let path = path.to_path_buf();
    let reason = error.to_string();
    match error.into_kind() {
        ErrorKind::Io(source) => IngestError::Io { path, source },
        ErrorKind::UnequalLengths { pos: Some(pos), .. } | ErrorKind::Utf8 { pos: Some(pos), .. } => {
            IngestError::MalformedLine {
                path,
                line: pos.line() as usize,
                reason,
            }
        }
        _ => IngestError::Parse { path, reason },
    }
}
