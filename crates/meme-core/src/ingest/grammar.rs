//! The `"<body>" - <author>` line grammar shared by txt, docx and pdf.

use std::path::Path;

use tracing::trace;

use super::Result;
use crate::error::IngestError;
use crate::models::QuoteModel;

/// Separator between quote body and author.
pub const SEPARATOR: &str = " - ";

/// Quote characters stripped from a body under [`QuoteTrim::Strip`].
const QUOTE_CHARS: &[char] = &['"', '\u{201C}', '\u{201D}'];

/// Whether surrounding quote characters are removed from the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteTrim {
    /// Keep the body exactly as written.
    Keep,
    /// Strip surrounding `"` (and typographic double quotes).
    Strip,
}

/// Parse a single line.
///
/// Blank lines yield `Ok(None)`. The line is split at the last separator,
/// so bodies may contain `" - "` but authors may not.
pub fn parse_quote_line(
    line: &str,
    trim: QuoteTrim,
) -> std::result::Result<Option<QuoteModel>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (body, author) = line
        .rsplit_once(SEPARATOR)
        .ok_or_else(|| format!("expected '<body>{}<author>', got '{}'", SEPARATOR, line))?;

    let body = match trim {
        QuoteTrim::Keep => body.trim(),
        QuoteTrim::Strip => body.trim().trim_matches(QUOTE_CHARS),
    };
    let author = author.trim();

    if body.trim().is_empty() {
        return Err("quote body is empty".to_string());
    }
    if author.is_empty() {
        return Err("author is empty".to_string());
    }

    Ok(Some(QuoteModel::new(body, author)))
}

/// Parse every line of a source, failing on the first malformed one.
///
/// Line numbers in errors are 1-based positions in `lines`, blank lines
/// included.
pub fn parse_quote_lines<'a, I>(path: &Path, lines: I, trim: QuoteTrim) -> Result<Vec<QuoteModel>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut quotes = Vec::new();

    for (index, line) in lines.into_iter().enumerate() {
        match parse_quote_line(line, trim) {
            Ok(Some(quote)) => {
                trace!("{}:{}: {}", path.display(), index + 1, quote);
                quotes.push(quote);
            }
            Ok(None) => {}
            Err(reason) => {
                return Err(IngestError::MalformedLine {
                    path: path.to_path_buf(),
                    line: index + 1,
                    reason,
                });
            }
        }
    }

    Ok(quotes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_removes_surrounding_quotes() {
        let quote = parse_quote_line("\"Stay hungry, stay foolish\" - Steve Jobs", QuoteTrim::Strip)
            .unwrap()
            .unwrap();
        assert_eq!(quote, QuoteModel::new("Stay hungry, stay foolish", "Steve Jobs"));
    }

    #[test]
    fn test_keep_preserves_surrounding_quotes() {
        let quote = parse_quote_line("\"Stay hungry, stay foolish\" - Steve Jobs", QuoteTrim::Keep)
            .unwrap()
            .unwrap();
        assert_eq!(quote, QuoteModel::new("\"Stay hungry, stay foolish\"", "Steve Jobs"));
    }

    #[test]
    fn test_typographic_quotes_are_stripped() {
        let quote = parse_quote_line("\u{201C}Fetch\u{201D} - Rex", QuoteTrim::Strip)
            .unwrap()
            .unwrap();
        assert_eq!(quote.body(), "Fetch");
    }

    #[test]
    fn test_blank_line_is_skipped() {
        assert_eq!(parse_quote_line("   \t", QuoteTrim::Strip), Ok(None));
        assert_eq!(parse_quote_line("\u{c}", QuoteTrim::Keep), Ok(None));
    }

    #[test]
    fn test_body_may_contain_separator() {
        let quote = parse_quote_line("\"Sit - stay - roll over\" - Trainer", QuoteTrim::Strip)
            .unwrap()
            .unwrap();
        assert_eq!(quote, QuoteModel::new("Sit - stay - roll over", "Trainer"));
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let quote = parse_quote_line("  Woof -  Rex \r", QuoteTrim::Keep).unwrap().unwrap();
        assert_eq!(quote, QuoteModel::new("Woof", "Rex"));
    }

    #[test]
    fn test_malformed_lines() {
        assert!(parse_quote_line("no separator here", QuoteTrim::Keep).is_err());
        assert!(parse_quote_line("Woof-Rex", QuoteTrim::Keep).is_err());
        assert!(parse_quote_line("\"\" - Rex", QuoteTrim::Strip).is_err());
        assert!(parse_quote_line(" - Rex", QuoteTrim::Keep).is_err());
    }

    #[test]
    fn test_parse_lines_keeps_order_and_skips_blanks() {
        let text = "\"One\" - A\n\n\"Two\" - B\n   \n\"Three\" - C\n";
        let quotes = parse_quote_lines(Path::new("q.txt"), text.lines(), QuoteTrim::Strip).unwrap();
        assert_eq!(
            quotes,
            vec![
                QuoteModel::new("One", "A"),
                QuoteModel::new("Two", "B"),
                QuoteModel::new("Three", "C"),
            ]
        );
    }

    #[test]
    fn test_parse_lines_reports_malformed_line_number() {
        let text = "\"One\" - A\n\njust words\n\"Two\" - B\n";
        let err = parse_quote_lines(Path::new("q.txt"), text.lines(), QuoteTrim::Strip).unwrap_err();
        match err {
            IngestError::MalformedLine { path, line, .. } => {
                assert_eq!(path, Path::new("q.txt"));
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
