//! The quote value produced by every ingestion adapter.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A quote body together with its author.
///
/// Both fields are non-empty when produced by an ingestor; records violating
/// that are rejected during parsing rather than constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteModel {
    body: String,
    author: String,
}

impl QuoteModel {
    /// Create a quote from its two parts.
    pub fn new(body: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            author: author.into(),
        }
    }

    /// The quoted text.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Who said it.
    pub fn author(&self) -> &str {
        &self.author
    }
}

impl fmt::Display for QuoteModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" - {}", self.body, self.author)
    }
}
