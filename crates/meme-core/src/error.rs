//! Error types for the meme-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the meme library.
#[derive(Error, Debug)]
pub enum MemeError {
    /// Quote ingestion error.
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Meme rendering error.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning a quote source into quotes.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Missing file, unknown extension, or the adapter refused the path.
    #[error("{} cannot be ingested", path.display())]
    NotIngestible { path: PathBuf },

    /// A required table column is absent.
    #[error("{} is missing required column '{column}'", path.display())]
    Schema { path: PathBuf, column: String },

    /// A single row, line or paragraph does not follow the quote grammar.
    #[error("{}:{line}: {reason}", path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// The document could not be decoded at all.
    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// The external text extraction step failed.
    #[error("text extraction failed for {}: {reason}", path.display())]
    ExtractionFailed { path: PathBuf, reason: String },

    /// Reading the source failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while rendering a meme.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The source image is not gif, jpg or png.
    #[error("{} is not a supported image (expected gif, jpg or png)", path.display())]
    UnsupportedImageFormat { path: PathBuf },

    /// A maximum output width of zero was requested.
    #[error("maximum output width must be positive")]
    ZeroMaxWidth,

    /// The font could not be read or parsed.
    #[error("failed to load font {source_name}: {reason}")]
    FontLoad { source_name: String, reason: String },

    /// Decoding, resizing or encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for the meme library.
pub type Result<T> = std::result::Result<T, MemeError>;
