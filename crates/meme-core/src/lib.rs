//! Core library for the meme generator.
//!
//! This crate provides:
//! - Quote ingestion from csv, docx, pdf and txt sources
//! - A dispatcher routing each file to the adapter for its extension
//! - Meme rendering: captioning, proportional downscaling and saving

pub mod error;
pub mod ingest;
pub mod meme;
pub mod models;

pub use error::{IngestError, MemeError, RenderError, Result};
pub use ingest::{extension_of, Format, Ingestor, PdfIngestor, QuoteIngestor, TextExtractor};
pub use meme::{MemeEngine, RenderRequest, RenderResult, SUPPORTED_IMAGE_EXTENSIONS};
pub use models::config::{MemeConfig, Placement};
pub use models::QuoteModel;
