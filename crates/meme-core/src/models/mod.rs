//! Data models shared by the ingestion and rendering pipelines.

pub mod config;
pub mod embedded;
pub mod quote;

pub use quote::QuoteModel;
