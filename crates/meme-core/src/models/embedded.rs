//! Assets embedded in the library for standalone distribution.

/// Embedded DejaVu Sans (~740KB), used when no font file is configured.
pub static DEFAULT_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Name reported in errors and logs for the embedded font.
pub const DEFAULT_FONT_NAME: &str = "embedded DejaVuSans.ttf";
