//! Configuration structures for the ingestion and rendering pipelines.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::MemeError;
use crate::meme::DEFAULT_MAX_WIDTH;

/// Main configuration for the meme pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemeConfig {
    /// Quote ingestion configuration.
    pub ingest: IngestConfig,

    /// Meme rendering configuration.
    pub render: RenderConfig,
}

/// Largest accepted caption font size in pixels.
pub const MAX_FONT_SIZE: f32 = 1024.0;

/// Quote ingestion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// External program that converts a PDF into plain text.
    ///
    /// Invoked as `<program> <input.pdf> <output.txt>`.
    pub extractor_program: String,

    /// Directory for transient extraction files (system temp dir when unset).
    pub temp_dir: Option<PathBuf>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            extractor_program: "pdftotext".to_string(),
            temp_dir: None,
        }
    }
}

/// Meme rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Directory generated memes are written to.
    pub output_dir: PathBuf,

    /// Images wider than this are downscaled to exactly this width.
    pub max_width: u32,

    /// TrueType/OpenType font file (embedded font when unset).
    pub font_path: Option<PathBuf>,

    /// Pixel size of the quote body.
    pub body_font_size: f32,

    /// Pixel size of the attribution line.
    pub author_font_size: f32,

    /// Colour of the quote body as `#RRGGBB` or `#RGB`.
    pub body_color: String,

    /// Colour of the attribution line as `#RRGGBB` or `#RGB`.
    pub author_color: String,

    /// Where the quote body is anchored.
    pub placement: Placement,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("static"),
            max_width: DEFAULT_MAX_WIDTH,
            font_path: None,
            body_font_size: 20.0,
            author_font_size: 16.0,
            body_color: "#FFFFFF".to_string(),
            author_color: "#805500".to_string(),
            placement: Placement::default(),
        }
    }
}

/// Anchor policy for the quote body.
///
/// The attribution is always drawn at a fixed offset from this anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Placement {
    /// Uniformly random anchor within the given inclusive ranges.
    Random {
        x_min: u32,
        x_max: u32,
        y_min: u32,
        y_max: u32,
    },
    /// Always the same anchor.
    Fixed { x: u32, y: u32 },
}

impl Default for Placement {
    fn default() -> Self {
        Placement::Random {
            x_min: 10,
            x_max: 50,
            y_min: 10,
            y_max: 200,
        }
    }
}

impl MemeConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Check values that serde cannot check on its own.
    pub fn validate(&self) -> Result<(), MemeError> {
        self.render.validate()?;
        if self.ingest.extractor_program.trim().is_empty() {
            return Err(MemeError::Config("ingest.extractor_program is empty".to_string()));
        }
        Ok(())
    }
}

impl RenderConfig {
    /// Check sizes, ranges and colours.
    pub fn validate(&self) -> Result<(), MemeError> {
        if self.max_width == 0 {
            return Err(MemeError::Config("render.max_width must be positive".to_string()));
        }
        for (name, size) in [
            ("body_font_size", self.body_font_size),
            ("author_font_size", self.author_font_size),
        ] {
            if !size.is_finite() || size <= 0.0 || size > MAX_FONT_SIZE {
                return Err(MemeError::Config(format!(
                    "render.{} must be in (0, {}], got {}",
                    name, MAX_FONT_SIZE, size
                )));
            }
        }
        if let Placement::Random { x_min, x_max, y_min, y_max } = self.placement {
            if x_min > x_max || y_min > y_max {
                return Err(MemeError::Config(
                    "render.placement ranges must have min <= max".to_string(),
                ));
            }
        }
        parse_hex_color(&self.body_color)?;
        parse_hex_color(&self.author_color)?;
        Ok(())
    }
}

/// Parse `#RRGGBB` or `#RGB` into an opaque RGBA colour.
pub fn parse_hex_color(value: &str) -> Result<[u8; 4], MemeError> {
    let invalid = || MemeError::Config(format!("invalid colour '{}', expected #RRGGBB", value));

    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match hex.len() {
        6 => Ok([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?, 255]),
        3 => {
            // #FFF expands each nibble: F -> FF
            let r = channel(&hex[0..1])? * 17;
            let g = channel(&hex[1..2])? * 17;
            let b = channel(&hex[2..3])? * 17;
            Ok([r, g, b, 255])
        }
        _ => Err(invalid()),
    }
}
