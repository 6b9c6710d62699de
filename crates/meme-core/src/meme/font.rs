//! Font loading for meme captions.

use std::fs;
use std::path::PathBuf;

use ab_glyph::FontArc;
use tracing::debug;

use crate::error::RenderError;
use crate::models::embedded::{DEFAULT_FONT, DEFAULT_FONT_NAME};

/// Where caption glyphs come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FontSource {
    /// The font compiled into the library.
    #[default]
    Embedded,
    /// A TrueType/OpenType file on disk.
    File(PathBuf),
}

impl FontSource {
    /// Load and parse the font.
    pub fn load(&self) -> Result<FontArc, RenderError> {
        match self {
            FontSource::Embedded => {
                FontArc::try_from_slice(DEFAULT_FONT).map_err(|e| RenderError::FontLoad {
                    source_name: DEFAULT_FONT_NAME.to_string(),
                    reason: e.to_string(),
                })
            }
            FontSource::File(path) => {
                let source_name = path.display().to_string();
                let data = fs::read(path).map_err(|e| RenderError::FontLoad {
                    source_name: source_name.clone(),
                    reason: e.to_string(),
                })?;
                debug!("Loaded font {} ({} bytes)", source_name, data.len());
                FontArc::try_from_vec(data).map_err(|e| RenderError::FontLoad {
                    source_name,
                    reason: e.to_string(),
                })
            }
        }
    }
}

impl From<Option<PathBuf>> for FontSource {
    fn from(path: Option<PathBuf>) -> Self {
        path.map(FontSource::File).unwrap_or_default()
    }
}
