//! Meme rendering: caption a raster image and write a resized copy.

mod font;
mod layout;

pub use font::FontSource;
pub use layout::{scaled_dimensions, TextAnchors, AUTHOR_OFFSET};

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use ab_glyph::PxScale;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use tracing::{debug, info};

use crate::error::{MemeError, RenderError};
use crate::ingest::extension_of;
use crate::models::config::{parse_hex_color, Placement, RenderConfig};

/// Raster formats accepted as meme sources (lowercase extensions).
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["gif", "jpg", "jpeg", "png"];

/// Default maximum output width in pixels.
pub const DEFAULT_MAX_WIDTH: u32 = 500;

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Parameters of a single render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// Source image (gif, jpg or png).
    pub image_path: PathBuf,
    /// Quote body drawn in the larger font.
    pub body: String,
    /// Author drawn below the body as `- <author>`.
    pub author: String,
    /// Overrides the engine's maximum output width.
    pub max_width: Option<u32>,
}

impl RenderRequest {
    pub fn new(
        image_path: impl Into<PathBuf>,
        body: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            image_path: image_path.into(),
            body: body.into(),
            author: author.into(),
            max_width: None,
        }
    }

    pub fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = Some(max_width);
        self
    }
}

/// Outcome of a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    /// Where the meme was written.
    pub output_path: PathBuf,
    /// Final width in pixels.
    pub width: u32,
    /// Final height in pixels.
    pub height: u32,
}

/// Style of one caption line.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TextStyle {
    size: f32,
    color: Rgba<u8>,
}

/// Renders memes into an output directory.
///
/// Output files keep the source file name, so rendering the same source
/// twice overwrites the earlier meme.
#[derive(Debug, Clone)]
pub struct MemeEngine {
    output_dir: PathBuf,
    max_width: u32,
    font: FontSource,
    body_style: TextStyle,
    author_style: TextStyle,
    placement: Placement,
}

impl MemeEngine {
    /// Create an engine with default styling writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            max_width: DEFAULT_MAX_WIDTH,
            font: FontSource::Embedded,
            body_style: TextStyle {
                size: 20.0,
                color: Rgba([255, 255, 255, 255]),
            },
            author_style: TextStyle {
                size: 16.0,
                color: Rgba([128, 85, 0, 255]),
            },
            placement: Placement::default(),
        }
    }

    /// Create an engine from configuration.
    pub fn from_config(config: &RenderConfig) -> std::result::Result<Self, MemeError> {
        config.validate()?;
        Ok(Self {
            output_dir: config.output_dir.clone(),
            max_width: config.max_width,
            font: FontSource::from(config.font_path.clone()),
            body_style: TextStyle {
                size: config.body_font_size,
                color: Rgba(parse_hex_color(&config.body_color)?),
            },
            author_style: TextStyle {
                size: config.author_font_size,
                color: Rgba(parse_hex_color(&config.author_color)?),
            },
            placement: config.placement,
        })
    }

    /// Set the default maximum output width.
    pub fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = max_width;
        self
    }

    /// Use a font file instead of the embedded font.
    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font = FontSource::File(path.into());
        self
    }

    /// Set the body anchor policy.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Directory memes are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Caption `image_path` with the default width and return the output path.
    pub fn make_meme(
        &self,
        image_path: impl AsRef<Path>,
        body: &str,
        author: &str,
    ) -> Result<PathBuf> {
        let request = RenderRequest::new(image_path.as_ref(), body, author);
        Ok(self.render(&request)?.output_path)
    }

    /// Caption the image, downscale it if needed and save it.
    pub fn render(&self, request: &RenderRequest) -> Result<RenderResult> {
        let path = request.image_path.as_path();
        let unsupported = || RenderError::UnsupportedImageFormat {
            path: path.to_path_buf(),
        };

        let extension = extension_of(path);
        if !SUPPORTED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(unsupported());
        }
        let file_name = path.file_name().ok_or_else(unsupported)?;
        let format = ImageFormat::from_extension(&extension).ok_or_else(unsupported)?;
        let max_width = request.max_width.unwrap_or(self.max_width);
        if max_width == 0 {
            return Err(RenderError::ZeroMaxWidth);
        }

        let data = fs::read(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut canvas = image::load_from_memory(&data)?.to_rgba8();
        debug!(
            "Loaded {} ({}x{})",
            path.display(),
            canvas.width(),
            canvas.height()
        );

        self.draw_caption(&mut canvas, &request.body, &request.author)?;

        if let Some((width, height)) = scaled_dimensions(canvas.width(), canvas.height(), max_width)
        {
            debug!(
                "Resizing {}x{} -> {}x{}",
                canvas.width(),
                canvas.height(),
                width,
                height
            );
            canvas = imageops::resize(&canvas, width, height, FilterType::Lanczos3);
        }

        let (width, height) = canvas.dimensions();
        let encoded = encode(canvas, format)?;

        fs::create_dir_all(&self.output_dir).map_err(|source| RenderError::Io {
            path: self.output_dir.clone(),
            source,
        })?;
        let output_path = self.output_dir.join(file_name);
        fs::write(&output_path, encoded).map_err(|source| RenderError::Io {
            path: output_path.clone(),
            source,
        })?;

        info!("Wrote meme to {}", output_path.display());
        Ok(RenderResult {
            output_path,
            width,
            height,
        })
    }

    fn draw_caption(&self, canvas: &mut RgbaImage, body: &str, author: &str) -> Result<()> {
        let font = self.font.load()?;

        let anchors = self.placement.anchors(
            &mut rand::thread_rng(),
            canvas.dimensions(),
            self.author_style.size.ceil() as u32,
        );
        let (body_x, body_y) = anchors.body;
        let (author_x, author_y) = anchors.author;

        draw_text_mut(
            canvas,
            self.body_style.color,
            body_x,
            body_y,
            PxScale::from(self.body_style.size),
            &font,
            body,
        );
        draw_text_mut(
            canvas,
            self.author_style.color,
            author_x,
            author_y,
            PxScale::from(self.author_style.size),
            &font,
            &format!("- {}", author),
        );

        Ok(())
    }
}

/// Encode fully in memory so a failed encode never touches the output file.
fn encode(canvas: RgbaImage, format: ImageFormat) -> Result<Vec<u8>> {
    let output = DynamicImage::ImageRgba8(canvas);
    let output = match format {
        // JPEG has no alpha channel.
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(output.to_rgb8()),
        _ => output,
    };

    let mut buffer = Cursor::new(Vec::new());
    output.write_to(&mut buffer, format)?;
    Ok(buffer.into_inner())
}
