//! Text placement and output sizing.

use rand::Rng;

use crate::models::config::Placement;

/// Offset of the attribution line from the body anchor, in pixels.
pub const AUTHOR_OFFSET: (u32, u32) = (20, 30);

/// Top-left positions of the two text lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextAnchors {
    /// Where the quote body starts.
    pub body: (i32, i32),
    /// Where the attribution starts.
    pub author: (i32, i32),
}

impl Placement {
    /// Pick the body anchor for an image of the given size.
    ///
    /// The anchor is clamped so that the attribution line, including
    /// `author_height` pixels below its anchor, starts inside the image.
    pub fn anchors<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        (width, height): (u32, u32),
        author_height: u32,
    ) -> TextAnchors {
        let (x, y) = match *self {
            Placement::Random {
                x_min,
                x_max,
                y_min,
                y_max,
            } => (
                rng.gen_range(x_min..=x_max.max(x_min)),
                rng.gen_range(y_min..=y_max.max(y_min)),
            ),
            Placement::Fixed { x, y } => (x, y),
        };

        let max_x = width.saturating_sub(AUTHOR_OFFSET.0 + 1);
        let max_y = height.saturating_sub(AUTHOR_OFFSET.1.saturating_add(author_height));
        let (x, y) = (x.min(max_x), y.min(max_y));

        TextAnchors {
            body: (x as i32, y as i32),
            author: ((x + AUTHOR_OFFSET.0) as i32, (y + AUTHOR_OFFSET.1) as i32),
        }
    }
}

/// Size an image must be scaled to so it is at most `max_width` wide.
///
/// Returns `None` when the image is already narrow enough. Height keeps the
/// aspect ratio and is rounded to the nearest pixel.
pub fn scaled_dimensions(width: u32, height: u32, max_width: u32) -> Option<(u32, u32)> {
    if width <= max_width || width == 0 {
        return None;
    }

    let (width, height, max_width) = (width as u64, height as u64, max_width as u64);
    let new_height = (height * max_width + width / 2) / width;

    Some((max_width as u32, new_height.max(1) as u32))
}
