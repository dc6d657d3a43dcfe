/**
 * Scene Rasterizer
 *
 * Produces the initial buffer the pipeline consumes: a vertical gradient
 * between two palette colors with a handful of randomly placed filled
 * ellipses on top. The output honors the pipeline's input contract: fully
 * opaque (alpha 255 everywhere) and sized to include the blur padding
 * border, so no transparency bleeds into the blur.
 */

use crate::buffer::{BufferError, PixelBuffer};
use crate::rng::SeededRandom;
use thiserror::Error;

/// Error types for scene construction
#[derive(Error, Debug)]
pub enum SceneError {
    /// Invalid hex color string format
    #[error("Invalid hex color: {0}")]
    InvalidHexColor(String),

    /// The palette has no colors to draw with
    #[error("Palette must contain at least one color")]
    EmptyPalette,

    /// Buffer construction failed
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;

/// RGB color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
}

impl Color {
    /// Create a new color from RGB values
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string (e.g., "#FF0000" or "FF0000")
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim_start_matches('#');

        if hex.len() != 6 {
            return Err(SceneError::InvalidHexColor(hex.to_string()));
        }

        let r = u8::from_str_radix(&hex[0..2], 16)
            .map_err(|_| SceneError::InvalidHexColor(hex.to_string()))?;
        let g = u8::from_str_radix(&hex[2..4], 16)
            .map_err(|_| SceneError::InvalidHexColor(hex.to_string()))?;
        let b = u8::from_str_radix(&hex[4..6], 16)
            .map_err(|_| SceneError::InvalidHexColor(hex.to_string()))?;

        Ok(Self { r, g, b })
    }

    /// Opaque RGBA value
    pub fn rgba(&self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    /// Channel-wise linear interpolation toward `other`
    fn lerp(&self, other: &Color, t: f32) -> Color {
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// Built-in palette used by the CLI when none is given
pub fn default_palette() -> Vec<Color> {
    // Muted earth-and-sky set; posterizes well
    ["#264653", "#2a9d8f", "#e9c46a", "#f4a261", "#e76f51"]
        .iter()
        .map(|hex| Color::from_hex(hex).expect("built-in palette is valid"))
        .collect()
}

/// Minimum and maximum ellipse count per scene
const ELLIPSES_MIN: usize = 3;
const ELLIPSES_MAX: usize = 8;

/// Ellipse semi-axis bounds as fractions of the buffer dimensions
const AXIS_FRACTION_MIN: f32 = 0.05;
const AXIS_FRACTION_MAX: f32 = 0.30;

fn pick(palette: &[Color], rng: &mut SeededRandom) -> Color {
    let idx = (rng.next() * palette.len() as f32) as usize;
    palette[idx.min(palette.len() - 1)]
}

/// Fill an axis-aligned ellipse by scanning its bounding box and testing
/// the implicit equation `(dx/rx)^2 + (dy/ry)^2 <= 1`
fn fill_ellipse(
    buffer: &mut PixelBuffer,
    cx: f32,
    cy: f32,
    rx: f32,
    ry: f32,
    color: Color,
) {
    let width = buffer.width();
    let height = buffer.height();
    let x0 = ((cx - rx).floor().max(0.0)) as usize;
    let x1 = (((cx + rx).ceil()) as usize).min(width.saturating_sub(1));
    let y0 = ((cy - ry).floor().max(0.0)) as usize;
    let y1 = (((cy + ry).ceil()) as usize).min(height.saturating_sub(1));

    let rgba = color.rgba();
    for y in y0..=y1 {
        let dy = (y as f32 - cy) / ry;
        for x in x0..=x1 {
            let dx = (x as f32 - cx) / rx;
            if dx * dx + dy * dy <= 1.0 {
                buffer.put_pixel(x, y, rgba);
            }
        }
    }
}

/**
 * Rasterize a gradient-and-ellipse scene.
 *
 * The background is a vertical gradient between two colors drawn from the
 * palette; on top, between three and eight filled ellipses with random
 * centers, semi-axes proportional to the buffer size, and random palette
 * colors. Every pixel is opaque. Deterministic for a given palette, size
 * and RNG state.
 */
pub fn rasterize(
    width: usize,
    height: usize,
    palette: &[Color],
    rng: &mut SeededRandom,
) -> Result<PixelBuffer> {
    if palette.is_empty() {
        return Err(SceneError::EmptyPalette);
    }

    let top = pick(palette, rng);
    let bottom = pick(palette, rng);

    let mut buffer = PixelBuffer::filled(width, height, top.rgba())?;
    let denom = (height - 1).max(1) as f32;
    for y in 0..height {
        let row = top.lerp(&bottom, y as f32 / denom).rgba();
        for x in 0..width {
            buffer.put_pixel(x, y, row);
        }
    }

    let count = ELLIPSES_MIN
        + (rng.next() * (ELLIPSES_MAX - ELLIPSES_MIN + 1) as f32) as usize;
    for _ in 0..count {
        let cx = rng.next() * width as f32;
        let cy = rng.next() * height as f32;
        let rx = rng.range(AXIS_FRACTION_MIN, AXIS_FRACTION_MAX) * width as f32;
        let ry = rng.range(AXIS_FRACTION_MIN, AXIS_FRACTION_MAX) * height as f32;
        let color = pick(palette, rng);
        fill_ellipse(&mut buffer, cx, cy, rx, ry, color);
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        let black = Color::from_hex("#000000").unwrap();
        assert_eq!(black, Color::new(0, 0, 0));

        let white = Color::from_hex("ffffff").unwrap();
        assert_eq!(white, Color::new(255, 255, 255));

        let teal = Color::from_hex("#2A9D8F").unwrap();
        assert_eq!(teal, Color::new(0x2a, 0x9d, 0x8f));
    }

    #[test]
    fn test_color_from_hex_invalid() {
        assert!(Color::from_hex("#fff").is_err());
        assert!(Color::from_hex("#fffffff").is_err());
        assert!(Color::from_hex("#gggggg").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn test_default_palette_parses() {
        let palette = default_palette();
        assert!(palette.len() >= 2);
    }

    #[test]
    fn test_scene_is_fully_opaque() {
        let palette = default_palette();
        let mut rng = SeededRandom::new(Some(42));
        let scene = rasterize(48, 48, &palette, &mut rng).unwrap();

        assert_eq!(scene.width(), 48);
        assert_eq!(scene.height(), 48);
        for pixel in scene.data().chunks_exact(4) {
            assert_eq!(pixel[3], 255);
        }
    }

    #[test]
    fn test_scene_deterministic_per_seed() {
        let palette = default_palette();
        let mut rng_a = SeededRandom::new(Some(7));
        let mut rng_b = SeededRandom::new(Some(7));

        let a = rasterize(32, 32, &palette, &mut rng_a).unwrap();
        let b = rasterize(32, 32, &palette, &mut rng_b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_palette_rejected() {
        let mut rng = SeededRandom::new(Some(1));
        assert!(matches!(
            rasterize(16, 16, &[], &mut rng),
            Err(SceneError::EmptyPalette)
        ));
    }

    #[test]
    fn test_single_color_palette_gives_solid_gradient() {
        let palette = vec![Color::new(10, 20, 30)];
        let mut rng = SeededRandom::new(Some(3));
        let scene = rasterize(16, 16, &palette, &mut rng).unwrap();
        for pixel in scene.data().chunks_exact(4) {
            assert_eq!(pixel, [10, 20, 30, 255]);
        }
    }

    #[test]
    fn test_fill_ellipse_stays_in_bounds() {
        // Center outside the buffer must not panic or wrap
        let mut buf = PixelBuffer::filled(16, 16, [0, 0, 0, 255]).unwrap();
        fill_ellipse(&mut buf, -4.0, 8.0, 6.0, 6.0, Color::new(255, 0, 0));
        fill_ellipse(&mut buf, 20.0, 8.0, 6.0, 6.0, Color::new(0, 255, 0));
        assert_eq!(buf.pixel(0, 8), [255, 0, 0, 255]);
        assert_eq!(buf.pixel(15, 8), [0, 255, 0, 255]);
    }
}
