/**
 * Box Blur Engine
 *
 * Two-pass separable mean filter over RGBA buffers, in two modes:
 *
 * - Fixed radius: every pixel averages a `2r + 1` window, implemented with
 *   a sliding running sum per scanline.
 * - Variable radius: the window half-width at each pixel comes from a
 *   per-pixel BlurMap, generated from a deterministic multi-harmonic field.
 *
 * Edge handling is a truncated average: the window is intersected with the
 * buffer bounds and the sum divided by the count of samples actually
 * included. There is no zero padding, so edge pixels have smaller effective
 * windows than interior pixels. The pipeline renders with a padding border
 * and crops it away afterwards for exactly this reason.
 *
 * Alpha is blurred identically to the color channels.
 */

use crate::buffer::PixelBuffer;
use thiserror::Error;

/// Error types for blur operations
#[derive(Error, Debug)]
pub enum BlurError {
    /// Width or height is zero
    #[error("Width and height must be positive")]
    InvalidDimensions,

    /// Radius range has min above max
    #[error("Invalid radius range: min {min} exceeds max {max}")]
    InvalidRadiusRange {
        /// Lower radius bound
        min: u32,
        /// Upper radius bound
        max: u32,
    },

    /// Blur map dimensions differ from the buffer being blurred
    #[error("Blur map is {map_width}x{map_height} but buffer is {width}x{height}")]
    MapSizeMismatch {
        /// Map width
        map_width: usize,
        /// Map height
        map_height: usize,
        /// Buffer width
        width: usize,
        /// Buffer height
        height: usize,
    },
}

/// Result type for blur operations
pub type Result<T> = std::result::Result<T, BlurError>;

/// Per-pixel field of blur radii
#[derive(Debug, Clone)]
pub struct BlurMap {
    width: usize,
    height: usize,
    radii: Vec<u32>,
}

impl BlurMap {
    /// Map width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Map height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Radius at `(x, y)`
    #[inline]
    pub fn radius(&self, x: usize, y: usize) -> u32 {
        self.radii[y * self.width + x]
    }
}

/// Base spatial frequency of the radius field
const FIELD_FREQUENCY: f64 = 0.023;

/// Harmonic multipliers of the base frequency; three unit-amplitude
/// sine/cosine cross-terms keep the raw field inside [-3, 3]
const FIELD_HARMONICS: [f64; 3] = [1.0, 2.7, 6.1];

/**
 * Generate a per-pixel radius field from deterministic multi-harmonic noise.
 *
 * For each pixel the scaled coordinates are fed through three sine/cosine
 * cross-terms at increasing frequencies, summing to a raw value in [-3, 3].
 * The raw value is normalized to [0, 1] and mapped onto [min, max) with a
 * floor. The floor is deliberate: rounding would shift the distribution and
 * let the field reach `max` far more often.
 *
 * The field is a pure function of its inputs; no randomness is involved.
 */
pub fn generate_blur_map(
    width: usize,
    height: usize,
    min_radius: u32,
    max_radius: u32,
) -> Result<BlurMap> {
    if width == 0 || height == 0 {
        return Err(BlurError::InvalidDimensions);
    }
    if min_radius > max_radius {
        return Err(BlurError::InvalidRadiusRange {
            min: min_radius,
            max: max_radius,
        });
    }

    let span = (max_radius - min_radius) as f64;
    let mut radii = Vec::with_capacity(width * height);

    for y in 0..height {
        for x in 0..width {
            let fx = x as f64 * FIELD_FREQUENCY;
            let fy = y as f64 * FIELD_FREQUENCY;

            let mut raw = 0.0;
            for h in FIELD_HARMONICS {
                raw += (fx * h).sin() * (fy * h).cos();
            }

            let normalized = (raw + 3.0) / 6.0;
            radii.push(min_radius + (normalized * span).floor() as u32);
        }
    }

    Ok(BlurMap {
        width,
        height,
        radii,
    })
}

/// Truncated-average window along one axis: `[center - r, center + r]`
/// clamped to `[0, len)`
#[inline]
fn window(center: usize, radius: usize, len: usize) -> (usize, usize) {
    let lo = center.saturating_sub(radius);
    let hi = (center + radius).min(len - 1);
    (lo, hi)
}

#[inline]
fn average(sum: [u32; 4], count: u32) -> [u8; 4] {
    let mut out = [0u8; 4];
    for c in 0..4 {
        out[c] = (sum[c] as f32 / count as f32).round() as u8;
    }
    out
}

/// One fixed-radius pass along an axis, using a sliding running sum.
/// The running sum is an exact integer, so results are identical to the
/// naive per-window loop for every pixel including the truncated edges.
fn blur_pass_fixed(src: &PixelBuffer, radius: usize, horizontal: bool) -> PixelBuffer {
    let width = src.width();
    let height = src.height();
    let (lanes, len) = if horizontal {
        (height, width)
    } else {
        (width, height)
    };

    let data = src.data();
    let mut out = vec![0u8; data.len()];

    let index = |lane: usize, pos: usize| -> usize {
        if horizontal {
            (lane * width + pos) * 4
        } else {
            (pos * width + lane) * 4
        }
    };

    for lane in 0..lanes {
        // Seed the window for position 0: samples [0, min(radius, len - 1)]
        let mut sum = [0u32; 4];
        let init_hi = radius.min(len - 1);
        for pos in 0..=init_hi {
            let i = index(lane, pos);
            for c in 0..4 {
                sum[c] += data[i + c] as u32;
            }
        }
        let mut count = (init_hi + 1) as u32;

        for pos in 0..len {
            let o = index(lane, pos);
            out[o..o + 4].copy_from_slice(&average(sum, count));

            // Slide: admit the sample entering at pos+1+radius, retire the
            // sample leaving at pos-radius
            let entering = pos + 1 + radius;
            if entering < len {
                let i = index(lane, entering);
                for c in 0..4 {
                    sum[c] += data[i + c] as u32;
                }
                count += 1;
            }
            if pos >= radius {
                let i = index(lane, pos - radius);
                for c in 0..4 {
                    sum[c] -= data[i + c] as u32;
                }
                count -= 1;
            }
        }
    }

    PixelBuffer::from_raw(width, height, out).expect("pass preserves dimensions")
}

/// One variable-radius pass along an axis. The window half-width is read
/// from the map at the destination pixel.
fn blur_pass_variable(src: &PixelBuffer, map: &BlurMap, horizontal: bool) -> PixelBuffer {
    let width = src.width();
    let height = src.height();
    let data = src.data();
    let mut out = vec![0u8; data.len()];

    for y in 0..height {
        for x in 0..width {
            let radius = map.radius(x, y) as usize;
            let (lo, hi) = if horizontal {
                window(x, radius, width)
            } else {
                window(y, radius, height)
            };

            let mut sum = [0u32; 4];
            for pos in lo..=hi {
                let i = if horizontal {
                    (y * width + pos) * 4
                } else {
                    (pos * width + x) * 4
                };
                for c in 0..4 {
                    sum[c] += data[i + c] as u32;
                }
            }

            let count = (hi - lo + 1) as u32;
            let o = (y * width + x) * 4;
            out[o..o + 4].copy_from_slice(&average(sum, count));
        }
    }

    PixelBuffer::from_raw(width, height, out).expect("pass preserves dimensions")
}

/**
 * Fixed-radius box blur: horizontal pass into an intermediate buffer, then
 * a vertical pass over the intermediate. Radius 0 is an identity.
 */
pub fn box_blur(buffer: &PixelBuffer, radius: u32) -> Result<PixelBuffer> {
    let intermediate = blur_pass_fixed(buffer, radius as usize, true);
    Ok(blur_pass_fixed(&intermediate, radius as usize, false))
}

/**
 * Variable-radius box blur driven by a per-pixel radius map.
 *
 * Both passes read the radius at the destination pixel: the vertical pass
 * at `(x, y)` uses the map value at `(x, y)`, not a value derived from the
 * intermediate source pixels. This is an approximation of a spatially
 * varying filter, not a true 2D variable-width convolution, and is kept
 * as-is for compatibility with the reference output.
 */
pub fn box_blur_variable(buffer: &PixelBuffer, map: &BlurMap) -> Result<PixelBuffer> {
    if map.width() != buffer.width() || map.height() != buffer.height() {
        return Err(BlurError::MapSizeMismatch {
            map_width: map.width(),
            map_height: map.height(),
            width: buffer.width(),
            height: buffer.height(),
        });
    }

    let intermediate = blur_pass_variable(buffer, map, true);
    Ok(blur_pass_variable(&intermediate, map, false))
}
