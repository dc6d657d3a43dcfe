/**
 * Noise Compositor
 *
 * Generates a grayscale grain field and screen-blends it into the buffer.
 * The field is a uniformly random base plus a faint deterministic
 * two-frequency structural term plus a full-range random term multiplied by
 * `scale`. At typical scales the scaled random term dominates the
 * structural term, so the overlay reads as near-pure grain; the numeric
 * relationship is kept that way on purpose.
 */

use crate::buffer::PixelBuffer;
use crate::rng::SeededRandom;

/// Structural term frequencies (x uses sine, y uses cosine)
const STRUCTURE_FREQ_X: f32 = 0.17;
const STRUCTURE_FREQ_Y: f32 = 0.31;

/// Structural term amplitude, small against the 0-255 random base
const STRUCTURE_AMPLITUDE: f32 = 24.0;

/// Generate a `width * height` grayscale grain field
fn grain_field(
    width: usize,
    height: usize,
    scale: f32,
    rng: &mut SeededRandom,
) -> Vec<u8> {
    let mut field = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let base = rng.next() * 255.0;
            let structure = ((x as f32 * STRUCTURE_FREQ_X).sin()
                + (y as f32 * STRUCTURE_FREQ_Y).cos())
                * STRUCTURE_AMPLITUDE;
            let grain = (rng.next() - 0.5) * 255.0 * scale;
            field.push((base + structure + grain).clamp(0.0, 255.0) as u8);
        }
    }
    field
}

/**
 * Blend a grain field into the buffer in place.
 *
 * For each color channel: `new = clamp(old + (noise - 128) * opacity)`, an
 * additive blend centered at mid-gray, so on average the overlay neither
 * brightens nor darkens. Alpha is unchanged.
 */
pub fn apply_noise(
    buffer: &mut PixelBuffer,
    opacity: f32,
    scale: f32,
    rng: &mut SeededRandom,
) {
    let width = buffer.width();
    let height = buffer.height();
    let field = grain_field(width, height, scale, rng);

    for (pixel, &noise) in buffer.data_mut().chunks_exact_mut(4).zip(field.iter()) {
        let offset = (noise as f32 - 128.0) * opacity;
        for channel in pixel.iter_mut().take(3) {
            *channel = (*channel as f32 + offset).clamp(0.0, 255.0) as u8;
        }
    }
}
