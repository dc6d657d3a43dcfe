/**
 * Contrast Enhancement Module
 *
 * Per-channel linear contrast stretch around mid-gray, applied in place.
 */

use crate::buffer::PixelBuffer;

/// Midpoint of the 8-bit channel range; the stretch pivots here, so
/// mid-gray is a fixed point for every factor
const PIVOT: f32 = 128.0;

/**
 * Stretch each color channel around mid-gray: `new = factor * (old - 128)
 * + 128`, clamped to [0, 255]. A factor of 1.0 is an identity, factors
 * above 1 increase spread, factors below 1 compress it. Alpha is left
 * untouched.
 */
pub fn enhance(buffer: &mut PixelBuffer, factor: f32) {
    for pixel in buffer.data_mut().chunks_exact_mut(4) {
        for channel in pixel.iter_mut().take(3) {
            let adjusted = factor * (*channel as f32 - PIVOT) + PIVOT;
            *channel = adjusted.clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_one_is_identity() {
        let mut buf = PixelBuffer::filled(4, 4, [0, 0, 0, 255]).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                let v = (x * 60 + y * 17) as u8;
                buf.put_pixel(x, y, [v, 255 - v, v / 2, 200]);
            }
        }
        let reference = buf.clone();

        enhance(&mut buf, 1.0);
        assert_eq!(buf, reference);
    }

    #[test]
    fn test_mid_gray_is_fixed_point() {
        let mut buf = PixelBuffer::filled(2, 2, [128, 128, 128, 255]).unwrap();
        enhance(&mut buf, 2.0);
        assert_eq!(buf.pixel(0, 0), [128, 128, 128, 255]);

        enhance(&mut buf, 0.1);
        assert_eq!(buf.pixel(1, 1), [128, 128, 128, 255]);
    }

    #[test]
    fn test_extreme_factor_clamps() {
        let mut buf = PixelBuffer::filled(1, 1, [10, 200, 128, 255]).unwrap();
        enhance(&mut buf, 1000.0);
        // Below pivot saturates to 0, above pivot to 255, pivot unchanged
        assert_eq!(buf.pixel(0, 0), [0, 255, 128, 255]);
    }

    #[test]
    fn test_low_factor_compresses_toward_pivot() {
        let mut buf = PixelBuffer::filled(1, 1, [0, 255, 64, 255]).unwrap();
        enhance(&mut buf, 0.5);
        // 0 -> 64, 255 -> 191 (191.5 truncated), 64 -> 96
        assert_eq!(buf.pixel(0, 0), [64, 191, 96, 255]);
    }

    #[test]
    fn test_alpha_untouched() {
        let mut buf = PixelBuffer::filled(2, 1, [10, 20, 30, 77]).unwrap();
        enhance(&mut buf, 3.0);
        assert_eq!(buf.pixel(0, 0)[3], 77);
        assert_eq!(buf.pixel(1, 0)[3], 77);
    }
}
