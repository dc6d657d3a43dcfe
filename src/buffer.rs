/**
 * Pixel Buffer Module
 *
 * The shared data structure every pipeline stage operates on: a row-major
 * RGBA byte buffer with its dimensions. Each stage consumes one buffer and
 * produces a new one (or mutates in place where documented), so the length
 * invariant `data.len() == width * height * 4` is enforced at construction
 * and preserved by every operation.
 */

use image::{ImageBuffer, Rgba, RgbaImage};
use std::path::Path;
use thiserror::Error;

/// Error types for buffer construction and I/O
#[derive(Error, Debug)]
pub enum BufferError {
    /// Width or height is zero
    #[error("Width and height must be positive")]
    InvalidDimensions,

    /// Raw data length does not match the stated dimensions
    #[error("Buffer length {found} does not match {width}x{height}x4 = {expected}")]
    LengthMismatch {
        /// Stated width in pixels
        width: usize,
        /// Stated height in pixels
        height: usize,
        /// Expected byte length (`width * height * 4`)
        expected: usize,
        /// Actual byte length supplied
        found: usize,
    },

    /// Requested crop region extends past the buffer bounds
    #[error("Crop region {x},{y} {width}x{height} exceeds buffer bounds")]
    CropOutOfBounds {
        /// Crop origin x
        x: usize,
        /// Crop origin y
        y: usize,
        /// Crop width
        width: usize,
        /// Crop height
        height: usize,
    },

    /// Failed to load or save an image file
    #[error("Image I/O failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for buffer operations
pub type Result<T> = std::result::Result<T, BufferError>;

/// Row-major RGBA pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a buffer filled with a single RGBA value
    pub fn filled(width: usize, height: usize, rgba: [u8; 4]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BufferError::InvalidDimensions);
        }
        let mut data = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            data.extend_from_slice(&rgba);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap raw RGBA bytes, validating the length invariant
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BufferError::InvalidDimensions);
        }
        let expected = width * height * 4;
        if data.len() != expected {
            return Err(BufferError::LengthMismatch {
                width,
                height,
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes, row-major
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the raw RGBA bytes
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Byte index of the red channel of pixel `(x, y)`
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * 4
    }

    /// Read the RGBA value at `(x, y)`
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = self.index(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Write the RGBA value at `(x, y)`
    #[inline]
    pub fn put_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let i = self.index(x, y);
        self.data[i..i + 4].copy_from_slice(&rgba);
    }

    /// Extract a `width x height` region with its origin at `(x, y)`
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BufferError::InvalidDimensions);
        }
        if x + width > self.width || y + height > self.height {
            return Err(BufferError::CropOutOfBounds {
                x,
                y,
                width,
                height,
            });
        }

        let mut data = Vec::with_capacity(width * height * 4);
        for row in y..y + height {
            let start = (row * self.width + x) * 4;
            data.extend_from_slice(&self.data[start..start + width * 4]);
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Save the buffer as an RGBA PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let img: RgbaImage =
            ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
                Rgba(self.pixel(x as usize, y as usize))
            });
        img.save(path)?;
        Ok(())
    }

    /// Load an image file, converting to RGBA
    pub fn load_png<P: AsRef<Path>>(path: P) -> Result<Self> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(BufferError::InvalidDimensions);
        }
        Ok(Self {
            width: width as usize,
            height: height as usize,
            data: img.into_raw(),
        })
    }
}
