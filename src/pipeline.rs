/**
 * Pipeline Orchestration
 *
 * Runs the stage sequence over an input buffer:
 *
 *   rasterize -> blur -> crop -> contrast -> [dither] -> [blur] -> [noise]
 *
 * The input is rendered with a padding border of one maximum blur radius
 * per side; cropping after the first blur discards the truncated-average
 * edge artifacts, leaving only full-window-averaged pixels. Configuration
 * is validated up front so a bad run fails before any buffer is touched,
 * and each run is a pure function of its configuration and seed.
 */

use crate::blur::{box_blur, box_blur_variable, generate_blur_map, BlurError};
use crate::buffer::{BufferError, PixelBuffer};
use crate::contrast;
use crate::dither::{dither, DitherError};
use crate::noise::apply_noise;
use crate::rng::SeededRandom;
use crate::scene::{rasterize, Color, SceneError};
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

/// Blur stage configuration: one global radius, or a radius range realized
/// as a per-pixel field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurSetting {
    /// Single radius for every pixel
    Fixed(u32),
    /// Per-pixel radii drawn from the deterministic field in `[min, max)`
    Variable {
        /// Lower radius bound
        min: u32,
        /// Upper radius bound
        max: u32,
    },
}

impl BlurSetting {
    /// Largest radius the stage can use; sizes the padding border
    pub fn max_radius(&self) -> u32 {
        match *self {
            BlurSetting::Fixed(radius) => radius,
            BlurSetting::Variable { max, .. } => max,
        }
    }

    fn validate(&self) -> Result<()> {
        if let BlurSetting::Variable { min, max } = *self {
            if min > max {
                return Err(PipelineError::Blur(BlurError::InvalidRadiusRange {
                    min,
                    max,
                }));
            }
        }
        Ok(())
    }
}

/// Grain overlay configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseSettings {
    /// Blend strength of the grain field
    pub opacity: f32,
    /// Multiplier on the full-range random grain term
    pub scale: f32,
}

/// Immutable per-run configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Output width after cropping
    pub final_width: usize,
    /// Output height after cropping
    pub final_height: usize,
    /// First (wide) blur stage
    pub blur: BlurSetting,
    /// Contrast stretch factor (1.0 = identity)
    pub contrast_factor: f32,
    /// Posterization level count; `None` skips dithering
    pub dither_shades: Option<u32>,
    /// Second (narrow) blur to soften dithering artifacts; `None` skips it
    pub second_blur: Option<BlurSetting>,
    /// Grain overlay; `None` skips it
    pub noise: Option<NoiseSettings>,
    /// Show per-stage progress
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            final_width: 256,
            final_height: 256,
            blur: BlurSetting::Fixed(40),
            contrast_factor: 1.3,
            dither_shades: Some(24),
            second_blur: Some(BlurSetting::Fixed(2)),
            noise: Some(NoiseSettings {
                opacity: 0.25,
                scale: 0.8,
            }),
            verbose: false,
        }
    }
}

/// Error types for pipeline runs
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Final dimensions are zero
    #[error("Final dimensions must be positive")]
    InvalidDimensions,

    /// Contrast factor is negative or not finite
    #[error("Contrast factor must be finite and non-negative, got {0}")]
    InvalidContrast(f32),

    /// Noise opacity or scale is not finite
    #[error("Noise opacity and scale must be finite")]
    InvalidNoise,

    /// Input buffer does not match final size plus blur padding
    #[error(
        "Input buffer is {found_width}x{found_height}, expected \
         {expected_width}x{expected_height} (final size plus blur padding)"
    )]
    InputSizeMismatch {
        /// Expected input width
        expected_width: usize,
        /// Expected input height
        expected_height: usize,
        /// Actual input width
        found_width: usize,
        /// Actual input height
        found_height: usize,
    },

    /// A blur stage failed
    #[error(transparent)]
    Blur(#[from] BlurError),

    /// The dithering stage failed
    #[error(transparent)]
    Dither(#[from] DitherError),

    /// A buffer operation failed
    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// Scene rasterization failed
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineConfig {
    /// Fail-fast validation of the whole configuration; nothing is
    /// allocated until this passes
    pub fn validate(&self) -> Result<()> {
        if self.final_width == 0 || self.final_height == 0 {
            return Err(PipelineError::InvalidDimensions);
        }
        self.blur.validate()?;
        if let Some(second) = &self.second_blur {
            second.validate()?;
        }
        if !self.contrast_factor.is_finite() || self.contrast_factor < 0.0 {
            return Err(PipelineError::InvalidContrast(self.contrast_factor));
        }
        if let Some(shades) = self.dither_shades {
            if shades < 2 {
                return Err(PipelineError::Dither(DitherError::TooFewShades(shades)));
            }
        }
        if let Some(noise) = &self.noise {
            if !noise.opacity.is_finite() || !noise.scale.is_finite() {
                return Err(PipelineError::InvalidNoise);
            }
        }
        Ok(())
    }

    /// Padding border width on each side of the rasterized input
    pub fn padding(&self) -> usize {
        self.blur.max_radius() as usize
    }

    /// Input dimensions the run expects: final size plus padding per side
    pub fn padded_size(&self) -> (usize, usize) {
        (
            self.final_width + 2 * self.padding(),
            self.final_height + 2 * self.padding(),
        )
    }

    fn stage_count(&self) -> u64 {
        3 + self.dither_shades.is_some() as u64
            + self.second_blur.is_some() as u64
            + self.noise.is_some() as u64
    }
}

fn apply_blur(buffer: &PixelBuffer, setting: &BlurSetting) -> Result<PixelBuffer> {
    match *setting {
        BlurSetting::Fixed(radius) => Ok(box_blur(buffer, radius)?),
        BlurSetting::Variable { min, max } => {
            let map = generate_blur_map(buffer.width(), buffer.height(), min, max)?;
            Ok(box_blur_variable(buffer, &map)?)
        }
    }
}

fn stage_progress(config: &PipelineConfig) -> Option<ProgressBar> {
    if !config.verbose {
        return None;
    }
    let pb = ProgressBar::new(config.stage_count());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );
    Some(pb)
}

fn tick(progress: &Option<ProgressBar>, message: &'static str) {
    if let Some(pb) = progress {
        pb.set_message(message);
        pb.inc(1);
    }
}

/**
 * Run the processing chain over an already-rasterized input buffer.
 *
 * The input must be exactly `(final + 2 * padding)` in each dimension. The
 * RNG is only drawn from when the grain stage is enabled, so disabling
 * noise makes the run fully deterministic regardless of seed.
 */
pub fn run(
    input: &PixelBuffer,
    config: &PipelineConfig,
    rng: &mut SeededRandom,
) -> Result<PixelBuffer> {
    config.validate()?;

    let (expected_width, expected_height) = config.padded_size();
    if input.width() != expected_width || input.height() != expected_height {
        return Err(PipelineError::InputSizeMismatch {
            expected_width,
            expected_height,
            found_width: input.width(),
            found_height: input.height(),
        });
    }

    let progress = stage_progress(config);

    tick(&progress, "Blurring");
    let blurred = apply_blur(input, &config.blur)?;

    tick(&progress, "Cropping");
    let pad = config.padding();
    let mut output = blurred.crop(pad, pad, config.final_width, config.final_height)?;

    tick(&progress, "Stretching contrast");
    contrast::enhance(&mut output, config.contrast_factor);

    if let Some(shades) = config.dither_shades {
        tick(&progress, "Dithering");
        output = dither(&output, shades)?;
    }

    if let Some(second) = &config.second_blur {
        tick(&progress, "Softening");
        output = apply_blur(&output, second)?;
    }

    if let Some(noise) = &config.noise {
        tick(&progress, "Compositing grain");
        apply_noise(&mut output, noise.opacity, noise.scale, rng);
    }

    if let Some(pb) = progress {
        pb.finish_with_message("Pipeline complete");
    }

    Ok(output)
}

/**
 * Render a full texture: rasterize the padded scene with the seeded RNG,
 * then run the processing chain. Deterministic for a given configuration,
 * palette and seed.
 */
pub fn render(
    config: &PipelineConfig,
    palette: &[Color],
    seed: Option<u32>,
) -> Result<PixelBuffer> {
    config.validate()?;

    let mut rng = SeededRandom::new(seed);
    let (width, height) = config.padded_size();
    let scene = rasterize(width, height, palette, &mut rng)?;
    run(&scene, config, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::default_palette;

    fn minimal_config(size: usize, radius: u32, contrast: f32) -> PipelineConfig {
        PipelineConfig {
            final_width: size,
            final_height: size,
            blur: BlurSetting::Fixed(radius),
            contrast_factor: contrast,
            dither_shades: None,
            second_blur: None,
            noise: None,
            verbose: false,
        }
    }

    #[test]
    fn test_solid_gray_identity_run() {
        // 64x64 solid #808080, radius 5, contrast 1.0, nothing else:
        // averaging and identity contrast preserve the constant exactly
        let config = minimal_config(64, 5, 1.0);
        let input = PixelBuffer::filled(74, 74, [128, 128, 128, 255]).unwrap();
        let mut rng = SeededRandom::new(Some(1));

        let output = run(&input, &config, &mut rng).unwrap();
        assert_eq!(output.width(), 64);
        assert_eq!(output.height(), 64);
        for pixel in output.data().chunks_exact(4) {
            assert_eq!(pixel, [128, 128, 128, 255]);
        }
    }

    #[test]
    fn test_solid_gray_contrast_fixed_point() {
        // Mid-gray is the contrast pivot: factor 2.0 leaves 128 unchanged
        let config = minimal_config(64, 5, 2.0);
        let input = PixelBuffer::filled(74, 74, [128, 128, 128, 255]).unwrap();
        let mut rng = SeededRandom::new(Some(1));

        let output = run(&input, &config, &mut rng).unwrap();
        for pixel in output.data().chunks_exact(4) {
            assert_eq!(pixel, [128, 128, 128, 255]);
        }
    }

    #[test]
    fn test_input_size_mismatch_rejected() {
        let config = minimal_config(64, 5, 1.0);
        let input = PixelBuffer::filled(64, 64, [128, 128, 128, 255]).unwrap();
        let mut rng = SeededRandom::new(Some(1));

        assert!(matches!(
            run(&input, &config, &mut rng),
            Err(PipelineError::InputSizeMismatch {
                expected_width: 74,
                expected_height: 74,
                ..
            })
        ));
    }

    #[test]
    fn test_validation_rejects_bad_configs() {
        let mut config = minimal_config(0, 5, 1.0);
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidDimensions)
        ));

        config = minimal_config(64, 5, -1.0);
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidContrast(_))
        ));

        config = minimal_config(64, 5, f32::NAN);
        assert!(config.validate().is_err());

        config = minimal_config(64, 5, 1.0);
        config.dither_shades = Some(1);
        assert!(matches!(
            config.validate(),
            Err(PipelineError::Dither(DitherError::TooFewShades(1)))
        ));

        config = minimal_config(64, 5, 1.0);
        config.blur = BlurSetting::Variable { min: 8, max: 2 };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::Blur(BlurError::InvalidRadiusRange { .. }))
        ));

        config = minimal_config(64, 5, 1.0);
        config.noise = Some(NoiseSettings {
            opacity: f32::INFINITY,
            scale: 0.8,
        });
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidNoise)
        ));
    }

    #[test]
    fn test_padding_follows_max_radius() {
        let mut config = minimal_config(100, 7, 1.0);
        assert_eq!(config.padding(), 7);
        assert_eq!(config.padded_size(), (114, 114));

        config.blur = BlurSetting::Variable { min: 2, max: 13 };
        assert_eq!(config.padding(), 13);
        assert_eq!(config.padded_size(), (126, 126));
    }

    #[test]
    fn test_full_pipeline_produces_final_dimensions() {
        let config = PipelineConfig {
            final_width: 40,
            final_height: 28,
            blur: BlurSetting::Variable { min: 2, max: 9 },
            contrast_factor: 1.4,
            dither_shades: Some(12),
            second_blur: Some(BlurSetting::Fixed(1)),
            noise: Some(NoiseSettings {
                opacity: 0.3,
                scale: 0.8,
            }),
            verbose: false,
        };

        let output = render(&config, &default_palette(), Some(42)).unwrap();
        assert_eq!(output.width(), 40);
        assert_eq!(output.height(), 28);
        // Scene contract plus alpha-preserving stages keep full opacity
        for pixel in output.data().chunks_exact(4) {
            assert_eq!(pixel[3], 255);
        }
    }

    #[test]
    fn test_render_deterministic_per_seed() {
        let config = PipelineConfig {
            final_width: 32,
            final_height: 32,
            blur: BlurSetting::Fixed(6),
            ..Default::default()
        };

        let a = render(&config, &default_palette(), Some(9)).unwrap();
        let b = render(&config, &default_palette(), Some(9)).unwrap();
        assert_eq!(a, b);

        let c = render(&config, &default_palette(), Some(10)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_noise_disabled_ignores_seed() {
        let config = PipelineConfig {
            final_width: 24,
            final_height: 24,
            blur: BlurSetting::Fixed(4),
            contrast_factor: 1.2,
            dither_shades: Some(8),
            second_blur: None,
            noise: None,
            verbose: false,
        };

        let input = PixelBuffer::filled(32, 32, [90, 150, 40, 255]).unwrap();
        let mut rng_a = SeededRandom::new(Some(1));
        let mut rng_b = SeededRandom::new(Some(2));

        let a = run(&input, &config, &mut rng_a).unwrap();
        let b = run(&input, &config, &mut rng_b).unwrap();
        assert_eq!(a, b);
    }
}
