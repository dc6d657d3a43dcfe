/**
 * Grainscape CLI - command-line interface for procedural texture rendering
 * and image processing
 */

mod blur;
mod buffer;
mod contrast;
mod dither;
mod noise;
mod pipeline;
mod rng;
mod scene;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use buffer::PixelBuffer;
use pipeline::{render, run, BlurSetting, NoiseSettings, PipelineConfig};
use rng::SeededRandom;
use scene::{default_palette, Color};

/// Procedural posterized texture tools
#[derive(Parser)]
#[command(name = "grainscape")]
#[command(version = "0.1.0")]
#[command(about = "Procedural posterized texture rendering and processing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Processing-stage flags shared by both subcommands
#[derive(Args)]
struct StageArgs {
    /// Blur radius for the first pass
    #[arg(short, long, default_value = "40")]
    blur: u32,

    /// Minimum radius for a spatially varying first blur (requires --max-blur)
    #[arg(long)]
    min_blur: Option<u32>,

    /// Maximum radius for a spatially varying first blur (requires --min-blur)
    #[arg(long)]
    max_blur: Option<u32>,

    /// Contrast stretch factor (1.0 = unchanged)
    #[arg(short, long, default_value = "1.3")]
    contrast: f32,

    /// Posterization shade count (omit to skip dithering)
    #[arg(long)]
    shades: Option<u32>,

    /// Radius of the softening second blur (omit to skip it)
    #[arg(long)]
    second_blur: Option<u32>,

    /// Minimum radius for a spatially varying second blur (requires --second-max)
    #[arg(long)]
    second_min: Option<u32>,

    /// Maximum radius for a spatially varying second blur (requires --second-min)
    #[arg(long)]
    second_max: Option<u32>,

    /// Grain blend opacity (omit to skip the grain overlay)
    #[arg(long)]
    noise_opacity: Option<f32>,

    /// Multiplier on the random grain term
    #[arg(long, default_value = "0.8")]
    noise_scale: f32,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u32>,

    /// Show per-stage progress
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a procedural gradient-and-ellipse texture
    Render {
        /// Output file path
        #[arg(short, long, default_value = "grainscape.png")]
        output: PathBuf,

        /// Output size (width and height)
        #[arg(short, long, default_value = "256")]
        size: usize,

        /// Comma-separated hex palette (e.g. "#264653,#e9c46a")
        #[arg(short, long)]
        palette: Option<String>,

        #[command(flatten)]
        stages: StageArgs,
    },

    /// Run the processing chain over an existing image
    Process {
        /// Input image path
        #[arg(short, long)]
        input: PathBuf,

        /// Output image path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        stages: StageArgs,
    },
}

/// Resolve the first-blur flags into a setting, rejecting ambiguous
/// combinations
fn first_blur(stages: &StageArgs) -> Result<BlurSetting> {
    match (stages.min_blur, stages.max_blur) {
        (Some(min), Some(max)) => {
            if min > max {
                anyhow::bail!("--min-blur must not exceed --max-blur");
            }
            Ok(BlurSetting::Variable { min, max })
        }
        (None, None) => Ok(BlurSetting::Fixed(stages.blur)),
        _ => anyhow::bail!("--min-blur and --max-blur must be given together"),
    }
}

/// Resolve the second-blur flags; the stage is skipped when none are given
fn second_blur(stages: &StageArgs) -> Result<Option<BlurSetting>> {
    match (stages.second_min, stages.second_max) {
        (Some(min), Some(max)) => {
            if stages.second_blur.is_some() {
                anyhow::bail!("--second-blur conflicts with --second-min/--second-max");
            }
            if min > max {
                anyhow::bail!("--second-min must not exceed --second-max");
            }
            Ok(Some(BlurSetting::Variable { min, max }))
        }
        (None, None) => Ok(stages.second_blur.map(BlurSetting::Fixed)),
        _ => anyhow::bail!("--second-min and --second-max must be given together"),
    }
}

fn build_config(final_width: usize, final_height: usize, stages: &StageArgs) -> Result<PipelineConfig> {
    if stages.contrast <= 0.0 {
        anyhow::bail!("Contrast must be positive");
    }
    if let Some(shades) = stages.shades {
        if shades < 2 {
            anyhow::bail!("At least two shades are required");
        }
    }
    if let Some(opacity) = stages.noise_opacity {
        if opacity < 0.0 {
            anyhow::bail!("Noise opacity must not be negative");
        }
    }

    Ok(PipelineConfig {
        final_width,
        final_height,
        blur: first_blur(stages)?,
        contrast_factor: stages.contrast,
        dither_shades: stages.shades,
        second_blur: second_blur(stages)?,
        noise: stages.noise_opacity.map(|opacity| NoiseSettings {
            opacity,
            scale: stages.noise_scale,
        }),
        verbose: stages.verbose,
    })
}

fn parse_palette(spec: Option<&str>) -> Result<Vec<Color>> {
    match spec {
        None => Ok(default_palette()),
        Some(list) => list
            .split(',')
            .map(|hex| {
                Color::from_hex(hex.trim())
                    .with_context(|| format!("Failed to parse palette color {hex:?}"))
            })
            .collect(),
    }
}

fn ensure_parent_dir(path: &PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            output,
            size,
            palette,
            stages,
        } => {
            if size < 16 || size > 512 {
                anyhow::bail!("Size must be between 16 and 512");
            }

            let config = build_config(size, size, &stages)?;
            let palette = parse_palette(palette.as_deref())?;

            println!("Rendering {}×{} texture", size, size);
            if let Some(s) = stages.seed {
                println!("Seed: {}", s);
            }
            println!("Output: {}", output.display());
            println!();

            ensure_parent_dir(&output)?;

            let image =
                render(&config, &palette, stages.seed).context("Failed to render texture")?;
            image.save_png(&output).context("Failed to save texture")?;

            println!("Saved texture to {}", output.display());
            println!();
            println!("Done!");
        }

        Commands::Process { input, output, stages } => {
            if !input.exists() {
                anyhow::bail!("Input file does not exist: {}", input.display());
            }

            let buffer = PixelBuffer::load_png(&input).context("Failed to load input image")?;

            // The loaded image is treated as an already-padded input: the
            // padding border is consumed by the first blur and cropped away
            let setting = first_blur(&stages)?;
            let pad = setting.max_radius() as usize;
            let (width, height) = (buffer.width(), buffer.height());
            if width <= 2 * pad || height <= 2 * pad {
                anyhow::bail!(
                    "Input {}×{} is too small for a blur padding of {} per side",
                    width,
                    height,
                    pad
                );
            }

            let config = build_config(width - 2 * pad, height - 2 * pad, &stages)?;

            println!("Processing: {}", input.display());
            println!(
                "Output: {}×{} after removing {} padding pixels per side",
                config.final_width, config.final_height, pad
            );
            println!();

            ensure_parent_dir(&output)?;

            let mut rng = SeededRandom::new(stages.seed);
            let result = run(&buffer, &config, &mut rng).context("Failed to process image")?;
            result.save_png(&output).context("Failed to save output")?;

            println!("Processed image saved to: {}", output.display());
            println!();
            println!("Done!");
        }
    }

    Ok(())
}
