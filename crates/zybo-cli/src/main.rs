//! `zybo-orb` — run one image through the ORB accelerator.
//!
//! ```text
//! USAGE:
//!   zybo-orb <IMAGE> [<THRESH> <NEG_THRESH>]
//! ```
//!
//! Loads the image as 8-bit grayscale, streams it into the fabric, prints
//! one line per detected feature followed by its 256-bit descriptor in
//! hex, then the final count, and writes a contrast-normalized copy with
//! the feature positions marked to `features_image<thresh>[<count>].bmp`.

use anyhow::{bail, Context, Result};
use clap::Parser;
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_cross_mut;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use zybo_chip::{FeatureRecord, Frame, LINE_SIZE, NUM_LINES};
use zybo_driver::{DeviceSession, EngineConfig, OrbEngine, PollMode};

#[derive(Parser)]
#[command(name = "zybo-orb", about = "ORB feature detection on the Zybo accelerator", version)]
struct Cli {
    /// Input image, read as 8-bit grayscale (must be 640x480).
    image: PathBuf,

    /// Positive corner threshold (default 15; requires NEG_THRESH).
    #[arg(requires = "neg_thresh", allow_negative_numbers = true)]
    thresh: Option<i32>,

    /// Negative corner threshold (default -15).
    #[arg(allow_negative_numbers = true)]
    neg_thresh: Option<i32>,

    /// Poll the trigger flag without a timeout, as the bring-up host did.
    #[arg(long)]
    unbounded_poll: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(1);
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    // An unreadable image abandons the frame before any hardware access.
    let gray = image::open(&cli.image)
        .with_context(|| format!("Could not read the image: {}", cli.image.display()))?
        .to_luma8();

    if gray.width() != LINE_SIZE as u32 || gray.height() != NUM_LINES as u32 {
        bail!(
            "accelerator expects a {LINE_SIZE}x{NUM_LINES} frame, got {}x{}",
            gray.width(),
            gray.height()
        );
    }
    let frame = Frame::from_raw(gray.as_raw().clone())?;

    let config = EngineConfig {
        corner_thresh: cli.thresh.unwrap_or(15),
        corner_thresh_n: cli.neg_thresh.unwrap_or(-15),
        poll: if cli.unbounded_poll {
            PollMode::Unbounded
        } else {
            PollMode::default()
        },
    };

    let session = DeviceSession::open()?;
    let mut engine = OrbEngine::new(session, config);
    let report = engine.process(&frame)?;

    for feature in &report.features {
        println!("{feature}");
        println!("{}", feature.descriptor_hex());
    }
    println!("Found {} features", report.features.len());

    let marked = render_markers(&gray, &report.features);
    let out_name = report.artifact_name();
    marked
        .save(&out_name)
        .with_context(|| format!("could not write {out_name}"))?;

    Ok(())
}

/// Contrast-normalize the grayscale frame into an RGB image and mark each
/// feature position in green.
fn render_markers(gray: &GrayImage, features: &[FeatureRecord]) -> RgbImage {
    let (mut min, mut max) = (255u8, 0u8);
    for px in gray.pixels() {
        min = min.min(px[0]);
        max = max.max(px[0]);
    }
    // A flat image has nothing to stretch.
    if min == max {
        min = 0;
        max = 255;
    }
    let span = u32::from(max - min);

    let mut out = RgbImage::new(gray.width(), gray.height());
    for (x, y, px) in gray.enumerate_pixels() {
        let v = (255 * u32::from(px[0] - min) / span) as u8;
        out.put_pixel(x, y, Rgb([v, v, v]));
    }

    for feature in features {
        draw_cross_mut(
            &mut out,
            Rgb([0, 255, 0]),
            i32::from(feature.col),
            i32::from(feature.row),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn uniform_image_normalizes_to_identity_bounds() {
        let gray = GrayImage::from_pixel(8, 8, Luma([128]));
        let out = render_markers(&gray, &[]);
        assert_eq!(out.get_pixel(0, 0), &Rgb([128, 128, 128]));
    }

    #[test]
    fn normalization_stretches_to_full_range() {
        let mut gray = GrayImage::from_pixel(4, 1, Luma([100]));
        gray.put_pixel(0, 0, Luma([50]));
        gray.put_pixel(3, 0, Luma([150]));
        let out = render_markers(&gray, &[]);
        assert_eq!(out.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(3, 0), &Rgb([255, 255, 255]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([127, 127, 127]));
    }

    #[test]
    fn markers_land_on_the_feature_position() {
        let gray = GrayImage::from_pixel(16, 16, Luma([0]));
        let feature = FeatureRecord {
            row: 5,
            col: 9,
            score: 1,
            angle: 0,
            quadrant: 0,
            theta: 0,
            scale: 0,
            orientation: 0.0,
            descriptor: [0; 8],
        };
        let out = render_markers(&gray, &[feature]);
        assert_eq!(out.get_pixel(9, 5), &Rgb([0, 255, 0]));
    }
}
