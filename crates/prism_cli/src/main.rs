//! `prism`: render the built-in demo scene to a PNG.
//!
//! ```text
//! prism <output.png> [settings.json]
//! ```
//!
//! Settings default to a Whitted render; see `RenderSettings` for the JSON
//! fields. `RUST_LOG` overrides the default `info` log level.

mod demo;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use prism_core::RenderSettings;
use prism_renderer::{render_with_progress, Camera};

const USAGE: &str = "Usage: prism <output.png> [settings.json]";

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut args = std::env::args().skip(1);
    let output = PathBuf::from(args.next().ok_or_else(|| anyhow!(USAGE))?);
    let settings = match args.next() {
        Some(path) => RenderSettings::from_json_file(&path)
            .with_context(|| format!("Failed to read settings from {path}"))?,
        None => RenderSettings::default(),
    };
    if args.next().is_some() {
        return Err(anyhow!(USAGE));
    }

    log::info!("Starting Prism");
    let scene = demo::scene().context("Failed to build the demo scene")?;
    let camera = demo::camera();

    let image = render_with_progress(&scene, &camera, &settings, |result| {
        log::debug!(
            "Bucket {} at ({}, {}) done",
            result.bucket.index,
            result.bucket.x,
            result.bucket.y
        );
    })?;

    let rgba = image::RgbaImage::from_raw(camera.width(), camera.height(), image.to_rgba(settings.gamma))
        .ok_or_else(|| anyhow!("Rendered buffer does not match {}x{}", camera.width(), camera.height()))?;
    rgba.save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    log::info!("Wrote {}", output.display());
    Ok(())
}
