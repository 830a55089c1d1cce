//! Parallel image rendering.
//!
//! Picks the integrator named by the settings, spreads buckets over a
//! dedicated rayon pool and gathers the results into an [`ImageBuffer`]
//! of linear colors.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use prism_core::{IntegratorKind, RenderSettings};
use rayon::prelude::*;

use crate::{
    bucket::{generate_buckets, render_bucket, BucketResult},
    camera::Camera,
    error::RenderError,
    integrator::Integrator,
    monte_carlo::MonteCarlo,
    scene::Scene,
    whitted::Whitted,
    Color,
};

/// Raise each channel to `1/gamma` and quantize to 8-bit RGBA.
pub fn color_to_rgba(color: Color, gamma: f32) -> [u8; 4] {
    let encode = |c: f32| {
        let c = if c > 0.0 { c.powf(1.0 / gamma) } else { 0.0 };
        (255.0 * c.clamp(0.0, 1.0)) as u8
    };
    [encode(color.x), encode(color.y), encode(color.z), 255]
}

/// Row-major image of linear colors.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy a finished bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let i = i as u32;
            self.set(bucket.x + i % bucket.width, bucket.y + i / bucket.width, *color);
        }
    }

    /// Gamma-encoded RGBA bytes, ready for saving.
    pub fn to_rgba(&self, gamma: f32) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color, gamma));
        }
        bytes
    }
}

/// Integrator named by `settings.integrator`.
pub fn integrator_for<'s>(scene: &'s Scene, settings: &'s RenderSettings) -> Box<dyn Integrator + 's> {
    match settings.integrator {
        IntegratorKind::Whitted => Box::new(Whitted::new(scene, settings)),
        IntegratorKind::MonteCarlo => Box::new(MonteCarlo::new(scene, settings)),
    }
}

/// Render one pixel with the configured integrator.
pub fn render_pixel(scene: &Scene, camera: &dyn Camera, settings: &RenderSettings, x: u32, y: u32) -> Color {
    integrator_for(scene, settings).pixel_color(camera, x, y)
}

/// Render the full image.
pub fn render(scene: &Scene, camera: &dyn Camera, settings: &RenderSettings) -> Result<ImageBuffer, RenderError> {
    render_with_progress(scene, camera, settings, |_| {})
}

/// Render the full image, calling `on_bucket` as each bucket finishes.
///
/// Buckets finish in whatever order the pool schedules them.
pub fn render_with_progress<F>(
    scene: &Scene,
    camera: &dyn Camera,
    settings: &RenderSettings,
    on_bucket: F,
) -> Result<ImageBuffer, RenderError>
where
    F: Fn(&BucketResult) + Sync,
{
    let (width, height) = (camera.width(), camera.height());
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyImage { width, height });
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.threads)
        .build()?;
    let buckets = generate_buckets(width, height, settings.bucket_size);
    let integrator = integrator_for(scene, settings);
    let integrator: &dyn Integrator = integrator.as_ref();

    log::info!(
        "Rendering {}x{} with {:?} ({} buckets, {} threads)",
        width,
        height,
        settings.integrator,
        buckets.len(),
        pool.current_num_threads()
    );
    let start = Instant::now();
    let done = AtomicUsize::new(0);
    let step = (buckets.len() / 10).max(1);

    let results: Vec<BucketResult> = pool.install(|| {
        buckets
            .par_iter()
            .map(|bucket| {
                let result = BucketResult::new(*bucket, render_bucket(bucket, camera, integrator));
                on_bucket(&result);

                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                if finished % step == 0 || finished == buckets.len() {
                    log::info!("Rendered {}/{} buckets", finished, buckets.len());
                }
                result
            })
            .collect()
    });

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    Ok(image)
}
