//! Texture loading and sampling for materials.
//!
//! Textures are decoded once during scene setup and shared between
//! materials through `Arc`. Lookups are nearest-texel, which is what the
//! integrators expect for diffuse color.

use std::path::Path;

use prism_math::Vec3;
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Texture has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("Pixel buffer holds {actual} texels, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Largest coordinate a lookup may reach, keeping `u * width` below `width`.
const MAX_COORD: f32 = 0.9999;

/// A decoded texture with linear RGB texels.
///
/// Row 0 is the bottom of the image, so `v = 0` samples the bottom edge.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Texels in row-major order, bottom row first
    pixels: Vec<Vec3>,

    /// Original file path (for debugging)
    pub path: String,
}

impl Texture {
    /// Create a texture from texels laid out bottom row first.
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<Vec3>,
        path: impl Into<String>,
    ) -> TextureResult<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { width, height });
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(TextureError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
            path: path.into(),
        })
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Vec3) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color],
            path: "<solid>".to_string(),
        }
    }

    /// Procedural checkerboard with `cells` squares along each side.
    pub fn checker(cells: u32, a: Vec3, b: Vec3) -> Self {
        let cells = cells.max(1);
        let pixels = (0..cells)
            .flat_map(|y| (0..cells).map(move |x| if (x + y) % 2 == 0 { a } else { b }))
            .collect();

        Self {
            width: cells,
            height: cells,
            pixels,
            path: "<checker>".to_string(),
        }
    }

    /// Load a texture from disk.
    ///
    /// Every channel `c` in [0, 1] is stored as `c^gamma`; pass 1.0 to keep
    /// the encoded values as they are.
    pub fn load(path: impl AsRef<Path>, gamma: f32) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in (0..height).rev() {
            for x in 0..width {
                let p = rgb.get_pixel(x, y);
                pixels.push(Vec3::new(
                    linearize(p[0], gamma),
                    linearize(p[1], gamma),
                    linearize(p[2], gamma),
                ));
            }
        }

        let texture = Self::new(width, height, pixels, path.to_string_lossy())?;
        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            texture.path,
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );
        Ok(texture)
    }

    /// Nearest-texel lookup. Coordinates are clamped to [0, 0.9999].
    pub fn color_at(&self, u: f32, v: f32) -> Vec3 {
        let u = clamp_coord(u);
        let v = clamp_coord(v);

        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);
        self.pixels[(y * self.width + x) as usize]
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<Vec3>()
    }
}

fn clamp_coord(c: f32) -> f32 {
    // NaN falls through max/min to 0
    c.max(0.0).min(MAX_COORD)
}

/// Convert an encoded byte to a linear float.
fn linearize(value: u8, gamma: f32) -> f32 {
    let v = value as f32 / 255.0;
    if (gamma - 1.0).abs() < f32::EPSILON {
        v
    } else {
        v.powf(gamma)
    }
}
