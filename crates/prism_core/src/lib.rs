//! Prism Core - configuration and texture support for the renderer.
//!
//! This crate provides:
//!
//! - **Render settings**: `RenderSettings`, loaded from JSON and validated
//! - **Textures**: `Texture`, decoded with the `image` crate and sampled by UV
//!
//! # Example
//!
//! ```ignore
//! use prism_core::RenderSettings;
//!
//! let settings = RenderSettings::from_json_file("render.json")?;
//! println!("{:?} @ {} spp", settings.integrator, settings.spp);
//! ```

pub mod settings;
pub mod texture;

// Re-export commonly used types
pub use settings::{IntegratorKind, RenderSettings, SamplingStrategy, SettingsError};
pub use texture::{Texture, TextureError, TextureResult};
