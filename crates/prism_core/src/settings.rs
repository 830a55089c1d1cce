//! Per-run render settings.
//!
//! Settings are plain data read from JSON. Every field has a default, so a
//! settings file only lists what it changes:
//!
//! ```json
//! { "integrator": "monte_carlo", "spp": 256, "sampling": "mis", "jitter": true }
//! ```

use std::path::Path;

use prism_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading or validating settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error reading settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Which light-transport algorithm renders the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorKind {
    /// Deterministic recursive ray tracing with shadow rays.
    #[default]
    Whitted,
    /// Path tracing with next-event estimation.
    MonteCarlo,
}

/// How the Monte Carlo integrator picks the continuation direction on
/// BRDF surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingStrategy {
    /// Uniform hemisphere, no explicit area-light sampling.
    Uniform,
    /// Uniform hemisphere plus next-event estimation.
    NeeUniform,
    /// Cosine-weighted hemisphere plus next-event estimation.
    NeeCosine,
    /// BRDF importance sampling plus next-event estimation.
    NeeBrdf,
    /// 50/50 blend of cosine and BRDF sampling plus next-event estimation.
    #[default]
    Mis,
}

impl SamplingStrategy {
    /// True when area lights are sampled explicitly at every BRDF bounce.
    pub fn uses_nee(self) -> bool {
        !matches!(self, SamplingStrategy::Uniform)
    }
}

/// Render settings shared by both integrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    /// Integrator used for every pixel
    pub integrator: IntegratorKind,
    /// Samples per pixel (Monte Carlo only)
    pub spp: u32,
    /// Russian roulette termination probability, in [0, 1)
    pub rr_prob: f32,
    /// Minimum accepted ray distance, avoids self-intersection
    pub t_min: f32,
    /// Display gamma; output channels are raised to 1/gamma
    pub gamma: f32,
    /// Continuation sampling on BRDF surfaces
    pub sampling: SamplingStrategy,
    /// Offset samples by a Hammersley sequence inside the pixel
    pub jitter: bool,
    /// Worker threads, 0 lets rayon decide
    pub threads: usize,
    /// Color returned by rays that leave the scene (Whitted)
    pub background: Vec3,
    /// Surfaces hit at this recursion depth or deeper shade to black;
    /// misses and emitters still count there. Shared by both integrators.
    pub max_depth: u32,
    /// Edge length of render buckets in pixels
    pub bucket_size: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            integrator: IntegratorKind::Whitted,
            spp: 16,
            rr_prob: 0.2,
            t_min: 1e-4,
            gamma: 1.0,
            sampling: SamplingStrategy::Mis,
            jitter: false,
            threads: 0,
            background: Vec3::ZERO,
            max_depth: 64,
            bucket_size: 32,
        }
    }
}

impl RenderSettings {
    /// Parse settings from a JSON string and validate them.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: RenderSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file and validate them.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&raw)?;
        log::debug!("Loaded settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }

    /// Check value ranges the integrators rely on.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.spp == 0 {
            return Err(invalid("spp", "must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.rr_prob) {
            return Err(invalid(
                "rr_prob",
                format!("{} is outside [0, 1)", self.rr_prob),
            ));
        }
        if !(self.t_min >= 0.0 && self.t_min.is_finite()) {
            return Err(invalid("t_min", format!("{} must be finite and >= 0", self.t_min)));
        }
        if !(self.gamma > 0.0 && self.gamma.is_finite()) {
            return Err(invalid("gamma", format!("{} must be positive", self.gamma)));
        }
        if self.max_depth == 0 {
            return Err(invalid("max_depth", "must be at least 1"));
        }
        if self.bucket_size == 0 {
            return Err(invalid("bucket_size", "must be at least 1"));
        }
        if !self.background.is_finite() {
            return Err(invalid("background", "must be finite"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.into(),
    }
}
