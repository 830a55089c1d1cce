//! Errors raised while building scenes or setting up a render.
//!
//! The intersection and shading hot path never returns these; misses and
//! non-converging refinements are plain `false` results there.

use thiserror::Error;

/// Invalid scene construction input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Bezier curve needs 3n+1 control points (n >= 1), got {0}")]
    BezierControlCount(usize),

    #[error("B-spline curve needs more than 3 control points, got {0}")]
    BSplineControlCount(usize),

    #[error("Revolution profile must lie in the xy-plane (control point {index} has z = {z})")]
    ProfileNotPlanar { index: usize, z: f32 },

    #[error("Revolution needs at least {min} {name} steps, got {actual}")]
    TooFewSteps {
        name: &'static str,
        min: u32,
        actual: u32,
    },

    #[error("Mesh {kind} face {face} references index {index}, but only {count} exist")]
    IndexOutOfRange {
        kind: &'static str,
        face: usize,
        index: usize,
        count: usize,
    },

    #[error("Mesh has {faces} faces but {attribute_faces} {kind} faces")]
    AttributeFaceCount {
        kind: &'static str,
        faces: usize,
        attribute_faces: usize,
    },

    #[error("Group expected {expected} children, got {actual}")]
    GroupSize { expected: usize, actual: usize },

    #[error("Transform matrix is not invertible")]
    SingularTransform,
}

/// Failures while preparing a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Camera resolution {width}x{height} is empty")]
    EmptyImage { width: u32, height: u32 },
}
