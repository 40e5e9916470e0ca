//! Facial Geometry Features
//!
//! Turns one frame of landmark/pose output from the external face mesh
//! estimator into the raw signals the attention engine consumes:
//! - Eye aspect ratio (EAR), averaged over both eyes
//! - Head pose Euler angles (pitch, yaw, roll) in degrees

mod ear;
mod landmarks;
mod pose;

pub use ear::{eye_aspect_ratio, DEGENERATE_EAR};
pub use landmarks::{FaceFrame, Landmark, LEFT_EYE_INDICES, MIN_LANDMARKS, RIGHT_EYE_INDICES};
pub use pose::{HeadPose, Rotation, RotationMatrix};

use thiserror::Error;

/// Errors raised while validating a frame's geometry input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Expected at least {expected} landmarks, got {actual}")]
    TooFewLandmarks { expected: usize, actual: usize },

    #[error("Rotation contains non-finite values")]
    NonFiniteRotation,

    #[error("Landmark {index} has non-finite coordinates")]
    NonFiniteLandmark { index: usize },
}

/// Raw (unsmoothed) signals extracted from one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawGeometry {
    /// Mean of left and right eye EAR
    pub ear: f64,
    pub left_ear: f64,
    pub right_ear: f64,
    pub pose: HeadPose,
}
