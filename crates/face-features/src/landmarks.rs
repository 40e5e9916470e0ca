//! Face mesh landmarks and per-frame input

use serde::{Deserialize, Serialize};

use crate::ear::eye_aspect_ratio;
use crate::pose::{HeadPose, Rotation};
use crate::{GeometryError, RawGeometry};

/// Minimum landmark count of the face mesh topology (478 with iris refinement)
pub const MIN_LANDMARKS: usize = 468;

/// Left eye contour: outer corner, upper lid x2, inner corner, lower lid x2
pub const LEFT_EYE_INDICES: [usize; 6] = [33, 160, 158, 133, 153, 144];

/// Right eye contour, same ordering as [`LEFT_EYE_INDICES`]
pub const RIGHT_EYE_INDICES: [usize; 6] = [362, 385, 387, 263, 373, 380];

/// Normalized 3-D landmark (x, y in image fractions, z relative depth)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Landmark {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Landmark> for [f64; 3] {
    fn from(l: Landmark) -> Self {
        [l.x, l.y, l.z]
    }
}

/// Landmark/pose output for a single frame in which a face was found
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "FaceFrameWire")]
pub struct FaceFrame {
    landmarks: Vec<Landmark>,
    rotation: Rotation,
}

#[derive(Deserialize)]
struct FaceFrameWire {
    landmarks: Vec<Landmark>,
    rotation: Rotation,
}

impl TryFrom<FaceFrameWire> for FaceFrame {
    type Error = GeometryError;

    fn try_from(wire: FaceFrameWire) -> Result<Self, Self::Error> {
        Self::new(wire.landmarks, wire.rotation)
    }
}

impl FaceFrame {
    /// Validate and wrap one frame of estimator output
    pub fn new(landmarks: Vec<Landmark>, rotation: Rotation) -> Result<Self, GeometryError> {
        if landmarks.len() < MIN_LANDMARKS {
            return Err(GeometryError::TooFewLandmarks {
                expected: MIN_LANDMARKS,
                actual: landmarks.len(),
            });
        }
        if let Some(index) = landmarks.iter().position(|l| !l.is_finite()) {
            return Err(GeometryError::NonFiniteLandmark { index });
        }
        if !rotation.is_finite() {
            return Err(GeometryError::NonFiniteRotation);
        }
        Ok(Self { landmarks, rotation })
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    /// EAR of the eye described by six landmark indices (x, y only)
    pub fn eye_aspect_ratio(&self, indices: &[usize; 6]) -> f64 {
        let points = indices.map(|i| {
            let l = self.landmarks[i];
            (l.x, l.y)
        });
        eye_aspect_ratio(&points)
    }

    /// Extract EAR and head pose for this frame
    pub fn extract(&self) -> RawGeometry {
        let left_ear = self.eye_aspect_ratio(&LEFT_EYE_INDICES);
        let right_ear = self.eye_aspect_ratio(&RIGHT_EYE_INDICES);

        RawGeometry {
            ear: (left_ear + right_ear) / 2.0,
            left_ear,
            right_ear,
            pose: HeadPose::from_matrix(&self.rotation.to_matrix()),
        }
    }
}
