//! Head pose: rotation representations and Euler angle extraction

use serde::{Deserialize, Serialize};

/// Row-major 3x3 rotation matrix
pub type RotationMatrix = [[f64; 3]; 3];

/// Below this `sy` the matrix is treated as gimbal-locked
const SINGULARITY_EPSILON: f64 = 1e-6;

/// Rotation vectors shorter than this are treated as the identity
const ZERO_ANGLE_EPSILON: f64 = 1e-12;

/// Rotation output of the external head-pose solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    /// Rotation matrix already in the head-pose frame
    Matrix(RotationMatrix),
    /// Axis-angle vector (radians), converted with the Rodrigues formula
    Vector([f64; 3]),
    /// 4x4 pose transform from the face geometry solver (camera frame)
    #[serde(rename = "transform")]
    PoseTransform([[f64; 4]; 4]),
}

impl Rotation {
    pub fn is_finite(&self) -> bool {
        match self {
            Rotation::Matrix(m) => m.iter().flatten().all(|v| v.is_finite()),
            Rotation::Vector(v) => v.iter().all(|v| v.is_finite()),
            Rotation::PoseTransform(t) => t.iter().flatten().all(|v| v.is_finite()),
        }
    }

    /// Resolve to a rotation matrix in the head-pose frame
    pub fn to_matrix(&self) -> RotationMatrix {
        match self {
            Rotation::Matrix(m) => *m,
            Rotation::Vector(v) => rodrigues(*v),
            Rotation::PoseTransform(t) => {
                // The solver's y and z axes point opposite to the pose frame
                let mut m = [[0.0; 3]; 3];
                for (row, out) in m.iter_mut().enumerate() {
                    let sign = if row == 0 { 1.0 } else { -1.0 };
                    for (col, value) in out.iter_mut().enumerate() {
                        *value = sign * t[row][col];
                    }
                }
                m
            }
        }
    }
}

/// Axis-angle vector to rotation matrix
fn rodrigues(r: [f64; 3]) -> RotationMatrix {
    let theta = (r[0] * r[0] + r[1] * r[1] + r[2] * r[2]).sqrt();
    if theta < ZERO_ANGLE_EPSILON {
        return [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    }

    let (kx, ky, kz) = (r[0] / theta, r[1] / theta, r[2] / theta);
    let (s, c) = theta.sin_cos();
    let t = 1.0 - c;

    [
        [c + kx * kx * t, kx * ky * t - kz * s, kx * kz * t + ky * s],
        [ky * kx * t + kz * s, c + ky * ky * t, ky * kz * t - kx * s],
        [kz * kx * t - ky * s, kz * ky * t + kx * s, c + kz * kz * t],
    ]
}

/// Head pose Euler angles in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadPose {
    /// Up-down tilt, negative when the head is lowered
    pub pitch: f64,
    /// Left-right rotation
    pub yaw: f64,
    /// Side tilt
    pub roll: f64,
}

impl HeadPose {
    /// Extract Euler angles from a rotation matrix
    pub fn from_matrix(r: &RotationMatrix) -> Self {
        let sy = (r[0][0] * r[0][0] + r[1][0] * r[1][0]).sqrt();
        let pitch = (-r[2][0]).atan2(sy);

        let (yaw, roll) = if sy < SINGULARITY_EPSILON {
            ((-r[1][2]).atan2(r[1][1]), 0.0)
        } else {
            (r[1][0].atan2(r[0][0]), r[2][1].atan2(r[2][2]))
        };

        Self {
            pitch: pitch.to_degrees(),
            yaw: yaw.to_degrees(),
            roll: roll.to_degrees(),
        }
    }
}
