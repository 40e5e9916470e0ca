//! Monitor Settings
//!
//! User-tunable thresholds and the active monitoring mode, plus the
//! sparse update type accepted from the control surface.

mod delta;
mod error;
mod mode;
mod validator;

pub use delta::{SettingsDelta, UpdateOutcome};
pub use error::ValidationError;
pub use mode::Mode;
pub use validator::{Validator, ValidationConfig};

use serde::{Deserialize, Serialize};

/// Tunable thresholds and mode
///
/// Field names double as the keys of the settings mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Active EAR threshold below which eyes count as closed
    pub ear_threshold: f64,
    /// STUDY: pitch below this (degrees) counts as head down
    pub pitch_head_down: f64,
    /// HOMEWORK: pitch above this (degrees) counts as head up
    pub pitch_head_up: f64,
    /// |yaw| above this (degrees) counts as head turned
    pub yaw_threshold: f64,
    /// Seconds of head-down before STUDY distraction trips
    pub study_time: u64,
    /// Seconds of head-up before HOMEWORK distraction trips
    pub homework_time: u64,
    /// Seconds of closed eyes before drowsiness trips
    pub drowsy_time: u64,
    /// Seconds of head turn before distraction trips
    pub turn_time: u64,
    pub mode: Mode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ear_threshold: 0.35,
            pitch_head_down: 0.0,
            pitch_head_up: 2.0,
            yaw_threshold: 30.0,
            study_time: 120,
            homework_time: 120,
            drowsy_time: 30,
            turn_time: 30,
            mode: Mode::Study,
        }
    }
}

impl Settings {
    /// Apply a validated delta; returns the keys that changed value
    pub fn apply(&mut self, delta: &SettingsDelta) -> Vec<&'static str> {
        let mut changed = Vec::new();

        macro_rules! apply_field {
            ($field:ident) => {
                if let Some(value) = delta.$field {
                    if self.$field != value {
                        changed.push(stringify!($field));
                    }
                    self.$field = value;
                }
            };
        }

        apply_field!(ear_threshold);
        apply_field!(pitch_head_down);
        apply_field!(pitch_head_up);
        apply_field!(yaw_threshold);
        apply_field!(study_time);
        apply_field!(homework_time);
        apply_field!(drowsy_time);
        apply_field!(turn_time);
        apply_field!(mode);

        changed
    }

    /// Distraction time (seconds) for the pitch condition of the active mode
    pub fn pitch_distraction_time(&self) -> u64 {
        match self.mode {
            Mode::Study => self.study_time,
            Mode::Homework => self.homework_time,
        }
    }
}
