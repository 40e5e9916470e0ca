//! Range checking for threshold values

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Allowed ranges per settings key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// EAR threshold valid range
    pub ear_range: (f64, f64),
    /// Pitch threshold valid range (degrees)
    pub pitch_range: (f64, f64),
    /// Yaw threshold valid range (degrees)
    pub yaw_range: (f64, f64),
    /// Duration valid range (seconds)
    pub duration_range: (u64, u64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            ear_range: (0.01, 1.0),
            pitch_range: (-90.0, 90.0),
            yaw_range: (0.0, 90.0),
            duration_range: (1, 86_400),
        }
    }
}

/// Validator for individual settings values
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        key: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<f64, ValidationError> {
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                key,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(value)
        }
    }

    pub fn validate_ear(&self, key: &'static str, value: f64) -> Result<f64, ValidationError> {
        self.validate_range(key, value, self.config.ear_range)
    }

    pub fn validate_pitch(&self, key: &'static str, value: f64) -> Result<f64, ValidationError> {
        self.validate_range(key, value, self.config.pitch_range)
    }

    pub fn validate_yaw(&self, key: &'static str, value: f64) -> Result<f64, ValidationError> {
        self.validate_range(key, value, self.config.yaw_range)
    }

    /// Validate a duration in seconds
    pub fn validate_duration(&self, key: &'static str, value: u64) -> Result<u64, ValidationError> {
        let (min, max) = self.config.duration_range;
        if value < min || value > max {
            Err(ValidationError::OutOfRange {
                key,
                value: value as f64,
                min: min as f64,
                max: max as f64,
            })
        } else {
            Ok(value)
        }
    }
}
