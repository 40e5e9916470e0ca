//! Sparse settings updates
//!
//! The control surface sends a loosely typed mapping (slider values often
//! arrive as strings). Each known key is coerced and validated on its own,
//! so one malformed value never blocks or corrupts the others.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::mode::Mode;
use crate::validator::Validator;

/// Validated partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettingsDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ear_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_head_down: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_head_up: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaw_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homework_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drowsy_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
}

/// Result of parsing a sparse settings mapping
#[derive(Debug, Clone, Default)]
pub struct UpdateOutcome {
    /// Keys that passed validation
    pub delta: SettingsDelta,
    /// Keys that failed, one error each
    pub rejected: Vec<ValidationError>,
    /// Unrecognized keys
    pub ignored: Vec<String>,
}

impl UpdateOutcome {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

impl SettingsDelta {
    /// Parse a sparse mapping with the default validation ranges
    pub fn parse(map: &Map<String, Value>) -> UpdateOutcome {
        Self::parse_with(map, &Validator::default())
    }

    /// Parse a sparse mapping, validating each key independently
    pub fn parse_with(map: &Map<String, Value>, validator: &Validator) -> UpdateOutcome {
        let mut outcome = UpdateOutcome::default();
        let delta = &mut outcome.delta;

        for (key, value) in map {
            let result = match key.as_str() {
                "ear_threshold" => coerce_f64("ear_threshold", value)
                    .and_then(|v| validator.validate_ear("ear_threshold", v))
                    .map(|v| delta.ear_threshold = Some(v)),
                "pitch_head_down" => coerce_f64("pitch_head_down", value)
                    .and_then(|v| validator.validate_pitch("pitch_head_down", v))
                    .map(|v| delta.pitch_head_down = Some(v)),
                "pitch_head_up" => coerce_f64("pitch_head_up", value)
                    .and_then(|v| validator.validate_pitch("pitch_head_up", v))
                    .map(|v| delta.pitch_head_up = Some(v)),
                "yaw_threshold" => coerce_f64("yaw_threshold", value)
                    .and_then(|v| validator.validate_yaw("yaw_threshold", v))
                    .map(|v| delta.yaw_threshold = Some(v)),
                "study_time" => coerce_seconds("study_time", value)
                    .and_then(|v| validator.validate_duration("study_time", v))
                    .map(|v| delta.study_time = Some(v)),
                "homework_time" => coerce_seconds("homework_time", value)
                    .and_then(|v| validator.validate_duration("homework_time", v))
                    .map(|v| delta.homework_time = Some(v)),
                "drowsy_time" => coerce_seconds("drowsy_time", value)
                    .and_then(|v| validator.validate_duration("drowsy_time", v))
                    .map(|v| delta.drowsy_time = Some(v)),
                "turn_time" => coerce_seconds("turn_time", value)
                    .and_then(|v| validator.validate_duration("turn_time", v))
                    .map(|v| delta.turn_time = Some(v)),
                "mode" => match value {
                    Value::String(s) => {
                        delta.mode = Some(Mode::parse_lenient(s));
                        Ok(())
                    }
                    _ => Err(ValidationError::WrongType {
                        key: "mode",
                        expected: "a mode name",
                    }),
                },
                other => {
                    debug!("Ignoring unknown settings key {:?}", other);
                    outcome.ignored.push(other.to_string());
                    Ok(())
                }
            };

            if let Err(e) = result {
                warn!("Rejected settings value: {}", e);
                outcome.rejected.push(e);
            }
        }

        outcome
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Keys carried by this delta
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.ear_threshold.is_some() {
            keys.push("ear_threshold");
        }
        if self.pitch_head_down.is_some() {
            keys.push("pitch_head_down");
        }
        if self.pitch_head_up.is_some() {
            keys.push("pitch_head_up");
        }
        if self.yaw_threshold.is_some() {
            keys.push("yaw_threshold");
        }
        if self.study_time.is_some() {
            keys.push("study_time");
        }
        if self.homework_time.is_some() {
            keys.push("homework_time");
        }
        if self.drowsy_time.is_some() {
            keys.push("drowsy_time");
        }
        if self.turn_time.is_some() {
            keys.push("turn_time");
        }
        if self.mode.is_some() {
            keys.push("mode");
        }
        keys
    }
}

/// Read a finite number from a JSON number or numeric string
fn coerce_f64(key: &'static str, value: &Value) -> Result<f64, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => {
            return Err(ValidationError::WrongType {
                key,
                expected: "a number",
            })
        }
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(ValidationError::NotNumeric {
            key,
            value: value.to_string(),
        }),
    }
}

/// Read a whole, non-negative number of seconds
fn coerce_seconds(key: &'static str, value: &Value) -> Result<u64, ValidationError> {
    if let Some(v) = value.as_u64() {
        return Ok(v);
    }

    let v = coerce_f64(key, value)?;
    if v < 0.0 {
        return Err(ValidationError::OutOfRange {
            key,
            value: v,
            min: 0.0,
            max: u64::MAX as f64,
        });
    }
    if v.fract() != 0.0 {
        return Err(ValidationError::NotInteger {
            key,
            value: value.to_string(),
        });
    }
    Ok(v as u64)
}
