//! Alert escalation levels

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

/// Severity of an ongoing condition, serialized as 0..=3
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AlertLevel {
    #[default]
    None,
    Gentle,
    Warning,
    Critical,
}

impl AlertLevel {
    pub fn value(self) -> u8 {
        match self {
            AlertLevel::None => 0,
            AlertLevel::Gentle => 1,
            AlertLevel::Warning => 2,
            AlertLevel::Critical => 3,
        }
    }

    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(AlertLevel::None),
            1 => Some(AlertLevel::Gentle),
            2 => Some(AlertLevel::Warning),
            3 => Some(AlertLevel::Critical),
            _ => None,
        }
    }

    /// Level for a condition that has held for `elapsed` out of `threshold`
    pub fn from_elapsed(elapsed: Duration, threshold: Duration) -> Self {
        if threshold.is_zero() {
            return AlertLevel::None;
        }
        Self::from_ratio(elapsed.as_secs_f64() / threshold.as_secs_f64())
    }

    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < 0.5 {
            AlertLevel::None
        } else if ratio < 0.75 {
            AlertLevel::Gentle
        } else if ratio < 1.0 {
            AlertLevel::Warning
        } else {
            AlertLevel::Critical
        }
    }
}

impl Serialize for AlertLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.value())
    }
}

impl<'de> Deserialize<'de> for AlertLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        AlertLevel::from_value(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid alert level {}", value)))
    }
}
