//! Exported monitor state
//!
//! A snapshot is built whole and swapped into the shared slot, so readers
//! never see a half-updated record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use settings::{Mode, Settings};
use std::time::Duration;

use crate::alert::AlertLevel;

/// Elapsed vs. allowed time for one running condition timer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerProgress {
    /// Seconds the condition has held
    pub elapsed: f64,
    /// Seconds allowed before the latch trips
    pub threshold: u64,
}

impl TimerProgress {
    pub fn new(elapsed: Duration, threshold: u64) -> Self {
        Self {
            elapsed: round_to(elapsed.as_secs_f64(), 1),
            threshold,
        }
    }
}

/// Condition timers running at the last evaluated frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveTimers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drowsy: Option<TimerProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn: Option<TimerProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_down: Option<TimerProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_up: Option<TimerProgress>,
}

/// Flat record pushed to the delivery layer after every frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
    pub ear: f64,
    pub face_detected: bool,
    pub calibrated: bool,
    pub calibration_progress: f64,
    pub is_distracted: bool,
    pub distraction_reason: String,
    pub alert_level: AlertLevel,
    pub mode: Mode,
    pub distraction_count: u64,
    pub session_duration: String,
    pub session_started_at: DateTime<Utc>,
    pub blink_count: u64,
    pub ear_threshold: f64,
    pub pitch_down_threshold: f64,
    pub pitch_up_threshold: f64,
    pub yaw_threshold: f64,
    pub timers: ActiveTimers,
}

impl MonitorSnapshot {
    /// Snapshot before any frame has been processed
    pub fn initial(settings: &Settings, session_started_at: DateTime<Utc>) -> Self {
        Self {
            pitch: 0.0,
            yaw: 0.0,
            roll: 0.0,
            ear: 0.0,
            face_detected: false,
            calibrated: false,
            calibration_progress: 0.0,
            is_distracted: false,
            distraction_reason: String::new(),
            alert_level: AlertLevel::None,
            mode: settings.mode,
            distraction_count: 0,
            session_duration: "00:00:00".to_string(),
            session_started_at,
            blink_count: 0,
            ear_threshold: round_to(settings.ear_threshold, 3),
            pitch_down_threshold: settings.pitch_head_down,
            pitch_up_threshold: settings.pitch_head_up,
            yaw_threshold: settings.yaw_threshold,
            timers: ActiveTimers::default(),
        }
    }
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.345, 1), 12.3);
        assert_eq!(round_to(0.27777, 3), 0.278);
        assert_eq!(round_to(-4.96, 1), -5.0);
    }

    #[test]
    fn test_wire_shape() {
        let mut snapshot = MonitorSnapshot::initial(&Settings::default(), Utc::now());
        snapshot.timers.turn = Some(TimerProgress::new(Duration::from_millis(12_340), 30));

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["mode"], "STUDY");
        assert_eq!(value["alert_level"], 0);
        assert_eq!(value["session_duration"], "00:00:00");
        assert_eq!(value["ear_threshold"], 0.35);
        assert_eq!(value["timers"]["turn"]["elapsed"], 12.3);
        assert!(value["timers"].get("drowsy").is_none());

        let back: MonitorSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(back.mode, snapshot.mode);
        assert_eq!(back.session_started_at, snapshot.session_started_at);
        assert_eq!(back.timers.turn.map(|t| t.threshold), Some(30));
    }
}
