//! Engine configuration
//!
//! Fixed parameters of the signal pipeline. The user-tunable thresholds
//! live in [`settings::Settings`] instead.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Raw EAR samples collected before the baseline is computed
    pub calibration_frames: usize,

    /// Personal EAR threshold = baseline * ratio
    pub calibration_ratio: f64,

    /// Percentage of samples trimmed from each end before averaging
    pub calibration_trim_percent: usize,

    /// EAR threshold used before calibration and after a recalibration request
    pub default_ear_threshold: f64,

    /// Consecutive closed frames that separate a blink from closed eyes
    pub blink_frames_threshold: u32,

    /// Smoothing window length (frames)
    pub history_len: usize,

    /// Seconds without a face before pose timers are discarded
    pub face_lost_timeout_secs: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            calibration_frames: 60,
            calibration_ratio: 0.7,
            calibration_trim_percent: 10,
            default_ear_threshold: 0.35,
            blink_frames_threshold: 3,
            history_len: ring_buffer::DEFAULT_CAPACITY,
            face_lost_timeout_secs: 5.0,
        }
    }
}
