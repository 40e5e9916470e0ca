//! Signal conditioning: calibration and temporal smoothing

use face_features::RawGeometry;
use ring_buffer::RingBuffer;

use crate::calibration::Calibration;
use crate::config::MonitorConfig;

/// Denoised per-frame signals
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SmoothedSignals {
    /// Median of the pitch window (degrees)
    pub pitch: f64,
    /// Median of the yaw window (degrees)
    pub yaw: f64,
    /// Raw roll (degrees), not used for decisions
    pub roll: f64,
    /// Mean of the EAR window
    pub ear: f64,
}

/// Owns EAR calibration and the pitch/yaw/EAR history windows
#[derive(Debug, Clone)]
pub struct SignalConditioner {
    calibration: Calibration,
    pitch_history: RingBuffer<f64>,
    yaw_history: RingBuffer<f64>,
    ear_history: RingBuffer<f64>,
}

impl SignalConditioner {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            calibration: Calibration::new(config),
            pitch_history: RingBuffer::new(config.history_len),
            yaw_history: RingBuffer::new(config.history_len),
            ear_history: RingBuffer::new(config.history_len),
        }
    }

    /// Feed a raw EAR sample to calibration; returns the new threshold on completion
    pub fn calibrate(&mut self, raw_ear: f64) -> Option<f64> {
        self.calibration.observe(raw_ear)
    }

    /// Push raw signals into their windows and return the smoothed values
    ///
    /// Pitch and yaw use the median to reject single-frame spikes; EAR uses
    /// the mean so a blink only dents it.
    pub fn smooth(&mut self, raw: &RawGeometry) -> SmoothedSignals {
        self.pitch_history.push(raw.pose.pitch);
        self.yaw_history.push(raw.pose.yaw);
        self.ear_history.push(raw.ear);

        SmoothedSignals {
            pitch: self.pitch_history.median().unwrap_or(raw.pose.pitch),
            yaw: self.yaw_history.median().unwrap_or(raw.pose.yaw),
            roll: raw.pose.roll,
            ear: self.ear_history.mean().unwrap_or(raw.ear),
        }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn reset_calibration(&mut self) {
        self.calibration.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_features::HeadPose;

    fn raw(pitch: f64, yaw: f64, ear: f64) -> RawGeometry {
        RawGeometry {
            ear,
            left_ear: ear,
            right_ear: ear,
            pose: HeadPose { pitch, yaw, roll: 1.5 },
        }
    }

    #[test]
    fn test_first_sample_passes_through() {
        let mut conditioner = SignalConditioner::new(&MonitorConfig::default());
        let s = conditioner.smooth(&raw(-4.0, 12.0, 0.3));
        assert_eq!(s.pitch, -4.0);
        assert_eq!(s.yaw, 12.0);
        assert_eq!(s.ear, 0.3);
        assert_eq!(s.roll, 1.5);
    }

    #[test]
    fn test_yaw_spike_is_rejected() {
        let mut conditioner = SignalConditioner::new(&MonitorConfig::default());
        for _ in 0..9 {
            conditioner.smooth(&raw(0.0, 5.0, 0.3));
        }
        let s = conditioner.smooth(&raw(0.0, 80.0, 0.3));
        assert_eq!(s.yaw, 5.0);
    }

    #[test]
    fn test_blink_only_dents_ear() {
        let mut conditioner = SignalConditioner::new(&MonitorConfig::default());
        for _ in 0..9 {
            conditioner.smooth(&raw(0.0, 0.0, 0.3));
        }
        let s = conditioner.smooth(&raw(0.0, 0.0, 0.0));
        assert!((s.ear - 0.27).abs() < 1e-12);
    }

    #[test]
    fn test_window_evicts_old_samples() {
        let mut conditioner = SignalConditioner::new(&MonitorConfig::default());
        for _ in 0..10 {
            conditioner.smooth(&raw(-10.0, 0.0, 0.3));
        }
        let mut s = SmoothedSignals::default();
        for _ in 0..10 {
            s = conditioner.smooth(&raw(10.0, 0.0, 0.3));
        }
        assert_eq!(s.pitch, 10.0);
    }

    #[test]
    fn test_calibration_passthrough() {
        let config = MonitorConfig {
            calibration_frames: 2,
            ..Default::default()
        };
        let mut conditioner = SignalConditioner::new(&config);
        assert_eq!(conditioner.calibrate(0.4), None);
        let threshold = conditioner.calibrate(0.4).unwrap();
        assert!((threshold - 0.28).abs() < 1e-12);
        assert!(conditioner.calibration().is_calibrated());

        conditioner.reset_calibration();
        assert!(!conditioner.calibration().is_calibrated());
    }
}
