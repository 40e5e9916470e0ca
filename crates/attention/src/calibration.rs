//! Personal EAR calibration
//!
//! Eye geometry varies a lot between people, so the closed-eye threshold is
//! derived from the user's own open-eye EAR during the first frames.

use crate::config::MonitorConfig;

#[derive(Debug, Clone)]
pub struct Calibration {
    samples: Vec<f64>,
    target: usize,
    trim_percent: usize,
    ratio: f64,
    baseline: Option<f64>,
}

impl Calibration {
    pub fn new(config: &MonitorConfig) -> Self {
        let target = config.calibration_frames.max(1);
        Self {
            samples: Vec::with_capacity(target),
            target,
            trim_percent: config.calibration_trim_percent.min(49),
            ratio: config.calibration_ratio,
            baseline: None,
        }
    }

    /// Record one raw EAR sample
    ///
    /// Returns the personal EAR threshold on the sample that completes
    /// calibration. Samples arriving after that are ignored.
    pub fn observe(&mut self, ear: f64) -> Option<f64> {
        if self.is_calibrated() {
            return None;
        }

        self.samples.push(ear);
        if self.samples.len() < self.target {
            return None;
        }

        let baseline = trimmed_mean(&self.samples, self.trim_percent);
        self.baseline = Some(baseline);
        Some(baseline * self.ratio)
    }

    pub fn is_calibrated(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    /// Collected samples as a percentage of the target, frozen at 100
    pub fn progress(&self) -> f64 {
        if self.is_calibrated() {
            return 100.0;
        }
        self.samples.len() as f64 / self.target as f64 * 100.0
    }

    /// Discard samples and baseline
    pub fn reset(&mut self) {
        self.samples.clear();
        self.baseline = None;
    }
}

/// Mean after dropping `percent`% of the sorted samples from each end
fn trimmed_mean(samples: &[f64], percent: usize) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let trim = sorted.len() * percent / 100;
    let kept = if trim > 0 && sorted.len() > 2 * trim {
        &sorted[trim..sorted.len() - trim]
    } else {
        &sorted[..]
    };

    kept.iter().sum::<f64>() / kept.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibration() -> Calibration {
        Calibration::new(&MonitorConfig::default())
    }

    #[test]
    fn test_constant_samples() {
        let mut cal = calibration();
        let mut threshold = None;
        for _ in 0..60 {
            threshold = cal.observe(0.4);
        }
        assert!(cal.is_calibrated());
        assert!((cal.baseline().unwrap() - 0.4).abs() < 1e-12);
        assert!((threshold.unwrap() - 0.28).abs() < 1e-12);
    }

    #[test]
    fn test_outliers_are_trimmed() {
        // 0.01..=0.60: trimming 6 from each end keeps 0.07..=0.54
        let mut cal = calibration();
        let mut threshold = None;
        for i in 1..=60 {
            threshold = cal.observe(i as f64 * 0.01);
        }
        assert!((cal.baseline().unwrap() - 0.305).abs() < 1e-9);
        assert!((threshold.unwrap() - 0.2135).abs() < 1e-9);
    }

    #[test]
    fn test_progress_is_monotone_then_frozen() {
        let mut cal = calibration();
        let mut last = cal.progress();
        assert_eq!(last, 0.0);
        for _ in 0..60 {
            cal.observe(0.3);
            assert!(cal.progress() >= last);
            last = cal.progress();
        }
        assert_eq!(cal.progress(), 100.0);

        assert_eq!(cal.observe(0.9), None);
        assert_eq!(cal.progress(), 100.0);
        assert!((cal.baseline().unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_reset() {
        let mut cal = calibration();
        for _ in 0..60 {
            cal.observe(0.3);
        }
        cal.reset();
        assert!(!cal.is_calibrated());
        assert_eq!(cal.baseline(), None);
        assert_eq!(cal.progress(), 0.0);
    }

    #[test]
    fn test_small_target_skips_trimming() {
        let config = MonitorConfig {
            calibration_frames: 5,
            ..Default::default()
        };
        let mut cal = Calibration::new(&config);
        for v in [0.1, 0.2, 0.3, 0.4] {
            assert_eq!(cal.observe(v), None);
        }
        let threshold = cal.observe(0.5).unwrap();
        assert!((cal.baseline().unwrap() - 0.3).abs() < 1e-12);
        assert!((threshold - 0.21).abs() < 1e-12);
    }
}
