//! Frame orchestration
//!
//! [`FocusMonitor`] is the per-session object: it sequences geometry
//! extraction, conditioning and the state machine for each frame, applies
//! control requests, and publishes a complete [`MonitorSnapshot`] after
//! every change. Callers must serialise access (one frame at a time, and
//! control requests under the same lock); snapshot readers only need a
//! receiver from [`FocusMonitor::subscribe`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use face_features::FaceFrame;
use metrics::counter;
use serde_json::{Map, Value};
use settings::{Mode, Settings, SettingsDelta, UpdateOutcome};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::conditioner::{SignalConditioner, SmoothedSignals};
use crate::config::MonitorConfig;
use crate::session::SessionStats;
use crate::snapshot::{round_to, MonitorSnapshot};
use crate::state::{DistractionMachine, Evaluation};

/// Estimator output for one video frame
#[derive(Debug, Clone)]
pub enum FrameObservation {
    Face(FaceFrame),
    NoFace,
}

pub struct FocusMonitor {
    config: MonitorConfig,
    settings: Settings,
    conditioner: SignalConditioner,
    machine: DistractionMachine,
    session: SessionStats,
    face_lost_since: Option<Instant>,
    snapshot_tx: watch::Sender<Arc<MonitorSnapshot>>,
}

impl FocusMonitor {
    pub fn new(config: MonitorConfig, settings: Settings) -> Self {
        Self::new_at(config, settings, Instant::now())
    }

    /// Create a monitor whose session starts at `now`
    pub fn new_at(config: MonitorConfig, settings: Settings, now: Instant) -> Self {
        info!("Creating focus monitor ({} mode)", settings.mode);
        let session = SessionStats::new(now);
        let initial = MonitorSnapshot::initial(&settings, session.started_at);
        let (snapshot_tx, _) = watch::channel(Arc::new(initial));

        Self {
            conditioner: SignalConditioner::new(&config),
            machine: DistractionMachine::new(config.blink_frames_threshold),
            config,
            settings,
            session,
            face_lost_since: None,
            snapshot_tx,
        }
    }

    /// Process one frame observed now; returns whether a face was present
    pub fn process_frame(&mut self, observation: FrameObservation) -> bool {
        self.process_frame_at(observation, Instant::now())
    }

    /// Process one frame observed at `now`
    pub fn process_frame_at(&mut self, observation: FrameObservation, now: Instant) -> bool {
        match observation {
            FrameObservation::Face(frame) => {
                self.process_face(&frame, now);
                true
            }
            FrameObservation::NoFace => {
                self.process_face_lost(now);
                false
            }
        }
    }

    fn process_face(&mut self, frame: &FaceFrame, now: Instant) {
        counter!("focus_frames_total", "face" => "present").increment(1);
        self.face_lost_since = None;

        let geometry = frame.extract();

        if let Some(threshold) = self.conditioner.calibrate(geometry.ear) {
            info!(
                baseline = self.conditioner.calibration().baseline().unwrap_or_default(),
                threshold,
                "EAR calibration complete"
            );
            counter!("focus_calibrations_total").increment(1);
            self.settings.ear_threshold = threshold;
        }

        let signals = self.conditioner.smooth(&geometry);

        if let Evaluation::Tripped(reason) = self.machine.evaluate(&signals, &self.settings, now) {
            info!(reason = reason.kind(), "Distraction detected: {}", reason);
            counter!("focus_distractions_total", "reason" => reason.kind()).increment(1);
        }
        if self.machine.blink_completed() {
            counter!("focus_blinks_total").increment(1);
        }

        debug!(
            pitch = signals.pitch,
            yaw = signals.yaw,
            ear = signals.ear,
            alert = self.machine.alert_level().value(),
            "Frame processed"
        );

        let snapshot = self.build_snapshot(&signals, true, now);
        self.publish(snapshot);
    }

    fn process_face_lost(&mut self, now: Instant) {
        counter!("focus_frames_total", "face" => "absent").increment(1);

        match self.face_lost_since {
            None => self.face_lost_since = Some(now),
            Some(since) if now.saturating_duration_since(since) > self.face_lost_timeout() => {
                let timers = self.machine.timers();
                if timers.head_turn.is_some() || timers.pitch.is_some() {
                    debug!("Face lost beyond timeout, clearing pose timers");
                }
                self.machine.clear_pose_timers();
            }
            Some(_) => {}
        }

        let mut snapshot = MonitorSnapshot::clone(&self.snapshot());
        snapshot.face_detected = false;
        self.publish(snapshot);
    }

    fn face_lost_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.config.face_lost_timeout_secs).unwrap_or(Duration::ZERO)
    }

    fn build_snapshot(
        &self,
        signals: &SmoothedSignals,
        face_detected: bool,
        now: Instant,
    ) -> MonitorSnapshot {
        let calibration = self.conditioner.calibration();

        MonitorSnapshot {
            pitch: round_to(signals.pitch, 1),
            yaw: round_to(signals.yaw, 1),
            roll: round_to(signals.roll, 1),
            ear: round_to(signals.ear, 3),
            face_detected,
            calibrated: calibration.is_calibrated(),
            calibration_progress: round_to(calibration.progress(), 1),
            is_distracted: self.machine.is_distracted(),
            distraction_reason: self
                .machine
                .reason()
                .map(|r| r.to_string())
                .unwrap_or_default(),
            alert_level: self.machine.alert_level(),
            mode: self.settings.mode,
            distraction_count: self.session.distraction_count,
            session_duration: self.session.duration_string(now),
            session_started_at: self.session.started_at,
            blink_count: self.machine.blink_count(),
            ear_threshold: round_to(self.settings.ear_threshold, 3),
            pitch_down_threshold: self.settings.pitch_head_down,
            pitch_up_threshold: self.settings.pitch_head_up,
            yaw_threshold: self.settings.yaw_threshold,
            timers: *self.machine.active_timers(),
        }
    }

    fn publish(&self, snapshot: MonitorSnapshot) {
        self.snapshot_tx.send_replace(Arc::new(snapshot));
    }

    /// Rebuild the snapshot after a control request, keeping the last signals
    fn republish(&self) {
        let previous = self.snapshot();
        let signals = SmoothedSignals {
            pitch: previous.pitch,
            yaw: previous.yaw,
            roll: previous.roll,
            ear: previous.ear,
        };
        let snapshot = self.build_snapshot(&signals, previous.face_detected, Instant::now());
        self.publish(snapshot);
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<MonitorSnapshot> {
        self.snapshot_tx.borrow().clone()
    }

    /// Receiver notified on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<MonitorSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply a sparse settings mapping, key by key
    pub fn update_settings(&mut self, map: &Map<String, Value>) -> UpdateOutcome {
        let outcome = SettingsDelta::parse(map);
        self.apply_delta(&outcome.delta);
        outcome
    }

    /// Apply a validated delta; returns the keys whose value changed
    pub fn apply_delta(&mut self, delta: &SettingsDelta) -> Vec<&'static str> {
        let changed = self.settings.apply(delta);
        if let Some(mode) = delta.mode {
            info!("Mode set to {} ({})", mode, mode.label());
            self.machine.clear_pose_timers();
        }
        if !changed.is_empty() {
            info!(?changed, "Settings updated");
        }
        self.republish();
        changed
    }

    /// Switch mode; in-flight head-turn and posture timers restart
    pub fn set_mode(&mut self, mode: Mode) {
        self.apply_delta(&SettingsDelta {
            mode: Some(mode),
            ..Default::default()
        });
    }

    /// Clear the distraction latch and count the finished episode
    pub fn reset_distraction(&mut self) {
        self.machine.reset_distraction();
        self.session.distraction_count += 1;
        info!(
            count = self.session.distraction_count,
            "Distraction acknowledged"
        );
        self.republish();
    }

    /// Start a new session: distraction count, clock and blinks reset
    pub fn reset_session(&mut self) {
        self.reset_session_at(Instant::now());
    }

    pub fn reset_session_at(&mut self, now: Instant) {
        self.session.reset(now);
        self.machine.reset_blinks();
        info!("Session reset");
        self.republish();
    }

    /// Discard the personal EAR baseline and start collecting again
    pub fn recalibrate(&mut self) {
        self.conditioner.reset_calibration();
        self.settings.ear_threshold = self.config.default_ear_threshold;
        info!("EAR recalibration requested");
        self.republish();
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn machine(&self) -> &DistractionMachine {
        &self.machine
    }

    pub fn conditioner(&self) -> &SignalConditioner {
        &self.conditioner
    }

    pub fn session(&self) -> &SessionStats {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertLevel;
    use face_features::{Landmark, Rotation, LEFT_EYE_INDICES, MIN_LANDMARKS, RIGHT_EYE_INDICES};
    use serde_json::json;

    const OPEN: f64 = 0.4;

    /// Face with both eyes at the given EAR and head rotated by pitch/yaw (degrees)
    fn face(pitch: f64, yaw: f64, ear: f64) -> FrameObservation {
        let mut landmarks = vec![Landmark::default(); MIN_LANDMARKS];
        let span = ear * 0.1;
        for (indices, x0) in [(LEFT_EYE_INDICES, 0.3), (RIGHT_EYE_INDICES, 0.6)] {
            let offsets = [
                (0.0, 0.0),
                (0.03, -span / 2.0),
                (0.07, -span / 2.0),
                (0.1, 0.0),
                (0.07, span / 2.0),
                (0.03, span / 2.0),
            ];
            for (idx, (dx, dy)) in indices.iter().zip(offsets) {
                landmarks[*idx] = Landmark::new(x0 + dx, 0.4 + dy, 0.0);
            }
        }

        // Rz(yaw) * Ry(pitch)
        let (sz, cz) = yaw.to_radians().sin_cos();
        let (sy, cy) = pitch.to_radians().sin_cos();
        let matrix = [
            [cz * cy, -sz, cz * sy],
            [sz * cy, cz, sz * sy],
            [-sy, 0.0, cy],
        ];

        FrameObservation::Face(FaceFrame::new(landmarks, Rotation::Matrix(matrix)).unwrap())
    }

    fn monitor(start: Instant) -> FocusMonitor {
        FocusMonitor::new_at(MonitorConfig::default(), Settings::default(), start)
    }

    fn secs(start: Instant, t: u64) -> Instant {
        start + Duration::from_secs(t)
    }

    /// One frame per second from `from` through `to` inclusive
    fn feed(monitor: &mut FocusMonitor, start: Instant, from: u64, to: u64, pitch: f64, yaw: f64) {
        for t in from..=to {
            monitor.process_frame_at(face(pitch, yaw, OPEN), secs(start, t));
        }
    }

    #[test]
    fn test_head_turn_scenario() {
        let start = Instant::now();
        let mut monitor = monitor(start);
        feed(&mut monitor, start, 0, 30, 5.0, 35.0);
        assert!(!monitor.snapshot().is_distracted);
        assert_eq!(monitor.snapshot().alert_level, AlertLevel::Critical);

        feed(&mut monitor, start, 31, 31, 5.0, 35.0);
        let snapshot = monitor.snapshot();
        assert!(snapshot.is_distracted);
        assert_eq!(snapshot.alert_level, AlertLevel::Critical);
        assert!(snapshot.distraction_reason.contains("左"));
        assert_eq!(snapshot.yaw, 35.0);
        assert!(snapshot.face_detected);
        assert_eq!(snapshot.session_duration, "00:00:31");
    }

    #[test]
    fn test_study_head_down_scenario() {
        let start = Instant::now();
        let mut monitor = monitor(start);
        feed(&mut monitor, start, 0, 121, -5.0, 0.0);
        let snapshot = monitor.snapshot();
        assert!(snapshot.is_distracted);
        assert!(snapshot.distraction_reason.starts_with("长时间低头"));
    }

    #[test]
    fn test_homework_never_trips_on_head_down() {
        let start = Instant::now();
        let mut monitor = monitor(start);
        monitor.set_mode(Mode::Homework);
        feed(&mut monitor, start, 0, 400, -5.0, 0.0);
        assert!(!monitor.snapshot().is_distracted);
        assert_eq!(monitor.machine().timers().pitch, None);
    }

    #[test]
    fn test_calibration_through_frames() {
        let start = Instant::now();
        let mut monitor = monitor(start);
        feed(&mut monitor, start, 0, 29, 5.0, 0.0);
        assert_eq!(monitor.snapshot().calibration_progress, 50.0);
        assert!(!monitor.snapshot().calibrated);

        feed(&mut monitor, start, 30, 59, 5.0, 0.0);
        let snapshot = monitor.snapshot();
        assert!(snapshot.calibrated);
        assert_eq!(snapshot.calibration_progress, 100.0);
        assert_eq!(snapshot.ear_threshold, 0.28);
        assert!((monitor.settings().ear_threshold - 0.28).abs() < 1e-9);

        monitor.recalibrate();
        let snapshot = monitor.snapshot();
        assert!(!snapshot.calibrated);
        assert_eq!(snapshot.calibration_progress, 0.0);
        assert_eq!(snapshot.ear_threshold, 0.35);
    }

    #[test]
    fn test_face_lost_clears_pose_timers() {
        let start = Instant::now();
        let mut monitor = monitor(start);
        feed(&mut monitor, start, 0, 10, -5.0, 35.0);
        assert!(monitor.machine().timers().head_turn.is_some());
        assert!(monitor.machine().timers().pitch.is_some());

        assert!(!monitor.process_frame_at(FrameObservation::NoFace, secs(start, 11)));
        monitor.process_frame_at(FrameObservation::NoFace, secs(start, 14));
        assert!(monitor.machine().timers().head_turn.is_some());

        monitor.process_frame_at(FrameObservation::NoFace, secs(start, 17));
        assert_eq!(monitor.machine().timers().head_turn, None);
        assert_eq!(monitor.machine().timers().pitch, None);

        // Returning face starts timing from scratch
        feed(&mut monitor, start, 18, 18, -5.0, 35.0);
        assert_eq!(monitor.machine().timers().head_turn, Some(secs(start, 18)));
    }

    #[test]
    fn test_face_lost_keeps_latch_and_last_values() {
        let start = Instant::now();
        let mut monitor = monitor(start);
        feed(&mut monitor, start, 0, 31, 5.0, 35.0);
        let before = monitor.snapshot();
        assert!(before.is_distracted);

        monitor.process_frame_at(FrameObservation::NoFace, secs(start, 32));
        monitor.process_frame_at(FrameObservation::NoFace, secs(start, 40));

        let after = monitor.snapshot();
        assert!(!after.face_detected);
        assert!(after.is_distracted);
        assert!(monitor.machine().is_distracted());
        assert_eq!(after.yaw, before.yaw);
        assert_eq!(after.distraction_reason, before.distraction_reason);
        assert_eq!(after.session_duration, before.session_duration);
    }

    #[test]
    fn test_reset_distraction_does_not_relatch_immediately() {
        let start = Instant::now();
        let mut monitor = monitor(start);
        feed(&mut monitor, start, 0, 31, 5.0, 35.0);
        assert!(monitor.snapshot().is_distracted);

        monitor.reset_distraction();
        let snapshot = monitor.snapshot();
        assert!(!snapshot.is_distracted);
        assert_eq!(snapshot.distraction_reason, "");
        assert_eq!(snapshot.alert_level, AlertLevel::None);
        assert_eq!(snapshot.distraction_count, 1);

        feed(&mut monitor, start, 32, 32, 5.0, 35.0);
        assert!(!monitor.snapshot().is_distracted);
        assert_eq!(monitor.machine().eye_closed_frames(), 0);

        feed(&mut monitor, start, 33, 63, 5.0, 35.0);
        assert!(monitor.snapshot().is_distracted);
    }

    #[test]
    fn test_mode_switch_restarts_pitch_timer() {
        let start = Instant::now();
        let mut monitor = monitor(start);
        feed(&mut monitor, start, 0, 60, -5.0, 0.0);
        assert_eq!(monitor.machine().timers().pitch, Some(start));

        monitor.set_mode(Mode::Homework);
        assert_eq!(monitor.machine().timers().pitch, None);
        assert_eq!(monitor.snapshot().mode, Mode::Homework);

        feed(&mut monitor, start, 61, 61, -5.0, 0.0);
        assert_eq!(monitor.machine().timers().pitch, None);

        feed(&mut monitor, start, 62, 80, 10.0, 0.0);
        let started = monitor.machine().timers().pitch.unwrap();
        assert!(started > secs(start, 61));
        assert!(monitor.machine().active_timers().head_up.is_some());
    }

    #[test]
    fn test_settings_update_is_per_key() {
        let start = Instant::now();
        let mut monitor = monitor(start);
        let map = json!({"yaw_threshold": "wide", "turn_time": "45", "mode": "HOMEWORK"});
        let outcome = monitor.update_settings(map.as_object().unwrap());

        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].key(), "yaw_threshold");
        assert_eq!(monitor.settings().yaw_threshold, 30.0);
        assert_eq!(monitor.settings().turn_time, 45);
        assert_eq!(monitor.settings().mode, Mode::Homework);
        assert_eq!(monitor.snapshot().mode, Mode::Homework);
    }

    #[test]
    fn test_settings_mode_change_clears_pose_timers_only() {
        let start = Instant::now();
        let mut monitor = monitor(start);
        for t in 0..=10 {
            monitor.process_frame_at(face(-5.0, 35.0, 0.0), secs(start, t));
        }
        assert!(monitor.machine().timers().drowsy.is_some());

        let map = json!({"mode": "STUDY"});
        monitor.update_settings(map.as_object().unwrap());
        assert!(monitor.machine().timers().drowsy.is_some());
        assert_eq!(monitor.machine().timers().head_turn, None);
        assert_eq!(monitor.machine().timers().pitch, None);
    }

    #[test]
    fn test_blinks_and_session_reset() {
        let start = Instant::now();
        let config = MonitorConfig {
            history_len: 1,
            ..Default::default()
        };
        let mut monitor = FocusMonitor::new_at(config, Settings::default(), start);
        let mut t = 0;
        for _ in 0..3 {
            monitor.process_frame_at(face(5.0, 0.0, OPEN), secs(start, t));
            monitor.process_frame_at(face(5.0, 0.0, 0.05), secs(start, t + 1));
            monitor.process_frame_at(face(5.0, 0.0, OPEN), secs(start, t + 2));
            t += 3;
        }
        assert_eq!(monitor.snapshot().blink_count, 3);

        monitor.reset_distraction();
        monitor.reset_session_at(secs(start, t));
        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.blink_count, 0);
        assert_eq!(snapshot.distraction_count, 0);
        assert_eq!(monitor.session().elapsed(secs(start, t + 5)), Duration::from_secs(5));
    }

    #[test]
    fn test_subscribers_see_every_publish() {
        let start = Instant::now();
        let mut monitor = monitor(start);
        let mut rx = monitor.subscribe();
        assert!(!rx.has_changed().unwrap());

        monitor.process_frame_at(face(5.0, 0.0, OPEN), start);
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().face_detected);

        monitor.process_frame_at(FrameObservation::NoFace, secs(start, 1));
        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().face_detected);
    }
}
