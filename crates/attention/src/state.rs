//! Distraction state machine
//!
//! Three independent condition timers (drowsiness, head turn, head posture
//! for the active mode) escalate an alert level and trip a sticky latch once
//! any of them outlasts its duration. While latched nothing is evaluated
//! until [`DistractionMachine::reset_distraction`] is called.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use settings::{Mode, Settings};
use tracing::debug;

use crate::alert::AlertLevel;
use crate::blink::EyeClosureTracker;
use crate::conditioner::SmoothedSignals;
use crate::snapshot::{ActiveTimers, TimerProgress};

/// Which way the head is turned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    /// Positive yaw is a turn to the user's left in the landmark frame
    pub fn from_yaw(yaw: f64) -> Self {
        if yaw > 0.0 {
            TurnDirection::Left
        } else {
            TurnDirection::Right
        }
    }
}

/// Why the latch tripped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistractionReason {
    /// Eyes closed for longer than the drowsy time
    Drowsy,
    /// Head turned away for longer than the turn time
    HeadTurn(TurnDirection),
    /// STUDY mode: head lowered for longer than the study time
    HeadDown { elapsed: Duration },
    /// HOMEWORK mode: head raised for longer than the homework time
    HeadUp { elapsed: Duration },
}

impl DistractionReason {
    /// Short machine-readable tag
    pub fn kind(&self) -> &'static str {
        match self {
            DistractionReason::Drowsy => "drowsy",
            DistractionReason::HeadTurn(_) => "turn",
            DistractionReason::HeadDown { .. } => "head_down",
            DistractionReason::HeadUp { .. } => "head_up",
        }
    }
}

impl fmt::Display for DistractionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistractionReason::Drowsy => f.write_str("检测到犯困 (长时间闭眼)"),
            DistractionReason::HeadTurn(TurnDirection::Left) => f.write_str("长时间转头看左边"),
            DistractionReason::HeadTurn(TurnDirection::Right) => f.write_str("长时间转头看右边"),
            DistractionReason::HeadDown { elapsed } => write!(
                f,
                "长时间低头 (已持续 {} 分钟)，请专注屏幕",
                elapsed.as_secs() / 60
            ),
            DistractionReason::HeadUp { elapsed } => write!(
                f,
                "长时间抬头发呆 (已持续 {} 分钟)，请专注作业",
                elapsed.as_secs() / 60
            ),
        }
    }
}

/// Start instants of the condition timers; `None` while inactive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DistractionTimers {
    pub drowsy: Option<Instant>,
    pub head_turn: Option<Instant>,
    pub pitch: Option<Instant>,
}

/// Outcome of evaluating one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    /// Already latched; nothing was evaluated
    Latched,
    /// A condition exceeded its duration on this frame
    Tripped(DistractionReason),
    /// No condition tripped; highest pre-emptive alert level
    Monitoring(AlertLevel),
}

/// Start (or keep) a timer while `active`, clear it otherwise
///
/// Returns the time the condition has held so far.
fn track(start: &mut Option<Instant>, active: bool, now: Instant) -> Option<Duration> {
    if !active {
        *start = None;
        return None;
    }
    let started = *start.get_or_insert(now);
    Some(now.saturating_duration_since(started))
}

#[derive(Debug, Clone)]
pub struct DistractionMachine {
    eyes: EyeClosureTracker,
    timers: DistractionTimers,
    latched: Option<DistractionReason>,
    alert_level: AlertLevel,
    active_timers: ActiveTimers,
    blink_completed: bool,
}

impl DistractionMachine {
    pub fn new(blink_frames_threshold: u32) -> Self {
        Self {
            eyes: EyeClosureTracker::new(blink_frames_threshold),
            timers: DistractionTimers::default(),
            latched: None,
            alert_level: AlertLevel::None,
            active_timers: ActiveTimers::default(),
            blink_completed: false,
        }
    }

    /// Evaluate one frame of smoothed signals
    pub fn evaluate(
        &mut self,
        signals: &SmoothedSignals,
        settings: &Settings,
        now: Instant,
    ) -> Evaluation {
        self.blink_completed = false;
        if self.latched.is_some() {
            return Evaluation::Latched;
        }

        let mut max_alert = AlertLevel::None;
        let mut active = ActiveTimers::default();

        // 1. Drowsiness
        let closure = self.eyes.observe(signals.ear, settings.ear_threshold);
        self.blink_completed = closure.blink_completed;
        if let Some(elapsed) = track(&mut self.timers.drowsy, closure.truly_closed, now) {
            let threshold = Duration::from_secs(settings.drowsy_time);
            active.drowsy = Some(TimerProgress::new(elapsed, settings.drowsy_time));
            max_alert = max_alert.max(AlertLevel::from_elapsed(elapsed, threshold));
            if elapsed > threshold {
                return self.trip(DistractionReason::Drowsy);
            }
        }

        // 2. Head turn
        let turned = signals.yaw.abs() > settings.yaw_threshold;
        if let Some(elapsed) = track(&mut self.timers.head_turn, turned, now) {
            let threshold = Duration::from_secs(settings.turn_time);
            active.turn = Some(TimerProgress::new(elapsed, settings.turn_time));
            max_alert = max_alert.max(AlertLevel::from_elapsed(elapsed, threshold));
            if elapsed > threshold {
                let direction = TurnDirection::from_yaw(signals.yaw);
                return self.trip(DistractionReason::HeadTurn(direction));
            }
        }

        // 3. Head posture for the active mode
        let deviated = match settings.mode {
            Mode::Study => signals.pitch < settings.pitch_head_down,
            Mode::Homework => signals.pitch > settings.pitch_head_up,
        };
        if let Some(elapsed) = track(&mut self.timers.pitch, deviated, now) {
            let limit = settings.pitch_distraction_time();
            let threshold = Duration::from_secs(limit);
            let progress = Some(TimerProgress::new(elapsed, limit));
            match settings.mode {
                Mode::Study => active.head_down = progress,
                Mode::Homework => active.head_up = progress,
            }
            max_alert = max_alert.max(AlertLevel::from_elapsed(elapsed, threshold));
            if elapsed > threshold {
                let reason = match settings.mode {
                    Mode::Study => DistractionReason::HeadDown { elapsed },
                    Mode::Homework => DistractionReason::HeadUp { elapsed },
                };
                return self.trip(reason);
            }
        }

        if max_alert != self.alert_level {
            debug!("Alert level {:?} -> {:?}", self.alert_level, max_alert);
        }
        self.alert_level = max_alert;
        self.active_timers = active;
        Evaluation::Monitoring(max_alert)
    }

    fn trip(&mut self, reason: DistractionReason) -> Evaluation {
        self.latched = Some(reason);
        self.alert_level = AlertLevel::Critical;
        Evaluation::Tripped(reason)
    }

    /// Clear the latch, every condition timer and the closed-eye run
    pub fn reset_distraction(&mut self) {
        self.latched = None;
        self.timers = DistractionTimers::default();
        self.alert_level = AlertLevel::None;
        self.active_timers = ActiveTimers::default();
        self.eyes.reset_run();
    }

    /// Clear the head-turn and head-posture timers
    pub fn clear_pose_timers(&mut self) {
        self.timers.head_turn = None;
        self.timers.pitch = None;
    }

    pub fn reset_blinks(&mut self) {
        self.eyes.reset_blinks();
    }

    pub fn is_distracted(&self) -> bool {
        self.latched.is_some()
    }

    pub fn reason(&self) -> Option<DistractionReason> {
        self.latched
    }

    pub fn alert_level(&self) -> AlertLevel {
        self.alert_level
    }

    pub fn timers(&self) -> &DistractionTimers {
        &self.timers
    }

    pub fn active_timers(&self) -> &ActiveTimers {
        &self.active_timers
    }

    pub fn eye_closed_frames(&self) -> u32 {
        self.eyes.closed_frames()
    }

    pub fn blink_count(&self) -> u64 {
        self.eyes.blink_count()
    }

    /// Whether a blink ended on the last evaluated frame
    pub fn blink_completed(&self) -> bool {
        self.blink_completed
    }
}
