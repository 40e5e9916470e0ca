//! Attention Monitoring Engine
//!
//! Per-frame signal processing and state machine that turns facial geometry
//! into a stable "distracted / not distracted" verdict:
//! - Personal EAR calibration
//! - Median/mean smoothing of pitch, yaw and EAR
//! - Blink vs. sustained eye closure discrimination
//! - Drowsiness, head-turn and mode-dependent head posture timers
//! - Alert escalation and a sticky distraction latch

pub mod alert;
pub mod blink;
pub mod calibration;
pub mod conditioner;
pub mod config;
pub mod monitor;
pub mod session;
pub mod snapshot;
pub mod state;

pub use alert::AlertLevel;
pub use blink::{ClosureUpdate, EyeClosureTracker};
pub use calibration::Calibration;
pub use conditioner::{SignalConditioner, SmoothedSignals};
pub use config::MonitorConfig;
pub use monitor::{FocusMonitor, FrameObservation};
pub use session::SessionStats;
pub use snapshot::{ActiveTimers, MonitorSnapshot, TimerProgress};
pub use state::{DistractionMachine, DistractionReason, DistractionTimers, Evaluation, TurnDirection};

pub use face_features::{FaceFrame, GeometryError, Landmark, Rotation};
pub use settings::{Mode, Settings, SettingsDelta, UpdateOutcome, ValidationError};
