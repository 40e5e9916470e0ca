//! Monitoring lifecycle and session control routes

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use settings::Mode;
use tracing::info;

use crate::{ApiError, SharedState};
use attention::MonitorSnapshot;

/// Response for start/stop
#[derive(Debug, Serialize)]
pub struct RunningResponse {
    pub status: &'static str,
    pub running: bool,
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ModeResponse {
    pub status: &'static str,
    pub mode: Mode,
    pub label: &'static str,
}

/// Begin accepting frames
pub async fn start(State(state): State<SharedState>) -> Json<RunningResponse> {
    if !state.set_running(true) {
        info!("Monitoring started");
    }
    Json(RunningResponse {
        status: "ok",
        running: true,
    })
}

/// Stop accepting frames; monitor state is kept
pub async fn stop(State(state): State<SharedState>) -> Json<RunningResponse> {
    if state.set_running(false) {
        info!("Monitoring stopped");
    }
    Json(RunningResponse {
        status: "ok",
        running: false,
    })
}

/// Switch between study and homework posture rules
pub async fn set_mode(
    State(state): State<SharedState>,
    Json(request): Json<ModeRequest>,
) -> Result<Json<ModeResponse>, ApiError> {
    let mode = Mode::parse_lenient(request.mode.as_deref().unwrap_or(Mode::Study.as_str()));

    // Saved under the monitor lock so the file always ends with the newest settings
    let mut monitor = state.monitor.lock().await;
    monitor.set_mode(mode);
    state.store.save(monitor.settings()).await?;
    drop(monitor);

    Ok(Json(ModeResponse {
        status: "ok",
        mode,
        label: mode.label(),
    }))
}

/// Acknowledge the current distraction episode
pub async fn reset_distraction(State(state): State<SharedState>) -> Json<MonitorSnapshot> {
    let mut monitor = state.monitor.lock().await;
    monitor.reset_distraction();
    Json(monitor.snapshot().as_ref().clone())
}

/// Start a new session
pub async fn reset_session(State(state): State<SharedState>) -> Json<MonitorSnapshot> {
    let mut monitor = state.monitor.lock().await;
    monitor.reset_session();
    Json(monitor.snapshot().as_ref().clone())
}

/// Drop the EAR baseline and collect a new one
pub async fn recalibrate(State(state): State<SharedState>) -> Json<MonitorSnapshot> {
    let mut monitor = state.monitor.lock().await;
    monitor.recalibrate();
    Json(monitor.snapshot().as_ref().clone())
}
