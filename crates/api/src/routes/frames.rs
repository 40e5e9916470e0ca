//! Frame ingestion
//!
//! The landmark estimator posts one record per camera frame. A body with a
//! `landmarks` key carries a detected face; any other object (`{}`,
//! `{"face": null}`) reports a frame without a face.

use axum::{extract::State, Json};
use serde_json::Value;

use crate::{ApiError, SharedState};
use attention::{FaceFrame, FrameObservation, MonitorSnapshot};

/// Process one frame and return the resulting snapshot
pub async fn submit_frame(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> Result<Json<MonitorSnapshot>, ApiError> {
    if !state.is_running() {
        return Err(ApiError::NotRunning);
    }
    let observation = parse_observation(body)?;

    let mut monitor = state.monitor.lock().await;
    monitor.process_frame(observation);
    Ok(Json(monitor.snapshot().as_ref().clone()))
}

fn parse_observation(body: Value) -> Result<FrameObservation, ApiError> {
    if !body.is_object() {
        return Err(ApiError::InvalidFrame("expected a JSON object".to_string()));
    }
    if body.get("landmarks").map_or(true, Value::is_null) {
        return Ok(FrameObservation::NoFace);
    }

    let frame: FaceFrame =
        serde_json::from_value(body).map_err(|e| ApiError::InvalidFrame(e.to_string()))?;
    Ok(FrameObservation::Face(frame))
}
