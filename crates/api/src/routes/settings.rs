//! Settings routes

use axum::{extract::State, http::StatusCode, Json};
use metrics::counter;
use serde::Serialize;
use serde_json::{Map, Value};
use settings::Settings;

use crate::{ApiError, SharedState};

/// Per-key result of a sparse update
#[derive(Debug, Serialize)]
pub struct SettingsUpdateResponse {
    /// `ok` when every known key was accepted, `partial` otherwise
    pub status: &'static str,
    pub applied: Vec<&'static str>,
    pub rejected: Vec<RejectedKey>,
    pub ignored: Vec<String>,
    pub settings: Settings,
}

#[derive(Debug, Serialize)]
pub struct RejectedKey {
    pub key: &'static str,
    pub error: String,
}

/// Current settings
pub async fn get_settings(State(state): State<SharedState>) -> Json<Settings> {
    let monitor = state.monitor.lock().await;
    Json(monitor.settings().clone())
}

/// Apply a sparse update; valid keys apply even when others are rejected
pub async fn update_settings(
    State(state): State<SharedState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<SettingsUpdateResponse>), ApiError> {
    let (outcome, settings) = {
        let mut monitor = state.monitor.lock().await;
        let outcome = monitor.update_settings(&body);
        // Persist before releasing the lock so saves land in update order
        if !outcome.delta.is_empty() {
            state.store.save(monitor.settings()).await?;
        }
        (outcome, monitor.settings().clone())
    };
    if !outcome.rejected.is_empty() {
        counter!("focus_settings_rejected_total").increment(outcome.rejected.len() as u64);
    }

    let status = if outcome.is_clean() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    let response = SettingsUpdateResponse {
        status: if outcome.is_clean() { "ok" } else { "partial" },
        applied: outcome.delta.keys(),
        rejected: outcome
            .rejected
            .iter()
            .map(|e| RejectedKey {
                key: e.key(),
                error: e.to_string(),
            })
            .collect(),
        ignored: outcome.ignored,
        settings,
    };

    Ok((status, Json(response)))
}
