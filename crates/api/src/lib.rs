//! Focus Monitor API Server
//!
//! REST control surface, frame ingestion and server-sent snapshot stream
//! for the attention monitor.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub mod config;
mod error;
mod routes;

pub use config::{AppConfig, ServerConfig, StorageConfig};
pub use error::ApiError;

use attention::{FocusMonitor, MonitorSnapshot};
use storage::SettingsStore;

pub type SharedState = Arc<AppState>;

/// Application state shared across handlers
pub struct AppState {
    /// The single monitor instance; every mutation goes through this lock
    pub monitor: Mutex<FocusMonitor>,
    /// Published snapshots, readable without the monitor lock
    pub snapshots: watch::Receiver<Arc<MonitorSnapshot>>,
    /// Settings persistence
    pub store: SettingsStore,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
    running: AtomicBool,
    metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state around a monitor; frame intake starts stopped
    pub fn new(monitor: FocusMonitor, store: SettingsStore) -> Self {
        Self {
            snapshots: monitor.subscribe(),
            monitor: Mutex::new(monitor),
            store,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            running: AtomicBool::new(false),
            metrics: None,
        }
    }

    /// Serve `/metrics` from an installed Prometheus recorder
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Set the running flag, returning the previous value
    pub fn set_running(&self, running: bool) -> bool {
        self.running.swap(running, Ordering::AcqRel)
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime_seconds: u64,
    pub running: bool,
    pub monitor: MonitorHealth,
}

/// Monitor status as of the last published snapshot
#[derive(Debug, Serialize)]
pub struct MonitorHealth {
    pub face_detected: bool,
    pub calibrated: bool,
    pub is_distracted: bool,
}

/// Create the application router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/start", post(routes::control::start))
        .route("/api/v1/stop", post(routes::control::stop))
        .route("/api/v1/mode", post(routes::control::set_mode))
        .route(
            "/api/v1/reset_distraction",
            post(routes::control::reset_distraction),
        )
        .route("/api/v1/reset_session", post(routes::control::reset_session))
        .route("/api/v1/recalibrate", post(routes::control::recalibrate))
        .route("/api/v1/frames", post(routes::frames::submit_frame))
        .route("/api/v1/snapshot", get(routes::snapshot::get_snapshot))
        .route("/api/v1/stream", get(routes::snapshot::stream))
        .route(
            "/api/v1/settings",
            get(routes::settings::get_settings).post(routes::settings::update_settings),
        )
        .route("/metrics", get(metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let snapshot = state.snapshots.borrow().clone();

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        running: state.is_running(),
        monitor: MonitorHealth {
            face_detected: snapshot.face_detected,
            calibrated: snapshot.calibrated,
            is_distracted: snapshot.is_distracted,
        },
    })
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<SharedState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// Initialize logging; `RUST_LOG` overrides the default `info` filter
pub fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}

/// Run the server until Ctrl-C
pub async fn run_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = SettingsStore::new(&config.storage.settings_path);
    let settings = store.load_or_default().await;
    let monitor = FocusMonitor::new(config.monitor.clone(), settings);

    let mut state = AppState::new(monitor, store);
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => warn!("Prometheus recorder not installed: {}", e),
    }
    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", config.server.addr);

    let listener = tokio::net::TcpListener::bind(&config.server.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
