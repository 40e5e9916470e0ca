//! Snapshot polling and live push

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use tokio_stream::{wrappers::WatchStream, Stream, StreamExt};

use crate::SharedState;
use attention::MonitorSnapshot;

/// SSE event name carrying a snapshot
pub const SNAPSHOT_EVENT: &str = "monitor_data";

/// Latest published snapshot
pub async fn get_snapshot(State(state): State<SharedState>) -> Json<MonitorSnapshot> {
    let snapshot = state.snapshots.borrow().clone();
    Json(snapshot.as_ref().clone())
}

/// Push every published snapshot as a server-sent event
///
/// A slow client skips intermediate snapshots and always receives the
/// latest one.
pub async fn stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let events = WatchStream::new(state.snapshots.clone())
        .map(|snapshot| Event::default().event(SNAPSHOT_EVENT).json_data(snapshot.as_ref()));
    Sse::new(events).keep_alive(KeepAlive::default())
}
