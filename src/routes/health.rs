use std::sync::OnceLock;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

fn startup_instant() -> &'static Instant {
    static INSTANCE: OnceLock<Instant> = OnceLock::new();
    INSTANCE.get_or_init(Instant::now)
}

pub fn router() -> Router<AppState> {
    // Ensure startup time is recorded when the router is built
    let _ = startup_instant();

    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .route("/pipeline", get(pipeline_health))
}

pub async fn health_check() -> impl axum::response::IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "uptimeSecs": startup_instant().elapsed().as_secs(),
        "pipeline": {
            "healthy": true,
        }
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// Depth probe for the signal windows. Steadily growing numbers here with a
/// frozen cycle count mean the fusion job has stalled.
pub async fn pipeline_health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let windows = state.windows();

    Json(serde_json::json!({
        "healthy": true,
        "camera": state.config().monitor.camera.as_str(),
        "emotionSamples": windows.emotions.len(),
        "typingHolds": windows.typing.len(),
        "scrollEvents": windows.scroll.peek(),
        "cycles": state.reports().cycle_count(),
        "uptimeSecs": state.uptime_secs(),
    }))
}
