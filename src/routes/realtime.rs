use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::{extract::State, Router};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;

use crate::response::AppError;
use crate::state::AppState;

/// Maximum concurrent SSE subscribers.
const MAX_SSE_CONNECTIONS: usize = 64;

static SSE_CONNECTION_COUNT: AtomicUsize = AtomicUsize::new(0);

struct SseGuard;
impl Drop for SseGuard {
    fn drop(&mut self) {
        SSE_CONNECTION_COUNT.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(sse_handler))
}

pub async fn sse_handler(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let current = SSE_CONNECTION_COUNT.fetch_add(1, Ordering::SeqCst);
    if current >= MAX_SSE_CONNECTIONS {
        SSE_CONNECTION_COUNT.fetch_sub(1, Ordering::SeqCst);
        return Err(AppError::too_many_requests("Too many SSE connections"));
    }

    // Subscribe before the stream starts so no cycle lands in the gap.
    let mut reports_rx = state.reports().subscribe();
    let mut shutdown_rx = state.shutdown_rx();
    let latest = state.reports().latest();

    let stream = async_stream::stream! {
        let _guard = SseGuard;

        // 新订阅者先收到最近一份报告,不必等下个周期
        if let Some(report) = latest {
            if let Ok(json) = serde_json::to_string(&report) {
                yield Ok(Event::default().event("report").data(json));
            }
        }

        loop {
            tokio::select! {
                received = reports_rx.recv() => match received {
                    Ok(report) => {
                        if let Ok(json) = serde_json::to_string(&report) {
                            yield Ok(Event::default().event("report").data(json));
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "SSE subscriber lagged behind report channel");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    ))
}
