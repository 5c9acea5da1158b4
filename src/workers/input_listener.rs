//! Input event listener: turns hook events into typing and scroll signals.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{broadcast, mpsc};

use crate::affect::windows::SignalWindows;
use crate::services::input::InputEvent;

/// Consume input events until the channel closes or shutdown is signalled.
///
/// Presses are held in a pending map keyed by the event's key identifier;
/// the matching release records one hold duration. A release without a
/// matching press is dropped, and a second press of the same key before
/// its release simply restarts that key's timing.
pub async fn run(
    mut events: mpsc::UnboundedReceiver<InputEvent>,
    windows: Arc<SignalWindows>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut pending: HashMap<String, Instant> = HashMap::new();
    tracing::info!("Input listener started");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(InputEvent::KeyPress { key, at }) => {
                    pending.insert(key, at);
                }
                Some(InputEvent::KeyRelease { key, at }) => {
                    if let Some(pressed_at) = pending.remove(&key) {
                        let hold = at.saturating_duration_since(pressed_at);
                        windows.typing.record_hold(hold.as_secs_f64());
                    }
                }
                Some(InputEvent::Scroll { .. }) => {
                    windows.scroll.increment();
                }
                None => break,
            },
            _ = shutdown_rx.recv() => break,
        }
    }

    tracing::info!("Input session ended");
}
