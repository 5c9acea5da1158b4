//! Input events fed into the monitor by OS hook adapters.
//!
//! The crate does not ship a global keyboard or mouse hook; embedders wire
//! their platform hook of choice to the monitor's input sender and emit
//! these events from the hook callbacks.

use std::time::Instant;

/// One keyboard or mouse observation with its capture timestamp.
///
/// `key` is an opaque identifier; press and release are matched by equal
/// identifiers, so any stable per-key string works. Key hold duration is
/// the span between a press and the next release of the same identifier.
#[derive(Debug, Clone)]
pub enum InputEvent {
    KeyPress { key: String, at: Instant },
    KeyRelease { key: String, at: Instant },
    Scroll { at: Instant },
}

impl InputEvent {
    pub fn press(key: impl Into<String>) -> Self {
        Self::KeyPress {
            key: key.into(),
            at: Instant::now(),
        }
    }

    pub fn release(key: impl Into<String>) -> Self {
        Self::KeyRelease {
            key: key.into(),
            at: Instant::now(),
        }
    }

    pub fn scroll() -> Self {
        Self::Scroll { at: Instant::now() }
    }
}
