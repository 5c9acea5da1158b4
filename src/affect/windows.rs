//! Shared signal windows bridging the capture side and the fusion cycle.
//!
//! Producers (frame loop, input listener) run on different threads than the
//! consumer (fusion cycle), so every window is internally synchronized.
//! Locks are held only for the push or the swap; nothing blocks across a
//! cycle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::affect::types::AffectLabel;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // 窗口数据在持锁代码 panic 后仍然有效，继续使用即可
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Facial affect samples accumulated since the labels were last purged.
///
/// Unlike the typing and scroll windows this one is not cleared wholesale
/// each cycle; only labels that fired an alert are removed, so everything
/// else keeps accumulating context across cycles.
#[derive(Debug, Default)]
pub struct EmotionWindow {
    entries: Mutex<Vec<AffectLabel>>,
}

impl EmotionWindow {
    pub fn append(&self, label: AffectLabel) {
        lock(&self.entries).push(label);
    }

    /// Copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<AffectLabel> {
        lock(&self.entries).clone()
    }

    /// Remove every occurrence of each given label, keeping the rest.
    pub fn purge_labels(&self, labels: &[AffectLabel]) {
        if labels.is_empty() {
            return;
        }
        lock(&self.entries).retain(|entry| !labels.contains(entry));
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Key hold durations (seconds) recorded since the last fusion cycle.
#[derive(Debug, Default)]
pub struct TypingWindow {
    holds: Mutex<Vec<f64>>,
}

impl TypingWindow {
    pub fn record_hold(&self, seconds: f64) {
        lock(&self.holds).push(seconds);
    }

    /// Take all recorded holds, leaving the window empty.
    pub fn drain(&self) -> Vec<f64> {
        std::mem::take(&mut *lock(&self.holds))
    }

    pub fn len(&self) -> usize {
        lock(&self.holds).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scroll events counted since the last fusion cycle.
#[derive(Debug, Default)]
pub struct ScrollCounter {
    events: AtomicU64,
}

impl ScrollCounter {
    pub fn increment(&self) {
        self.events.fetch_add(1, Ordering::Relaxed);
    }

    /// Current count without resetting it.
    pub fn peek(&self) -> u64 {
        self.events.load(Ordering::Relaxed)
    }

    /// Take the count and reset it to zero in one step.
    pub fn take(&self) -> u64 {
        self.events.swap(0, Ordering::Relaxed)
    }
}

/// The three windows bundled for sharing across tasks.
#[derive(Debug, Default)]
pub struct SignalWindows {
    pub emotions: EmotionWindow,
    pub typing: TypingWindow,
    pub scroll: ScrollCounter,
}

impl SignalWindows {
    pub fn new() -> Self {
        Self::default()
    }
}
