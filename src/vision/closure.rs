//! Debounced eye-closure tracking across consecutive frames.

use crate::constants::{EAR_CONSEC_FRAMES, EAR_THRESH};

/// Counts consecutive frames where both eyes read closed and reports
/// tiredness once per closure episode.
///
/// The report fires on the reopening frame, not while the eyes are still
/// shut, so one long closure yields exactly one `true`.
#[derive(Debug, Clone)]
pub struct EyeClosureDebouncer {
    threshold: f64,
    required_frames: u32,
    consecutive_closed: u32,
}

impl Default for EyeClosureDebouncer {
    fn default() -> Self {
        Self::new(EAR_THRESH, EAR_CONSEC_FRAMES)
    }
}

impl EyeClosureDebouncer {
    pub fn new(threshold: f64, required_frames: u32) -> Self {
        Self {
            threshold,
            required_frames,
            consecutive_closed: 0,
        }
    }

    /// Feed one frame's binocular EAR reading.
    ///
    /// `None` means no face was visible this frame; the closure run is kept
    /// rather than reset, so a brief detector dropout during a long blink
    /// does not erase the episode.
    pub fn observe(&mut self, ears: Option<(f64, f64)>) -> bool {
        let Some((left, right)) = ears else {
            return false;
        };

        if left < self.threshold && right < self.threshold {
            self.consecutive_closed = self.consecutive_closed.saturating_add(1);
            return false;
        }

        // 重新睁眼：只有足够长的闭眼段才上报
        let tired = self.consecutive_closed >= self.required_frames;
        self.consecutive_closed = 0;
        tired
    }

    pub fn consecutive_closed(&self) -> u32 {
        self.consecutive_closed
    }
}
