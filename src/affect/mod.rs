//! Affect fusion core: label vocabulary, signal windows and the cycle
//! policies that reduce them to reports and alerts.

pub mod alert;
pub mod harmonize;
pub mod reducer;
pub mod types;
pub mod windows;

pub use harmonize::harmonise;
pub use types::{AffectLabel, AlertCondition, FusedReport, ScrollState, TypingState};
pub use windows::SignalWindows;
