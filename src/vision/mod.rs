//! Eye geometry primitives for the camera pipeline.
//!
//! `ear` turns detector landmarks into an eye aspect ratio, `closure` turns a
//! stream of per-frame ratios into a debounced tiredness signal.

pub mod closure;
pub mod ear;

pub use closure::EyeClosureDebouncer;
pub use ear::{ear, EyePoints, Point};
