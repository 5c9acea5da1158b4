//! Face landmark detection seam.
//!
//! Real detector backends live behind `FaceLandmarkDetector`; the crate
//! ships a scripted synthetic detector for demo runs and a disabled one for
//! deployments that only use the HTTP surface.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::config::CameraMode;
use crate::services::camera::Frame;
use crate::vision::{EyePoints, Point};

/// Eye landmarks for one detected face.
#[derive(Debug, Clone)]
pub struct FaceLandmarks {
    left_eye: EyePoints,
    right_eye: EyePoints,
}

impl FaceLandmarks {
    pub fn new(left_eye: EyePoints, right_eye: EyePoints) -> Self {
        Self {
            left_eye,
            right_eye,
        }
    }

    pub fn left_eye(&self) -> &EyePoints {
        &self.left_eye
    }

    pub fn right_eye(&self) -> &EyePoints {
        &self.right_eye
    }
}

/// Finds faces in a frame and returns eye landmarks for each.
///
/// Order is backend-defined; the pipeline only consumes the first face.
/// An empty result means no face was visible.
pub trait FaceLandmarkDetector: Send + Sync {
    fn detect(&self, frame: &Frame) -> Vec<FaceLandmarks>;
}

const OPEN_EAR: f64 = 0.3;
const CLOSED_EAR: f64 = 0.08;

/// Build a unit-width eye whose aspect ratio evaluates to `openness`.
///
/// The ratio is translation and scale invariant, so placing the eye at the
/// origin is as good as any pixel position.
pub fn synthetic_eye(openness: f64) -> EyePoints {
    let half = openness / 2.0;
    [
        Point::new(0.0, 0.0),
        Point::new(0.33, half),
        Point::new(0.66, half),
        Point::new(1.0, 0.0),
        Point::new(0.66, -half),
        Point::new(0.33, -half),
    ]
}

/// Scripted detector: one face whose eyes close for `closed_frames` frames
/// at the start of every `period`-frame cycle, then stay open.
///
/// With the default script the closure runs one frame past the debounce
/// limit, so every cycle produces exactly one tiredness report.
#[derive(Debug)]
pub struct SyntheticLandmarkDetector {
    closed_frames: u32,
    period: u32,
    frame_index: AtomicU32,
}

impl Default for SyntheticLandmarkDetector {
    fn default() -> Self {
        Self::new(crate::constants::EAR_CONSEC_FRAMES + 1, 90)
    }
}

impl SyntheticLandmarkDetector {
    /// `closed_frames` must be smaller than `period`.
    pub fn new(closed_frames: u32, period: u32) -> Self {
        debug_assert!(closed_frames < period);
        Self {
            closed_frames,
            period,
            frame_index: AtomicU32::new(0),
        }
    }
}

impl FaceLandmarkDetector for SyntheticLandmarkDetector {
    fn detect(&self, _frame: &Frame) -> Vec<FaceLandmarks> {
        let index = self.frame_index.fetch_add(1, Ordering::Relaxed);
        let openness = if index % self.period < self.closed_frames {
            CLOSED_EAR
        } else {
            OPEN_EAR
        };
        vec![FaceLandmarks::new(
            synthetic_eye(openness),
            synthetic_eye(openness),
        )]
    }
}

/// Detector reporting one face with a constant eye openness. Test helper
/// for paths that need a deterministic open or closed read.
#[derive(Debug)]
pub struct FixedLandmarkDetector {
    openness: f64,
}

impl FixedLandmarkDetector {
    pub fn with_openness(openness: f64) -> Self {
        Self { openness }
    }

    pub fn open() -> Self {
        Self::with_openness(OPEN_EAR)
    }

    pub fn closed() -> Self {
        Self::with_openness(CLOSED_EAR)
    }
}

impl FaceLandmarkDetector for FixedLandmarkDetector {
    fn detect(&self, _frame: &Frame) -> Vec<FaceLandmarks> {
        vec![FaceLandmarks::new(
            synthetic_eye(self.openness),
            synthetic_eye(self.openness),
        )]
    }
}

/// Detector that never finds a face. Used when no camera backend is
/// configured; the classifier fallback then carries the whole signal.
#[derive(Debug, Default)]
pub struct DisabledLandmarkDetector;

impl FaceLandmarkDetector for DisabledLandmarkDetector {
    fn detect(&self, _frame: &Frame) -> Vec<FaceLandmarks> {
        Vec::new()
    }
}

pub fn from_camera_mode(mode: CameraMode) -> Arc<dyn FaceLandmarkDetector> {
    match mode {
        CameraMode::Synthetic => Arc::new(SyntheticLandmarkDetector::default()),
        CameraMode::Off => Arc::new(DisabledLandmarkDetector),
    }
}
