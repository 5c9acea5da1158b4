//! Continuous frame-processing loop.
//!
//! Runs on a dedicated blocking thread: grabs frames, tracks eye closure on
//! every frame and samples the emotion classifier at a fixed interval,
//! appending one harmonized label per sample to the emotion window.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::affect::harmonise;
use crate::affect::windows::SignalWindows;
use crate::services::camera::FrameSource;
use crate::services::classifier::EmotionClassifier;
use crate::services::detector::FaceLandmarkDetector;
use crate::vision::{ear, EyeClosureDebouncer};

pub struct FrameLoopDeps {
    pub windows: Arc<SignalWindows>,
    pub detector: Arc<dyn FaceLandmarkDetector>,
    pub classifier: Arc<dyn EmotionClassifier>,
    pub sample_interval: Duration,
    pub stop: Arc<AtomicBool>,
}

/// Drive the frame loop until the source quits, the stop flag is set, or
/// the camera cannot be opened.
///
/// A failed open ends only this context; the fusion cycle and input
/// listener keep running on whatever the windows already hold. A failed
/// grab skips that frame and carries on.
pub fn run(mut source: Box<dyn FrameSource>, deps: FrameLoopDeps) {
    if let Err(error) = source.open() {
        tracing::error!(error = %error, "Cannot open frame source; camera pipeline disabled");
        return;
    }

    let mut debouncer = EyeClosureDebouncer::default();
    let mut last_sample: Option<Instant> = None;
    tracing::info!("Frame loop started");

    loop {
        if deps.stop.load(Ordering::Relaxed) {
            tracing::info!("Frame loop stopping");
            break;
        }

        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::info!("Frame source ended");
                break;
            }
            Err(error) => {
                tracing::warn!(error = %error, "Frame grab failed; skipping frame");
                continue;
            }
        };

        // 只取第一张脸;没有检测到脸时保留当前闭眼计数
        let faces = deps.detector.detect(&frame);
        let ears = faces
            .first()
            .map(|face| (ear(face.left_eye()), ear(face.right_eye())));
        let tired_now = debouncer.observe(ears);

        let sample_due = last_sample
            .map(|at| at.elapsed() >= deps.sample_interval)
            .unwrap_or(true);
        if sample_due {
            let classification = deps.classifier.classify(&frame);
            let (raw, score) = classification.label_or_neutral();
            let label = harmonise(raw, tired_now);
            deps.windows.emotions.append(label);
            tracing::debug!(label = %label, raw, score, tired = tired_now, "Facial sample");
            last_sample = Some(Instant::now());
        }
    }
}
