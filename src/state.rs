use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use crate::affect::SignalWindows;
use crate::config::Config;
use crate::services::classifier::EmotionClassifier;
use crate::services::detector::FaceLandmarkDetector;
use crate::services::report::ReportChannel;

/// Shared handles for the HTTP surface and the monitor pipeline.
///
/// Everything inside is reference counted; cloning the state is cheap and
/// every clone sees the same windows and report channel.
#[derive(Clone)]
pub struct AppState {
    windows: Arc<SignalWindows>,
    reports: Arc<ReportChannel>,
    classifier: Arc<dyn EmotionClassifier>,
    detector: Arc<dyn FaceLandmarkDetector>,
    config: Arc<Config>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        windows: Arc<SignalWindows>,
        reports: Arc<ReportChannel>,
        classifier: Arc<dyn EmotionClassifier>,
        detector: Arc<dyn FaceLandmarkDetector>,
        config: &Config,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            windows,
            reports,
            classifier,
            detector,
            config: Arc::new(config.clone()),
            shutdown_tx,
            started_at: Instant::now(),
        }
    }

    pub fn windows(&self) -> &Arc<SignalWindows> {
        &self.windows
    }

    pub fn reports(&self) -> &Arc<ReportChannel> {
        &self.reports
    }

    pub fn classifier(&self) -> &Arc<dyn EmotionClassifier> {
        &self.classifier
    }

    pub fn detector(&self) -> &Arc<dyn FaceLandmarkDetector> {
        &self.detector
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn shutdown_tx(&self) -> &broadcast::Sender<()> {
        &self.shutdown_tx
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
