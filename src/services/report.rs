//! Report publication: console sink plus the in-process channel the HTTP
//! surface reads from.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use tokio::sync::broadcast;

use crate::affect::types::FusedReport;

/// Receives each cycle's fused report.
pub trait ReportSink: Send + Sync {
    fn publish(&self, report: &FusedReport);
}

/// Default sink: one structured log line per cycle.
#[derive(Debug, Default)]
pub struct LogReportSink;

impl ReportSink for LogReportSink {
    fn publish(&self, report: &FusedReport) {
        tracing::info!(
            facial = %report.facial,
            typing = %report.typing,
            scroll = %report.scroll,
            "Cycle report"
        );
    }
}

/// Fan-out point between the fusion cycle and HTTP consumers.
///
/// Keeps the latest report for polling endpoints and broadcasts each new
/// one to SSE subscribers. Lagging subscribers lose old reports rather
/// than slowing the cycle down.
#[derive(Debug)]
pub struct ReportChannel {
    latest: RwLock<Option<FusedReport>>,
    tx: broadcast::Sender<FusedReport>,
    cycles: AtomicU64,
}

impl Default for ReportChannel {
    fn default() -> Self {
        Self::new(32)
    }
}

impl ReportChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            latest: RwLock::new(None),
            tx,
            cycles: AtomicU64::new(0),
        }
    }

    pub fn publish(&self, report: FusedReport) {
        {
            let mut latest = self
                .latest
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *latest = Some(report.clone());
        }
        self.cycles.fetch_add(1, Ordering::Relaxed);
        // 没有订阅者时发送失败是正常情况
        let _ = self.tx.send(report);
    }

    pub fn latest(&self) -> Option<FusedReport> {
        self.latest
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FusedReport> {
        self.tx.subscribe()
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }
}
