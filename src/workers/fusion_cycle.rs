//! Periodic fusion cycle: seize the windows, reduce, report, alert.

use std::sync::Arc;

use crate::affect::alert::{self, AlertDispatcher};
use crate::affect::reducer;
use crate::affect::types::AffectLabel;
use crate::affect::windows::SignalWindows;
use crate::services::report::{ReportChannel, ReportSink};

pub struct CycleDeps {
    pub windows: Arc<SignalWindows>,
    pub reports: Arc<ReportChannel>,
    pub sink: Arc<dyn ReportSink>,
    pub dispatcher: AlertDispatcher,
    pub alert_threshold: usize,
}

/// One fusion cycle.
///
/// The typing and scroll windows are taken atomically at the start, so
/// events arriving while the cycle runs count toward the next one. The
/// emotion snapshot feeds both the majority reduction and the alert
/// evaluation; only labels that actually alerted are purged afterwards.
pub async fn run(deps: &CycleDeps) {
    let snapshot = deps.windows.emotions.snapshot();
    let holds = deps.windows.typing.drain();
    let scroll_events = deps.windows.scroll.take();

    let report = reducer::reduce(&snapshot, &holds, scroll_events);
    deps.sink.publish(&report);
    deps.reports.publish(report);

    let conditions = alert::evaluate(&snapshot, deps.alert_threshold);
    if !conditions.is_empty() {
        deps.dispatcher.dispatch(&conditions);
        let fired: Vec<AffectLabel> = conditions.iter().map(|c| c.label).collect();
        deps.windows.emotions.purge_labels(&fired);
    }

    tracing::debug!(
        samples = snapshot.len(),
        holds = holds.len(),
        scroll = scroll_events,
        alerts = conditions.len(),
        "Fusion cycle complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affect::types::{FusedReport, ScrollState, TypingState};
    use crate::constants::ALERT_THRESHOLD;
    use crate::services::notifier::{NotificationSink, NotifyError};
    use std::sync::Mutex;
    use std::time::Duration;

    struct RecordingReportSink {
        reports: Mutex<Vec<FusedReport>>,
    }

    impl ReportSink for RecordingReportSink {
        fn publish(&self, report: &FusedReport) {
            self.reports.lock().unwrap().push(report.clone());
        }
    }

    struct RecordingNotifier {
        delivered: Mutex<Vec<AffectLabel>>,
    }

    impl NotificationSink for RecordingNotifier {
        fn notify(&self, label: AffectLabel) -> Result<(), NotifyError> {
            self.delivered.lock().unwrap().push(label);
            Ok(())
        }
    }

    struct Harness {
        deps: CycleDeps,
        sink: Arc<RecordingReportSink>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness() -> Harness {
        let sink = Arc::new(RecordingReportSink {
            reports: Mutex::new(Vec::new()),
        });
        let notifier = Arc::new(RecordingNotifier {
            delivered: Mutex::new(Vec::new()),
        });
        let deps = CycleDeps {
            windows: Arc::new(SignalWindows::new()),
            reports: Arc::new(ReportChannel::default()),
            sink: sink.clone(),
            dispatcher: AlertDispatcher::new(notifier.clone()),
            alert_threshold: ALERT_THRESHOLD,
        };
        Harness {
            deps,
            sink,
            notifier,
        }
    }

    async fn wait_for_deliveries(notifier: &RecordingNotifier, expected: usize) {
        for _ in 0..200 {
            if notifier.delivered.lock().unwrap().len() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn empty_windows_still_produce_a_report() {
        let h = harness();
        run(&h.deps).await;

        let reports = h.sink.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].facial, AffectLabel::Engagement);
        assert_eq!(reports[0].typing, TypingState::Inactive);
        assert_eq!(reports[0].scroll, ScrollState::Focused);
        drop(reports);

        assert_eq!(h.deps.reports.cycle_count(), 1);
        assert!(h.deps.reports.latest().is_some());
    }

    #[tokio::test]
    async fn typing_and_scroll_windows_are_consumed() {
        let h = harness();
        h.deps.windows.typing.record_hold(0.3);
        for _ in 0..12 {
            h.deps.windows.scroll.increment();
        }

        run(&h.deps).await;

        assert!(h.deps.windows.typing.is_empty());
        assert_eq!(h.deps.windows.scroll.peek(), 0);

        let report = h.deps.reports.latest().unwrap();
        assert_eq!(report.typing, TypingState::Neutral);
        assert_eq!(report.scroll, ScrollState::ImpatientRestless);
    }

    #[tokio::test]
    async fn alerting_purges_only_the_fired_label() {
        let h = harness();
        for _ in 0..ALERT_THRESHOLD {
            h.deps.windows.emotions.append(AffectLabel::Confusion);
        }
        h.deps.windows.emotions.append(AffectLabel::Engagement);
        h.deps.windows.emotions.append(AffectLabel::Tired);

        run(&h.deps).await;
        wait_for_deliveries(&h.notifier, 1).await;

        assert_eq!(
            *h.notifier.delivered.lock().unwrap(),
            vec![AffectLabel::Confusion]
        );
        assert_eq!(
            h.deps.windows.emotions.snapshot(),
            vec![AffectLabel::Engagement, AffectLabel::Tired]
        );
        // 多数仍按清除前的快照计算
        assert_eq!(
            h.deps.reports.latest().unwrap().facial,
            AffectLabel::Confusion
        );
    }

    #[tokio::test]
    async fn below_threshold_keeps_the_window() {
        let h = harness();
        for _ in 0..ALERT_THRESHOLD - 1 {
            h.deps.windows.emotions.append(AffectLabel::Boredom);
        }

        run(&h.deps).await;

        assert!(h.notifier.delivered.lock().unwrap().is_empty());
        assert_eq!(h.deps.windows.emotions.len(), ALERT_THRESHOLD - 1);
    }
}
