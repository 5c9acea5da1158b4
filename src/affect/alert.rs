//! Alert evaluation and fire-and-forget delivery.

use std::sync::Arc;

use crate::affect::types::{AffectLabel, AlertCondition};
use crate::services::notifier::NotificationSink;

/// Count negative labels in the snapshot and return every one that reached
/// the threshold, in order of first appearance.
///
/// `engagement/focus` never alerts regardless of how often it occurs.
pub fn evaluate(snapshot: &[AffectLabel], threshold: usize) -> Vec<AlertCondition> {
    let mut tallies: Vec<(AffectLabel, usize)> = Vec::new();
    for &label in snapshot {
        if !label.is_negative() {
            continue;
        }
        match tallies.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => tallies.push((label, 1)),
        }
    }

    tallies
        .into_iter()
        .filter(|&(_, count)| count >= threshold)
        .map(|(label, count)| AlertCondition { label, count })
        .collect()
}

/// Hands alert conditions to the notification sink without blocking the
/// fusion cycle.
#[derive(Clone)]
pub struct AlertDispatcher {
    sink: Arc<dyn NotificationSink>,
}

impl AlertDispatcher {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Spawn one delivery task per condition. Sink failures are logged and
    /// never surface to the caller; the cycle continues regardless.
    pub fn dispatch(&self, conditions: &[AlertCondition]) {
        for condition in conditions {
            tracing::info!(
                label = %condition.label,
                count = condition.count,
                "Alert threshold crossed"
            );
            let sink = Arc::clone(&self.sink);
            let condition = *condition;
            tokio::task::spawn_blocking(move || {
                if let Err(error) = sink.notify(condition.label) {
                    tracing::warn!(
                        label = %condition.label,
                        error = %error,
                        "Alert delivery failed"
                    );
                }
            });
        }
    }
}
