//! Pure fusion policy: collapse one cycle's window contents into a report.
//!
//! Everything here is side-effect free; the fusion worker owns the clock
//! and the windows and calls down into these functions.

use chrono::Utc;

use crate::affect::types::{AffectLabel, FusedReport, ScrollState, TypingState};
use crate::constants::{
    HOLD_FAST_SECS, HOLD_SLOW_SECS, SCROLL_BOREDOM_OVERRIDE, SCROLL_RESTLESS_EVENTS,
};

/// Most frequent label in the snapshot, `engagement/focus` when empty.
///
/// Ties resolve to the label that appeared first, so the outcome is stable
/// for a given window ordering.
pub fn facial_state(snapshot: &[AffectLabel]) -> AffectLabel {
    let mut tallies: Vec<(AffectLabel, usize)> = Vec::new();
    for &label in snapshot {
        match tallies.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => tallies.push((label, 1)),
        }
    }

    let mut best: Option<(AffectLabel, usize)> = None;
    for (label, count) in tallies {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((label, count)),
        }
    }
    best.map(|(label, _)| label)
        .unwrap_or(AffectLabel::Engagement)
}

/// Classify the cycle's typing rhythm from mean key hold duration.
///
/// Both boundaries are strict; a mean of exactly 0.5s or 0.15s reads as
/// neutral.
pub fn typing_state(holds: &[f64]) -> TypingState {
    if holds.is_empty() {
        return TypingState::Inactive;
    }

    let mean = holds.iter().sum::<f64>() / holds.len() as f64;
    if mean > HOLD_SLOW_SECS {
        TypingState::ConfusedFrustrated
    } else if mean < HOLD_FAST_SECS {
        TypingState::Confident
    } else {
        TypingState::Neutral
    }
}

/// Classify the cycle's scroll activity; the boundary count itself still
/// reads as focused.
pub fn scroll_state(events: u64) -> ScrollState {
    if events > SCROLL_RESTLESS_EVENTS {
        ScrollState::ImpatientRestless
    } else {
        ScrollState::Focused
    }
}

/// Cross-signal adjustment: heavy scrolling reinterprets a neutral facial
/// read as boredom. Negative facial reads are never rewritten.
pub fn cross_adjust(facial: AffectLabel, scroll_events: u64) -> AffectLabel {
    if facial == AffectLabel::Engagement && scroll_events > SCROLL_BOREDOM_OVERRIDE {
        AffectLabel::Boredom
    } else {
        facial
    }
}

/// Fuse one cycle's raw window contents into a timestamped report.
pub fn reduce(emotions: &[AffectLabel], holds: &[f64], scroll_events: u64) -> FusedReport {
    let facial = cross_adjust(facial_state(emotions), scroll_events);
    FusedReport {
        facial,
        typing: typing_state(holds),
        scroll: scroll_state(scroll_events),
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_window_reads_as_engagement() {
        assert_eq!(facial_state(&[]), AffectLabel::Engagement);
    }

    #[test]
    fn majority_label_wins() {
        let window = [
            AffectLabel::Boredom,
            AffectLabel::Engagement,
            AffectLabel::Boredom,
            AffectLabel::Tension,
            AffectLabel::Boredom,
        ];
        assert_eq!(facial_state(&window), AffectLabel::Boredom);
    }

    #[test]
    fn ties_resolve_to_the_earliest_label() {
        let window = [
            AffectLabel::Confusion,
            AffectLabel::Tension,
            AffectLabel::Tension,
            AffectLabel::Confusion,
        ];
        assert_eq!(facial_state(&window), AffectLabel::Confusion);
    }

    #[test]
    fn typing_boundaries_are_strict() {
        assert_eq!(typing_state(&[]), TypingState::Inactive);
        assert_eq!(typing_state(&[0.5]), TypingState::Neutral);
        assert_eq!(typing_state(&[0.15]), TypingState::Neutral);
        assert_eq!(typing_state(&[0.51]), TypingState::ConfusedFrustrated);
        assert_eq!(typing_state(&[0.14]), TypingState::Confident);
        // 0.9 和 0.2 的均值 0.55 仍然超过慢速阈值
        assert_eq!(typing_state(&[0.9, 0.2]), TypingState::ConfusedFrustrated);
    }

    #[test]
    fn scroll_boundary_is_strict() {
        assert_eq!(scroll_state(10), ScrollState::Focused);
        assert_eq!(scroll_state(11), ScrollState::ImpatientRestless);
    }

    #[test]
    fn heavy_scrolling_rewrites_neutral_face_to_boredom() {
        assert_eq!(cross_adjust(AffectLabel::Engagement, 16), AffectLabel::Boredom);
        assert_eq!(
            cross_adjust(AffectLabel::Engagement, 15),
            AffectLabel::Engagement
        );
    }

    #[test]
    fn negative_faces_are_never_rewritten() {
        assert_eq!(cross_adjust(AffectLabel::Tension, 40), AffectLabel::Tension);
        assert_eq!(cross_adjust(AffectLabel::Tired, 40), AffectLabel::Tired);
    }

    #[test]
    fn reduce_composes_all_three_signals() {
        let emotions = [AffectLabel::Engagement, AffectLabel::Engagement];
        let holds = [0.05, 0.07];
        let report = reduce(&emotions, &holds, 16);

        assert_eq!(report.facial, AffectLabel::Boredom);
        assert_eq!(report.typing, TypingState::Confident);
        assert_eq!(report.scroll, ScrollState::ImpatientRestless);
    }

    #[test]
    fn bored_face_survives_heavy_scrolling() {
        let emotions = [AffectLabel::Boredom; 5];
        let report = reduce(&emotions, &[], 20);

        assert_eq!(report.facial, AffectLabel::Boredom);
        assert_eq!(report.typing, TypingState::Inactive);
        assert_eq!(report.scroll, ScrollState::ImpatientRestless);
    }
}
