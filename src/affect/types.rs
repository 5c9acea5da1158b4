use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// High-level affect category produced by the harmonizer.
///
/// This is the closed vocabulary the whole pipeline speaks after raw
/// classifier labels have been collapsed. Every variant except
/// `Engagement` counts as negative for alerting purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AffectLabel {
    #[serde(rename = "tired")]
    Tired,
    #[serde(rename = "tension/frustration")]
    Tension,
    #[serde(rename = "confusion")]
    Confusion,
    #[serde(rename = "boredom")]
    Boredom,
    #[serde(rename = "engagement/focus")]
    Engagement,
}

impl AffectLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tired => "tired",
            Self::Tension => "tension/frustration",
            Self::Confusion => "confusion",
            Self::Boredom => "boredom",
            Self::Engagement => "engagement/focus",
        }
    }

    pub fn is_negative(&self) -> bool {
        !matches!(self, Self::Engagement)
    }
}

impl fmt::Display for AffectLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typing read for one fusion cycle, derived from mean key hold duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypingState {
    #[serde(rename = "inactive")]
    Inactive,
    #[serde(rename = "confused/frustrated")]
    ConfusedFrustrated,
    #[serde(rename = "confident")]
    Confident,
    #[serde(rename = "neutral")]
    Neutral,
}

impl TypingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::ConfusedFrustrated => "confused/frustrated",
            Self::Confident => "confident",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for TypingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scroll read for one fusion cycle, derived from the event count alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollState {
    #[serde(rename = "impatient/restless")]
    ImpatientRestless,
    #[serde(rename = "focused")]
    Focused,
}

impl ScrollState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImpatientRestless => "impatient/restless",
            Self::Focused => "focused",
        }
    }
}

impl fmt::Display for ScrollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fused snapshot of the user's state, emitted once per cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusedReport {
    pub facial: AffectLabel,
    pub typing: TypingState,
    pub scroll: ScrollState,
    pub generated_at: DateTime<Utc>,
}

/// A negative label that crossed the alert threshold within one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertCondition {
    pub label: AffectLabel,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_serialize_to_slash_forms() {
        let json = serde_json::to_string(&AffectLabel::Tension).unwrap();
        assert_eq!(json, "\"tension/frustration\"");
        let back: AffectLabel = serde_json::from_str("\"engagement/focus\"").unwrap();
        assert_eq!(back, AffectLabel::Engagement);
    }

    #[test]
    fn engagement_is_the_only_non_negative_label() {
        let negatives = [
            AffectLabel::Tired,
            AffectLabel::Tension,
            AffectLabel::Confusion,
            AffectLabel::Boredom,
        ];
        assert!(negatives.iter().all(AffectLabel::is_negative));
        assert!(!AffectLabel::Engagement.is_negative());
    }

    #[test]
    fn report_serializes_camel_case() {
        let report = FusedReport {
            facial: AffectLabel::Boredom,
            typing: TypingState::Neutral,
            scroll: ScrollState::Focused,
            generated_at: Utc::now(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["facial"], "boredom");
        assert!(value.get("generatedAt").is_some());
    }
}
