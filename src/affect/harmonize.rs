//! Collapse raw classifier vocabulary into the pipeline's affect categories.

use crate::affect::types::AffectLabel;

/// Map one raw classifier label plus the debounced tiredness flag to a
/// high-level category.
///
/// Tiredness always wins over whatever the classifier said for the same
/// frame. Labels outside the known vocabulary fall back to
/// `engagement/focus`, the same bucket as a calm face, so an exotic model
/// output can never fabricate a negative signal.
pub fn harmonise(raw: &str, tired: bool) -> AffectLabel {
    if tired {
        return AffectLabel::Tired;
    }

    match raw {
        "angry" | "fear" => AffectLabel::Tension,
        "disgust" | "surprise" => AffectLabel::Confusion,
        "sad" => AffectLabel::Boredom,
        "happy" | "neutral" => AffectLabel::Engagement,
        _ => AffectLabel::Engagement,
    }
}
