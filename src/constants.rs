/// EAR below this value counts as a closed eye.
pub const EAR_THRESH: f64 = 0.23;

/// Consecutive closed frames required before reopening reports tiredness.
pub const EAR_CONSEC_FRAMES: u32 = 15;

/// Seconds between emotion-classifier samples inside the frame loop.
pub const EMOTION_SAMPLE_INTERVAL_SECS: u64 = 1;

/// Seconds between fusion cycles (one report per cycle).
pub const EMOTION_REPORT_INTERVAL_SECS: u64 = 30;

/// Occurrences of a negative label within the emotion window that trigger an alert.
pub const ALERT_THRESHOLD: usize = 5;

/// Mean key hold duration (seconds) above which typing reads as confused/frustrated.
pub const HOLD_SLOW_SECS: f64 = 0.5;

/// Mean key hold duration (seconds) below which typing reads as confident.
pub const HOLD_FAST_SECS: f64 = 0.15;

/// Scroll events per cycle above which scrolling reads as impatient/restless.
pub const SCROLL_RESTLESS_EVENTS: u64 = 10;

/// Scroll events per cycle above which a neutral facial read is rewritten to boredom.
pub const SCROLL_BOREDOM_OVERRIDE: u64 = 15;
