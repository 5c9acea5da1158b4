//! Emotion classification seam and its mock/remote implementations.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::config::ClassifierConfig;
use crate::services::camera::Frame;

/// Outcome of one classifier call.
///
/// `Unavailable` covers every way a sample can fail to produce a label:
/// classifier disabled, no face in frame, transport or model errors. The
/// harmonizer treats it as a neutral read.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Scored { label: String, score: f64 },
    Unavailable,
}

impl Classification {
    /// Raw label plus score, substituting the neutral fallback when the
    /// classifier had nothing to say.
    pub fn label_or_neutral(&self) -> (&str, f64) {
        match self {
            Self::Scored { label, score } => (label.as_str(), *score),
            Self::Unavailable => ("neutral", 0.0),
        }
    }
}

/// Scores one frame. Calls are synchronous and may block; the frame loop
/// and the upload handler both run them on blocking tasks.
pub trait EmotionClassifier: Send + Sync {
    fn classify(&self, frame: &Frame) -> Classification;
}

/// Classifier returning a fixed outcome, used for mock mode and tests.
#[derive(Debug, Clone)]
pub struct MockEmotionClassifier {
    outcome: Classification,
}

impl Default for MockEmotionClassifier {
    fn default() -> Self {
        Self::scored("neutral", 0.0)
    }
}

impl MockEmotionClassifier {
    pub fn scored(label: impl Into<String>, score: f64) -> Self {
        Self {
            outcome: Classification::Scored {
                label: label.into(),
                score,
            },
        }
    }

    pub fn unavailable() -> Self {
        Self {
            outcome: Classification::Unavailable,
        }
    }
}

impl EmotionClassifier for MockEmotionClassifier {
    fn classify(&self, _frame: &Frame) -> Classification {
        self.outcome.clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier request timed out")]
    Timeout,
    #[error("classifier network error: {0}")]
    Network(String),
    #[error("classifier api error: status={status}, message={message}")]
    Api { status: u16, message: String },
    #[error("frame encode failed: {0}")]
    Encode(String),
    #[error("classifier response malformed: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClassifierError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct RemoteScore {
    label: String,
    score: f64,
}

/// Classifier backed by an HTTP scoring service.
///
/// Frames are JPEG-encoded and posted as a multipart `file` field; the
/// service answers `{"label": "...", "score": 0.93}`. Any failure is
/// logged and reported as `Unavailable` so one bad sample never stalls the
/// frame loop.
#[derive(Debug, Clone)]
pub struct RemoteEmotionClassifier {
    config: ClassifierConfig,
    client: reqwest::blocking::Client,
}

impl RemoteEmotionClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self {
            config: config.clone(),
            client,
        }
    }

    /// Validate classifier configuration at startup.
    /// Panics if `enabled=true` and `mock=false` without an API URL, since
    /// real mode has nothing to call.
    pub fn validate_config(config: &ClassifierConfig) {
        if config.enabled && !config.mock && config.api_url.is_empty() {
            panic!(
                "Invalid classifier configuration: enabled=true and mock=false \
                 require CLASSIFIER_API_URL. Set CLASSIFIER_MOCK=true or provide \
                 the scoring service URL."
            );
        }
    }

    fn encode_jpeg(frame: &Frame) -> Result<Vec<u8>, ClassifierError> {
        let image =
            image::RgbImage::from_raw(frame.width(), frame.height(), frame.pixels().to_vec())
                .ok_or_else(|| ClassifierError::Encode("pixel buffer size mismatch".to_string()))?;
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
            .map_err(|error| ClassifierError::Encode(error.to_string()))?;
        Ok(bytes)
    }

    fn request(&self, jpeg: Vec<u8>) -> Result<RemoteScore, ClassifierError> {
        let part = reqwest::blocking::multipart::Part::bytes(jpeg)
            .file_name("frame.jpg")
            .mime_str("image/jpeg")
            .map_err(|error| ClassifierError::Encode(error.to_string()))?;
        let form = reqwest::blocking::multipart::Form::new().part("file", part);

        let mut request = self.client.post(&self.config.api_url).multipart(form);
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }
        let response = request.send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(ClassifierError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<RemoteScore>()?)
    }

    fn try_classify(&self, frame: &Frame) -> Result<RemoteScore, ClassifierError> {
        let jpeg = Self::encode_jpeg(frame)?;
        self.request(jpeg)
    }
}

impl EmotionClassifier for RemoteEmotionClassifier {
    fn classify(&self, frame: &Frame) -> Classification {
        match self.try_classify(frame) {
            Ok(score) => Classification::Scored {
                label: score.label,
                score: score.score,
            },
            Err(error) => {
                tracing::warn!(error = %error, "Classifier sample failed");
                Classification::Unavailable
            }
        }
    }
}

/// Pick the classifier implementation for the configured mode.
pub fn from_config(config: &ClassifierConfig) -> Arc<dyn EmotionClassifier> {
    if !config.enabled {
        Arc::new(MockEmotionClassifier::unavailable())
    } else if config.mock {
        Arc::new(MockEmotionClassifier::default())
    } else {
        Arc::new(RemoteEmotionClassifier::new(config))
    }
}
