use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;

use crate::affect::harmonise;
use crate::affect::types::AffectLabel;
use crate::constants::EAR_THRESH;
use crate::response::{ok, AppError};
use crate::services::camera::Frame;
use crate::services::classifier::EmotionClassifier;
use crate::services::detector::FaceLandmarkDetector;
use crate::state::AppState;
use crate::vision::ear;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(classify_upload))
        .route("/report", get(latest_report))
}

/// Verdict for one uploaded image.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectVerdict {
    label: AffectLabel,
    score: f64,
}

async fn classify_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|_| AppError::bad_request("BAD_UPLOAD", "Malformed multipart body"))?
        .ok_or_else(|| AppError::bad_request("MISSING_FILE", "Attach one image field"))?;

    match field.content_type() {
        Some("image/jpeg") | Some("image/png") => {}
        _ => {
            return Err(AppError::unsupported_media_type(
                "Upload a JPEG or PNG image",
            ))
        }
    }

    let bytes = field
        .bytes()
        .await
        .map_err(|_| AppError::bad_request("BAD_UPLOAD", "Could not read the upload"))?;

    let detector = Arc::clone(state.detector());
    let classifier = Arc::clone(state.classifier());

    // 解码和分类都是阻塞工作,移出异步线程
    let verdict =
        tokio::task::spawn_blocking(move || score_image(&bytes, &*detector, &*classifier))
            .await
            .map_err(|_| AppError::internal("Classification task failed"))??;

    Ok(ok(verdict))
}

fn score_image(
    bytes: &[u8],
    detector: &dyn FaceLandmarkDetector,
    classifier: &dyn EmotionClassifier,
) -> Result<AffectVerdict, AppError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|_| AppError::bad_request("BAD_IMAGE", "Could not decode the image"))?;
    let rgb = decoded.to_rgb8();
    let frame = Frame::new(rgb.width(), rgb.height(), rgb.into_raw());

    // 单张照片没有帧序列,闭眼直接按阈值判定
    let tired = detector
        .detect(&frame)
        .first()
        .map(|face| ear(face.left_eye()) < EAR_THRESH && ear(face.right_eye()) < EAR_THRESH)
        .unwrap_or(false);

    let classification = classifier.classify(&frame);
    let (raw, score) = classification.label_or_neutral();
    let label = harmonise(raw, tired);

    Ok(AffectVerdict { label, score })
}

async fn latest_report(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let reports = state.reports();
    Ok(ok(serde_json::json!({
        "report": reports.latest(),
        "cycles": reports.cycle_count(),
    })))
}
