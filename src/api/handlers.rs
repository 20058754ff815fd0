use axum::{extract::State, Json};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use serde_json::{json, Value};
use uuid::Uuid;

use super::errors::ApiError;
use super::server::AppState;
use crate::models::{DetectionResult, FallbackReason};

/// Multipart field carrying the upload
pub const IMAGE_FIELD: &str = "image";

/// POST /detect - locate card-like regions in an uploaded image
///
/// Expects `multipart/form-data` with an `image` field. A request without one
/// (including a non-multipart body) is answered with 400.
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn detect_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectionResult>, ApiError> {
    let Ok(mut multipart) = multipart else {
        return Err(ApiError::MissingInput);
    };

    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) {
            image = Some(field.bytes().await?);
            break;
        }
    }

    let Some(image) = image else {
        return Err(ApiError::MissingInput);
    };
    tracing::debug!("received {} image bytes", image.len());

    // Decoding and contour tracing are CPU bound
    let detector = state.detector.clone();
    let task = tokio::task::spawn_blocking(move || detector.detect(Some(&image[..])));
    let result = match task.await {
        Ok(result) => result?,
        Err(e) => {
            tracing::warn!("detection task failed: {}", e);
            DetectionResult::mocked(FallbackReason::ProcessingFailure)
        }
    };

    tracing::info!(
        source = ?result.source,
        reason = ?result.fallback_reason,
        "returning {} boxes",
        result.boxes.len()
    );
    Ok(Json(result))
}

/// GET /health
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
