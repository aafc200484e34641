//! Sentiment prediction endpoint.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde_json::Value;

use crate::error::ApiError;
use crate::types::{AppState, PredictRequest, PredictResponse};

/// `POST /predict`: classify `text` or `texts`.
///
/// Invalid JSON is `MALFORMED_INPUT` regardless of content type. Inference
/// runs on the blocking pool so large batches do not stall runtime workers.
pub async fn predict(
    State(pipeline): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictResponse>, ApiError> {
    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::MalformedInput(format!("invalid JSON body: {e}")))?;
    let texts = PredictRequest::from_json(&value)?.into_texts();

    let predictions = tokio::task::spawn_blocking(move || pipeline.infer(&texts))
        .await
        .map_err(|e| ApiError::Internal(format!("inference task failed: {e}")))??;
    tracing::info!(count = predictions.len(), "predicted");

    Ok(Json(PredictResponse { predictions }))
}
