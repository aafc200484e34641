//! Health check endpoint.

use axum::Json;
use axum::extract::State;

use crate::types::{AppState, HealthResponse};

/// `GET /health`: liveness plus whether the text model is loaded.
pub async fn check(State(pipeline): State<AppState>) -> Json<HealthResponse> {
    let loaded = pipeline.is_ready();
    let classes = pipeline
        .artifacts()
        .map(|a| a.classifier().classes().to_vec());

    Json(HealthResponse {
        message: "ok",
        model_loaded: loaded,
        text_model: loaded,
        version: env!("CARGO_PKG_VERSION"),
        classes,
    })
}
