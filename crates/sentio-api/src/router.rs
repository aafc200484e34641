//! Sentiment API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Every request gets an `info` span with method, path and response status.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use sentio_ai::SentimentPipeline;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::endpoints;

/// Default cap on request bodies.
pub const BODY_LIMIT: usize = 1024 * 1024;

/// Build the router with the default body limit.
pub fn api_router(pipeline: Arc<SentimentPipeline>) -> Router {
    api_router_with_limit(pipeline, BODY_LIMIT)
}

pub fn api_router_with_limit(pipeline: Arc<SentimentPipeline>, body_limit: usize) -> Router {
    Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/predict", post(endpoints::predict::predict))
        .with_state(pipeline)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
