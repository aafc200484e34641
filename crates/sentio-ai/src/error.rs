use std::path::PathBuf;

use thiserror::Error;

/// Failures loading or running a vectorizer/classifier artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found: {0}")]
    Missing(PathBuf),

    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact: {0}")]
    Invalid(String),

    #[error("{what} mismatch: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid token pattern: {0}")]
    TokenPattern(#[from] regex::Error),
}

/// Failures surfaced by [`SentimentPipeline::infer`](crate::SentimentPipeline::infer).
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Artifacts were not loaded at startup; nothing was attempted.
    #[error("text model not loaded")]
    ModelUnavailable,

    /// The vectorizer or classifier rejected the batch.
    #[error(transparent)]
    Inference(#[from] ArtifactError),
}
