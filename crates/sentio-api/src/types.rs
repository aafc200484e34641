//! Request and response shapes for the HTTP surface.

use std::sync::Arc;

use sentio_ai::SentimentPipeline;
use sentio_core::PredictionResult;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// Shared handler state: the pipeline is immutable once built.
pub type AppState = Arc<SentimentPipeline>;

/// A `/predict` body resolved to the texts to classify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictRequest {
    Single(String),
    Batch(Vec<String>),
}

impl PredictRequest {
    /// Resolve a JSON body.
    ///
    /// `texts` wins over `text` when both are present. A bare string under
    /// `texts` is a batch of one; numbers and booleans are taken as their
    /// display form.
    pub fn from_json(body: &Value) -> Result<Self, ApiError> {
        let Value::Object(fields) = body else {
            return Err(ApiError::MalformedInput(
                "request body must be a JSON object".into(),
            ));
        };

        if let Some(texts) = fields.get("texts").filter(|v| !v.is_null()) {
            return match texts {
                Value::Array(items) => items
                    .iter()
                    .map(|item| coerce("texts", item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(PredictRequest::Batch),
                other => coerce("texts", other).map(|t| PredictRequest::Batch(vec![t])),
            };
        }

        if let Some(text) = fields.get("text").filter(|v| !v.is_null()) {
            return coerce("text", text).map(PredictRequest::Single);
        }

        Err(ApiError::MalformedInput(
            "expected a \"text\" or \"texts\" field".into(),
        ))
    }

    pub fn texts(&self) -> Vec<&str> {
        match self {
            PredictRequest::Single(text) => vec![text.as_str()],
            PredictRequest::Batch(texts) => texts.iter().map(String::as_str).collect(),
        }
    }

    /// Owned texts, for handing the batch to a blocking task.
    pub fn into_texts(self) -> Vec<String> {
        match self {
            PredictRequest::Single(text) => vec![text],
            PredictRequest::Batch(texts) => texts,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PredictRequest::Single(_) => 1,
            PredictRequest::Batch(texts) => texts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn coerce(field: &str, value: &Value) -> Result<String, ApiError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Err(ApiError::MalformedInput(format!(
            "\"{field}\" entries must not be null"
        ))),
        Value::Array(_) | Value::Object(_) => Err(ApiError::MalformedInput(format!(
            "\"{field}\" entries must be strings"
        ))),
    }
}

/// `POST /predict` success body.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predictions: Vec<PredictionResult>,
}

/// `GET /health` body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
    pub model_loaded: bool,
    pub text_model: bool,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<String>>,
}
