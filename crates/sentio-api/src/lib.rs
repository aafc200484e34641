//! HTTP surface for the sentiment pipeline.
//!
//! `GET /health` reports whether the text model is loaded; `POST /predict`
//! classifies a single `text` or a batch of `texts`.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::{BODY_LIMIT, api_router};
pub use server::serve;
pub use types::{PredictRequest, PredictResponse};
