//! Inference layer: fitted vectorizer and classifier artifacts, and the
//! pipeline that turns raw text into labelled predictions.

pub mod artifacts;
pub mod classifier;
pub mod error;
pub mod pipeline;
pub mod vectorizer;

pub use artifacts::{ArtifactPaths, ArtifactSummary, ClassifierArtifacts};
pub use classifier::{Classified, Classifier};
pub use error::{ArtifactError, InferenceError};
pub use pipeline::{Scored, SentimentPipeline};
pub use vectorizer::{FeatureMatrix, SparseRow, TermWeighting, Vectorizer};
