//! Loading the fitted vectorizer and classifier from a model directory.
//!
//! The directory holds two JSON files, each tagged with a `kind`:
//!
//! - `vectorizer.json`: `count` or `tfidf`
//! - `model.json`: `logistic_regression` or `multinomial_nb`
//!
//! Both load or neither does; a half-loaded pair is never exposed.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classifier::{
    Classifier, LogisticRegression, LogisticRegressionParams, MultinomialNb, MultinomialNbParams,
};
use crate::error::ArtifactError;
use crate::vectorizer::{CountParams, TermWeighting, TfidfParams, Vectorizer};

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const CLASSIFIER_FILE: &str = "model.json";

/// Locations of the two artifact files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub vectorizer: PathBuf,
    pub classifier: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(model_dir: &Path) -> Self {
        Self {
            vectorizer: model_dir.join(VECTORIZER_FILE),
            classifier: model_dir.join(CLASSIFIER_FILE),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VectorizerArtifact {
    Count(CountParams),
    Tfidf(TfidfParams),
}

impl VectorizerArtifact {
    pub fn build(self) -> Result<Box<dyn Vectorizer>, ArtifactError> {
        Ok(match self {
            Self::Count(params) => Box::new(TermWeighting::count(params)?),
            Self::Tfidf(params) => Box::new(TermWeighting::tfidf(params)?),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression(LogisticRegressionParams),
    MultinomialNb(MultinomialNbParams),
}

impl ClassifierArtifact {
    pub fn build(self) -> Result<Box<dyn Classifier>, ArtifactError> {
        Ok(match self {
            Self::LogisticRegression(params) => Box::new(LogisticRegression::new(params)?),
            Self::MultinomialNb(params) => Box::new(MultinomialNb::new(params)?),
        })
    }
}

/// What `/health` and `sentio inspect` report about the loaded pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSummary {
    pub vectorizer: &'static str,
    pub classifier: &'static str,
    pub features: usize,
    pub classes: Vec<String>,
}

/// A loaded vectorizer/classifier pair.
pub struct ClassifierArtifacts {
    vectorizer: Box<dyn Vectorizer>,
    classifier: Box<dyn Classifier>,
}

impl std::fmt::Debug for ClassifierArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierArtifacts")
            .field("vectorizer", &self.vectorizer.kind())
            .field("classifier", &self.classifier.kind())
            .finish()
    }
}

impl ClassifierArtifacts {
    pub fn new(vectorizer: Box<dyn Vectorizer>, classifier: Box<dyn Classifier>) -> Self {
        if vectorizer.dim() != classifier.n_features() {
            warn!(
                vectorizer = vectorizer.dim(),
                classifier = classifier.n_features(),
                "vectorizer and classifier disagree on feature count"
            );
        }
        Self {
            vectorizer,
            classifier,
        }
    }

    /// Load both artifacts, failing on the first problem.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        let vectorizer = read_json::<VectorizerArtifact>(&paths.vectorizer)?.build()?;
        let classifier = read_json::<ClassifierArtifact>(&paths.classifier)?.build()?;

        info!(
            vectorizer = vectorizer.kind(),
            classifier = classifier.kind(),
            features = vectorizer.dim(),
            classes = classifier.classes().len(),
            "loaded text model"
        );
        Ok(Self::new(vectorizer, classifier))
    }

    /// Load both artifacts, or `None` if either is missing or unreadable.
    pub fn load_optional(paths: &ArtifactPaths) -> Option<Self> {
        match Self::load(paths) {
            Ok(artifacts) => Some(artifacts),
            Err(ArtifactError::Missing(path)) => {
                warn!(path = %path.display(), "text model artifact missing; predictions disabled");
                None
            }
            Err(e) => {
                warn!(error = %e, "failed to load text model; predictions disabled");
                None
            }
        }
    }

    pub fn vectorizer(&self) -> &dyn Vectorizer {
        self.vectorizer.as_ref()
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn describe(&self) -> ArtifactSummary {
        ArtifactSummary {
            vectorizer: self.vectorizer.kind(),
            classifier: self.classifier.kind(),
            features: self.vectorizer.dim(),
            classes: self.classifier.classes().to_vec(),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::Missing(path.to_path_buf())
        } else {
            ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}
