//! Batch sentiment inference: normalize → vectorize → classify → confidence.

use std::path::Path;
use std::time::Instant;

use sentio_core::{CleanedText, Confidence, Lexicon, Normalizer, PredictionResult};
use tracing::debug;

use crate::artifacts::{ArtifactPaths, ClassifierArtifacts};
use crate::error::{ArtifactError, InferenceError};

/// One prediction together with the cleaned text it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub cleaned: CleanedText,
    pub result: PredictionResult,
}

/// The full inference pipeline.
///
/// Holds the normalizer and, when loading succeeded, the classifier
/// artifacts. Immutable after construction, so one instance is shared across
/// request handlers.
#[derive(Debug)]
pub struct SentimentPipeline {
    normalizer: Normalizer,
    artifacts: Option<ClassifierArtifacts>,
}

impl SentimentPipeline {
    pub fn new(normalizer: Normalizer, artifacts: Option<ClassifierArtifacts>) -> Self {
        Self {
            normalizer,
            artifacts,
        }
    }

    /// Load the lexicon and the artifacts from `model_dir`.
    ///
    /// Never fails: missing artifacts leave the pipeline in the not-ready
    /// state, a missing lexicon means no stopwords are removed.
    pub fn load(model_dir: &Path, stopwords: Option<&Path>) -> Self {
        let normalizer = Normalizer::new(Lexicon::load(stopwords));
        let artifacts = ClassifierArtifacts::load_optional(&ArtifactPaths::in_dir(model_dir));
        Self::new(normalizer, artifacts)
    }

    pub fn is_ready(&self) -> bool {
        self.artifacts.is_some()
    }

    pub fn artifacts(&self) -> Option<&ClassifierArtifacts> {
        self.artifacts.as_ref()
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn normalize(&self, text: &str) -> CleanedText {
        self.normalizer.normalize(text)
    }

    /// One result per input, in input order.
    pub fn infer<S: AsRef<str>>(&self, batch: &[S]) -> Result<Vec<PredictionResult>, InferenceError> {
        Ok(self
            .infer_scored(batch)?
            .into_iter()
            .map(|scored| scored.result)
            .collect())
    }

    /// Like [`infer`](Self::infer), keeping each input's cleaned text.
    pub fn infer_scored<S: AsRef<str>>(&self, batch: &[S]) -> Result<Vec<Scored>, InferenceError> {
        let artifacts = self
            .artifacts
            .as_ref()
            .ok_or(InferenceError::ModelUnavailable)?;
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let start = Instant::now();

        let cleaned = self.normalizer.normalize_all(batch);
        let docs: Vec<&str> = cleaned.iter().map(CleanedText::as_str).collect();

        let features = artifacts.vectorizer().transform(&docs)?;
        let classifier = artifacts.classifier();
        let classified = classifier.classify(&features)?;

        check_len("label count", batch.len(), classified.labels.len())?;
        check_len("probability rows", batch.len(), classified.probabilities.len())?;
        let classes = classifier.classes();

        let results = cleaned
            .into_iter()
            .zip(classified.labels)
            .zip(&classified.probabilities)
            .map(|((cleaned, sentiment), probs)| {
                check_len("probability columns", classes.len(), probs.len())?;
                Ok(Scored {
                    cleaned,
                    result: PredictionResult {
                        sentiment,
                        confidence: Confidence::from_probabilities(classes, probs),
                    },
                })
            })
            .collect::<Result<Vec<_>, ArtifactError>>()?;

        debug!(
            batch = batch.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "inferred sentiment"
        );
        Ok(results)
    }

    pub fn infer_one(&self, text: &str) -> Result<PredictionResult, InferenceError> {
        let mut results = self.infer(&[text])?;
        results
            .pop()
            .ok_or(InferenceError::Inference(ArtifactError::ShapeMismatch {
                what: "label count",
                expected: 1,
                found: 0,
            }))
    }
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<(), ArtifactError> {
    if expected == found {
        Ok(())
    } else {
        Err(ArtifactError::ShapeMismatch {
            what,
            expected,
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use sentio_core::Stopwords;

    use super::*;
    use crate::classifier::{
        Classified, Classifier, LogisticRegression, LogisticRegressionParams, MultiClass,
    };
    use crate::vectorizer::{CountParams, FeatureMatrix, TermWeighting, TokenizerParams, Vectorizer};

    fn stopwords() -> Stopwords {
        Stopwords::from_words(["i", "this", "the", "is", "at", "all", "was", "not"])
    }

    fn vectorizer() -> Box<dyn Vectorizer> {
        let vocabulary: HashMap<String, usize> = ["bad", "great", "hate", "love", "not"]
            .iter()
            .enumerate()
            .map(|(i, w)| (w.to_string(), i))
            .collect();
        Box::new(
            TermWeighting::count(CountParams {
                vocabulary,
                tokenizer: TokenizerParams::default(),
                binary: false,
            })
            .unwrap(),
        )
    }

    fn classifier() -> Box<dyn Classifier> {
        Box::new(
            LogisticRegression::new(LogisticRegressionParams {
                classes: vec!["negative".into(), "positive".into()],
                coef: vec![vec![-2.0, 2.0, -3.0, 3.0, -0.5]],
                intercept: vec![0.0],
                multi_class: MultiClass::Auto,
            })
            .unwrap(),
        )
    }

    fn ready() -> SentimentPipeline {
        SentimentPipeline::new(
            Normalizer::with_stopwords(stopwords()),
            Some(ClassifierArtifacts::new(vectorizer(), classifier())),
        )
    }

    #[test]
    fn results_follow_input_order() {
        let pipeline = ready();
        let out = pipeline
            .infer(&["I love this", "I hate this", "great great"])
            .unwrap();
        let labels: Vec<&str> = out.iter().map(|r| r.sentiment.as_str()).collect();
        assert_eq!(labels, vec!["positive", "negative", "positive"]);
    }

    #[test]
    fn confidence_covers_classes_and_sums_to_100() {
        let pipeline = ready();
        for result in pipeline.infer(&["Not bad at all", "love", ""]).unwrap() {
            assert_eq!(result.confidence.len(), 2);
            assert!((result.confidence.total() - 100.0).abs() <= 0.02);
            let top = result.confidence.ranked()[0].0.to_string();
            assert_eq!(top, result.sentiment);
        }
    }

    #[test]
    fn negation_reaches_the_vectorizer() {
        // "not" scores -0.5 and "bad" -2.0: z = -2.5 → negative.
        let result = ready().infer_one("This was NOT bad").unwrap();
        assert_eq!(result.sentiment, "negative");
        let p = 1.0 / (1.0 + 2.5f64.exp());
        assert_eq!(
            result.confidence.get("positive"),
            Some(sentio_core::prediction::to_percentage(p))
        );
    }

    #[test]
    fn empty_text_scores_intercept_only() {
        let result = ready().infer_one("!!!").unwrap();
        assert_eq!(result.confidence.get("negative"), Some(50.0));
        assert_eq!(result.confidence.get("positive"), Some(50.0));
        assert_eq!(result.sentiment, "negative");
    }

    #[test]
    fn empty_batch_is_empty_result() {
        let out = ready().infer::<&str>(&[]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn unavailable_model_checked_first() {
        let pipeline = SentimentPipeline::new(Normalizer::with_stopwords(stopwords()), None);
        assert!(!pipeline.is_ready());
        assert!(matches!(
            pipeline.infer(&["love"]),
            Err(InferenceError::ModelUnavailable)
        ));
        assert!(matches!(
            pipeline.infer::<&str>(&[]),
            Err(InferenceError::ModelUnavailable)
        ));
    }

    #[test]
    fn batch_matches_single_calls() {
        let pipeline = ready();
        let texts = ["I love this", "bad bad hate", "nothing here"];
        let batch = pipeline.infer(&texts).unwrap();
        for (text, result) in texts.iter().zip(&batch) {
            assert_eq!(&pipeline.infer_one(text).unwrap(), result);
        }
    }

    #[test]
    fn scored_keeps_cleaned_text_alongside_result() {
        let pipeline = ready();
        let texts = ["I LOVED this!", "This was NOT bad"];
        let scored = pipeline.infer_scored(&texts).unwrap();
        let plain = pipeline.infer(&texts).unwrap();

        assert_eq!(scored.len(), 2);
        for ((text, s), result) in texts.iter().zip(&scored).zip(&plain) {
            assert_eq!(s.cleaned, pipeline.normalize(text));
            assert_eq!(&s.result, result);
        }
        assert_eq!(scored[0].cleaned.as_str(), "love");
    }

    #[test]
    fn load_without_artifacts_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = SentimentPipeline::load(dir.path(), Some(&dir.path().join("none")));
        assert!(!pipeline.is_ready());
        assert_eq!(pipeline.normalize("I love this").as_str(), "i love thi");
    }

    // ── Failing components ──

    struct ShortVectorizer;

    impl Vectorizer for ShortVectorizer {
        fn kind(&self) -> &'static str {
            "short"
        }

        fn dim(&self) -> usize {
            1
        }

        fn transform(&self, _docs: &[&str]) -> Result<FeatureMatrix, ArtifactError> {
            Ok(FeatureMatrix::zeros(1, 1))
        }
    }

    struct FixedClassifier;

    impl Classifier for FixedClassifier {
        fn kind(&self) -> &'static str {
            "fixed"
        }

        fn classes(&self) -> &[String] {
            &[]
        }

        fn n_features(&self) -> usize {
            1
        }

        fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Vec<f64>>, ArtifactError> {
            Ok(vec![Vec::new(); features.rows()])
        }

        fn classify(&self, features: &FeatureMatrix) -> Result<Classified, ArtifactError> {
            Ok(Classified {
                labels: vec!["x".into(); features.rows()],
                probabilities: self.predict_proba(features)?,
            })
        }
    }

    #[test]
    fn row_count_disagreement_is_inference_error() {
        let pipeline = SentimentPipeline::new(
            Normalizer::with_stopwords(Stopwords::empty()),
            Some(ClassifierArtifacts::new(
                Box::new(ShortVectorizer),
                Box::new(FixedClassifier),
            )),
        );
        let err = pipeline.infer(&["a", "b"]).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::Inference(ArtifactError::ShapeMismatch {
                expected: 2,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn classifier_width_error_propagates() {
        let pipeline = SentimentPipeline::new(
            Normalizer::with_stopwords(Stopwords::empty()),
            Some(ClassifierArtifacts::new(Box::new(ShortVectorizer), classifier())),
        );
        let err = pipeline.infer_one("love").unwrap_err();
        assert!(matches!(
            err,
            InferenceError::Inference(ArtifactError::ShapeMismatch { .. })
        ));
    }
}
