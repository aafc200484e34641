//! Probabilistic classifiers over bag-of-words features.
//!
//! Both kinds hold the fitted state exported from scikit-learn and reproduce
//! its `predict_proba`:
//!
//! - [`LogisticRegression`]: linear decision scores. A binary model with
//!   `auto` or `ovr` gives `[1 - σ(z), σ(z)]`, with `multinomial` it gives
//!   `softmax([-z, z])`. Multiclass models use softmax or normalized sigmoids.
//! - [`MultinomialNb`]: joint log-likelihood normalized with log-sum-exp.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ArtifactError;
use crate::vectorizer::{FeatureMatrix, SparseRow};

/// Labels and probability rows for one batch, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub labels: Vec<String>,
    /// One row per input, columns in [`Classifier::classes`] order.
    pub probabilities: Vec<Vec<f64>>,
}

/// Maps feature rows to a label and a distribution over a fixed class list.
pub trait Classifier: Send + Sync {
    /// Short name of the artifact kind, for diagnostics.
    fn kind(&self) -> &'static str;

    /// Known classes, in the column order of every probability row.
    fn classes(&self) -> &[String];

    /// Expected feature width.
    fn n_features(&self) -> usize;

    /// Probability rows summing to 1.
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Vec<f64>>, ArtifactError>;

    /// Labels and probabilities in one pass. The label is the most probable
    /// class; the first class wins ties.
    fn classify(&self, features: &FeatureMatrix) -> Result<Classified, ArtifactError> {
        let probabilities = self.predict_proba(features)?;
        let classes = self.classes();
        let labels = probabilities
            .iter()
            .map(|row| classes[argmax(row)].clone())
            .collect();
        Ok(Classified {
            labels,
            probabilities,
        })
    }
}

/// How a logistic regression turns decision scores into probabilities.
///
/// `Auto` is one-vs-rest for binary models and multinomial otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    #[default]
    Auto,
    Multinomial,
    Ovr,
}

/// Fitted state of a `LogisticRegression`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionParams {
    #[serde(deserialize_with = "class_labels")]
    pub classes: Vec<String>,
    /// `n_classes × n_features`, or a single row for binary problems.
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default)]
    pub multi_class: MultiClass,
}

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    classes: Vec<String>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    multi_class: MultiClass,
    n_features: usize,
}

impl LogisticRegression {
    pub fn new(params: LogisticRegressionParams) -> Result<Self, ArtifactError> {
        validate_classes(&params.classes)?;
        let expected_rows = if params.classes.len() == 2 {
            1
        } else {
            params.classes.len()
        };
        if params.coef.len() != expected_rows {
            return Err(ArtifactError::ShapeMismatch {
                what: "coefficient rows",
                expected: expected_rows,
                found: params.coef.len(),
            });
        }
        if params.intercept.len() != expected_rows {
            return Err(ArtifactError::ShapeMismatch {
                what: "intercept length",
                expected: expected_rows,
                found: params.intercept.len(),
            });
        }
        let n_features = uniform_width(&params.coef, "coefficient row width")?;

        Ok(Self {
            classes: params.classes,
            coef: params.coef,
            intercept: params.intercept,
            multi_class: params.multi_class,
            n_features,
        })
    }

    fn scores(&self, x: SparseRow<'_>) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(w, b)| x.dot(w) + b)
            .collect()
    }
}

impl Classifier for LogisticRegression {
    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Vec<f64>>, ArtifactError> {
        check_width(features, self.n_features)?;
        Ok(features
            .iter_rows()
            .map(|x| {
                let scores = self.scores(x);
                if let [z] = scores.as_slice() {
                    return match self.multi_class {
                        MultiClass::Multinomial => softmax(&[-z, *z]),
                        MultiClass::Auto | MultiClass::Ovr => {
                            let p = sigmoid(*z);
                            vec![1.0 - p, p]
                        }
                    };
                }
                match self.multi_class {
                    MultiClass::Auto | MultiClass::Multinomial => softmax(&scores),
                    MultiClass::Ovr => {
                        let probs: Vec<f64> = scores.iter().map(|&z| sigmoid(z)).collect();
                        normalize_sum(probs)
                    }
                }
            })
            .collect())
    }
}

/// Fitted state of a `MultinomialNB`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNbParams {
    #[serde(deserialize_with = "class_labels")]
    pub classes: Vec<String>,
    pub class_log_prior: Vec<f64>,
    /// `n_classes × n_features`.
    pub feature_log_prob: Vec<Vec<f64>>,
}

#[derive(Debug, Clone)]
pub struct MultinomialNb {
    classes: Vec<String>,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
    n_features: usize,
}

impl MultinomialNb {
    pub fn new(params: MultinomialNbParams) -> Result<Self, ArtifactError> {
        validate_classes(&params.classes)?;
        let n_classes = params.classes.len();
        if params.class_log_prior.len() != n_classes {
            return Err(ArtifactError::ShapeMismatch {
                what: "class_log_prior length",
                expected: n_classes,
                found: params.class_log_prior.len(),
            });
        }
        if params.feature_log_prob.len() != n_classes {
            return Err(ArtifactError::ShapeMismatch {
                what: "feature_log_prob rows",
                expected: n_classes,
                found: params.feature_log_prob.len(),
            });
        }
        let n_features = uniform_width(&params.feature_log_prob, "feature_log_prob row width")?;

        Ok(Self {
            classes: params.classes,
            class_log_prior: params.class_log_prior,
            feature_log_prob: params.feature_log_prob,
            n_features,
        })
    }
}

impl Classifier for MultinomialNb {
    fn kind(&self) -> &'static str {
        "multinomial_nb"
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Vec<f64>>, ArtifactError> {
        check_width(features, self.n_features)?;
        Ok(features
            .iter_rows()
            .map(|x| {
                let jll: Vec<f64> = self
                    .feature_log_prob
                    .iter()
                    .zip(&self.class_log_prior)
                    .map(|(w, prior)| x.dot(w) + prior)
                    .collect();
                softmax(&jll)
            })
            .collect())
    }
}

// ── Helpers ──

/// Accept class labels exported as strings, integers, or booleans.
fn class_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<serde_json::Value> = Vec::deserialize(deserializer)?;
    raw.into_iter()
        .map(|v| match v {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            serde_json::Value::Bool(b) => Ok(b.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "unsupported class label {other}"
            ))),
        })
        .collect()
}

fn validate_classes(classes: &[String]) -> Result<(), ArtifactError> {
    if classes.len() < 2 {
        return Err(ArtifactError::Invalid(format!(
            "need at least two classes, got {}",
            classes.len()
        )));
    }
    for (i, class) in classes.iter().enumerate() {
        if classes[..i].contains(class) {
            return Err(ArtifactError::Invalid(format!("duplicate class {class:?}")));
        }
    }
    Ok(())
}

fn uniform_width(rows: &[Vec<f64>], what: &'static str) -> Result<usize, ArtifactError> {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    for row in rows {
        if row.len() != width {
            return Err(ArtifactError::ShapeMismatch {
                what,
                expected: width,
                found: row.len(),
            });
        }
    }
    Ok(width)
}

fn check_width(features: &FeatureMatrix, n_features: usize) -> Result<(), ArtifactError> {
    if features.dim() != n_features {
        return Err(ArtifactError::ShapeMismatch {
            what: "feature count",
            expected: n_features,
            found: features.dim(),
        });
    }
    Ok(())
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    normalize_sum(exps)
}

fn normalize_sum(mut values: Vec<f64>) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total > 0.0 {
        for v in &mut values {
            *v /= total;
        }
    }
    values
}

fn argmax(row: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn binary_lr() -> LogisticRegression {
        LogisticRegression::new(LogisticRegressionParams {
            classes: labels(&["negative", "positive"]),
            coef: vec![vec![-2.0, 3.0]],
            intercept: vec![0.5],
            multi_class: MultiClass::Auto,
        })
        .unwrap()
    }

    fn assert_sums_to_one(rows: &[Vec<f64>]) {
        for (i, row) in rows.iter().enumerate() {
            let total: f64 = row.iter().sum();
            assert!((total - 1.0).abs() < 1e-9, "row {i} sums to {total}");
        }
    }

    #[test]
    fn binary_logistic_uses_sigmoid() {
        let clf = binary_lr();
        let x = FeatureMatrix::from_rows(2, &[vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        let out = clf.classify(&x).unwrap();

        let p = 1.0 / (1.0 + (-3.5f64).exp());
        assert!((out.probabilities[0][1] - p).abs() < 1e-12);
        assert!((out.probabilities[0][0] - (1.0 - p)).abs() < 1e-12);
        assert_eq!(out.labels, vec!["positive", "negative"]);
        assert_sums_to_one(&out.probabilities);
    }

    #[test]
    fn binary_multinomial_is_softmax_of_negated_pair() {
        let clf = LogisticRegression::new(LogisticRegressionParams {
            classes: labels(&["negative", "positive"]),
            coef: vec![vec![-2.0, 3.0]],
            intercept: vec![0.5],
            multi_class: MultiClass::Multinomial,
        })
        .unwrap();
        let x = FeatureMatrix::from_rows(2, &[vec![0.0, 1.0]]).unwrap();
        let probs = clf.predict_proba(&x).unwrap();

        // softmax([-z, z]) = σ(2z) with z = 3.5.
        let p = 1.0 / (1.0 + (-7.0f64).exp());
        assert!((probs[0][1] - p).abs() < 1e-12);
        assert!((probs[0][0] - (1.0 - p)).abs() < 1e-12);

        let sigmoid_p = binary_lr().predict_proba(&x).unwrap()[0][1];
        assert!(probs[0][1] > sigmoid_p);
    }

    #[test]
    fn auto_multiclass_is_softmax() {
        let params = |multi_class| LogisticRegressionParams {
            classes: labels(&["a", "b", "c"]),
            coef: vec![vec![1.0], vec![0.0], vec![-1.0]],
            intercept: vec![0.0, 0.0, 0.0],
            multi_class,
        };
        let x = FeatureMatrix::from_rows(1, &[vec![1.0]]).unwrap();
        let auto = LogisticRegression::new(params(MultiClass::Auto))
            .unwrap()
            .predict_proba(&x)
            .unwrap();
        let multinomial = LogisticRegression::new(params(MultiClass::Multinomial))
            .unwrap()
            .predict_proba(&x)
            .unwrap();
        assert_eq!(auto, multinomial);
    }

    #[test]
    fn sparse_rows_ignore_absent_columns() {
        let clf = binary_lr();
        let mut x = FeatureMatrix::new(2);
        x.push_row([(1, 1.0)]).unwrap();
        x.push_row(std::iter::empty()).unwrap();
        let probs = clf.predict_proba(&x).unwrap();

        let p = 1.0 / (1.0 + (-3.5f64).exp());
        assert!((probs[0][1] - p).abs() < 1e-12);
        let intercept_only = 1.0 / (1.0 + (-0.5f64).exp());
        assert!((probs[1][1] - intercept_only).abs() < 1e-12);
    }

    #[test]
    fn multinomial_softmax() {
        let clf = LogisticRegression::new(LogisticRegressionParams {
            classes: labels(&["negative", "neutral", "positive"]),
            coef: vec![vec![1.0, 0.0], vec![0.0, 0.0], vec![0.0, 1.0]],
            intercept: vec![0.0, 0.0, 0.0],
            multi_class: MultiClass::Multinomial,
        })
        .unwrap();
        let x = FeatureMatrix::from_rows(2, &[vec![0.0, 2.0]]).unwrap();
        let out = clf.classify(&x).unwrap();

        let denom = 1.0 + 1.0 + 2.0f64.exp();
        assert!((out.probabilities[0][2] - 2.0f64.exp() / denom).abs() < 1e-12);
        assert!((out.probabilities[0][0] - 1.0 / denom).abs() < 1e-12);
        assert_eq!(out.labels, vec!["positive"]);
    }

    #[test]
    fn ovr_normalizes_sigmoids() {
        let clf = LogisticRegression::new(LogisticRegressionParams {
            classes: labels(&["a", "b", "c"]),
            coef: vec![vec![1.0], vec![0.0], vec![-1.0]],
            intercept: vec![0.0, 0.0, 0.0],
            multi_class: MultiClass::Ovr,
        })
        .unwrap();
        let x = FeatureMatrix::from_rows(1, &[vec![1.0]]).unwrap();
        let probs = clf.predict_proba(&x).unwrap();
        assert_sums_to_one(&probs);
        assert!(probs[0][0] > probs[0][1] && probs[0][1] > probs[0][2]);
    }

    #[test]
    fn ties_pick_first_class() {
        let clf = binary_lr();
        // Score exactly zero: z = -2*0.25 + 3*0 + 0.5.
        let x = FeatureMatrix::from_rows(2, &[vec![0.25, 0.0]]).unwrap();
        let out = clf.classify(&x).unwrap();
        assert_eq!(out.labels, vec!["negative"]);
    }

    #[test]
    fn naive_bayes_posterior() {
        let clf = MultinomialNb::new(MultinomialNbParams {
            classes: labels(&["negative", "positive"]),
            class_log_prior: vec![0.5f64.ln(), 0.5f64.ln()],
            feature_log_prob: vec![
                vec![0.8f64.ln(), 0.2f64.ln()],
                vec![0.2f64.ln(), 0.8f64.ln()],
            ],
        })
        .unwrap();
        let x = FeatureMatrix::from_rows(2, &[vec![0.0, 2.0], vec![1.0, 1.0]]).unwrap();
        let out = clf.classify(&x).unwrap();

        // 0.8² / (0.8² + 0.2²)
        assert!((out.probabilities[0][1] - 0.64 / 0.68).abs() < 1e-9);
        assert_eq!(out.labels[0], "positive");
        assert!((out.probabilities[1][0] - 0.5).abs() < 1e-9);
        assert_sums_to_one(&out.probabilities);
    }

    #[test]
    fn wrong_feature_width_is_shape_mismatch() {
        let clf = binary_lr();
        let x = FeatureMatrix::from_rows(3, &[vec![0.0, 0.0, 1.0]]).unwrap();
        let err = clf.classify(&x).unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::ShapeMismatch {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn rejects_inconsistent_shapes() {
        let err = LogisticRegression::new(LogisticRegressionParams {
            classes: labels(&["a", "b", "c"]),
            coef: vec![vec![1.0], vec![1.0]],
            intercept: vec![0.0, 0.0],
            multi_class: MultiClass::Multinomial,
        })
        .unwrap_err();
        assert!(matches!(err, ArtifactError::ShapeMismatch { .. }));

        let err = MultinomialNb::new(MultinomialNbParams {
            classes: labels(&["a", "a"]),
            class_log_prior: vec![0.0, 0.0],
            feature_log_prob: vec![vec![0.0], vec![0.0]],
        })
        .unwrap_err();
        assert!(matches!(err, ArtifactError::Invalid(_)));
    }

    #[test]
    fn integer_class_labels_accepted() {
        let params: LogisticRegressionParams = serde_json::from_str(
            r#"{"classes": [0, 1], "coef": [[1.0]], "intercept": [0.0]}"#,
        )
        .unwrap();
        assert_eq!(params.classes, vec!["0", "1"]);
        assert_eq!(params.multi_class, MultiClass::Auto);

        let params: LogisticRegressionParams = serde_json::from_str(
            r#"{"classes": [0, 1], "coef": [[1.0]], "intercept": [0.0], "multi_class": "multinomial"}"#,
        )
        .unwrap();
        assert_eq!(params.multi_class, MultiClass::Multinomial);
    }

    #[test]
    fn empty_batch_gives_no_rows() {
        let clf = binary_lr();
        let x = FeatureMatrix::zeros(0, 2);
        let out = clf.classify(&x).unwrap();
        assert!(out.labels.is_empty());
        assert!(out.probabilities.is_empty());
    }
}
