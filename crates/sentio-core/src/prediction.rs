//! Prediction results handed back to callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sentiment label and per-class confidence for one input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub sentiment: String,
    pub confidence: Confidence,
}

/// Per-class confidence as percentages rounded to two decimals.
///
/// Keyed by class label. Iteration and serialization follow label order, not
/// score order; use [`Confidence::ranked`] for highest-first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(BTreeMap<String, f64>);

impl Confidence {
    /// Pair each class with its probability, converted to a percentage.
    ///
    /// `classes` and `probabilities` are zipped in order; both come from the
    /// classifier and have the same length.
    pub fn from_probabilities(classes: &[String], probabilities: &[f64]) -> Self {
        Self(
            classes
                .iter()
                .zip(probabilities)
                .map(|(class, &p)| (class.clone(), to_percentage(p)))
                .collect(),
        )
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Sum of all percentages; 100 up to rounding.
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Labels sorted by score, highest first. Ties keep label order.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<(&str, f64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        entries
    }
}

/// Probability in [0, 1] → percentage rounded to two decimals.
pub fn to_percentage(probability: f64) -> f64 {
    let pct = probability * 100.0;
    (pct * 100.0).round() / 100.0
}
