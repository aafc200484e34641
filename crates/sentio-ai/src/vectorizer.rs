//! Bag-of-words feature extraction from a fitted vocabulary.
//!
//! [`TermWeighting`] reproduces the transform side of scikit-learn's
//! `CountVectorizer` and `TfidfVectorizer`: regex tokenization, optional word
//! n-grams, raw/binary/sublinear term frequency, optional idf weights, and
//! optional row normalization. Fitting happens offline; only the fitted state
//! is loaded here.

use std::collections::{BTreeMap, HashMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;

/// scikit-learn's default `token_pattern`: words of two or more characters.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Sparse row-major (CSR) feature matrix, one row per document.
///
/// Only non-zero cells are stored: memory follows the number of distinct
/// in-vocabulary terms in the batch, not `rows × dim`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    dim: usize,
    /// Row `i` owns `indices[indptr[i]..indptr[i + 1]]`.
    indptr: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl FeatureMatrix {
    /// A matrix with no rows yet.
    pub fn new(dim: usize) -> Self {
        Self::with_capacity(dim, 0)
    }

    pub fn with_capacity(dim: usize, rows: usize) -> Self {
        let mut indptr = Vec::with_capacity(rows + 1);
        indptr.push(0);
        Self {
            dim,
            indptr,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// `rows` empty rows.
    pub fn zeros(rows: usize, dim: usize) -> Self {
        Self {
            dim,
            indptr: vec![0; rows + 1],
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build from dense rows, all of which must have `dim` columns. Zero cells
    /// are dropped.
    pub fn from_rows(dim: usize, rows: &[Vec<f64>]) -> Result<Self, ArtifactError> {
        let mut matrix = Self::with_capacity(dim, rows.len());
        for row in rows {
            if row.len() != dim {
                return Err(ArtifactError::ShapeMismatch {
                    what: "feature row width",
                    expected: dim,
                    found: row.len(),
                });
            }
            matrix.push_row(
                row.iter()
                    .enumerate()
                    .filter(|(_, v)| **v != 0.0)
                    .map(|(i, &v)| (i, v)),
            )?;
        }
        Ok(matrix)
    }

    /// Append one row from `(column, value)` pairs.
    pub fn push_row<I>(&mut self, entries: I) -> Result<(), ArtifactError>
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let start = self.indices.len();
        for (col, value) in entries {
            if col >= self.dim {
                self.indices.truncate(start);
                self.values.truncate(start);
                return Err(ArtifactError::Invalid(format!(
                    "feature column {col} out of range 0..{}",
                    self.dim
                )));
            }
            self.indices.push(col);
            self.values.push(value);
        }
        self.indptr.push(self.indices.len());
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.indptr.len() - 1
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored cells across all rows.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn row(&self, i: usize) -> SparseRow<'_> {
        let (start, end) = (self.indptr[i], self.indptr[i + 1]);
        SparseRow {
            indices: &self.indices[start..end],
            values: &self.values[start..end],
        }
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = SparseRow<'_>> {
        (0..self.rows()).map(|i| self.row(i))
    }
}

/// Borrowed view of one matrix row.
#[derive(Debug, Clone, Copy)]
pub struct SparseRow<'a> {
    indices: &'a [usize],
    values: &'a [f64],
}

impl<'a> SparseRow<'a> {
    pub fn iter(self) -> impl Iterator<Item = (usize, f64)> + 'a {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Dot product with a dense weight vector. Columns past its end count as
    /// zero.
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.iter()
            .map(|(col, v)| v * weights.get(col).copied().unwrap_or(0.0))
            .sum()
    }

    pub fn to_dense(&self, dim: usize) -> Vec<f64> {
        let mut dense = vec![0.0; dim];
        for (col, v) in self.iter() {
            if let Some(cell) = dense.get_mut(col) {
                *cell += v;
            }
        }
        dense
    }
}

/// Maps cleaned text to fixed-width feature vectors.
///
/// Implementations are fitted offline and immutable once loaded.
pub trait Vectorizer: Send + Sync {
    /// Short name of the artifact kind, for diagnostics.
    fn kind(&self) -> &'static str;

    /// Width of every produced row.
    fn dim(&self) -> usize;

    /// One row per document, in input order. Out-of-vocabulary terms
    /// contribute nothing.
    fn transform(&self, docs: &[&str]) -> Result<FeatureMatrix, ArtifactError>;
}

/// Row normalization applied after weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

impl Norm {
    fn l2() -> Option<Norm> {
        Some(Norm::L2)
    }
}

/// How raw counts become term frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermFrequency {
    Raw,
    /// Any occurrence counts as 1.
    Binary,
    /// `1 + ln(count)`.
    Sublinear,
}

/// Tokenizer settings shared by the count and tf-idf artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerParams {
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    /// Terms removed after tokenization, when the vectorizer was fitted with
    /// its own stop list.
    #[serde(default)]
    pub stop_words: Vec<String>,
}

impl Default for TokenizerParams {
    fn default() -> Self {
        Self {
            token_pattern: default_token_pattern(),
            lowercase: true,
            ngram_range: default_ngram_range(),
            stop_words: Vec::new(),
        }
    }
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_true() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// Fitted state of a `CountVectorizer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountParams {
    pub vocabulary: HashMap<String, usize>,
    #[serde(flatten)]
    pub tokenizer: TokenizerParams,
    #[serde(default)]
    pub binary: bool,
}

/// Fitted state of a `TfidfVectorizer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfParams {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    #[serde(flatten)]
    pub tokenizer: TokenizerParams,
    #[serde(default)]
    pub binary: bool,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "Norm::l2")]
    pub norm: Option<Norm>,
}

/// Splits a document into the terms looked up in the vocabulary.
#[derive(Debug, Clone)]
struct Tokenizer {
    pattern: Regex,
    lowercase: bool,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
}

impl Tokenizer {
    fn new(params: TokenizerParams) -> Result<Self, ArtifactError> {
        let pattern = Regex::new(&params.token_pattern)?;
        // Group 0 plus at most one explicit capture group.
        if pattern.captures_len() > 2 {
            return Err(ArtifactError::Invalid(format!(
                "token pattern {:?} has more than one capture group",
                params.token_pattern
            )));
        }
        let (min_n, max_n) = params.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ArtifactError::Invalid(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }
        Ok(Self {
            pattern,
            lowercase: params.lowercase,
            ngram_range: params.ngram_range,
            stop_words: params.stop_words.into_iter().collect(),
        })
    }

    fn terms(&self, doc: &str) -> Vec<String> {
        let doc = if self.lowercase {
            doc.to_lowercase()
        } else {
            doc.to_string()
        };

        let group = if self.pattern.captures_len() == 2 { 1 } else { 0 };
        let words: Vec<&str> = self
            .pattern
            .captures_iter(&doc)
            .filter_map(|caps| caps.get(group).map(|m| m.as_str()))
            .filter(|w| !self.stop_words.contains(*w))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(words.len()) {
            for window in words.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }
}

/// Vocabulary lookup plus term weighting; the runtime form of both count and
/// tf-idf artifacts.
#[derive(Debug, Clone)]
pub struct TermWeighting {
    kind: &'static str,
    vocabulary: HashMap<String, usize>,
    idf: Option<Vec<f64>>,
    tokenizer: Tokenizer,
    tf: TermFrequency,
    norm: Option<Norm>,
}

impl TermWeighting {
    pub fn count(params: CountParams) -> Result<Self, ArtifactError> {
        validate_vocabulary(&params.vocabulary)?;
        Ok(Self {
            kind: "count",
            vocabulary: params.vocabulary,
            idf: None,
            tokenizer: Tokenizer::new(params.tokenizer)?,
            tf: if params.binary {
                TermFrequency::Binary
            } else {
                TermFrequency::Raw
            },
            norm: None,
        })
    }

    pub fn tfidf(params: TfidfParams) -> Result<Self, ArtifactError> {
        validate_vocabulary(&params.vocabulary)?;
        if params.idf.len() != params.vocabulary.len() {
            return Err(ArtifactError::ShapeMismatch {
                what: "idf length",
                expected: params.vocabulary.len(),
                found: params.idf.len(),
            });
        }
        let tf = match (params.binary, params.sublinear_tf) {
            (true, _) => TermFrequency::Binary,
            (false, true) => TermFrequency::Sublinear,
            (false, false) => TermFrequency::Raw,
        };
        Ok(Self {
            kind: "tfidf",
            vocabulary: params.vocabulary,
            idf: Some(params.idf),
            tokenizer: Tokenizer::new(params.tokenizer)?,
            tf,
            norm: params.norm,
        })
    }

    /// Apply tf, idf and norm to the non-zero `(column, count)` entries of a row.
    fn weigh_row(&self, row: &mut [(usize, f64)]) {
        for (col, v) in row.iter_mut() {
            *v = match self.tf {
                TermFrequency::Raw => *v,
                TermFrequency::Binary => 1.0,
                TermFrequency::Sublinear => v.ln() + 1.0,
            };
            if let Some(idf) = &self.idf {
                *v *= idf[*col];
            }
        }

        let total = match self.norm {
            None => return,
            Some(Norm::L1) => row.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            Some(Norm::L2) => row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
        };
        if total > 0.0 {
            for (_, v) in row.iter_mut() {
                *v /= total;
            }
        }
    }
}

impl Vectorizer for TermWeighting {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn dim(&self) -> usize {
        self.vocabulary.len()
    }

    fn transform(&self, docs: &[&str]) -> Result<FeatureMatrix, ArtifactError> {
        let mut matrix = FeatureMatrix::with_capacity(self.dim(), docs.len());
        for doc in docs {
            let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
            for term in self.tokenizer.terms(doc) {
                if let Some(&idx) = self.vocabulary.get(&term) {
                    *counts.entry(idx).or_insert(0.0) += 1.0;
                }
            }
            let mut row: Vec<(usize, f64)> = counts.into_iter().collect();
            self.weigh_row(&mut row);
            matrix.push_row(row)?;
        }
        Ok(matrix)
    }
}

/// Indices must be exactly `0..len`, each used once.
fn validate_vocabulary(vocabulary: &HashMap<String, usize>) -> Result<(), ArtifactError> {
    if vocabulary.is_empty() {
        return Err(ArtifactError::Invalid("empty vocabulary".into()));
    }
    let mut seen = vec![false; vocabulary.len()];
    for (term, &idx) in vocabulary {
        match seen.get_mut(idx) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => {
                return Err(ArtifactError::Invalid(format!(
                    "vocabulary index {idx} assigned twice (at {term:?})"
                )));
            }
            None => {
                return Err(ArtifactError::Invalid(format!(
                    "vocabulary index {idx} for {term:?} out of range 0..{}",
                    vocabulary.len()
                )));
            }
        }
    }
    Ok(())
}
