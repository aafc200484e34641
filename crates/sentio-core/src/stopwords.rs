//! English stopword lexicon.
//!
//! The lexicon is a plain-text file with one word per line, laid out like
//! NLTK's `corpora/stopwords/english`. Without an explicit path, the NLTK data
//! directories are searched and the English list compiled into the crate is
//! the final fallback. An explicit path that cannot be read still loads, with
//! an empty set and [`LexiconStatus::Missing`], so normalization keeps working
//! with every token retained.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// Negation token kept even when the lexicon lists it.
pub const NEGATION: &str = "not";

/// Location of the English list below an NLTK data directory.
pub const LEXICON_RELATIVE_PATH: &str = "corpora/stopwords/english";

/// NLTK's English list, compiled in.
const BUNDLED_ENGLISH: &str = include_str!("../data/stopwords/english");

/// Set of tokens dropped during normalization.
#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    /// An empty set: every token survives.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set from words, lowercasing each and discarding [`NEGATION`].
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty() && w != NEGATION)
            .collect();
        Self { words }
    }

    /// Parse a one-word-per-line lexicon file body.
    pub fn parse(contents: &str) -> Self {
        Self::from_words(contents.lines())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Outcome of looking for the lexicon file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexiconStatus {
    Loaded { path: PathBuf, words: usize },
    /// No file found; the compiled-in English list is in use.
    Bundled { words: usize },
    /// Set supplied directly by the caller rather than read from disk.
    Inline { words: usize },
    /// Nothing readable was found; the stopword set is empty.
    Missing { reason: String },
}

/// A stopword set together with how it was obtained.
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub stopwords: Stopwords,
    pub status: LexiconStatus,
}

impl Lexicon {
    /// Locate and load the lexicon.
    ///
    /// An explicit path is the only candidate when given, and a missing file
    /// there yields [`LexiconStatus::Missing`]. Otherwise each `$NLTK_DATA`
    /// entry is tried, then `~/nltk_data`, then the bundled list.
    pub fn load(explicit: Option<&Path>) -> Self {
        for path in candidate_paths(explicit) {
            if path.is_file() {
                return Self::load_from(&path);
            }
        }

        match explicit {
            Some(path) => Self::missing(format!("not found at {}", path.display())),
            None => Self::bundled(),
        }
    }

    /// The English list compiled into the crate.
    pub fn bundled() -> Self {
        let stopwords = Stopwords::parse(BUNDLED_ENGLISH);
        info!(words = stopwords.len(), "using bundled stopword lexicon");
        Self {
            status: LexiconStatus::Bundled {
                words: stopwords.len(),
            },
            stopwords,
        }
    }

    /// Load the lexicon from one file, degrading to an empty set on failure.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let stopwords = Stopwords::parse(&contents);
                info!(path = %path.display(), words = stopwords.len(), "loaded stopword lexicon");
                Self {
                    status: LexiconStatus::Loaded {
                        path: path.to_path_buf(),
                        words: stopwords.len(),
                    },
                    stopwords,
                }
            }
            Err(e) => Self::missing(format!("read {}: {e}", path.display())),
        }
    }

    fn missing(reason: String) -> Self {
        warn!(%reason, "stopword lexicon unavailable, keeping all tokens");
        Self {
            stopwords: Stopwords::empty(),
            status: LexiconStatus::Missing { reason },
        }
    }

    /// Wrap a caller-supplied set.
    pub fn inline(stopwords: Stopwords) -> Self {
        Self {
            status: LexiconStatus::Inline {
                words: stopwords.len(),
            },
            stopwords,
        }
    }

    pub fn is_loaded(&self) -> bool {
        !matches!(self.status, LexiconStatus::Missing { .. })
    }
}

/// Candidate lexicon files in lookup order.
pub fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }

    let mut paths = Vec::new();
    if let Some(dirs) = std::env::var_os("NLTK_DATA") {
        paths.extend(std::env::split_paths(&dirs).map(|d| d.join(LEXICON_RELATIVE_PATH)));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join("nltk_data").join(LEXICON_RELATIVE_PATH));
    }
    paths
}
