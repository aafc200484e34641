//! Text normalization ahead of vectorization.
//!
//! Produces the exact token stream the sentiment vocabulary was fitted on:
//!
//! 1. every character that is not an ASCII letter becomes a space
//! 2. lowercase, split on whitespace
//! 3. drop stopwords (the negation token `not` is always kept)
//! 4. Porter-stem each surviving token
//! 5. join with single spaces
//!
//! Normalization cannot fail.

use std::fmt;

use serde::Serialize;

use crate::stem::stem;
use crate::stopwords::{Lexicon, LexiconStatus, NEGATION, Stopwords};

/// Space-joined stemmed tokens, ready for the vectorizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CleanedText(String);

impl CleanedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|t| !t.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CleanedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CleanedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize `text` against the given stopword set.
pub fn normalize(text: &str, stopwords: &Stopwords) -> CleanedText {
    let letters: String = text
        .chars()
        .map(|c| if c.is_ascii_alphabetic() { c.to_ascii_lowercase() } else { ' ' })
        .collect();

    let stems: Vec<String> = letters
        .split_whitespace()
        .filter(|token| *token == NEGATION || !stopwords.contains(token))
        .map(stem)
        .collect();

    CleanedText(stems.join(" "))
}

/// Normalizer bound to a loaded (or absent) stopword lexicon.
#[derive(Debug, Clone)]
pub struct Normalizer {
    lexicon: Lexicon,
}

impl Normalizer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    /// Normalizer with a fixed stopword set, for callers that manage the
    /// lexicon themselves.
    pub fn with_stopwords(stopwords: Stopwords) -> Self {
        Self::new(Lexicon::inline(stopwords))
    }

    pub fn normalize(&self, text: &str) -> CleanedText {
        normalize(text, &self.lexicon.stopwords)
    }

    pub fn normalize_all<S: AsRef<str>>(&self, texts: &[S]) -> Vec<CleanedText> {
        texts.iter().map(|t| self.normalize(t.as_ref())).collect()
    }

    pub fn lexicon_status(&self) -> &LexiconStatus {
        &self.lexicon.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn english() -> Stopwords {
        Lexicon::bundled().stopwords
    }

    #[test]
    fn mixed_case_sentence_keeps_negation() {
        let cleaned = normalize("I LOVE this!!! Not bad at all.", &english());
        assert_eq!(cleaned.as_str(), "love not bad");
    }

    #[test]
    fn negation_kept_even_if_listed() {
        // Parsing drops `not` from the set; the filter guards it regardless.
        let sw = Stopwords::parse("not\ngood");
        assert_eq!(normalize("not good", &sw).as_str(), "not");
    }

    #[test]
    fn non_letters_become_separators() {
        let cleaned = normalize("rock'n'roll 4ever_and-ever", &Stopwords::empty());
        assert_eq!(cleaned.as_str(), "rock n roll ever and ever");
    }

    #[test]
    fn non_ascii_letters_are_separators() {
        let cleaned = normalize("naïve café", &Stopwords::empty());
        assert_eq!(cleaned.as_str(), "na ve caf");
    }

    #[test]
    fn stems_each_token() {
        let cleaned = normalize("Loving the amazing movies", &english());
        assert_eq!(cleaned.as_str(), "love amaz movi");
    }

    #[test]
    fn empty_and_punctuation_only() {
        assert!(normalize("", &english()).is_empty());
        assert!(normalize("!!! 123 ...", &english()).is_empty());
    }

    #[test]
    fn empty_lexicon_keeps_all_tokens() {
        let cleaned = normalize("I love this", &Stopwords::empty());
        assert_eq!(cleaned.as_str(), "i love thi");
    }

    #[test]
    fn idempotent_on_cleaned_text() {
        let sw = english();
        let once = normalize("Not bad, I love this product; the service was great.", &sw);
        let twice = normalize(once.as_str(), &sw);
        assert_eq!(once, twice);
    }

    #[test]
    fn tokens_iterates_stems() {
        let cleaned = normalize("terrible awful service", &english());
        let tokens: Vec<&str> = cleaned.tokens().collect();
        assert_eq!(tokens, vec!["terribl", "aw", "servic"]);
    }

    #[test]
    fn normalizer_reports_lexicon_status() {
        let dir = tempfile::tempdir().unwrap();
        let normalizer = Normalizer::new(Lexicon::load(Some(&dir.path().join("missing"))));
        assert!(matches!(
            normalizer.lexicon_status(),
            LexiconStatus::Missing { .. }
        ));
        assert_eq!(normalizer.normalize("This is it").as_str(), "thi is it");
    }

    #[test]
    fn normalize_all_preserves_order() {
        let normalizer = Normalizer::with_stopwords(english());
        let out = normalizer.normalize_all(&["great movie", "", "bad plot"]);
        let strs: Vec<&str> = out.iter().map(|c| c.as_str()).collect();
        assert_eq!(strs, vec!["great movi", "", "bad plot"]);
    }
}
