//! Core text handling for Sentio: normalization, stemming, stopwords, and the
//! prediction types shared by the inference and API layers.

pub mod normalize;
pub mod prediction;
pub mod stem;
pub mod stopwords;

pub use normalize::{CleanedText, Normalizer, normalize};
pub use prediction::{Confidence, PredictionResult};
pub use stopwords::{Lexicon, LexiconStatus, Stopwords};
