// Matching engine: skills ↔ job text similarity.
// normalize → batch-local TF-IDF → cosine → exact-match bonus → clamped score.
// Every call is self-contained; nothing here holds state across requests.

pub mod handlers;
pub mod normalize;
pub mod ranking;
pub mod scorer;
pub mod stopwords;
pub mod vectorizer;

use serde::{Deserialize, Serialize};

use crate::errors::MatchError;

/// Read-only construction parameters for the scorer, fixed at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherSettings {
    /// Vocabulary cap per batch.
    pub max_features: usize,
    /// Inclusive n-gram range; (1, 2) = unigrams + bigrams.
    pub ngram_range: (usize, usize),
    /// Tokens shorter than this never enter the vocabulary.
    pub min_token_len: usize,
    /// Points added when every skill appears verbatim in the job text.
    pub exact_match_bonus: f64,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            max_features: 10_000,
            ngram_range: (1, 2),
            min_token_len: 2,
            exact_match_bonus: 20.0,
        }
    }
}

impl MatcherSettings {
    pub fn validate(&self) -> Result<(), MatchError> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(MatchError::InvalidNgramRange { min_n, max_n });
        }
        if self.max_features == 0 {
            return Err(MatchError::ZeroMaxFeatures);
        }
        if !(0.0..=100.0).contains(&self.exact_match_bonus) {
            return Err(MatchError::InvalidBonus(self.exact_match_bonus));
        }
        Ok(())
    }
}
