#![allow(dead_code)]

//! Vector space construction — batch-local TF-IDF over unigrams and bigrams.
//!
//! Every call builds its vocabulary and IDF weights from exactly the documents
//! it is given. Nothing is cached between calls: the same job text can weigh
//! differently depending on which other jobs share its batch.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::matching::stopwords::is_stop_word;
use crate::matching::MatcherSettings;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// Why a batch produced no usable vector space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateReason {
    NoDocuments,
    /// Every document was empty or contained only stopwords / short tokens.
    EmptyVocabulary,
}

/// Result of vectorizing a batch. Degenerate batches are a normal outcome,
/// not an error: callers map them to zero scores.
#[derive(Debug, Clone)]
pub enum Vectorization {
    Space(TermVectorSpace),
    Degenerate(DegenerateReason),
}

/// One L2-normalized sparse TF-IDF vector. Keyed by vocabulary index; ordered
/// so dot products sum deterministically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    weights: BTreeMap<usize, f64>,
}

impl TermVector {
    pub fn is_zero(&self) -> bool {
        self.weights.is_empty()
    }

    /// Cosine similarity. Both sides are unit length (or empty), so this is the
    /// dot product; an empty vector is orthogonal to everything.
    pub fn cosine(&self, other: &TermVector) -> f64 {
        let (small, large) = if self.weights.len() <= other.weights.len() {
            (&self.weights, &other.weights)
        } else {
            (&other.weights, &self.weights)
        };

        small
            .iter()
            .filter_map(|(idx, w)| large.get(idx).map(|o| w * o))
            .fold(0.0, |acc, x| acc + x)
    }
}

/// Shared term space for one batch: `vectors[i]` belongs to `documents[i]`.
#[derive(Debug, Clone)]
pub struct TermVectorSpace {
    vocabulary: Vec<String>,
    idf: Vec<f64>,
    vectors: Vec<TermVector>,
}

impl TermVectorSpace {
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vector(&self, doc: usize) -> Option<&TermVector> {
        self.vectors.get(doc)
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary
            .binary_search_by(|t| t.as_str().cmp(term))
            .ok()
            .map(|idx| self.idf[idx])
    }

    /// Cosine similarity between documents `a` and `b`; 0.0 for unknown indices.
    pub fn similarity(&self, a: usize, b: usize) -> f64 {
        match (self.vectors.get(a), self.vectors.get(b)) {
            (Some(va), Some(vb)) => va.cosine(vb),
            _ => 0.0,
        }
    }

    /// The `n` highest-weighted terms of document `doc`, ties broken by term.
    pub fn top_terms(&self, doc: usize, n: usize) -> Vec<(String, f64)> {
        let Some(vector) = self.vectors.get(doc) else {
            return vec![];
        };

        let mut terms: Vec<(usize, f64)> = vector.weights.iter().map(|(i, w)| (*i, *w)).collect();
        terms.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        terms
            .into_iter()
            .take(n)
            .map(|(idx, w)| (self.vocabulary[idx].clone(), w))
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Construction
// ────────────────────────────────────────────────────────────────────────────

/// Splits a normalized document into candidate terms: short tokens and
/// stopwords are dropped first, then n-grams are formed over what remains.
pub fn extract_terms(document: &str, settings: &MatcherSettings) -> Vec<String> {
    let tokens: Vec<&str> = document
        .split_whitespace()
        .filter(|t| t.chars().count() >= settings.min_token_len)
        .filter(|t| !is_stop_word(t))
        .collect();

    let (min_n, max_n) = settings.ngram_range;
    let mut terms = Vec::new();
    for n in min_n..=max_n {
        if n == 0 || n > tokens.len() {
            continue;
        }
        terms.extend(tokens.windows(n).map(|w| w.join(" ")));
    }
    terms
}

/// Builds the TF-IDF space for one batch of already-normalized documents.
///
/// - tf: raw term count in the document
/// - idf: `ln((1 + n) / (1 + df)) + 1`
/// - vocabulary capped at `max_features` terms by total count across the
///   batch, ties broken alphabetically
/// - each vector L2-normalized
pub fn build_vector_space<S: AsRef<str>>(
    documents: &[S],
    settings: &MatcherSettings,
) -> Vectorization {
    if documents.is_empty() {
        return Vectorization::Degenerate(DegenerateReason::NoDocuments);
    }

    let doc_counts: Vec<HashMap<String, usize>> = documents
        .iter()
        .map(|doc| {
            let mut counts = HashMap::new();
            for term in extract_terms(doc.as_ref(), settings) {
                *counts.entry(term).or_insert(0) += 1;
            }
            counts
        })
        .collect();

    let mut totals: HashMap<&str, (usize, usize)> = HashMap::new(); // term → (count, df)
    for counts in &doc_counts {
        for (term, count) in counts {
            let entry = totals.entry(term.as_str()).or_insert((0, 0));
            entry.0 += count;
            entry.1 += 1;
        }
    }

    if totals.is_empty() {
        return Vectorization::Degenerate(DegenerateReason::EmptyVocabulary);
    }

    let mut ranked: Vec<(&str, usize, usize)> =
        totals.into_iter().map(|(t, (c, df))| (t, c, df)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    ranked.truncate(settings.max_features);
    ranked.sort_by(|a, b| a.0.cmp(b.0));

    let n_docs = documents.len() as f64;
    let vocabulary: Vec<String> = ranked.iter().map(|(t, _, _)| t.to_string()).collect();
    let idf: Vec<f64> = ranked
        .iter()
        .map(|(_, _, df)| ((1.0 + n_docs) / (1.0 + *df as f64)).ln() + 1.0)
        .collect();
    let index: HashMap<&str, usize> = vocabulary
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    let vectors = doc_counts
        .iter()
        .map(|counts| {
            let mut weights: BTreeMap<usize, f64> = counts
                .iter()
                .filter_map(|(term, tf)| {
                    index
                        .get(term.as_str())
                        .map(|&i| (i, *tf as f64 * idf[i]))
                })
                .collect();

            let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                weights.values_mut().for_each(|w| *w /= norm);
            }
            TermVector { weights }
        })
        .collect();

    Vectorization::Space(TermVectorSpace {
        vocabulary,
        idf,
        vectors,
    })
}
