#![allow(dead_code)]

//! Single-pair and batch scorers.
//!
//! Score = clamp(cosine × 100 + exact-match bonus, 0, 100), rounded to one
//! decimal. Empty input and degenerate vocabularies score 0.0; neither is an
//! error.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::matching::normalize::normalize;
use crate::matching::vectorizer::{build_vector_space, DegenerateReason, Vectorization};
use crate::matching::MatcherSettings;

const TOP_TERMS: usize = 5;

// ────────────────────────────────────────────────────────────────────────────
// MatchScore
// ────────────────────────────────────────────────────────────────────────────

/// Percentage relevance of a skill set to a job text. Always in [0, 100] with
/// at most one decimal place.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchScore(f64);

impl MatchScore {
    pub const ZERO: MatchScore = MatchScore(0.0);
    pub const MAX: MatchScore = MatchScore(100.0);

    /// Clamps to [0, 100] then rounds to one decimal. Clamping happens before
    /// rounding, so every raw value ≥ 100 collapses to the same 100.0.
    pub fn from_raw(raw: f64) -> Self {
        if raw.is_nan() {
            return Self::ZERO;
        }
        MatchScore(round_tenths(raw.clamp(0.0, 100.0)))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<MatchScore> for f64 {
    fn from(score: MatchScore) -> f64 {
        score.0
    }
}

/// Nearest tenth of the exact binary value of `x`, ties to even. `x * 10` is
/// not exact (0.15 is stored just below 0.15), so the midpoint test uses the
/// fused product `x * 20` and its rounding error.
fn round_tenths(x: f64) -> f64 {
    let lower = (x * 10.0).floor();
    let midpoint = 2.0 * lower + 1.0;
    let product = x * 20.0;
    let error = x.mul_add(20.0, -product);
    let offset = (product - midpoint) + error;

    let tenths = if offset < 0.0 {
        lower
    } else if offset > 0.0 {
        lower + 1.0
    } else if lower % 2.0 == 0.0 {
        lower
    } else {
        lower + 1.0
    };
    tenths / 10.0
}

// ────────────────────────────────────────────────────────────────────────────
// Single pair
// ────────────────────────────────────────────────────────────────────────────

/// Explainable score: the clamped result plus the parts it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchBreakdown {
    pub score: MatchScore,
    /// cosine × 100, before bonus and clamping.
    pub base: f64,
    pub bonus: f64,
    /// Skills (as supplied) found verbatim in the normalized job text.
    pub matched_skills: Vec<String>,
    /// Highest-weighted terms of the job text within this comparison.
    pub top_job_terms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degenerate: Option<DegenerateReason>,
}

impl MatchBreakdown {
    fn empty() -> Self {
        Self {
            score: MatchScore::ZERO,
            base: 0.0,
            bonus: 0.0,
            matched_skills: vec![],
            top_job_terms: vec![],
            degenerate: None,
        }
    }

    fn degenerate(reason: DegenerateReason) -> Self {
        Self {
            degenerate: Some(reason),
            ..Self::empty()
        }
    }
}

/// Scores one skill set against one job text.
pub fn score<S: AsRef<str>>(skills: &[S], job_text: &str, settings: &MatcherSettings) -> MatchScore {
    score_breakdown(skills, job_text, settings).score
}

/// `score` with its components exposed.
pub fn score_breakdown<S: AsRef<str>>(
    skills: &[S],
    job_text: &str,
    settings: &MatcherSettings,
) -> MatchBreakdown {
    if skills.is_empty() || job_text.is_empty() {
        return MatchBreakdown::empty();
    }

    let skills_text = normalize(&join_skills(skills));
    let job_norm = normalize(job_text);

    let space = match build_vector_space(&[skills_text, job_norm.clone()], settings) {
        Vectorization::Space(space) => space,
        Vectorization::Degenerate(reason) => {
            warn!(?reason, "Degenerate vocabulary for single match; scoring 0");
            return MatchBreakdown::degenerate(reason);
        }
    };

    let base = space.similarity(0, 1) * 100.0;
    let (bonus, matched_skills) = exact_match_bonus(skills, &job_norm, settings.exact_match_bonus);
    let score = MatchScore::from_raw(base + bonus);

    debug!(base, bonus, score = score.value(), "Scored skills against job");

    MatchBreakdown {
        score,
        base,
        bonus,
        matched_skills,
        top_job_terms: space
            .top_terms(1, TOP_TERMS)
            .into_iter()
            .map(|(term, _)| term)
            .collect(),
        degenerate: None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Batch
// ────────────────────────────────────────────────────────────────────────────

/// Outcome of scoring one skill set against many jobs in a shared space.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Scored(Vec<MatchScore>),
    /// The whole batch had no usable vocabulary; every position is zero.
    Degenerate {
        reason: DegenerateReason,
        scores: Vec<MatchScore>,
    },
}

impl BatchOutcome {
    pub fn scores(&self) -> &[MatchScore] {
        match self {
            BatchOutcome::Scored(scores) => scores,
            BatchOutcome::Degenerate { scores, .. } => scores,
        }
    }

    pub fn into_scores(self) -> Vec<MatchScore> {
        match self {
            BatchOutcome::Scored(scores) => scores,
            BatchOutcome::Degenerate { scores, .. } => scores,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, BatchOutcome::Degenerate { .. })
    }
}

/// Scores one skill set against every job in one joint TF-IDF space.
///
/// IDF is computed across the whole batch, so a job's score reflects its
/// standing among these jobs and differs from pairwise `score`. Output has the
/// same length and order as `job_texts`. Empty jobs still count toward IDF but
/// score 0.0.
pub fn score_all<S, J>(skills: &[S], job_texts: &[J], settings: &MatcherSettings) -> BatchOutcome
where
    S: AsRef<str>,
    J: AsRef<str>,
{
    if job_texts.is_empty() {
        return BatchOutcome::Scored(vec![]);
    }
    if skills.is_empty() {
        return BatchOutcome::Scored(vec![MatchScore::ZERO; job_texts.len()]);
    }

    let job_norms: Vec<String> = job_texts.iter().map(|j| normalize(j.as_ref())).collect();
    let mut documents = Vec::with_capacity(job_norms.len() + 1);
    documents.push(normalize(&join_skills(skills)));
    documents.extend(job_norms.iter().cloned());

    let space = match build_vector_space(&documents, settings) {
        Vectorization::Space(space) => space,
        Vectorization::Degenerate(reason) => {
            warn!(
                ?reason,
                jobs = job_texts.len(),
                "Degenerate vocabulary for batch match; scoring all 0"
            );
            return BatchOutcome::Degenerate {
                reason,
                scores: vec![MatchScore::ZERO; job_texts.len()],
            };
        }
    };

    let scores = job_texts
        .iter()
        .zip(&job_norms)
        .enumerate()
        .map(|(i, (raw, job_norm))| {
            if raw.as_ref().is_empty() {
                return MatchScore::ZERO;
            }
            let base = space.similarity(0, i + 1) * 100.0;
            let (bonus, _) = exact_match_bonus(skills, job_norm, settings.exact_match_bonus);
            MatchScore::from_raw(base + bonus)
        })
        .collect();

    BatchOutcome::Scored(scores)
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn join_skills<S: AsRef<str>>(skills: &[S]) -> String {
    skills
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `(matches / total) × max_bonus`, where a match is a skill whose lowercase
/// form is a substring of the normalized job text. Skills are not normalized,
/// so "c++" never matches. Duplicate skills each count.
fn exact_match_bonus<S: AsRef<str>>(
    skills: &[S],
    normalized_job: &str,
    max_bonus: f64,
) -> (f64, Vec<String>) {
    if skills.is_empty() {
        return (0.0, vec![]);
    }

    let matched: Vec<String> = skills
        .iter()
        .map(|s| s.as_ref())
        .filter(|s| normalized_job.contains(&s.to_lowercase()))
        .map(str::to_string)
        .collect();

    let bonus = matched.len() as f64 / skills.len() as f64 * max_bonus;
    (bonus, matched)
}
