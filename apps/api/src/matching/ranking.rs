#![allow(dead_code)]

//! Ranking — orders jobs for a skill set, or candidates for a job.
//!
//! `AppState` holds an `Arc<dyn RankingStrategy<Uuid>>`, chosen at startup:
//! - `TfidfRanker`: genuine scores from the matching engine.
//! - `RandomSampleRanker`: demo fallback with synthetic scores. Every entry it
//!   produces is tagged `ScoreSource::Synthetic`.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::MatchError;
use crate::matching::scorer::{score, score_all, MatchScore};
use crate::matching::MatcherSettings;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Where a score came from. Synthetic scores are never mixed with computed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Computed,
    Synthetic,
}

/// What the candidates are ranked against.
#[derive(Debug, Clone, Copy)]
pub enum Reference<'a> {
    /// A seeker's skills; candidates carry job text.
    Skills(&'a [String]),
    /// A job description; candidates carry skill lists.
    JobText(&'a str),
}

impl Reference<'_> {
    fn expected_payload(&self) -> &'static str {
        match self {
            Reference::Skills(_) => "job text",
            Reference::JobText(_) => "skills",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidatePayload {
    JobText(Option<String>),
    Skills(Vec<String>),
}

impl CandidatePayload {
    fn kind(&self) -> &'static str {
        match self {
            CandidatePayload::JobText(_) => "job text",
            CandidatePayload::Skills(_) => "skills",
        }
    }

    fn is_usable(&self) -> bool {
        match self {
            CandidatePayload::JobText(text) => text.as_deref().is_some_and(|t| !t.is_empty()),
            CandidatePayload::Skills(skills) => !skills.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<Id> {
    pub id: Id,
    pub payload: CandidatePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEntry<Id> {
    pub id: Id,
    pub score: MatchScore,
    pub source: ScoreSource,
}

/// Entries by score descending; equal scores keep input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedList<Id> {
    pub entries: Vec<ScoredEntry<Id>>,
    pub source: ScoreSource,
}

impl<Id> RankedList<Id> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_synthetic(&self) -> bool {
        self.source == ScoreSource::Synthetic
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The ranking strategy trait. Implement this to swap backends without
/// touching handlers.
pub trait RankingStrategy<Id>: Send + Sync {
    fn source(&self) -> ScoreSource;

    fn rank(
        &self,
        reference: Reference<'_>,
        candidates: Vec<Candidate<Id>>,
        limit: usize,
    ) -> Result<RankedList<Id>, MatchError>;
}

// ────────────────────────────────────────────────────────────────────────────
// TfidfRanker — default
// ────────────────────────────────────────────────────────────────────────────

/// Pairwise TF-IDF scoring of every candidate against the reference.
pub struct TfidfRanker {
    pub settings: MatcherSettings,
}

impl TfidfRanker {
    pub fn new(settings: MatcherSettings) -> Self {
        Self { settings }
    }
}

impl<Id: Send> RankingStrategy<Id> for TfidfRanker {
    fn source(&self) -> ScoreSource {
        ScoreSource::Computed
    }

    fn rank(
        &self,
        reference: Reference<'_>,
        candidates: Vec<Candidate<Id>>,
        limit: usize,
    ) -> Result<RankedList<Id>, MatchError> {
        rank(reference, candidates, limit, &self.settings)
    }
}

/// Scores each candidate against `reference`, sorts by score descending
/// (stable), and keeps at most `limit` entries. Candidates with no usable text
/// score 0 and sort below every usable candidate.
pub fn rank<Id>(
    reference: Reference<'_>,
    candidates: Vec<Candidate<Id>>,
    limit: usize,
    settings: &MatcherSettings,
) -> Result<RankedList<Id>, MatchError> {
    check_payloads(&reference, &candidates)?;

    let mut scored: Vec<(bool, ScoredEntry<Id>)> = candidates
        .into_iter()
        .map(|candidate| {
            let usable = candidate.payload.is_usable();
            let value = if usable {
                score_payload(&reference, &candidate.payload, settings)
            } else {
                MatchScore::ZERO
            };
            (
                usable,
                ScoredEntry {
                    id: candidate.id,
                    score: value,
                    source: ScoreSource::Computed,
                },
            )
        })
        .collect();

    scored.sort_by(|(ua, a), (ub, b)| {
        ub.cmp(ua)
            .then_with(|| b.score.value().total_cmp(&a.score.value()))
    });
    scored.truncate(limit);

    Ok(RankedList {
        entries: scored.into_iter().map(|(_, entry)| entry).collect(),
        source: ScoreSource::Computed,
    })
}

fn check_payloads<Id>(
    reference: &Reference<'_>,
    candidates: &[Candidate<Id>],
) -> Result<(), MatchError> {
    let expected = reference.expected_payload();
    match candidates
        .iter()
        .position(|c| c.payload.kind() != expected)
    {
        Some(index) => Err(MatchError::MismatchedCandidate {
            index,
            expected,
            found: candidates[index].payload.kind(),
        }),
        None => Ok(()),
    }
}

fn score_payload(
    reference: &Reference<'_>,
    payload: &CandidatePayload,
    settings: &MatcherSettings,
) -> MatchScore {
    match (reference, payload) {
        (Reference::Skills(skills), CandidatePayload::JobText(Some(text))) => {
            score(*skills, text, settings)
        }
        (Reference::JobText(text), CandidatePayload::Skills(skills)) => {
            score(skills.as_slice(), text, settings)
        }
        _ => MatchScore::ZERO,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RandomSampleRanker — demo fallback
// ────────────────────────────────────────────────────────────────────────────

/// Fallback used only when no real scorer is configured: an unordered random
/// sample with synthetic scores drawn from `score_range`.
pub struct RandomSampleRanker {
    pub sample_size: usize,
    pub score_range: RangeInclusive<u32>,
    /// Fixed seed for reproducible samples; entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for RandomSampleRanker {
    fn default() -> Self {
        Self {
            sample_size: 5,
            score_range: 70..=95,
            seed: None,
        }
    }
}

impl<Id: Send> RankingStrategy<Id> for RandomSampleRanker {
    fn source(&self) -> ScoreSource {
        ScoreSource::Synthetic
    }

    fn rank(
        &self,
        _reference: Reference<'_>,
        candidates: Vec<Candidate<Id>>,
        limit: usize,
    ) -> Result<RankedList<Id>, MatchError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let amount = self.sample_size.min(limit).min(candidates.len());
        let picks = rand::seq::index::sample(&mut rng, candidates.len(), amount);

        let mut slots: Vec<Option<Candidate<Id>>> = candidates.into_iter().map(Some).collect();
        let entries = picks
            .iter()
            .filter_map(|i| slots[i].take())
            .map(|candidate| ScoredEntry {
                id: candidate.id,
                score: MatchScore::from_raw(f64::from(rng.gen_range(self.score_range.clone()))),
                source: ScoreSource::Synthetic,
            })
            .collect();

        info!(sampled = amount, "Ranking with random fallback (synthetic scores)");

        Ok(RankedList {
            entries,
            source: ScoreSource::Synthetic,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Recommendation and listing helpers
// ────────────────────────────────────────────────────────────────────────────

/// Top jobs for a skill set.
pub fn recommend_jobs<Id>(
    strategy: &dyn RankingStrategy<Id>,
    skills: &[String],
    jobs: Vec<Candidate<Id>>,
    limit: usize,
) -> Result<RankedList<Id>, MatchError> {
    strategy.rank(Reference::Skills(skills), jobs, limit)
}

/// Top candidates for a job. For computed rankings, seekers without skills are
/// skipped and scores must exceed `min_score`; the synthetic fallback samples
/// every seeker.
pub fn recommend_candidates<Id>(
    strategy: &dyn RankingStrategy<Id>,
    job_text: &str,
    seekers: Vec<Candidate<Id>>,
    limit: usize,
    min_score: f64,
) -> Result<RankedList<Id>, MatchError> {
    if strategy.source() == ScoreSource::Synthetic {
        return strategy.rank(Reference::JobText(job_text), seekers, limit);
    }

    let seekers: Vec<Candidate<Id>> = seekers
        .into_iter()
        .filter(|c| !matches!(&c.payload, CandidatePayload::Skills(s) if s.is_empty()))
        .collect();

    let mut ranked = strategy.rank(Reference::JobText(job_text), seekers, usize::MAX)?;
    ranked.entries.retain(|e| e.score.value() > min_score);
    ranked.entries.truncate(limit);
    Ok(ranked)
}

/// A job in a listing, with its batch score when the viewer has skills.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedJob<Id> {
    pub id: Id,
    pub match_score: Option<MatchScore>,
}

/// Annotates a job listing with batch scores. With skills, every job is
/// scored in one joint space and the listing is stably sorted by score; with
/// no skills, scores are absent and input order is kept.
pub fn annotate_listing<Id>(
    skills: &[String],
    jobs: Vec<(Id, Option<String>)>,
    settings: &MatcherSettings,
) -> Vec<ListedJob<Id>> {
    if skills.is_empty() {
        return jobs
            .into_iter()
            .map(|(id, _)| ListedJob {
                id,
                match_score: None,
            })
            .collect();
    }

    let texts: Vec<&str> = jobs
        .iter()
        .map(|(_, text)| text.as_deref().unwrap_or(""))
        .collect();
    let scores = score_all(skills, &texts, settings).into_scores();

    let mut listed: Vec<ListedJob<Id>> = jobs
        .into_iter()
        .zip(scores)
        .map(|((id, _), s)| ListedJob {
            id,
            match_score: Some(s),
        })
        .collect();

    listed.sort_by(|a, b| {
        let sa = a.match_score.unwrap_or_default().value();
        let sb = b.match_score.unwrap_or_default().value();
        sb.total_cmp(&sa)
    });
    listed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: u32, text: &str) -> Candidate<u32> {
        Candidate {
            id,
            payload: CandidatePayload::JobText(Some(text.to_string())),
        }
    }

    fn seeker(id: u32, skills: &[&str]) -> Candidate<u32> {
        Candidate {
            id,
            payload: CandidatePayload::Skills(skills.iter().map(|s| s.to_string()).collect()),
        }
    }

    fn skills(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn ids<Id: Copy>(list: &RankedList<Id>) -> Vec<Id> {
        list.entries.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_rank_orders_by_score_descending() {
        let s = skills(&["python", "sql"]);
        let jobs = vec![
            job(1, "Java Spring backend"),
            job(2, "Python and SQL data analyst"),
            job(3, "Python scripting"),
        ];
        let ranked = rank(Reference::Skills(&s), jobs, 10, &MatcherSettings::default()).unwrap();
        assert_eq!(ids(&ranked), vec![2, 3, 1]);
        assert_eq!(ranked.source, ScoreSource::Computed);
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let s = skills(&["rust"]);
        let jobs = vec![
            job(7, "Java Spring backend"),
            job(3, "Kotlin Android"),
            job(5, "Ruby on Rails"),
        ];
        let ranked = rank(Reference::Skills(&s), jobs, 10, &MatcherSettings::default()).unwrap();
        assert!(ranked.entries.iter().all(|e| e.score == MatchScore::ZERO));
        assert_eq!(ids(&ranked), vec![7, 3, 5]);
    }

    #[test]
    fn test_unusable_candidates_sink_to_bottom() {
        let s = skills(&["rust"]);
        let jobs = vec![
            Candidate {
                id: 1,
                payload: CandidatePayload::JobText(None),
            },
            job(2, "Java Spring backend"),
            job(3, ""),
            job(4, "Rust systems engineer"),
        ];
        let ranked = rank(Reference::Skills(&s), jobs, 10, &MatcherSettings::default()).unwrap();
        assert_eq!(ids(&ranked), vec![4, 2, 1, 3]);
    }

    #[test]
    fn test_rank_truncates_to_limit() {
        let s = skills(&["python"]);
        let jobs = (0..20).map(|i| job(i, "Python developer")).collect();
        let ranked = rank(Reference::Skills(&s), jobs, 10, &MatcherSettings::default()).unwrap();
        assert_eq!(ranked.len(), 10);
        assert_eq!(ids(&ranked), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_rank_candidates_for_job() {
        let seekers = vec![seeker(1, &["java"]), seeker(2, &["python", "sql"])];
        let ranked = rank(
            Reference::JobText("We need a Python developer skilled in SQL"),
            seekers,
            10,
            &MatcherSettings::default(),
        )
        .unwrap();
        assert_eq!(ids(&ranked), vec![2, 1]);
    }

    #[test]
    fn test_mismatched_payload_is_rejected() {
        let s = skills(&["python"]);
        let err = rank(
            Reference::Skills(&s),
            vec![job(1, "Python"), seeker(2, &["python"])],
            10,
            &MatcherSettings::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            MatchError::MismatchedCandidate {
                index: 1,
                expected: "job text",
                found: "skills",
            }
        );
    }

    #[test]
    fn test_tfidf_ranker_never_synthetic() {
        let ranker = TfidfRanker::new(MatcherSettings::default());
        let s = skills(&["python"]);
        let ranked =
            RankingStrategy::<u32>::rank(&ranker, Reference::Skills(&s), vec![job(1, "Python")], 10)
                .unwrap();
        assert!(!ranked.is_synthetic());
        assert!(ranked
            .entries
            .iter()
            .all(|e| e.source == ScoreSource::Computed));
    }

    #[test]
    fn test_random_fallback_is_flagged_and_bounded() {
        let ranker = RandomSampleRanker {
            seed: Some(42),
            ..RandomSampleRanker::default()
        };
        let s = skills(&["python"]);
        let jobs: Vec<Candidate<u32>> = (0..12).map(|i| job(i, "anything")).collect();
        let ranked = ranker.rank(Reference::Skills(&s), jobs, 10).unwrap();

        assert!(ranked.is_synthetic());
        assert_eq!(ranked.len(), 5);
        for entry in &ranked.entries {
            assert_eq!(entry.source, ScoreSource::Synthetic);
            assert!((70.0..=95.0).contains(&entry.score.value()));
            assert_eq!(entry.score.value().fract(), 0.0);
        }
        let mut unique = ids(&ranked);
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn test_random_fallback_is_reproducible_with_seed() {
        let ranker = RandomSampleRanker {
            seed: Some(7),
            ..RandomSampleRanker::default()
        };
        let s = skills(&["python"]);
        let make = || (0..12).map(|i| job(i, "anything")).collect::<Vec<_>>();
        let a = ranker.rank(Reference::Skills(&s), make(), 10).unwrap();
        let b = ranker.rank(Reference::Skills(&s), make(), 10).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_fallback_small_pool() {
        let ranker = RandomSampleRanker::default();
        let s = skills(&["python"]);
        let ranked = ranker
            .rank(Reference::Skills(&s), vec![job(1, "a"), job(2, "b")], 10)
            .unwrap();
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_recommend_candidates_filters_threshold_and_empty_skills() {
        let ranker = TfidfRanker::new(MatcherSettings::default());
        let seekers = vec![
            seeker(1, &[]),
            seeker(2, &["java"]),
            seeker(3, &["python", "sql"]),
        ];
        let ranked = recommend_candidates(
            &ranker,
            "We need a Python developer skilled in SQL and data analysis",
            seekers,
            10,
            30.0,
        )
        .unwrap();
        assert_eq!(ids(&ranked), vec![3]);
        assert!(ranked.entries[0].score.value() > 30.0);
    }

    #[test]
    fn test_recommend_candidates_fallback_samples_seekers_without_skills() {
        let ranker = RandomSampleRanker {
            seed: Some(3),
            ..RandomSampleRanker::default()
        };
        let seekers = vec![seeker(1, &[]), seeker(2, &[]), seeker(3, &["python"])];
        let ranked = recommend_candidates(&ranker, "Python developer", seekers, 10, 50.0).unwrap();
        assert!(ranked.is_synthetic());
        let mut sampled = ids(&ranked);
        sampled.sort_unstable();
        assert_eq!(sampled, vec![1, 2, 3]);
    }

    #[test]
    fn test_recommend_candidates_empty_job_text_returns_nothing() {
        let ranker = TfidfRanker::new(MatcherSettings::default());
        let seekers = vec![seeker(1, &["python"]), seeker(2, &["sql"])];
        let ranked = recommend_candidates(&ranker, "", seekers, 10, 50.0).unwrap();
        assert!(ranked.is_empty());
        assert!(!ranked.is_synthetic());
    }

    #[test]
    fn test_recommend_jobs_uses_strategy() {
        let ranker = TfidfRanker::new(MatcherSettings::default());
        let s = skills(&["rust"]);
        let ranked = recommend_jobs(
            &ranker,
            &s,
            vec![job(1, "Go services"), job(2, "Rust compiler work")],
            10,
        )
        .unwrap();
        assert_eq!(ids(&ranked), vec![2, 1]);
    }

    #[test]
    fn test_annotate_listing_without_skills_keeps_order() {
        let listed = annotate_listing(
            &[],
            vec![(1, Some("Rust".to_string())), (2, None)],
            &MatcherSettings::default(),
        );
        assert_eq!(
            listed,
            vec![
                ListedJob { id: 1, match_score: None },
                ListedJob { id: 2, match_score: None },
            ]
        );
    }

    #[test]
    fn test_annotate_listing_sorts_by_batch_score() {
        let s = skills(&["python", "sql"]);
        let listed = annotate_listing(
            &s,
            vec![
                (1, Some("Java Spring backend".to_string())),
                (2, None),
                (3, Some("Python SQL analyst".to_string())),
            ],
            &MatcherSettings::default(),
        );
        let order: Vec<u32> = listed.iter().map(|j| j.id).collect();
        assert_eq!(order, vec![3, 1, 2]);
        assert!(listed.iter().all(|j| j.match_score.is_some()));
    }
}
