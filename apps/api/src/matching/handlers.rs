//! Axum route handlers for the Matching API.
//!
//! Handlers only validate and reshape; scoring runs on the blocking pool since
//! it is pure CPU work.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::ranking::{
    annotate_listing, recommend_candidates, recommend_jobs, Candidate, CandidatePayload,
    ListedJob, RankedList,
};
use crate::matching::scorer::{score_all, score_breakdown, MatchBreakdown, MatchScore};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub skills: Vec<String>,
    pub job_text: String,
}

#[derive(Debug, Deserialize)]
pub struct ScoreBatchRequest {
    pub skills: Vec<String>,
    pub job_texts: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ScoreBatchResponse {
    pub scores: Vec<MatchScore>,
    pub degenerate: bool,
}

#[derive(Debug, Deserialize)]
pub struct JobInput {
    pub id: Uuid,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobListRequest {
    #[serde(default)]
    pub skills: Vec<String>,
    pub jobs: Vec<JobInput>,
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<ListedJob<Uuid>>,
}

#[derive(Debug, Deserialize)]
pub struct JobRecommendationRequest {
    pub skills: Vec<String>,
    pub jobs: Vec<JobInput>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateInput {
    pub id: Uuid,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateRecommendationRequest {
    pub job_text: String,
    pub candidates: Vec<CandidateInput>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/match/score
///
/// Scores one skill set against one job description, with the breakdown.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<MatchBreakdown>, AppError> {
    let settings = state.config.matcher.clone();
    let breakdown =
        run_blocking(move || score_breakdown(&request.skills, &request.job_text, &settings))
            .await?;
    Ok(Json(breakdown))
}

/// POST /api/v1/match/score-batch
///
/// Scores one skill set against many jobs in a shared vector space.
/// `scores[i]` belongs to `job_texts[i]`.
pub async fn handle_score_batch(
    State(state): State<AppState>,
    Json(request): Json<ScoreBatchRequest>,
) -> Result<Json<ScoreBatchResponse>, AppError> {
    let settings = state.config.matcher.clone();
    let outcome =
        run_blocking(move || score_all(&request.skills, &request.job_texts, &settings)).await?;

    Ok(Json(ScoreBatchResponse {
        degenerate: outcome.is_degenerate(),
        scores: outcome.into_scores(),
    }))
}

/// POST /api/v1/match/jobs
///
/// Annotates a job listing with match scores. Without skills every score is
/// null and the listing keeps its order.
pub async fn handle_job_listing(
    State(state): State<AppState>,
    Json(request): Json<JobListRequest>,
) -> Result<Json<JobListResponse>, AppError> {
    let settings = state.config.matcher.clone();
    let jobs = run_blocking(move || {
        let jobs = request
            .jobs
            .into_iter()
            .map(|job| (job.id, job.description))
            .collect();
        annotate_listing(&request.skills, jobs, &settings)
    })
    .await?;

    Ok(Json(JobListResponse { jobs }))
}

/// POST /api/v1/recommendations/jobs
///
/// Top jobs for a seeker's skills. A seeker without skills is rejected.
pub async fn handle_recommend_jobs(
    State(state): State<AppState>,
    Json(request): Json<JobRecommendationRequest>,
) -> Result<Json<RankedList<Uuid>>, AppError> {
    if request.skills.is_empty() {
        return Err(AppError::Validation(
            "Please add skills to your profile to get recommendations".to_string(),
        ));
    }

    let ranker = state.ranker.clone();
    let limit = state.config.recommendation_limit;
    let ranked = run_blocking(move || {
        let jobs = request
            .jobs
            .into_iter()
            .map(|job| Candidate {
                id: job.id,
                payload: CandidatePayload::JobText(job.description),
            })
            .collect();
        recommend_jobs(ranker.as_ref(), &request.skills, jobs, limit)
    })
    .await??;

    info!(
        returned = ranked.len(),
        synthetic = ranked.is_synthetic(),
        "Job recommendations ranked"
    );
    Ok(Json(ranked))
}

/// POST /api/v1/recommendations/candidates
///
/// Top seekers for a job description. Seekers without skills are skipped and
/// computed scores must clear `CANDIDATE_MIN_SCORE`. An empty description
/// scores everyone 0, so the list comes back empty rather than rejected.
pub async fn handle_recommend_candidates(
    State(state): State<AppState>,
    Json(request): Json<CandidateRecommendationRequest>,
) -> Result<Json<RankedList<Uuid>>, AppError> {
    let ranker = state.ranker.clone();
    let limit = state.config.recommendation_limit;
    let min_score = state.config.candidate_min_score;
    let ranked = run_blocking(move || {
        let seekers = request
            .candidates
            .into_iter()
            .map(|c| Candidate {
                id: c.id,
                payload: CandidatePayload::Skills(c.skills),
            })
            .collect();
        recommend_candidates(ranker.as_ref(), &request.job_text, seekers, limit, min_score)
    })
    .await??;

    info!(
        returned = ranked.len(),
        synthetic = ranked.is_synthetic(),
        "Candidate recommendations ranked"
    );
    Ok(Json(ranked))
}

async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("scoring task failed: {e}")))
}
