pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route("/api/v1/match/score", post(handlers::handle_score))
        .route(
            "/api/v1/match/score-batch",
            post(handlers::handle_score_batch),
        )
        .route("/api/v1/match/jobs", post(handlers::handle_job_listing))
        // Recommendations API
        .route(
            "/api/v1/recommendations/jobs",
            post(handlers::handle_recommend_jobs),
        )
        .route(
            "/api/v1/recommendations/candidates",
            post(handlers::handle_recommend_candidates),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::{Config, ScorerBackend};

    fn test_state(backend: ScorerBackend) -> AppState {
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.scorer_backend = backend;
        AppState::new(config)
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(ScorerBackend::Tfidf));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_score_endpoint_returns_breakdown() {
        let app = build_router(test_state(ScorerBackend::Tfidf));
        let (status, body) = post_json(
            app,
            "/api/v1/match/score",
            json!({
                "skills": ["python", "sql"],
                "job_text": "We need a Python developer skilled in SQL and data analysis"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["score"].as_f64().unwrap() > 20.0);
        assert_eq!(body["bonus"].as_f64().unwrap(), 20.0);
        assert_eq!(body["matched_skills"], json!(["python", "sql"]));
    }

    #[tokio::test]
    async fn test_score_batch_preserves_length() {
        let app = build_router(test_state(ScorerBackend::Tfidf));
        let (status, body) = post_json(
            app,
            "/api/v1/match/score-batch",
            json!({
                "skills": ["rust"],
                "job_texts": ["Rust engineer", "", "Java developer"]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scores"].as_array().unwrap().len(), 3);
        assert_eq!(body["degenerate"], json!(false));
    }

    #[tokio::test]
    async fn test_job_listing_without_skills_has_null_scores() {
        let app = build_router(test_state(ScorerBackend::Tfidf));
        let id = Uuid::new_v4();
        let (status, body) = post_json(
            app,
            "/api/v1/match/jobs",
            json!({ "jobs": [{ "id": id, "description": "Rust engineer" }] }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["jobs"][0]["id"], json!(id));
        assert!(body["jobs"][0]["match_score"].is_null());
    }

    #[tokio::test]
    async fn test_recommend_jobs_without_skills_is_rejected() {
        let app = build_router(test_state(ScorerBackend::Tfidf));
        let (status, body) = post_json(
            app,
            "/api/v1/recommendations/jobs",
            json!({ "skills": [], "jobs": [] }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_recommend_jobs_computed_source() {
        let app = build_router(test_state(ScorerBackend::Tfidf));
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let (status, body) = post_json(
            app,
            "/api/v1/recommendations/jobs",
            json!({
                "skills": ["rust"],
                "jobs": [
                    { "id": a, "description": "Go services" },
                    { "id": b, "description": "Rust compiler engineer" }
                ]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "computed");
        assert_eq!(body["entries"][0]["id"], json!(b));
    }

    #[tokio::test]
    async fn test_recommend_candidates_empty_job_text_is_not_rejected() {
        let app = build_router(test_state(ScorerBackend::Tfidf));
        let (status, body) = post_json(
            app,
            "/api/v1/recommendations/candidates",
            json!({
                "job_text": "",
                "candidates": [{ "id": Uuid::new_v4(), "skills": ["python"] }]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "computed");
        assert_eq!(body["entries"], json!([]));
    }

    #[tokio::test]
    async fn test_recommend_candidates_fallback_is_labelled() {
        let app = build_router(test_state(ScorerBackend::Random));
        let candidates: Vec<Value> = (0..8)
            .map(|_| json!({ "id": Uuid::new_v4(), "skills": ["python"] }))
            .collect();
        let (status, body) = post_json(
            app,
            "/api/v1/recommendations/candidates",
            json!({ "job_text": "Python developer", "candidates": candidates }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "synthetic");
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 5);
        assert!(entries.iter().all(|e| e["source"] == "synthetic"));
    }
}
