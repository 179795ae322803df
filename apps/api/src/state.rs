use std::sync::Arc;

use uuid::Uuid;

use crate::config::{Config, ScorerBackend};
use crate::matching::ranking::{RandomSampleRanker, RankingStrategy, TfidfRanker};

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only after startup; scoring calls build their own vector spaces.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable ranking strategy. Default: TfidfRanker. Swap via SCORER_BACKEND.
    pub ranker: Arc<dyn RankingStrategy<Uuid>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let ranker: Arc<dyn RankingStrategy<Uuid>> = match config.scorer_backend {
            ScorerBackend::Tfidf => Arc::new(TfidfRanker::new(config.matcher.clone())),
            ScorerBackend::Random => Arc::new(RandomSampleRanker::default()),
        };
        Self { config, ranker }
    }
}
