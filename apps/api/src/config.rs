use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::matching::MatcherSettings;

/// Which ranking strategy the service runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerBackend {
    Tfidf,
    /// Demo fallback: random sample with synthetic scores.
    Random,
}

impl FromStr for ScorerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tfidf" => Ok(ScorerBackend::Tfidf),
            "random" => Ok(ScorerBackend::Random),
            other => bail!("SCORER_BACKEND must be 'tfidf' or 'random', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub matcher: MatcherSettings,
    pub recommendation_limit: usize,
    pub candidate_min_score: f64,
    pub scorer_backend: ScorerBackend,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = MatcherSettings::default();

        let matcher = MatcherSettings {
            max_features: parse_or(&lookup, "MATCH_MAX_FEATURES", defaults.max_features)?,
            exact_match_bonus: parse_or(&lookup, "MATCH_EXACT_BONUS", defaults.exact_match_bonus)?,
            ..defaults
        };
        matcher
            .validate()
            .context("Invalid matcher settings in environment")?;

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            matcher,
            recommendation_limit: parse_or(&lookup, "RECOMMENDATION_LIMIT", 10)?,
            candidate_min_score: parse_or(&lookup, "CANDIDATE_MIN_SCORE", 50.0)?,
            scorer_backend: parse_or(&lookup, "SCORER_BACKEND", ScorerBackend::Tfidf)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
    }
}
