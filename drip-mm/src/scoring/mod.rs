//! Compatibility scoring client
//!
//! The pairwise compatibility model lives in an external service; this
//! module defines the capability the matching engine consumes and the
//! HTTP implementation against the scoring endpoint.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Scoring failure, distinct from any legitimate low score.
///
/// The orchestrator recovers from these per-candidate with a neutral
/// fallback score; they never abort a match batch.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Request-level failure (connect, timeout, body read)
    #[error("scoring request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status from the scoring service
    #[error("scoring service returned {0}")]
    Status(StatusCode),

    /// Response parsed but the score was unusable
    #[error("malformed scoring response: {0}")]
    Malformed(String),

    /// Service not reachable or not configured
    #[error("scoring unavailable: {0}")]
    Unavailable(String),
}

/// External pairwise compatibility capability.
///
/// Implementations return a score in [0,1] for an (anchor, candidate)
/// pair. Per-call latency and failure are independent across pairs.
#[async_trait]
pub trait CompatibilityScorer: Send + Sync {
    async fn score(&self, anchor: Uuid, candidate: Uuid) -> Result<f64, ScoreError>;
}

/// Response body of the scoring endpoint.
#[derive(Debug, Deserialize)]
struct PredictResponse {
    compatibility_score: f64,
}

/// HTTP client for the compatibility scoring service.
///
/// The model evaluation is expensive, so calls are rate limited
/// client-side in addition to the per-request timeout.
pub struct HttpScorer {
    base_url: String,
    client: reqwest::Client,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl HttpScorer {
    pub fn new(base_url: impl Into<String>, timeout: Duration, requests_per_second: u32) -> Self {
        // Safe: max(1) guarantees a non-zero quota
        let quota = governor::Quota::per_second(
            std::num::NonZeroU32::new(requests_per_second.max(1)).unwrap(),
        );

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client (system error)"),
            rate_limiter: governor::RateLimiter::direct(quota),
        }
    }
}

#[async_trait]
impl CompatibilityScorer for HttpScorer {
    async fn score(&self, anchor: Uuid, candidate: Uuid) -> Result<f64, ScoreError> {
        // Rate limit API calls
        self.rate_limiter.until_ready().await;

        debug!(%anchor, %candidate, "querying compatibility score");

        let params = [
            ("item_id1", anchor.to_string()),
            ("item_id2", candidate.to_string()),
        ];

        let response = self
            .client
            .post(format!("{}/fashion-predict", self.base_url))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScoreError::Status(response.status()));
        }

        let body: PredictResponse = response.json().await?;

        if !body.compatibility_score.is_finite() {
            return Err(ScoreError::Malformed(format!(
                "non-finite score {}",
                body.compatibility_score
            )));
        }

        Ok(body.compatibility_score.clamp(0.0, 1.0))
    }
}
