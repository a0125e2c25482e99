use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use crate::models::CompatibilityScore;

/// What a scoring attempt produced
///
/// Failures are folded into `Unavailable` instead of being raised, so a
/// caller can always fall back to leaving the swipe pending.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    Scored(CompatibilityScore),
    Unavailable(String),
}

/// Capability that estimates how well a profile fits a listing
#[async_trait]
pub trait CompatibilityScorer: Send + Sync {
    async fn score_compatibility(&self, profile_text: &str, listing_text: &str) -> ScoreOutcome;
}

/// Request body; the snake_case pair is what the Flask `/match` scorer reads
#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    #[serde(rename = "profileText")]
    profile_text: &'a str,
    #[serde(rename = "listingText")]
    listing_text: &'a str,
    student_cv: &'a str,
    job_description: &'a str,
}

impl<'a> ScoreRequest<'a> {
    fn new(profile_text: &'a str, listing_text: &'a str) -> Self {
        Self {
            profile_text,
            listing_text,
            student_cv: profile_text,
            job_description: listing_text,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    #[serde(alias = "match_score")]
    score: f64,
    #[serde(alias = "should_show", default)]
    recommend: bool,
}

/// HTTP client for a remote compatibility scorer
///
/// Every call is bounded by `timeout`, both on the reqwest client and by an
/// outer `tokio::time::timeout` that also covers body decoding.
pub struct HttpScorer {
    url: String,
    timeout: Duration,
    client: Client,
}

impl HttpScorer {
    pub fn new(url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self { url, timeout, client })
    }

    async fn request(
        &self,
        profile_text: &str,
        listing_text: &str,
    ) -> Result<CompatibilityScore, String> {
        let response = self
            .client
            .post(&self.url)
            .json(&ScoreRequest::new(profile_text, listing_text))
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("scorer returned {}", response.status()));
        }

        let body: ScoreResponse = response
            .json()
            .await
            .map_err(|e| format!("invalid scorer response: {}", e))?;

        CompatibilityScore {
            score: body.score,
            recommend: body.recommend,
        }
        .normalized()
        .ok_or_else(|| format!("non-finite score {}", body.score))
    }
}

#[async_trait]
impl CompatibilityScorer for HttpScorer {
    async fn score_compatibility(&self, profile_text: &str, listing_text: &str) -> ScoreOutcome {
        match tokio::time::timeout(self.timeout, self.request(profile_text, listing_text)).await {
            Ok(Ok(score)) => {
                tracing::debug!("Scorer returned {:.2} (recommend: {})", score.score, score.recommend);
                ScoreOutcome::Scored(score)
            }
            Ok(Err(reason)) => {
                tracing::warn!("Compatibility scorer unavailable: {}", reason);
                ScoreOutcome::Unavailable(reason)
            }
            Err(_) => {
                tracing::warn!("Compatibility scorer timed out after {:?}", self.timeout);
                ScoreOutcome::Unavailable(format!("timed out after {:?}", self.timeout))
            }
        }
    }
}
