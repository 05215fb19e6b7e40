use std::env;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use vocab_core::model::{StudentProfile, VocabularyCard};

use crate::error::GenerationError;

/// Source of personalized vocabulary cards.
///
/// The production implementation calls the hosted generation endpoint; tests
/// substitute scripted generators.
#[async_trait]
pub trait WordGenerator: Send + Sync {
    /// Produce up to `count` cards tailored to `profile`.
    ///
    /// # Errors
    ///
    /// Returns a classified `GenerationError`; non-2xx responses and
    /// shape-invalid payloads are both generation failures.
    async fn generate(
        &self,
        profile: &StudentProfile,
        count: usize,
    ) -> Result<Vec<VocabularyCard>, GenerationError>;
}

/// Exponential backoff with a small fixed attempt cap.
///
/// After exhausting attempts the last error is surfaced rather than retried
/// indefinitely.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based), with jitter so two
    /// tabs retrying together do not stay in lockstep.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2_u32.saturating_pow(attempt))
            .min(self.max_delay);
        let jitter_cap = exp.as_millis() as u64 / 4;
        let jitter = if jitter_cap == 0 {
            0
        } else {
            rand::rng().random_range(0..=jitter_cap)
        };
        exp + Duration::from_millis(jitter)
    }
}

/// Run `generator` under `policy`, retrying only retryable failures.
///
/// # Errors
///
/// Returns the last `GenerationError` once attempts are exhausted or the
/// failure is not worth retrying.
pub async fn generate_with_retry(
    generator: &dyn WordGenerator,
    profile: &StudentProfile,
    count: usize,
    policy: RetryPolicy,
) -> Result<Vec<VocabularyCard>, GenerationError> {
    let mut attempt = 0;
    loop {
        match generator.generate(profile, count).await {
            Ok(words) => return Ok(words),
            Err(err) if err.retryable() && attempt + 1 < policy.max_attempts.max(1) => {
                let delay = policy.delay_for(attempt);
                log::debug!(
                    "word generation attempt {} failed ({err}), retrying in {delay:?}",
                    attempt + 1
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub api_key: String,
    pub request_timeout: Duration,
}

impl GeneratorConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("VOCAB_GENERATOR_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("VOCAB_GENERATOR_URL")
            .unwrap_or_else(|_| "https://api.example.com/vocabulary".into());
        let request_timeout = env::var("VOCAB_GENERATOR_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or(Duration::from_secs(10), Duration::from_secs);
        Some(Self {
            base_url,
            api_key,
            request_timeout,
        })
    }
}

/// `WordGenerator` backed by the hosted personalized-generation endpoint.
#[derive(Clone)]
pub struct HttpWordGenerator {
    client: Client,
    config: GeneratorConfig,
}

impl HttpWordGenerator {
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl WordGenerator for HttpWordGenerator {
    async fn generate(
        &self,
        profile: &StudentProfile,
        count: usize,
    ) -> Result<Vec<VocabularyCard>, GenerationError> {
        let url = format!("{}/generate", self.config.base_url.trim_end_matches('/'));
        let payload = GenerateRequest { profile, count };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.request_timeout)
            .json(&payload)
            .send()
            .await
            .map_err(GenerationError::from)?;

        if !response.status().is_success() {
            return Err(GenerationError::from_status(response.status()));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|err| GenerationError::generation(format!("malformed payload: {err}")))?;

        if body.words.is_empty() {
            return Err(GenerationError::generation("endpoint returned no words"));
        }
        for card in &body.words {
            card.validate()
                .map_err(|err| GenerationError::generation(format!("invalid card: {err}")))?;
        }

        let mut words = body.words;
        words.truncate(count.max(1));
        Ok(words)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    profile: &'a StudentProfile,
    count: usize,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    words: Vec<VocabularyCard>,
}
