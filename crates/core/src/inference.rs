//! External inference call.
//!
//! The assessment service only needs "prompt in, text out"; [`InferenceClient`] is that seam.
//! [`GatewayClient`] is the production implementation over an OpenAI-compatible
//! chat-completion endpoint. Transient failures (timeouts, connection errors, 429 and 5xx
//! responses) are retried a bounded number of times with jittered exponential backoff; any
//! other failure is returned immediately.

use crate::config::GatewayConfig;
use crate::{AssessmentError, AssessmentResult};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest gateway error body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

const DEFAULT_BACKOFF: Duration = Duration::from_millis(250);

/// A hosted model that turns a prompt into free text.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> AssessmentResult<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completion client for the configured gateway.
#[derive(Clone, Debug)]
pub struct GatewayClient {
    http: reqwest::Client,
    config: GatewayConfig,
    backoff: Duration,
}

impl GatewayClient {
    /// Builds a client whose requests time out after `config.timeout()`.
    ///
    /// # Errors
    /// Returns `AssessmentError::HttpClientBuild` if the HTTP client cannot be constructed.
    pub fn new(config: GatewayConfig) -> AssessmentResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(AssessmentError::HttpClientBuild)?;

        Ok(Self {
            http,
            config,
            backoff: DEFAULT_BACKOFF,
        })
    }

    /// Overrides the base retry delay.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    async fn send_once(&self, prompt: &str) -> AssessmentResult<String> {
        let body = ChatRequest {
            model: self.config.model(),
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(self.config.url())
            .bearer_auth(self.config.api_key())
            .json(&body)
            .send()
            .await
            .map_err(AssessmentError::InferenceTransport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AssessmentError::InferenceStatus {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| AssessmentError::InferenceResponse(e.to_string()))?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AssessmentError::InferenceResponse("reply had no message content".into())
            })
    }

    /// Delay before retry number `attempt` (1-based): `backoff * 2^(attempt-1)` plus up to one
    /// `backoff` of random jitter.
    fn retry_delay(&self, attempt: u32) -> Duration {
        let base = self.backoff.saturating_mul(1 << (attempt.saturating_sub(1)).min(6));
        let jitter_ms = self.backoff.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        };
        base + jitter
    }
}

fn is_retryable(err: &AssessmentError) -> bool {
    match err {
        AssessmentError::InferenceTransport(e) => e.is_timeout() || e.is_connect(),
        AssessmentError::InferenceStatus { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

#[async_trait]
impl InferenceClient for GatewayClient {
    async fn complete(&self, prompt: &str) -> AssessmentResult<String> {
        let mut attempt = 0;
        loop {
            match self.send_once(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if is_retryable(&e) && attempt < self.config.max_retries() => {
                    attempt += 1;
                    let delay = self.retry_delay(attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "inference call failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!("inference call failed: {}", e);
                    return Err(e);
                }
            }
        }
    }
}
