//! HTTP client for the patch-proposal model.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use tracing::{debug, info};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ModelConfig, Patch, PatchProvenance};
use crate::domain::ports::{ModelClient, PatchRequest};
use crate::services::prompts;

use super::error::ModelApiError;
use super::rate_limiter::TokenBucketRateLimiter;
use super::retry::RetryPolicy;
use super::types::{Message, MessageRequest, MessageResponse};

/// Messages-API model client.
///
/// Connection pooling via the shared reqwest client, token bucket rate
/// limiting, and exponential backoff on transient failures.
pub struct HttpModelClient {
    http: ReqwestClient,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
    rate_limiter: TokenBucketRateLimiter,
    retry: RetryPolicy,
}

impl HttpModelClient {
    /// Build a client from configuration. The API key is read from the
    /// environment variable the config names.
    pub fn from_config(config: &ModelConfig) -> DomainResult<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            DomainError::ModelFailed(format!(
                "API key environment variable '{}' is not set",
                config.api_key_env
            ))
        })?;

        let http = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| DomainError::ModelFailed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            rate_limiter: TokenBucketRateLimiter::new(config.rate_limit_rps),
            retry: RetryPolicy::new(
                config.retry.max_retries,
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ),
        })
    }

    async fn send(&self, request: &MessageRequest) -> Result<MessageResponse, ModelApiError> {
        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(ModelApiError::from_status(status, body));
        }

        response
            .json::<MessageResponse>()
            .await
            .map_err(|e| ModelApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn propose_patches(&self, request: &PatchRequest) -> DomainResult<Vec<Patch>> {
        let body = MessageRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: Some(prompts::SYSTEM_PROMPT.to_string()),
            temperature: self.temperature,
            messages: vec![Message::user(prompts::build_user_prompt(request))],
        };

        self.rate_limiter.acquire().await;
        let response = self
            .retry
            .execute(|| self.send(&body))
            .await
            .map_err(|e| DomainError::ModelFailed(e.to_string()))?;

        let reply = response.text();
        debug!(chars = reply.len(), stop_reason = ?response.stop_reason, "Model reply received");

        let patches: Vec<Patch> = prompts::extract_diffs(&reply)
            .into_iter()
            .enumerate()
            .map(|(rank, diff)| {
                Patch::new(
                    request.job_id,
                    diff,
                    rank,
                    PatchProvenance {
                        model: self.model.clone(),
                        iteration: request.iteration,
                    },
                )
            })
            .collect();

        info!(
            round = request.iteration,
            candidates = patches.len(),
            "Model proposed candidate patches"
        );
        Ok(patches)
    }
}
