/*!
 * Provider implementations for LLM chat APIs.
 *
 * This module contains client implementations for the supported providers:
 * - OpenAI: OpenAI chat completions, also used for compatible local servers (LM Studio)
 * - Anthropic: Anthropic messages API
 * - Mock: deterministic provider for tests and offline runs
 */

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};

use crate::errors::ProviderError;

/// A provider-neutral chat request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Model identifier
    pub model: String,
    /// System prompt
    pub system: String,
    /// User message
    pub user: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Ask the provider for a JSON-only answer where supported
    pub json_mode: bool,
    /// Upper bound for generated tokens
    pub max_tokens: u32,
}

/// A provider-neutral chat response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    /// Generated text
    pub text: String,
    /// Prompt tokens reported by the provider
    pub prompt_tokens: Option<u64>,
    /// Completion tokens reported by the provider
    pub completion_tokens: Option<u64>,
}

/// Common trait for all LLM providers
///
/// The translation client only talks to this trait, so providers can be
/// swapped by configuration and replaced by a mock in tests.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    /// Complete a chat request
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<ChatResponse, ProviderError>` - The response text or a classified error
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError>;
}

/// Build the HTTP client shared by the remote providers
pub(crate) fn http_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|e| {
            warn!("Failed to build HTTP client with a {}s timeout, using defaults: {}", timeout_secs, e);
            Client::new()
        })
}

/// Classify a transport error
pub(crate) fn transport_error(provider: &str, error: reqwest::Error) -> ProviderError {
    if error.is_timeout() || error.is_connect() {
        ProviderError::ConnectionError(format!("{}: {}", provider, error))
    } else {
        ProviderError::RequestFailed(format!("{}: {}", provider, error))
    }
}

/// Seconds from a numeric `Retry-After` header
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

/// Classify a non-success HTTP status
pub(crate) fn status_error(status: StatusCode, retry_after_secs: Option<u64>, body: &str) -> ProviderError {
    let lower = body.to_lowercase();
    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || status.as_u16() == 529
        || lower.contains("rate limit")
        || lower.contains("rate_limit")
        || lower.contains("too many requests");

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ProviderError::AuthenticationError(format!("{}: {}", status, body))
    } else if rate_limited {
        ProviderError::RateLimitExceeded {
            message: format!("{}: {}", status, body),
            retry_after_secs,
        }
    } else {
        ProviderError::ApiError {
            status_code: status.as_u16(),
            message: body.to_string(),
        }
    }
}

pub mod openai;
pub mod anthropic;
pub mod mock;
