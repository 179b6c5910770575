/*!
 * Translation client adapter.
 *
 * Turns a group of work items into one provider request and the provider's
 * answer back into a `TranslationResult`. The client owns the provider
 * reference; everything above it only deals with work items.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use log::debug;

use super::diagnostics::Diagnostics;
use super::prompts::{TranslationPromptBuilder, estimate_tokens};
use super::response::{TranslationResult, parse_response};
use super::selection::WorkItem;
use crate::errors::TranslationError;
use crate::providers::{ChatRequest, Provider};

/// Request settings shared by every call of a run
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    /// Target language code
    pub target_language: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Generation limit per request
    pub max_tokens: u32,
    /// Domain context injected into every request
    pub context: Option<String>,
    /// Answer every request locally with the unchanged source text
    pub dry_run: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            target_language: "nb".to_string(),
            model: String::new(),
            temperature: 0.2,
            max_tokens: 4096,
            context: None,
            dry_run: false,
        }
    }
}

/// Client adapter between work items and a provider
#[derive(Debug)]
pub struct TranslationClient {
    provider: Arc<dyn Provider>,
    options: ClientOptions,
    calls: AtomicUsize,
    prompt_tokens: AtomicU64,
    completion_tokens: AtomicU64,
}

impl TranslationClient {
    pub fn new(provider: Arc<dyn Provider>, options: ClientOptions) -> Self {
        Self {
            provider,
            options,
            calls: AtomicUsize::new(0),
            prompt_tokens: AtomicU64::new(0),
            completion_tokens: AtomicU64::new(0),
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Provider requests made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompt and completion tokens reported by the provider so far
    pub fn token_usage(&self) -> (u64, u64) {
        (
            self.prompt_tokens.load(Ordering::SeqCst),
            self.completion_tokens.load(Ordering::SeqCst),
        )
    }

    /// System and user messages for a group of items
    pub fn build_prompts(&self, items: &[WorkItem]) -> (String, String) {
        TranslationPromptBuilder::new(&self.options.target_language)
            .with_items(items)
            .with_context(self.options.context.as_deref())
            .build()
    }

    /// Estimated prompt tokens of one request for `items`
    pub fn estimate_prompt_tokens(&self, items: &[WorkItem]) -> usize {
        let (system, user) = self.build_prompts(items);
        estimate_tokens(&system) + estimate_tokens(&user)
    }

    /// Translate a group of items in one request
    ///
    /// A response that is not readable JSON is recorded in `diagnostics` and
    /// returned as `TranslationError::UnparsableResponse`. The result may
    /// lack some of the items.
    pub async fn translate(
        &self,
        batch_id: usize,
        items: &[WorkItem],
        diagnostics: &mut Diagnostics,
    ) -> Result<TranslationResult, TranslationError> {
        if self.options.dry_run {
            return Ok(TranslationResult::identity(items));
        }

        let (system, user) = self.build_prompts(items);
        let request = ChatRequest {
            model: self.options.model.clone(),
            system,
            user,
            temperature: self.options.temperature,
            json_mode: true,
            max_tokens: self.options.max_tokens,
        };

        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!(
            "Sending batch {} ({} items) to {}",
            batch_id,
            items.len(),
            self.provider.name()
        );
        let response = self.provider.complete(&request).await?;

        if let Some(tokens) = response.prompt_tokens {
            self.prompt_tokens.fetch_add(tokens, Ordering::SeqCst);
        }
        if let Some(tokens) = response.completion_tokens {
            self.completion_tokens.fetch_add(tokens, Ordering::SeqCst);
        }

        parse_response(&response.text, items).inspect_err(|e| {
            diagnostics.record_unparsable(batch_id, e, &response.text);
        })
    }
}
