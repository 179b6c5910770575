/*!
 * Mock provider implementations for testing.
 *
 * The mock reads the JSON user prompt built by the translation client, so it
 * answers with the ids of the items it was actually sent:
 * - `MockProvider::working()` - Translates every item as `[target] text`
 * - `MockProvider::with_translations()` - Answers from a fixed id → translation table
 * - `MockProvider::malformed()` - Returns text that is not JSON
 * - `MockProvider::failing()` - Always fails with a server error
 * - `MockProvider::with_custom_response()` - Delegates to a function
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::ProviderError;
use crate::providers::{ChatRequest, ChatResponse, Provider};
use crate::translation::prompts::{RequestItem, TranslationRequest};

/// What the mock saw in one request
#[derive(Debug, Clone, Default)]
pub struct MockRequest {
    /// Items decoded from the user prompt
    pub items: Vec<RequestItem>,
    /// Target language code from the user prompt
    pub target_language: String,
    /// Domain context from the user prompt
    pub context: Option<String>,
    /// 0-based number of this request
    pub call_number: usize,
}

impl MockRequest {
    fn from_chat(request: &ChatRequest, call_number: usize) -> Self {
        match serde_json::from_str::<TranslationRequest>(&request.user) {
            Ok(parsed) => Self {
                items: parsed.items,
                target_language: parsed.target_lang,
                context: parsed.context,
                call_number,
            },
            Err(_) => Self {
                call_number,
                ..Default::default()
            },
        }
    }
}

/// Function answering a mock request
pub type MockResponder = fn(&MockRequest) -> Result<String, ProviderError>;

/// Behavior mode for the mock provider
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always succeeds with a translation for every item
    Working,
    /// Answers only the ids found in the table
    Dictionary(Arc<HashMap<String, String>>),
    /// Returns a response that is not JSON
    Malformed,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
    /// Simulates slow response
    Slow { delay_ms: u64 },
    /// Delegates to a responder function
    Custom(MockResponder),
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request seen, shared between clones
    requests: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock answering from an id → translation table
    pub fn with_translations<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table = pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self::new(MockBehavior::Dictionary(Arc::new(table)))
    }

    /// Create a mock that returns non-JSON text
    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that waits before answering like `working()`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Create a mock driven by a responder function
    pub fn with_custom_response(responder: MockResponder) -> Self {
        Self::new(MockBehavior::Custom(responder))
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copies of all requests received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Deterministic translation used by `working()`
    pub fn fake_translation(text: &str, target_language: &str) -> String {
        format!("[{}] {}", target_language, text)
    }

    /// JSON object translating every item with `fake_translation`
    pub fn generate_batch_response(items: &[RequestItem], target_language: &str) -> String {
        let map: Map<String, Value> = items
            .iter()
            .map(|item| {
                (
                    item.id.clone(),
                    Value::String(Self::fake_translation(&item.text, target_language)),
                )
            })
            .collect();
        Value::Object(map).to_string()
    }

    fn server_error(message: String) -> ProviderError {
        ProviderError::ApiError {
            status_code: 500,
            message,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let seen = MockRequest::from_chat(request, count);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(seen.clone());
        }

        let text = match &self.behavior {
            MockBehavior::Working => Self::generate_batch_response(&seen.items, &seen.target_language),

            MockBehavior::Dictionary(table) => {
                let map: Map<String, Value> = seen
                    .items
                    .iter()
                    .filter_map(|item| {
                        table
                            .get(&item.id)
                            .map(|t| (item.id.clone(), Value::String(t.clone())))
                    })
                    .collect();
                Value::Object(map).to_string()
            }

            MockBehavior::Malformed => "Sure! Here are your translations: Godta alle, Lagre".to_string(),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    return Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    });
                }
                Self::generate_batch_response(&seen.items, &seen.target_language)
            }

            MockBehavior::Failing => return Err(Self::server_error("Simulated provider failure".to_string())),

            MockBehavior::Empty => String::new(),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Self::generate_batch_response(&seen.items, &seen.target_language)
            }

            MockBehavior::Custom(responder) => responder(&seen)?,
        };

        Ok(ChatResponse {
            prompt_tokens: Some((request.system.len() + request.user.len()).div_ceil(4) as u64),
            completion_tokens: Some(text.len().div_ceil(4) as u64),
            text,
        })
    }
}
