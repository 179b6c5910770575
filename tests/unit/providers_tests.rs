/*!
 * Tests for provider implementations
 */

use potwai::providers::anthropic::Anthropic;
use potwai::providers::mock::MockProvider;
use potwai::providers::openai::{OpenAI, OpenAIRequest};
use potwai::providers::{ChatRequest, Provider};

fn chat_request(json_mode: bool) -> ChatRequest {
    ChatRequest {
        model: "gpt-4o-mini".to_string(),
        system: "Translate into Norwegian Bokmål.".to_string(),
        user: r#"{"items":[{"id":"Save","text":"Save","lang":"en"}]}"#.to_string(),
        temperature: 0.2,
        json_mode,
        max_tokens: 512,
    }
}

#[test]
fn test_openAIRequest_withJsonMode_shouldAskForJsonObject() {
    let value = serde_json::to_value(OpenAIRequest::from_chat(&chat_request(true))).unwrap();

    assert_eq!(value["model"], "gpt-4o-mini");
    assert_eq!(value["messages"][0]["role"], "system");
    assert_eq!(value["messages"][1]["role"], "user");
    assert_eq!(value["response_format"]["type"], "json_object");
}

#[test]
fn test_openAIRequest_withoutJsonMode_shouldOmitResponseFormat() {
    let value = serde_json::to_value(OpenAIRequest::from_chat(&chat_request(false))).unwrap();
    assert!(value.get("response_format").is_none());
}

#[test]
fn test_providerNames_shouldIdentifyImplementations() {
    let providers: Vec<Box<dyn Provider>> = vec![
        Box::new(OpenAI::new("", "http://localhost:1234/v1", 5)),
        Box::new(Anthropic::new("key", "", 5)),
        Box::new(MockProvider::working()),
    ];
    let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();

    assert_eq!(names, vec!["openai", "anthropic", "mock"]);
}

#[tokio::test]
async fn test_openAI_withUnreachableServer_shouldReturnRetryableError() {
    // port 9 (discard) is not expected to run an HTTP server
    let provider = OpenAI::new("", "http://127.0.0.1:9/v1", 2);

    let err = provider.complete(&chat_request(true)).await.unwrap_err();

    assert!(err.is_retryable());
    assert!(!err.is_fatal());
}
