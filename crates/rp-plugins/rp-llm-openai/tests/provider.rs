use httpmock::Method::POST;
use httpmock::MockServer;
use rp_core::{CompletionRequest, LlmProvider};
use rp_llm_openai::OpenAiProvider;
use secrecy::SecretString;
use serde_json::json;
use std::time::Duration;

fn provider(base: &str) -> OpenAiProvider {
    OpenAiProvider::new(base, "gpt-4o-mini", SecretString::from("sk-test"), Duration::from_secs(5)).unwrap()
}

fn request(json_mode: bool) -> CompletionRequest {
    CompletionRequest {
        system: "You are helpful".into(),
        user: "Draft a reply".into(),
        temperature: 0.7,
        max_tokens: 500,
        json_mode,
    }
}

#[tokio::test]
async fn sends_chat_request_and_reads_first_choice() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .header("authorization", "Bearer sk-test")
            .json_body_partial(
                r#"{"model":"gpt-4o-mini","max_tokens":500,"messages":[{"role":"system","content":"You are helpful"},{"role":"user","content":"Draft a reply"}]}"#,
            );
        then.status(200).json_body(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Thanks for reaching out" } }]
        }));
    });

    let out = provider(&server.base_url()).complete(&request(false)).await.unwrap();
    mock.assert();
    assert_eq!(out.as_deref(), Some("Thanks for reaching out"));
}

#[tokio::test]
async fn json_mode_sets_response_format() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .json_body_partial(r#"{"response_format":{"type":"json_object"}}"#);
        then.status(200).json_body(json!({
            "choices": [{ "message": { "content": "{\"summary\":\"ok\"}" } }]
        }));
    });

    let out = provider(&server.base_url()).complete(&request(true)).await.unwrap();
    mock.assert();
    assert_eq!(out.as_deref(), Some("{\"summary\":\"ok\"}"));
}

#[tokio::test]
async fn no_choices_is_none() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(json!({ "choices": [] }));
    });

    let out = provider(&server.base_url()).complete(&request(false)).await.unwrap();
    assert!(out.is_none());
}

#[tokio::test]
async fn http_error_is_reported() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(401).body("invalid api key");
    });

    let err = provider(&server.base_url()).complete(&request(false)).await.unwrap_err();
    assert!(err.to_string().contains("401"));
}
