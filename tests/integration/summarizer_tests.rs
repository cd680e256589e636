/*!
 * Integration tests for the summarization client against a mock API
 */

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ytcapsum::app_config::{PromptConfig, DEFAULT_PROMPT_TEMPLATE};
use ytcapsum::errors::{PipelineError, ProviderError, ResponseStage};
use ytcapsum::providers::Provider;
use ytcapsum::summarizer::SummarizationClient;

use crate::common;

fn client_for(server: &MockServer) -> SummarizationClient {
    common::init_logging();
    SummarizationClient::new(
        format!("{}/v1beta", server.uri()),
        "gemini-pro",
        Duration::from_secs(5),
    )
}

fn prompt() -> PromptConfig {
    PromptConfig::new(common::API_KEY, Some(common::PROMPT.to_string()))
}

#[tokio::test]
async fn test_summarize_shouldPostPromptAndReturnLeafText() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(common::GENERATE_PATH))
        .and(query_param("key", common::API_KEY))
        .and(body_json(json!({
            "contents": [{"parts": [{"text": "Summarize:\n\nHello\nWorld"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::gemini_response("Summary X")))
        .expect(1)
        .mount(&server)
        .await;

    let summary = client_for(&server)
        .summarize("Hello\nWorld", &prompt())
        .await
        .unwrap();

    assert_eq!(summary, "Summary X");
}

#[tokio::test]
async fn test_summarize_withoutCustomPrompt_shouldUseDefaultTemplate() {
    let server = MockServer::start().await;
    let expected = format!("{}\n\nHello", DEFAULT_PROMPT_TEMPLATE);
    Mock::given(method("POST"))
        .and(path(common::GENERATE_PATH))
        .and(body_json(json!({"contents": [{"parts": [{"text": expected}]}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::gemini_response("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let prompt = PromptConfig::new(common::API_KEY, None);
    let summary = client_for(&server).summarize("Hello", &prompt).await.unwrap();

    assert_eq!(summary, "ok");
}

#[tokio::test]
async fn test_summarize_withEmptyText_shouldNotCallApi() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::gemini_response("x")))
        .expect(0)
        .mount(&server)
        .await;

    let error = client_for(&server).summarize("", &prompt()).await.unwrap_err();

    assert!(matches!(error, PipelineError::EmptyCaptionText));
}

#[tokio::test]
async fn test_summarize_withErrorStatus_shouldBeApiRequestFailed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(common::GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}
        })))
        .mount(&server)
        .await;

    let error = client_for(&server).summarize("Hello", &prompt()).await.unwrap_err();

    assert!(matches!(error, PipelineError::ApiRequestFailed { status: 400 }));
    assert_eq!(error.user_message(), "API request failed: 400");
}

#[tokio::test]
async fn test_summarize_withoutCandidates_shouldBeMalformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(common::GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [],
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let error = client_for(&server).summarize("Hello", &prompt()).await.unwrap_err();

    assert!(matches!(
        error,
        PipelineError::ApiResponseMalformed {
            stage: ResponseStage::NoCandidates
        }
    ));
}

#[tokio::test]
async fn test_summarize_withPartWithoutText_shouldBeMalformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(common::GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{}], "role": "model"}}]
        })))
        .mount(&server)
        .await;

    let error = client_for(&server).summarize("Hello", &prompt()).await.unwrap_err();

    assert!(matches!(
        error,
        PipelineError::ApiResponseMalformed {
            stage: ResponseStage::NoText
        }
    ));
}

#[tokio::test]
async fn test_summarize_withNonJsonBody_shouldBeMalformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(common::GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let error = client_for(&server).summarize("Hello", &prompt()).await.unwrap_err();

    assert!(matches!(
        error,
        PipelineError::ApiResponseMalformed {
            stage: ResponseStage::InvalidJson
        }
    ));
}

#[tokio::test]
async fn test_summarize_withUnreachableEndpoint_shouldHideKey() {
    let client = SummarizationClient::new(
        format!("{}/v1beta", common::closed_port_uri()),
        "gemini-pro",
        Duration::from_secs(5),
    );
    let error = client.summarize("Hello", &prompt()).await.unwrap_err();

    match error {
        PipelineError::ApiUnreachable(message) => assert!(!message.contains(common::API_KEY)),
        other => panic!("Expected ApiUnreachable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_testConnection_withWorkingApi_shouldSucceed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(common::GENERATE_PATH))
        .and(query_param("key", common::API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::gemini_response("Hi!")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = client_for(&server).provider(&prompt());

    assert!(provider.test_connection().await.is_ok());
}

#[tokio::test]
async fn test_testConnection_withRejectedKey_shouldReturnApiError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(common::GENERATE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let provider = client_for(&server).provider(&prompt());
    let error = provider.test_connection().await.unwrap_err();

    assert!(matches!(
        error,
        ProviderError::ApiError {
            status_code: 403,
            ..
        }
    ));
}
