use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::errors::{ProviderError, ResponseStage};
use crate::providers::Provider;

/// Gemini client for the generative language `generateContent` endpoint
#[derive(Clone)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key, sent as the `key` query parameter
    api_key: String,
    /// API base URL including the version segment
    endpoint: String,
    /// Model name
    model: String,
}

/// generateContent request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateContentRequest {
    /// Conversation contents; a summary request carries exactly one
    pub contents: Vec<Content>,
}

/// A content block: a list of parts
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// Parts of the content; absent in some responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<Part>>,

    /// Author role ("user" or "model")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// A single text part
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Part {
    /// Text of the part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// generateContent response; every level is optional on the wire
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Generated candidates
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,

    /// Feedback on the prompt, present when it was blocked
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// One generated candidate
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Candidate content
    #[serde(default)]
    pub content: Option<Content>,

    /// Why generation stopped (e.g. "STOP", "SAFETY")
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Prompt feedback block
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Reason the prompt was blocked
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl fmt::Debug for Gemini {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gemini")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GenerateContentRequest {
    /// Create a request with a single user text part
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                parts: Some(vec![Part {
                    text: Some(text.into()),
                }]),
                role: None,
            }],
        }
    }
}

impl Gemini {
    /// Create a new Gemini client with its own HTTP client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self::with_client(client, api_key, endpoint, model)
    }

    /// Create a Gemini client sharing an existing HTTP client
    pub fn with_client(
        client: Client,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    /// URL of the generateContent method, without the key
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    /// Parse a response body, mapping non-JSON to the `InvalidJson` stage
    pub fn parse_response(body: &str) -> Result<GenerateContentResponse, ProviderError> {
        serde_json::from_str(body).map_err(|e| {
            error!("Failed to parse Gemini API response: {}", e);
            ProviderError::MalformedResponse(ResponseStage::InvalidJson)
        })
    }
}

#[async_trait]
impl Provider for Gemini {
    type Request = GenerateContentRequest;
    type Response = GenerateContentResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let api_url = self.generate_url();
        debug!("POST {} (model {})", api_url, self.model);

        let response = self
            .client
            .post(&api_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                // reqwest errors embed the URL, which carries the key
                let mut message = e.to_string();
                if !self.api_key.is_empty() {
                    message = message.replace(&self.api_key, "***");
                }
                ProviderError::RequestFailed(format!(
                    "Failed to send request to Gemini API: {}",
                    message
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Gemini API error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.text().await.map_err(|e| {
            ProviderError::RequestFailed(format!("Failed to read Gemini API response: {}", e))
        })?;
        debug!("Gemini API response: {}", body);

        Self::parse_response(&body)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let response = self.complete(GenerateContentRequest::from_text("Hello")).await?;
        Self::extract_text(&response)?;
        Ok(())
    }

    fn extract_text(response: &Self::Response) -> Result<String, ProviderError> {
        let malformed = ProviderError::MalformedResponse;

        let Some(candidate) = response.candidates.as_deref().and_then(|c| c.first()) else {
            if let Some(reason) = response
                .prompt_feedback
                .as_ref()
                .and_then(|feedback| feedback.block_reason.as_deref())
            {
                warn!("Gemini blocked the prompt: {}", reason);
            }
            return Err(malformed(ResponseStage::NoCandidates));
        };

        let Some(content) = candidate.content.as_ref() else {
            if let Some(reason) = candidate.finish_reason.as_deref() {
                warn!("Candidate has no content, finish reason: {}", reason);
            }
            return Err(malformed(ResponseStage::NoContent));
        };

        let Some(part) = content.parts.as_deref().and_then(|p| p.first()) else {
            return Err(malformed(ResponseStage::NoParts));
        };

        match part.text.as_deref() {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => Err(malformed(ResponseStage::NoText)),
        }
    }
}
