use log::{debug, info};
use reqwest::Client;
use std::time::Duration;

use crate::app_config::{Config, PromptConfig};
use crate::errors::PipelineError;
use crate::providers::gemini::{GenerateContentRequest, Gemini};
use crate::providers::Provider;

// @module: Caption summarization through the generative language API

/// Builds summary requests from a prompt template and caption text
#[derive(Debug, Clone)]
pub struct SummarizationClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl SummarizationClient {
    /// Create a client for `model` under `endpoint`
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    /// Create a client from the application configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.api_endpoint.clone(),
            config.model.clone(),
            Duration::from_secs(config.api_timeout_secs),
        )
    }

    /// Provider bound to the key in `prompt`
    pub fn provider(&self, prompt: &PromptConfig) -> Gemini {
        Gemini::with_client(
            self.client.clone(),
            prompt.api_key.clone(),
            self.endpoint.clone(),
            self.model.clone(),
        )
    }

    /// Full prompt text: template, blank line, captions
    pub fn build_prompt(prompt: &PromptConfig, caption_text: &str) -> String {
        format!("{}\n\n{}", prompt.prompt_template, caption_text)
    }

    /// Summarize caption text; returns the endpoint's leaf text unchanged
    pub async fn summarize(
        &self,
        caption_text: &str,
        prompt: &PromptConfig,
    ) -> Result<String, PipelineError> {
        if caption_text.is_empty() {
            return Err(PipelineError::EmptyCaptionText);
        }

        let request = GenerateContentRequest::from_text(Self::build_prompt(prompt, caption_text));
        debug!("Summarizing {} characters of captions", caption_text.chars().count());

        let provider = self.provider(prompt);
        let response = provider.complete(request).await?;
        let summary = Gemini::extract_text(&response)?;

        info!("Received summary ({} characters)", summary.chars().count());
        Ok(summary)
    }
}
