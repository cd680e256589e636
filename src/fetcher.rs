use async_trait::async_trait;
use log::debug;
use reqwest::{header, Client};
use std::time::Duration;

use crate::errors::FetchError;

// @module: Plain-text HTTP retrieval for watch pages and caption payloads

/// Desktop browser user agent; the watch page omits player data for unknown clients
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Retrieves a URL and returns its body as text
#[async_trait]
pub trait TextFetcher: Send + Sync {
    /// GET `url`; any transport failure or non-success status is an error
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// `reqwest` backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("en-US,en;q=0.9"),
        );

        Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent(USER_AGENT)
                .default_headers(headers)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Wrap an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TextFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Body(e.to_string()))?;
        debug!("Received {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
