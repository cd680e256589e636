use log::debug;
use std::sync::Arc;

use super::{parse_timed_text, CaptionEntry};
use crate::errors::{FetchError, PipelineError};
use crate::fetcher::TextFetcher;
use crate::video;

/// Network side of caption retrieval: watch pages and timed-text payloads
#[derive(Clone)]
pub struct CaptionSource {
    fetcher: Arc<dyn TextFetcher>,
    page_base_url: String,
}

impl CaptionSource {
    /// Create a source reading watch pages under `page_base_url`
    pub fn new(fetcher: Arc<dyn TextFetcher>, page_base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            page_base_url: page_base_url.into(),
        }
    }

    /// Fetch the watch page markup for a video
    pub async fn watch_page(&self, video_id: &str) -> Result<String, PipelineError> {
        let url = video::watch_url(&self.page_base_url, video_id).map_err(|e| {
            PipelineError::PageFetchFailed(FetchError::Connection(format!(
                "invalid page base URL '{}': {}",
                self.page_base_url, e
            )))
        })?;

        self.fetcher
            .fetch_text(url.as_str())
            .await
            .map_err(PipelineError::PageFetchFailed)
    }

    /// Fetch the raw timed-text payload behind a track's base URL
    pub async fn payload(&self, base_url: &str) -> Result<String, PipelineError> {
        self.fetcher
            .fetch_text(base_url)
            .await
            .map_err(PipelineError::PayloadFetchFailed)
    }

    /// Fetch and parse a track's payload
    pub async fn entries(&self, base_url: &str) -> Result<Vec<CaptionEntry>, PipelineError> {
        let xml = self.payload(base_url).await?;
        debug!("Caption payload is {} bytes", xml.len());
        parse_timed_text(&xml).map_err(|e| PipelineError::PayloadParseFailed(e.to_string()))
    }
}
