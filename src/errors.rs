/*!
 * Error types for the ytcapsum application.
 *
 * This module contains custom error types for the different stages of the
 * caption pipeline, using the thiserror crate for ergonomic error definitions.
 */

use std::fmt;

use thiserror::Error;

/// Errors that can occur while retrieving a page or caption payload over HTTP
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The request did not complete before the client timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server answered with a non-success status
    #[error("Server responded with status {status} for {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// URL that was requested
        url: String,
    },

    /// The response body could not be read as text
    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_body() || error.is_decode() {
            Self::Body(error.to_string())
        } else {
            Self::Connection(error.to_string())
        }
    }
}

/// Why the caption track list could not be pulled out of a watch page
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionFailure {
    /// No `ytInitialPlayerResponse = {...};` assignment in the markup
    #[error("player response assignment not found in page markup")]
    AssignmentNotFound,

    /// The assigned literal is not valid JSON
    #[error("player response is not valid JSON: {0}")]
    InvalidJson(String),
}

/// Step of the generateContent response walk that came up empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStage {
    /// The body is not JSON
    InvalidJson,
    /// `candidates` is missing or empty
    NoCandidates,
    /// `candidates[0].content` is missing
    NoContent,
    /// `candidates[0].content.parts` is missing or empty
    NoParts,
    /// `candidates[0].content.parts[0].text` is missing or empty
    NoText,
}

impl fmt::Display for ResponseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Self::InvalidJson => "body is not valid JSON",
            Self::NoCandidates => "no candidates returned",
            Self::NoContent => "candidate has no content",
            Self::NoParts => "candidate content has no parts",
            Self::NoText => "first part has no text",
        };
        f.write_str(stage)
    }
}

/// Errors that can occur when working with the summarization provider API
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when sending the request fails at the transport level
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The response did not have the expected shape
    #[error("Malformed API response: {0}")]
    MalformedResponse(ResponseStage),
}

/// Terminal failure of a pipeline run
///
/// Every variant maps to exactly one user-facing message through
/// [`PipelineError::user_message`]; `Display` keeps the diagnostic detail.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The input did not contain a recognizable video id
    #[error("No video id could be resolved from the input")]
    NoVideoId,

    /// The watch page could not be retrieved
    #[error("Failed to fetch video page: {0}")]
    PageFetchFailed(#[source] FetchError),

    /// The embedded player response was missing or malformed
    #[error("Caption track extraction failed: {0}")]
    TrackExtractionFailed(#[source] ExtractionFailure),

    /// The page lists no caption tracks
    #[error("No caption tracks available for this video")]
    NoCaptionsAvailable,

    /// The selected track's payload could not be retrieved
    #[error("Failed to fetch caption payload: {0}")]
    PayloadFetchFailed(#[source] FetchError),

    /// The payload document could not be parsed at all
    #[error("Failed to parse caption payload: {0}")]
    PayloadParseFailed(String),

    /// Parsing produced no caption text
    #[error("Caption payload contained no text")]
    EmptyCaptionText,

    /// No API key is configured
    #[error("No API key configured")]
    MissingApiKey,

    /// The summarization endpoint could not be reached
    #[error("Summarization request could not be sent: {0}")]
    ApiUnreachable(String),

    /// The summarization endpoint answered with a non-success status
    #[error("Summarization API request failed with status {status}")]
    ApiRequestFailed {
        /// HTTP status code
        status: u16,
    },

    /// The summarization endpoint answered with an unexpected shape
    #[error("Summarization API response malformed: {stage}")]
    ApiResponseMalformed {
        /// Step of the response walk that failed
        stage: ResponseStage,
    },
}

impl PipelineError {
    /// Human-readable message for the presentation layer
    pub fn user_message(&self) -> String {
        match self {
            Self::NoVideoId => "Could not find a video id in the given input.".to_string(),
            Self::PageFetchFailed(_) => "Could not load the video page.".to_string(),
            Self::TrackExtractionFailed(_) => {
                "Could not read caption information from the video page.".to_string()
            }
            Self::NoCaptionsAvailable => "This video has no captions.".to_string(),
            Self::PayloadFetchFailed(_) => "Could not download the captions.".to_string(),
            Self::PayloadParseFailed(_) => "Could not read the downloaded captions.".to_string(),
            Self::EmptyCaptionText => "Could not get any caption text.".to_string(),
            Self::MissingApiKey => "Please set an API key first.".to_string(),
            Self::ApiUnreachable(_) => "Could not reach the summarization service.".to_string(),
            Self::ApiRequestFailed { status } => format!("API request failed: {}", status),
            Self::ApiResponseMalformed { .. } => {
                "The summarization service returned an incomplete response.".to_string()
            }
        }
    }
}

impl From<ProviderError> for PipelineError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::RequestFailed(message) => Self::ApiUnreachable(message),
            ProviderError::ApiError { status_code, .. } => {
                Self::ApiRequestFailed { status: status_code }
            }
            ProviderError::MalformedResponse(stage) => Self::ApiResponseMalformed { stage },
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a pipeline run
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Error from the provider outside a pipeline run
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Config(error.to_string())
    }
}
