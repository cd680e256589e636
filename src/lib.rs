/*!
 * # ytcapsum - Video caption summarizer
 *
 * A Rust library that pulls captions from a video's watch page and asks a
 * generative language API to summarize them.
 *
 * ## Features
 *
 * - Extract the caption track list embedded in a watch page
 * - Pick a track by language preference (Traditional/Simplified Chinese, English)
 * - Parse timed-text caption payloads leniently
 * - Summarize the caption text with the Gemini `generateContent` API
 * - Typed outcome for every failure point of a run
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management and the settings store
 * - `captions`: Caption track extraction, selection and timed-text processing:
 *   - `captions::tracks`: Player response scanning and track selection
 *   - `captions::timedtext`: Payload parsing and text assembly
 *   - `captions::source`: Watch page and payload retrieval
 * - `fetcher`: HTTP text retrieval
 * - `providers`: Client implementations for LLM providers:
 *   - `providers::gemini`: Gemini API client
 * - `summarizer`: Prompt building and summary extraction
 * - `pipeline`: Orchestration of a run, states and the working indicator
 * - `video`: Video id resolution
 * - `language_utils`: Language tag utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod captions;
pub mod errors;
pub mod fetcher;
pub mod language_utils;
pub mod pipeline;
pub mod providers;
pub mod summarizer;
pub mod video;

// Re-export main types for easier usage
pub use app_config::{Config, PromptConfig, SettingsStore, StoredSettings};
pub use captions::{CaptionEntry, CaptionTrack};
pub use errors::{AppError, ExtractionFailure, FetchError, PipelineError, ProviderError, ResponseStage};
pub use pipeline::{Orchestrator, PipelineOutcome, PipelineReport, PipelineState};
pub use summarizer::SummarizationClient;
