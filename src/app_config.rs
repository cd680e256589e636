use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::errors::PipelineError;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings, and the settings store
/// the pipeline reads its API key and prompt template from.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// API key for the summarization endpoint
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Prompt template placed before the caption text
    #[serde(default)]
    pub prompt: Option<String>,

    /// Model name used in the generateContent URL
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the generative language API (up to and including the version)
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// Base URL of the video site serving watch pages; a path prefix is kept
    #[serde(default = "default_page_base_url")]
    pub page_base_url: String,

    /// Timeout for page and caption payload requests
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Timeout for the summarization request
    #[serde(default = "default_api_timeout_secs")]
    pub api_timeout_secs: u64,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Prompt used when the settings carry none
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Summarize what is worth watching in these captions and give an outline of the overall content. Reply in Traditional Chinese.";

fn default_model() -> String {
    "gemini-pro".to_string()
}

fn default_api_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_page_base_url() -> String {
    "https://www.youtube.com".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_api_timeout_secs() -> u64 {
    120 // long captions make generation slow
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: String::new(),
            prompt: None,
            model: default_model(),
            api_endpoint: default_api_endpoint(),
            page_base_url: default_page_base_url(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            api_timeout_secs: default_api_timeout_secs(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Default location of the configuration file
    ///
    /// `conf.json` inside the platform config directory, or the working
    /// directory when the platform has none.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("ytcapsum").join("conf.json"))
            .unwrap_or_else(|| PathBuf::from("conf.json"))
    }

    /// Load the configuration at `path`, writing a default one if it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        log::warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
        }

        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency
    ///
    /// A missing API key is not a configuration error: the pipeline reports it
    /// as its own outcome before doing any network I/O.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(anyhow!("Model name must not be empty"));
        }

        for (name, value) in [
            ("api_endpoint", &self.api_endpoint),
            ("page_base_url", &self.page_base_url),
        ] {
            url::Url::parse(value).map_err(|e| anyhow!("Invalid {} '{}': {}", name, value, e))?;
        }

        if self.fetch_timeout_secs == 0 || self.api_timeout_secs == 0 {
            return Err(anyhow!("Timeouts must be greater than zero"));
        }

        Ok(())
    }

    /// Settings view of this configuration
    pub fn stored_settings(&self) -> StoredSettings {
        StoredSettings {
            api_key: Some(self.api_key.clone()).filter(|key| !key.trim().is_empty()),
            prompt: self.prompt.clone(),
        }
    }
}

/// Key/value record kept by the settings store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSettings {
    /// API key, absent until the user sets one
    pub api_key: Option<String>,
    /// Custom prompt template
    pub prompt: Option<String>,
}

/// Source of the user's summarization settings
///
/// Read once per pipeline run, before any summarization call.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the current settings
    async fn load(&self) -> Result<StoredSettings>;
}

#[async_trait]
impl SettingsStore for StoredSettings {
    async fn load(&self) -> Result<StoredSettings> {
        Ok(self.clone())
    }
}

#[async_trait]
impl SettingsStore for Config {
    async fn load(&self) -> Result<StoredSettings> {
        Ok(self.stored_settings())
    }
}

/// Validated settings consumed by the summarization client
#[derive(Debug, Clone, PartialEq)]
pub struct PromptConfig {
    /// API key carried in the request URL
    pub api_key: String,
    /// Instruction text placed before the captions
    pub prompt_template: String,
}

impl PromptConfig {
    /// Create a prompt config, substituting the default template when none is given
    pub fn new(api_key: impl Into<String>, prompt_template: Option<String>) -> Self {
        let prompt_template = prompt_template
            .filter(|prompt| !prompt.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROMPT_TEMPLATE.to_string());

        Self {
            api_key: api_key.into(),
            prompt_template,
        }
    }

    /// Build from stored settings; an absent or blank key is `MissingApiKey`
    pub fn from_settings(settings: StoredSettings) -> Result<Self, PipelineError> {
        match settings.api_key {
            Some(api_key) if !api_key.trim().is_empty() => {
                Ok(Self::new(api_key.trim(), settings.prompt))
            }
            _ => Err(PipelineError::MissingApiKey),
        }
    }
}
