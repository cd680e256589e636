// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use ytcapsum::app_config::{self, Config, PromptConfig, StoredSettings};
use ytcapsum::captions::{self, CaptionTrack};
use ytcapsum::language_utils;
use ytcapsum::pipeline::{Orchestrator, PipelineOutcome, SpinnerIndicator};
use ytcapsum::providers::Provider;
use ytcapsum::summarizer::SummarizationClient;
use ytcapsum::video;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Options shared by every command that reads the configuration
#[derive(clap::Args, Debug, Clone)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config_path: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

#[derive(clap::Args, Debug)]
struct SummarizeArgs {
    /// Video id or watch URL
    #[arg(value_name = "VIDEO")]
    video: String,

    /// API key (overrides the configuration file)
    #[arg(short = 'k', long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Prompt template placed before the captions
    #[arg(short, long)]
    prompt: Option<String>,

    /// Model name to use for summarization
    #[arg(short, long)]
    model: Option<String>,

    /// Write the summary to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not show the progress spinner
    #[arg(long)]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize the captions of a video (default command)
    Summarize(SummarizeArgs),

    /// List the caption tracks of a video and the one that would be summarized
    Tracks {
        /// Video id or watch URL
        #[arg(value_name = "VIDEO")]
        video: String,
    },

    /// Print the caption text of the selected track
    Captions {
        /// Video id or watch URL
        #[arg(value_name = "VIDEO")]
        video: String,

        /// Prefix each line with its start time
        #[arg(short, long)]
        timestamps: bool,
    },

    /// Check that the API key and model work
    Check {
        /// API key (overrides the configuration file)
        #[arg(short = 'k', long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Save the API key, prompt template or model to the configuration file
    Config {
        /// API key to store
        #[arg(short = 'k', long)]
        api_key: Option<String>,

        /// Prompt template to store; pass an empty string to restore the default
        #[arg(short, long)]
        prompt: Option<String>,

        /// Model name to store
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Generate shell completions for ytcapsum
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// ytcapsum - Video caption summarizer
///
/// Pulls the captions of a video and asks the Gemini API what is worth watching.
#[derive(Parser, Debug)]
#[command(name = "ytcapsum")]
#[command(version)]
#[command(about = "Summarize video captions with a generative language API")]
#[command(long_about = "ytcapsum extracts the captions of a video, picks a Chinese or English track when there is one, and asks the Gemini API to summarize them.

EXAMPLES:
    ytcapsum dQw4w9WgXcQ                                    # Summarize using the configured key
    ytcapsum 'https://www.youtube.com/watch?v=dQw4w9WgXcQ'  # Watch URLs work too
    ytcapsum config -k <API_KEY>                            # Store the API key
    ytcapsum config -p 'List the key points in English'     # Store a custom prompt
    ytcapsum tracks dQw4w9WgXcQ                             # Show available caption tracks
    ytcapsum captions -t dQw4w9WgXcQ                        # Print captions with timestamps
    ytcapsum check                                          # Verify the API key
    ytcapsum completions bash > ytcapsum.bash               # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json in the user config directory by default.
    You can specify a different file with --config-path. If the file doesn't exist,
    a default one is created automatically. GEMINI_API_KEY overrides the stored key.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    common: CommonArgs,

    /// Video id or watch URL
    #[arg(value_name = "VIDEO")]
    video: Option<String>,

    /// API key (overrides the configuration file)
    #[arg(short = 'k', long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Prompt template placed before the captions
    #[arg(short, long)]
    prompt: Option<String>,

    /// Model name to use for summarization
    #[arg(short, long)]
    model: Option<String>,

    /// Write the summary to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not show the progress spinner
    #[arg(long)]
    no_progress: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger itself passes everything; log::max_level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();
    let common = cli.common;

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "ytcapsum", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Config { api_key, prompt, model }) => {
            run_config(&common, api_key, prompt, model)
        }
        Some(Commands::Summarize(args)) => run_summarize(&common, args).await,
        Some(Commands::Tracks { video }) => run_tracks(&common, &video).await,
        Some(Commands::Captions { video, timestamps }) => {
            run_captions(&common, &video, timestamps).await
        }
        Some(Commands::Check { api_key }) => run_check(&common, api_key).await,
        None => {
            // Default behavior - use top-level args
            let video = cli.video.ok_or_else(|| {
                anyhow!("VIDEO is required when no subcommand is specified")
            })?;

            let args = SummarizeArgs {
                video,
                api_key: cli.api_key,
                prompt: cli.prompt,
                model: cli.model,
                output: cli.output,
                no_progress: cli.no_progress,
            };
            run_summarize(&common, args).await
        }
    }
}

/// Load the configuration and apply the log level from CLI or config
fn load_config(common: &CommonArgs) -> Result<(Config, PathBuf)> {
    if let Some(level) = &common.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config_path = common.config_path.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;

    if let Some(level) = &common.log_level {
        config.log_level = level.clone().into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    config.validate().context("Configuration validation failed")?;
    debug!("Using configuration at {}", config_path.display());
    Ok((config, config_path))
}

fn run_config(
    common: &CommonArgs,
    api_key: Option<String>,
    prompt: Option<String>,
    model: Option<String>,
) -> Result<()> {
    let (mut config, config_path) = load_config(common)?;

    if api_key.is_none() && prompt.is_none() && model.is_none() {
        let settings = config.stored_settings();
        println!("Config file: {}", config_path.display());
        println!("API key:     {}", if settings.api_key.is_some() { "set" } else { "not set" });
        println!("Model:       {}", config.model);
        println!(
            "Prompt:      {}",
            settings.prompt.as_deref().unwrap_or(app_config::DEFAULT_PROMPT_TEMPLATE)
        );
        return Ok(());
    }

    if let Some(api_key) = api_key {
        config.api_key = api_key.trim().to_string();
    }
    if let Some(prompt) = prompt {
        config.prompt = Some(prompt).filter(|p| !p.trim().is_empty());
    }
    if let Some(model) = model {
        config.model = model;
    }

    config.validate().context("Configuration validation failed")?;
    config.save(&config_path)?;
    info!("Settings saved to {}", config_path.display());
    Ok(())
}

async fn run_summarize(common: &CommonArgs, args: SummarizeArgs) -> Result<()> {
    let (mut config, _) = load_config(common)?;

    if let Some(api_key) = args.api_key {
        config.api_key = api_key;
    }
    if let Some(prompt) = args.prompt {
        config.prompt = Some(prompt);
    }
    if let Some(model) = args.model {
        config.model = model;
    }

    let mut orchestrator = Orchestrator::from_config(&config);
    if !args.no_progress {
        orchestrator = orchestrator.with_indicator(Arc::new(SpinnerIndicator::new()));
    }

    let report = orchestrator.run(&args.video).await;
    match report.outcome {
        PipelineOutcome::Done(summary) => {
            match args.output {
                Some(path) => {
                    std::fs::write(&path, &summary)
                        .with_context(|| format!("Failed to write summary to {}", path.display()))?;
                    info!("Summary written to {}", path.display());
                }
                None => println!("{}", summary),
            }
            Ok(())
        }
        PipelineOutcome::Failed(error) => Err(anyhow!(error.user_message())),
    }
}

async fn fetch_tracks(config: &Config, video_input: &str) -> Result<(Orchestrator, Vec<CaptionTrack>)> {
    let video_id = video::parse_video_id(video_input)
        .ok_or_else(|| anyhow!("No video id found in '{}'", video_input))?;

    let orchestrator = Orchestrator::from_config(config);
    let html = orchestrator.source().watch_page(&video_id).await?;
    let tracks = captions::extract_caption_tracks(&html)
        .map_err(|e| anyhow!("Caption track extraction failed: {}", e))?;
    Ok((orchestrator, tracks))
}

async fn run_tracks(common: &CommonArgs, video_input: &str) -> Result<()> {
    let (config, _) = load_config(common)?;
    let (_, tracks) = fetch_tracks(&config, video_input).await?;

    if tracks.is_empty() {
        println!("This video has no captions.");
        return Ok(());
    }

    let selected = captions::select_track(&tracks);
    for track in &tracks {
        let marker = if Some(track) == selected { "*" } else { " " };
        println!(
            "{} {:<8} {}{}{}",
            marker,
            track.language_code,
            track.name.clone().unwrap_or_else(|| language_utils::display_name(&track.language_code)),
            if track.is_auto_generated() { " [auto-generated]" } else { "" },
            if track.is_default { " [default]" } else { "" }
        );
    }
    Ok(())
}

async fn run_captions(common: &CommonArgs, video_input: &str, timestamps: bool) -> Result<()> {
    let (config, _) = load_config(common)?;
    let (orchestrator, tracks) = fetch_tracks(&config, video_input).await?;

    let track = captions::select_track(&tracks)
        .ok_or_else(|| anyhow!("This video has no captions"))?;
    info!("Using caption track {}", track.language_code);

    let entries = orchestrator.source().entries(&track.base_url).await?;
    let text = if timestamps {
        captions::render_with_timestamps(&entries)
    } else {
        captions::assemble_text(&entries)
    };
    println!("{}", text);
    Ok(())
}

async fn run_check(common: &CommonArgs, api_key: Option<String>) -> Result<()> {
    let (config, _) = load_config(common)?;

    let mut settings = config.stored_settings();
    if api_key.is_some() {
        settings = StoredSettings { api_key, ..settings };
    }
    let prompt = PromptConfig::from_settings(settings).map_err(|e| anyhow!(e.user_message()))?;

    let provider = SummarizationClient::from_config(&config).provider(&prompt);
    provider
        .test_connection()
        .await
        .with_context(|| format!("Connection test failed for model {}", config.model))?;

    info!("API key and model {} are working", config.model);
    Ok(())
}
