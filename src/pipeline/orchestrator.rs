use log::{debug, error, info, warn};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::indicator::{IndicatorGuard, NoopIndicator, ProgressIndicator};
use super::state::{PipelineOutcome, PipelineReport, PipelineState};
use crate::app_config::{Config, PromptConfig, SettingsStore, StoredSettings};
use crate::captions::{assemble_text, extract_caption_tracks, parse_timed_text, select_track, CaptionSource};
use crate::errors::PipelineError;
use crate::fetcher::HttpFetcher;
use crate::summarizer::SummarizationClient;
use crate::video;

/// Where a run gets its watch page markup from
enum PageInput<'a> {
    /// Video id or URL; the page is fetched
    Video(&'a str),
    /// Markup supplied by the caller
    Markup(&'a str),
}

/// Resolved page input
enum Page<'a> {
    Fetch { video_id: String },
    Given(&'a str),
}

/// States visited by one run
struct RunTrace {
    states: Vec<PipelineState>,
}

impl RunTrace {
    fn new() -> Self {
        Self {
            states: vec![PipelineState::Idle],
        }
    }

    fn enter(&mut self, state: PipelineState, guard: Option<&IndicatorGuard<'_>>) {
        if let Some(previous) = self.states.last() {
            debug!("Pipeline state: {} -> {}", previous, state);
        }
        self.states.push(state);
        if let Some(guard) = guard {
            guard.update(state);
        }
    }
}

/// Runs caption extraction, selection, assembly and summarization for a video
///
/// Holds no per-run state, so concurrent runs on one orchestrator are
/// independent of each other.
pub struct Orchestrator {
    settings: Arc<dyn SettingsStore>,
    source: CaptionSource,
    summarizer: SummarizationClient,
    indicator: Arc<dyn ProgressIndicator>,
}

impl Orchestrator {
    /// Create an orchestrator from its collaborators, without an indicator
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        source: CaptionSource,
        summarizer: SummarizationClient,
    ) -> Self {
        Self {
            settings,
            source,
            summarizer,
            indicator: Arc::new(NoopIndicator),
        }
    }

    /// Create an orchestrator reading settings, endpoints and timeouts from `config`
    pub fn from_config(config: &Config) -> Self {
        let fetcher = HttpFetcher::new(Duration::from_secs(config.fetch_timeout_secs));
        let source = CaptionSource::new(Arc::new(fetcher), config.page_base_url.clone());
        Self::new(
            Arc::new(config.clone()),
            source,
            SummarizationClient::from_config(config),
        )
    }

    /// Replace the settings store
    pub fn with_settings(mut self, settings: Arc<dyn SettingsStore>) -> Self {
        self.settings = settings;
        self
    }

    /// Show `indicator` while runs are in progress
    pub fn with_indicator(mut self, indicator: Arc<dyn ProgressIndicator>) -> Self {
        self.indicator = indicator;
        self
    }

    /// Caption source used for page and payload retrieval
    pub fn source(&self) -> &CaptionSource {
        &self.source
    }

    /// Summarize the captions of a video given by id or URL
    pub async fn run(&self, video: &str) -> PipelineReport {
        self.execute(PageInput::Video(video)).await
    }

    /// Summarize the captions listed in already-fetched watch page markup
    pub async fn run_markup(&self, html: &str) -> PipelineReport {
        self.execute(PageInput::Markup(html)).await
    }

    async fn execute(&self, input: PageInput<'_>) -> PipelineReport {
        let start_time = Instant::now();
        let mut trace = RunTrace::new();

        let outcome = match self.drive(input, &mut trace).await {
            Ok(summary) => {
                trace.enter(PipelineState::Done, None);
                info!("Summary ready in {:.1}s", start_time.elapsed().as_secs_f64());
                PipelineOutcome::Done(summary)
            }
            Err(err) => {
                let failed_in = trace.states.last().copied().unwrap_or(PipelineState::Idle);
                trace.enter(PipelineState::Failed, None);
                error!("Pipeline failed while {}: {}", failed_in.status_message().to_lowercase(), err);
                PipelineOutcome::Failed(err)
            }
        };

        PipelineReport {
            outcome,
            states: trace.states,
        }
    }

    /// Work through the states; the indicator guard is dropped before returning
    async fn drive(&self, input: PageInput<'_>, trace: &mut RunTrace) -> Result<String, PipelineError> {
        let prompt = self.load_prompt_config().await?;

        let page = match input {
            PageInput::Video(video) => Page::Fetch {
                video_id: video::parse_video_id(video).ok_or(PipelineError::NoVideoId)?,
            },
            PageInput::Markup(html) => Page::Given(html),
        };

        let guard = IndicatorGuard::acquire(self.indicator.as_ref(), "Processing captions...");

        trace.enter(PipelineState::Extracting, Some(&guard));
        let html = match page {
            Page::Given(html) => Cow::Borrowed(html),
            Page::Fetch { video_id } => {
                info!("Fetching video page for {}", video_id);
                Cow::Owned(self.source.watch_page(&video_id).await?)
            }
        };
        let tracks = extract_caption_tracks(&html).map_err(|e| {
            warn!("Could not extract caption tracks: {}", e);
            PipelineError::TrackExtractionFailed(e)
        })?;

        trace.enter(PipelineState::Selecting, Some(&guard));
        let track = select_track(&tracks).ok_or(PipelineError::NoCaptionsAvailable)?;
        info!(
            "Selected caption track '{}'{} out of {}",
            track.language_code,
            if track.is_auto_generated() { " (auto-generated)" } else { "" },
            tracks.len()
        );

        trace.enter(PipelineState::FetchingPayload, Some(&guard));
        let xml = self.source.payload(&track.base_url).await?;

        trace.enter(PipelineState::ParsingPayload, Some(&guard));
        let entries = parse_timed_text(&xml)
            .map_err(|e| PipelineError::PayloadParseFailed(e.to_string()))?;

        trace.enter(PipelineState::Assembling, Some(&guard));
        let caption_text = assemble_text(&entries);
        if caption_text.is_empty() {
            return Err(PipelineError::EmptyCaptionText);
        }
        debug!("Assembled {} caption entries", entries.len());

        trace.enter(PipelineState::Summarizing, Some(&guard));
        self.summarizer.summarize(&caption_text, &prompt).await
    }

    /// Read settings; a store failure counts as having no settings
    async fn load_prompt_config(&self) -> Result<PromptConfig, PipelineError> {
        let settings = match self.settings.load().await {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to load settings: {:#}", e);
                StoredSettings::default()
            }
        };
        PromptConfig::from_settings(settings)
    }
}
