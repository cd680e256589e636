use std::fmt;

use crate::errors::PipelineError;

/// State of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Extracting,
    Selecting,
    FetchingPayload,
    ParsingPayload,
    Assembling,
    Summarizing,
    Done,
    Failed,
}

impl PipelineState {
    /// Whether the run has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Short status line for the working indicator
    pub fn status_message(&self) -> &'static str {
        match self {
            Self::Idle => "Starting",
            Self::Extracting => "Reading video page",
            Self::Selecting => "Choosing caption track",
            Self::FetchingPayload => "Downloading captions",
            Self::ParsingPayload => "Parsing captions",
            Self::Assembling => "Assembling caption text",
            Self::Summarizing => "Summarizing captions",
            Self::Done => "Done",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Terminal result of a run
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Summary text returned by the endpoint
    Done(String),
    /// The error that stopped the run
    Failed(PipelineError),
}

impl PipelineOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Summary text, if the run succeeded
    pub fn summary(&self) -> Option<&str> {
        match self {
            Self::Done(summary) => Some(summary),
            Self::Failed(_) => None,
        }
    }

    /// Error, if the run failed
    pub fn error(&self) -> Option<&PipelineError> {
        match self {
            Self::Done(_) => None,
            Self::Failed(error) => Some(error),
        }
    }

    /// The single message shown to the user: the summary or the error message
    pub fn message(&self) -> String {
        match self {
            Self::Done(summary) => summary.clone(),
            Self::Failed(error) => error.user_message(),
        }
    }

    pub fn into_result(self) -> Result<String, PipelineError> {
        match self {
            Self::Done(summary) => Ok(summary),
            Self::Failed(error) => Err(error),
        }
    }
}

/// Outcome of a run plus the states it went through
#[derive(Debug)]
pub struct PipelineReport {
    pub outcome: PipelineOutcome,
    pub states: Vec<PipelineState>,
}

impl PipelineReport {
    /// Last state reached, always `Done` or `Failed`
    pub fn final_state(&self) -> PipelineState {
        self.states.last().copied().unwrap_or(PipelineState::Idle)
    }

    /// Whether the run passed through `state`
    pub fn visited(&self, state: PipelineState) -> bool {
        self.states.contains(&state)
    }
}
