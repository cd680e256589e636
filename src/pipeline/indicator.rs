use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::time::Duration;

use super::PipelineState;

/// "Working" indicator shown while a run is in progress
pub trait ProgressIndicator: Send + Sync {
    /// Show the indicator
    fn start(&self, message: &str);

    /// Report the state the run just entered
    fn update(&self, _state: PipelineState) {}

    /// Remove the indicator
    fn finish(&self);
}

/// Indicator that shows nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIndicator;

impl ProgressIndicator for NoopIndicator {
    fn start(&self, _message: &str) {}

    fn finish(&self) {}
}

/// Terminal spinner on stderr
///
/// Runs sharing one spinner share one bar; it is cleared when the last
/// active run finishes.
#[derive(Default)]
pub struct SpinnerIndicator {
    state: Mutex<SpinnerState>,
}

#[derive(Default)]
struct SpinnerState {
    bar: Option<ProgressBar>,
    active_runs: usize,
}

impl SpinnerIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_bar(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}

impl ProgressIndicator for SpinnerIndicator {
    fn start(&self, message: &str) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.active_runs += 1;
        if let Some(bar) = state.bar.as_ref() {
            bar.set_message(message.to_string());
            return;
        }
        state.bar = Some(Self::new_bar(message));
    }

    fn update(&self, state: PipelineState) {
        if let Some(bar) = self.state.lock().bar.as_ref() {
            bar.set_message(state.status_message());
        }
    }

    fn finish(&self) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.active_runs = state.active_runs.saturating_sub(1);
        if state.active_runs == 0 {
            if let Some(bar) = state.bar.take() {
                bar.finish_and_clear();
            }
        }
    }
}

/// Holds an indicator for the duration of a run and releases it on drop
pub struct IndicatorGuard<'a> {
    indicator: &'a dyn ProgressIndicator,
}

impl<'a> IndicatorGuard<'a> {
    /// Start `indicator` and return the guard that will finish it
    pub fn acquire(indicator: &'a dyn ProgressIndicator, message: &str) -> Self {
        indicator.start(message);
        Self { indicator }
    }

    pub fn update(&self, state: PipelineState) {
        self.indicator.update(state);
    }
}

impl Drop for IndicatorGuard<'_> {
    fn drop(&mut self) {
        self.indicator.finish();
    }
}
