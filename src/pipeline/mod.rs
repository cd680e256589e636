/*!
 * Caption summarization pipeline.
 *
 * The orchestrator drives one run through these states:
 * 1. Extracting: fetch the watch page and pull out the caption tracks
 * 2. Selecting: pick one track by language
 * 3. FetchingPayload / ParsingPayload: download and parse the timed text
 * 4. Assembling: join the caption text
 * 5. Summarizing: ask the generative language API for a summary
 *
 * Any failure ends the run in `Failed` with the originating error.
 */

pub mod indicator;
pub mod orchestrator;
pub mod state;

pub use indicator::{IndicatorGuard, NoopIndicator, ProgressIndicator, SpinnerIndicator};
pub use orchestrator::Orchestrator;
pub use state::{PipelineOutcome, PipelineReport, PipelineState};
