//! Animated status line for a single named unit of work.
//!
//! A [`Step`] spins next to its name on an [`indicatif`] steady tick until it
//! is completed, then leaves one final line with a success or failure glyph.
//! Completion is delivered exactly once; later attempts are reported as
//! [`StepError::AlreadyCompleted`].

use crate::error::StepError;
use crate::theme::Theme;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fmt::{self, Display};
use std::sync::Mutex;
use std::time::Duration;

/// Redraw period used by [`Step::new`]
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Spinner frames; the last entry is shown once the bar finishes
const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "];

const RUNNING_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const SUCCESS_TEMPLATE: &str = "{prefix:.green.bold} {msg}";
const FAILURE_TEMPLATE: &str = "{prefix:.red.bold} {msg}";

/// Outcome of the tracked work; `Err` carries the failure message
pub type Outcome = Result<(), String>;

/// A running progress indicator
pub struct Step {
    name: String,
    /// Taken by the first completion
    bar: Mutex<Option<ProgressBar>>,
}

impl Step {
    /// Start a step on stderr
    ///
    /// Nothing is drawn when stderr is not a terminal.
    pub fn new(name: impl Into<String>) -> Result<Self, StepError> {
        Self::with_target(ProgressDrawTarget::stderr(), name, DEFAULT_INTERVAL)
    }

    /// Start a step on an explicit draw target with a custom tick interval
    pub fn with_target(
        target: ProgressDrawTarget,
        name: impl Into<String>,
        interval: Duration,
    ) -> Result<Self, StepError> {
        let name = name.into();
        let style = ProgressStyle::with_template(RUNNING_TEMPLATE)?.tick_strings(FRAMES);

        let bar = ProgressBar::new_spinner();
        bar.set_draw_target(target);
        bar.set_style(style);
        bar.set_message(name.clone());
        bar.enable_steady_tick(interval);

        Ok(Self { name, bar: Mutex::new(Some(bar)) })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_completed(&self) -> bool {
        match self.bar.lock() {
            Ok(guard) => guard.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }

    fn take_bar(&self) -> Option<ProgressBar> {
        match self.bar.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    /// Stop spinning and draw the final line for `outcome`
    pub fn complete(&self, outcome: Outcome) -> Result<(), StepError> {
        let (template, glyph, message) = match outcome {
            Ok(()) => (SUCCESS_TEMPLATE, Theme::SUCCESS_GLYPH, self.name.clone()),
            Err(reason) => (FAILURE_TEMPLATE, Theme::FAILURE_GLYPH, format!("{} - error: {}", self.name, reason)),
        };
        let style = ProgressStyle::with_template(template)?;

        let Some(bar) = self.take_bar() else {
            return Err(StepError::already_completed(&self.name));
        };

        bar.set_style(style);
        bar.set_prefix(glyph);
        bar.finish_with_message(message);
        Ok(())
    }

    pub fn succeed(&self) -> Result<(), StepError> {
        self.complete(Ok(()))
    }

    pub fn fail(&self, err: impl Display) -> Result<(), StepError> {
        self.complete(Err(err.to_string()))
    }

    /// Complete from the result of the work this step tracked
    pub fn finish<T, E: Display>(&self, result: &Result<T, E>) -> Result<(), StepError> {
        match result {
            Ok(_) => self.succeed(),
            Err(e) => self.fail(e),
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step").field("name", &self.name).field("completed", &self.is_completed()).finish()
    }
}

impl Drop for Step {
    /// An abandoned step clears its line without a final status
    fn drop(&mut self) {
        if let Some(bar) = self.take_bar() {
            tracing::trace!("Step '{}' dropped before completion", self.name);
            bar.finish_and_clear();
        }
    }
}
