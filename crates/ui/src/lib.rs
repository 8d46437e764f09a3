//! Terminal presentation helpers for the keepsake CLI.

mod error;
pub mod stepper;
pub mod theme;

pub use error::StepError;
pub use stepper::{DEFAULT_INTERVAL, Outcome, Step};
pub use theme::Theme;
