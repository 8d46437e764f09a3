use thiserror::Error;

/// Errors reported by a [`crate::Step`]
#[derive(Debug, Error)]
pub enum StepError {
    /// `complete` was called on a step that already finished
    #[error("step \"{name}\" already completed")]
    AlreadyCompleted { name: String },

    /// A spinner template failed to parse
    #[error("invalid step template: {0}")]
    Template(#[from] indicatif::style::TemplateError),
}

impl StepError {
    pub fn already_completed(name: impl Into<String>) -> Self {
        Self::AlreadyCompleted { name: name.into() }
    }
}
