//! Error types for the dashboard core
//!
//! Provider clients return boxed errors; everything crossing into the
//! dashboard is converted to `DashboardError` at the call site.

use thiserror::Error;

/// Message shown whenever the analysis provider fails
pub const ANALYSIS_FAILED_MESSAGE: &str = "Analysis failed. Please try again.";
/// Message shown whenever the tone-improvement provider fails
pub const IMPROVEMENT_FAILED_MESSAGE: &str = "Could not generate an improved version. Please try again.";
/// Message shown when a manual submission has no text
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter some text to analyze.";

#[derive(Error, Debug)]
pub enum DashboardError {
    /// Nothing usable to submit
    #[error("No text to analyze")]
    EmptyInput,

    /// Analysis provider threw or returned something unusable
    #[error("Analysis provider failure: {0}")]
    ProviderFailure(String),

    /// Tone-improvement provider failed
    #[error("Tone improvement failure: {0}")]
    ImprovementFailure(String),

    /// Another batch is still in flight
    #[error("An analysis request is already in progress")]
    Busy,

    #[error("Not found: {0}")]
    NotFound(String),

    /// Result does not qualify for tone improvement
    #[error("Not eligible: {0}")]
    NotEligible(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DashboardResult<T> = Result<T, DashboardError>;

impl DashboardError {
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::ProviderFailure(msg.into())
    }

    pub fn improvement(msg: impl Into<String>) -> Self {
        Self::ImprovementFailure(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The generic text surfaced on the error channel, if this kind is user-facing
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            DashboardError::EmptyInput => Some(EMPTY_INPUT_MESSAGE),
            DashboardError::ProviderFailure(_) => Some(ANALYSIS_FAILED_MESSAGE),
            DashboardError::ImprovementFailure(_) => Some(IMPROVEMENT_FAILED_MESSAGE),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DashboardError::provider("timeout");
        assert_eq!(err.to_string(), "Analysis provider failure: timeout");
    }

    #[test]
    fn test_user_messages_are_generic() {
        assert_eq!(
            DashboardError::provider("HTTP 500: secret details").user_message(),
            Some(ANALYSIS_FAILED_MESSAGE)
        );
        assert_eq!(DashboardError::Busy.user_message(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DashboardError = io_err.into();
        assert!(matches!(err, DashboardError::Io(_)));
    }
}
