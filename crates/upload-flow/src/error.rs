//! Failure taxonomy and display-message normalization
//!
//! Heterogeneous failures (missing input, network faults, timeouts,
//! server-reported errors, malformed responses) all collapse to a single
//! display string for the page. Nothing is retried; every failure
//! terminates the task.

use thiserror::Error;

/// Workflow phase, selects the generic fallback message for failures
/// that carry no server-provided text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Analysis,
    Download,
    Processing,
}

impl Phase {
    fn fallback(self) -> &'static str {
        match self {
            Phase::Analysis => "Analysis failed",
            Phase::Download => "Download failed",
            Phase::Processing => "Processing failed",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    /// Required input missing or malformed at submit time. Surfaced
    /// immediately, before any network call.
    #[error("{0}")]
    Validation(String),

    /// Network-level failure.
    #[error("network error: {0}")]
    Transport(String),

    /// The call exceeded its bounded timeout.
    #[error("request timed out")]
    Timeout,

    /// Non-2xx response carrying a server-provided message.
    #[error("{0}")]
    Server(String),

    /// 2xx response whose body does not match the expected shape.
    #[error("invalid server response: {0}")]
    Shape(String),

    /// A submission was refused because one is already outstanding.
    #[error("a request is already in flight")]
    AlreadyInFlight,
}

impl FlowError {
    /// Collapse any failure to the single string shown in the UI.
    ///
    /// Server-provided and validation messages pass through verbatim;
    /// everything else gets a generic phase-appropriate message.
    pub fn user_message(&self, phase: Phase) -> String {
        match self {
            FlowError::Validation(msg) | FlowError::Server(msg) => msg.clone(),
            FlowError::Transport(_) | FlowError::Timeout => phase.fallback().to_string(),
            FlowError::Shape(_) => "Invalid server response".to_string(),
            FlowError::AlreadyInFlight => phase.fallback().to_string(),
        }
    }
}
