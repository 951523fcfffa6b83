//! Gradio client error types.

use thiserror::Error;

use crate::event_stream::EventStreamError;

pub type GradioResult<T> = Result<T, GradioError>;

/// Which of the three space calls failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Upload,
    Submit,
    Result,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Upload => "upload",
            Step::Submit => "submit",
            Step::Result => "result",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum GradioError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Space returned {status} on {step}: {body}")]
    Status {
        step: Step,
        status: u16,
        body: String,
    },

    #[error("Invalid response on {step}: {message}")]
    InvalidResponse { step: Step, message: String },

    #[error("Malformed event stream: {0}")]
    Stream(#[from] EventStreamError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GradioError {
    /// Transient failures worth another attempt when retries are enabled.
    pub fn is_retryable(&self) -> bool {
        match self {
            GradioError::Network(_) => true,
            GradioError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
