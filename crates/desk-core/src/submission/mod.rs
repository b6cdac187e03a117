//! Client-side order handling shared by every form.
//!
//! A submit runs [`validate`] first; only a clean draft is turned into a
//! wire payload by [`build`], and the backend reply is classified by
//! [`interpret`].

pub mod build;
pub mod interpret;
pub mod validate;

pub use build::{build_close, build_modify, build_trade};
pub use interpret::{interpret, interpret_reply, UNKNOWN_ERROR};
pub use validate::{validate_close, validate_modify, validate_trade};

use serde_json::Value;
use std::fmt;

/// Result of one submit attempt.
///
/// Replaces the previous outcome on every submit; never accumulates.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome<T = Value> {
    Success { data: T },
    /// Rejected locally, nothing was sent.
    ValidationError { messages: Vec<String> },
    /// The backend refused a well-formed request.
    ApiError { message: String },
    /// No usable response was obtained.
    NetworkError { message: String },
}

impl<T> SubmissionOutcome<T> {
    pub fn validation(messages: Vec<String>) -> Self {
        SubmissionOutcome::ValidationError { messages }
    }

    pub fn network(cause: impl fmt::Display) -> Self {
        SubmissionOutcome::NetworkError {
            message: cause.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success { .. })
    }

    /// Short tag for logs: `success`, `validation`, `api_error`, `network_error`.
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionOutcome::Success { .. } => "success",
            SubmissionOutcome::ValidationError { .. } => "validation",
            SubmissionOutcome::ApiError { .. } => "api_error",
            SubmissionOutcome::NetworkError { .. } => "network_error",
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            SubmissionOutcome::Success { data } => Some(data),
            _ => None,
        }
    }

    /// Text shown in the result panel for a failed submit.
    pub fn error_message(&self) -> Option<String> {
        match self {
            SubmissionOutcome::Success { .. } => None,
            SubmissionOutcome::ValidationError { messages } => Some(messages.join(", ")),
            SubmissionOutcome::ApiError { message } => Some(message.clone()),
            SubmissionOutcome::NetworkError { message } => {
                Some(format!("Network error: {}", message))
            }
        }
    }

    /// Convert the success payload; failures pass through unchanged.
    pub fn map<U, F>(self, f: F) -> SubmissionOutcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            SubmissionOutcome::Success { data } => SubmissionOutcome::Success { data: f(data) },
            SubmissionOutcome::ValidationError { messages } => {
                SubmissionOutcome::ValidationError { messages }
            }
            SubmissionOutcome::ApiError { message } => SubmissionOutcome::ApiError { message },
            SubmissionOutcome::NetworkError { message } => {
                SubmissionOutcome::NetworkError { message }
            }
        }
    }
}
