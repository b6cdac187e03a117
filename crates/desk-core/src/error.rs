//! Error types for the trading session desk.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("API error: {message}")]
    Api { message: String, status: Option<u16> },

    #[error("Invalid value for {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("A submission is already in flight")]
    SubmissionInFlight,
}

impl Error {
    /// Whether the request failed on the wire: send error, timeout, or a
    /// body that is not JSON.
    ///
    /// [`interpret_reply`](crate::submission::interpret_reply) reports these
    /// as network errors; every other error is returned to the caller.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Json(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
