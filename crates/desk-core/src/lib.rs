//! Session Desk Core Library
//!
//! Shared types, order validation, and the HTTP client used by every
//! front-end of the trading session desk.

pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod submission;
pub mod types;

pub use error::{Error, Result};
pub use form::{Form, Submission};
pub use submission::SubmissionOutcome;
