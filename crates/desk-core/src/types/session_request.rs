//! Requests that act on the positions of an existing session.

use serde::{Deserialize, Serialize};

/// In-progress stop loss / take profit adjustment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifyDraft {
    pub session_id: String,
    pub new_sl: String,
    pub new_tp: String,
}

impl ModifyDraft {
    /// Draft pre-filled with the session chosen on the dashboard.
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Default::default()
        }
    }

    pub fn with_new_sl(mut self, price: impl Into<String>) -> Self {
        self.new_sl = price.into();
        self
    }

    pub fn with_new_tp(mut self, price: impl Into<String>) -> Self {
        self.new_tp = price.into();
        self
    }
}

/// Body of `POST /modify_positions`. At least one level is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifyRequest {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_sl: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_tp: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloseDraft {
    pub session_id: String,
}

impl CloseDraft {
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}

/// Body of `POST /close_positions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseRequest {
    pub session_id: String,
}
