//! Classification of backend replies into submission outcomes.

use super::SubmissionOutcome;
use crate::api::HttpReply;
use crate::Error;
use serde_json::Value;

/// Shown when a failed response carries no usable `detail`.
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

pub fn interpret(status: u16, body: Value) -> SubmissionOutcome {
    if (200..300).contains(&status) {
        return SubmissionOutcome::Success { data: body };
    }

    SubmissionOutcome::ApiError {
        message: detail_message(&body).unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
    }
}

/// Interpret the result of a request, mapping transport failures to
/// [`SubmissionOutcome::NetworkError`].
///
/// Errors raised before a request could be sent (bad URL, configuration)
/// are not outcomes and are returned as they are.
pub fn interpret_reply(reply: crate::Result<HttpReply>) -> crate::Result<SubmissionOutcome> {
    match reply {
        Ok(reply) => Ok(interpret(reply.status, reply.body)),
        Err(e) if e.is_transport() => Ok(SubmissionOutcome::network(describe_failure(&e))),
        Err(e) => Err(e),
    }
}

/// Extract the `{detail}` message of an error body.
///
/// FastAPI reports request-model errors as a list of `{loc, msg, type}`
/// objects; their `msg` values are joined.
pub fn detail_message(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join(", "))
            }
        }
        _ => None,
    }
}

fn describe_failure(err: &Error) -> String {
    match err {
        Error::Http(e) if e.is_timeout() => format!("request timed out ({})", e),
        Error::Http(e) => e.to_string(),
        Error::Json(e) => format!("malformed response body: {}", e),
        other => other.to_string(),
    }
}
