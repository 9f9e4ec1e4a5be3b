use serde_json::Value;

/// Failure half of every API call. `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Server answered with a non-success status.
    #[error("{message}")]
    Http { status: u16, message: String },
    /// Request never produced a response (connection refused, timeout, ...).
    #[error("{0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Invalid(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Builds an error from a non-success response body.
    ///
    /// Looks for `detail` (a string, or a list of `{msg}` validation entries),
    /// then `message`, then `error`; otherwise falls back to the status code.
    pub fn from_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| extract_message(&v))
            .unwrap_or_else(|| format!("HTTP {status}"));
        ApiError::Http { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

fn extract_message(v: &Value) -> Option<String> {
    match v.get("detail") {
        Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.clone()),
        Some(Value::Array(items)) => {
            let msgs: Vec<&str> = items.iter().filter_map(|i| i.get("msg").and_then(Value::as_str)).collect();
            if !msgs.is_empty() {
                return Some(msgs.join("; "));
            }
        }
        _ => {}
    }
    ["message", "error"]
        .iter()
        .find_map(|k| v.get(*k).and_then(Value::as_str).filter(|s| !s.trim().is_empty()).map(str::to_string))
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}
