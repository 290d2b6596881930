use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - session is missing, invalid or expired")]
    Unauthorized { body: String },

    #[error("Access denied: {}", truncate_body(.0))]
    AccessDenied(String),

    #[error("Resource not found: {}", truncate_body(.0))]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited(String),

    #[error("Server error ({status}): {}", truncate_body(.body))]
    ServerError { status: StatusCode, body: String },

    #[error("Request rejected ({status}): {}", truncate_body(.body))]
    Rejected { status: StatusCode, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be built, so nothing was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to persist session: {0}")]
    Session(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Message shown when a failed login carries no detail from the server
const LOGIN_FAILED: &str = "Login failed";

/// Truncate a response body to avoid printing excessive data
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

/// Error payload shape used by the backend (`{"detail": "..."}`)
#[derive(Deserialize)]
struct ErrorDetail {
    detail: serde_json::Value,
}

impl ApiError {
    /// Map a non-success status to an error, keeping the body verbatim.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized { body },
            403 => ApiError::AccessDenied(body),
            404 => ApiError::NotFound(body),
            429 => ApiError::RateLimited(body),
            500..=599 => ApiError::ServerError { status, body },
            _ => ApiError::Rejected { status, body },
        }
    }

    /// HTTP status of the response that caused this error, if one arrived
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            ApiError::AccessDenied(_) => Some(StatusCode::FORBIDDEN),
            ApiError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            ApiError::RateLimited(_) => Some(StatusCode::TOO_MANY_REQUESTS),
            ApiError::ServerError { status, .. } | ApiError::Rejected { status, .. } => {
                Some(*status)
            }
            ApiError::Network(_)
            | ApiError::InvalidResponse(_)
            | ApiError::InvalidRequest(_)
            | ApiError::Session(_) => None,
        }
    }

    /// Raw response body, if the error came from a server response
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { body }
            | ApiError::ServerError { body, .. }
            | ApiError::Rejected { body, .. } => Some(body),
            ApiError::AccessDenied(body)
            | ApiError::NotFound(body)
            | ApiError::RateLimited(body) => Some(body),
            ApiError::Network(_)
            | ApiError::InvalidResponse(_)
            | ApiError::InvalidRequest(_)
            | ApiError::Session(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// The server's `detail` message, if the body carries one.
    /// Validation errors come back as a list; their `msg` fields are joined.
    pub fn detail(&self) -> Option<String> {
        let parsed: ErrorDetail = serde_json::from_str(self.body()?).ok()?;
        match parsed.detail {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            serde_json::Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            _ => None,
        }
    }

    /// Inline message for a failed login form
    pub fn login_message(&self) -> String {
        self.detail().unwrap_or_else(|| LOGIN_FAILED.to_string())
    }
}
