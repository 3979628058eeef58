use serde::Deserialize;
use thiserror::Error;

/// Fallback text when a failure carries no usable message.
pub const UNKNOWN_ERROR: &str = "unknown error";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("API not available: {0}")]
    Network(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    Application(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies carried in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid carrying excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Build an error for a non-2xx response, preferring the server's `message` field.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .map(|m| Self::truncate_body(&m))
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));

        ApiError::Http {
            status: status.as_u16(),
            message,
        }
    }

    /// Application-level failure (`success: false`) with the envelope's message.
    pub fn application(message: Option<&str>) -> Self {
        match message.map(str::trim) {
            Some(m) if !m.is_empty() => ApiError::Application(m.to_string()),
            _ => ApiError::Application(UNKNOWN_ERROR.to_string()),
        }
    }

    /// HTTP status, if the failure came from a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable text shown to dashboard users.
    pub fn user_message(&self) -> String {
        let text = self.to_string();
        if text.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            text
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Http {
                status: status.as_u16(),
                message: format!("HTTP error! status: {}", status.as_u16()),
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidResponse(err.to_string())
    }
}
