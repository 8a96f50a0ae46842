//! Typed error definitions for the Doraemon quant client.
//!
//! Every failure coming out of the HTTP adapter is folded into a single
//! [`ApiError`] whose `Display` output is the human-readable message that
//! stores record and callers surface. The message prefers the backend's own
//! `message` field and falls back to a transport-level description.

use thiserror::Error;

/// Normalized error raised by the HTTP client adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response was received (connect failure, reset, client timeout).
    #[error("{0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Backend-supplied `message`, or a status description when absent.
        message: String,
    },

    /// A 2xx body did not have the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),

    /// A polling helper gave up before the job finished.
    #[error("timed out: {0}")]
    Timeout(String),
}

impl ApiError {
    /// Build a [`ApiError::Backend`] from a status code and the raw error body.
    ///
    /// The body's top-level `message` string wins when present and non-empty;
    /// otherwise the message mirrors a generic status description.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("request failed with status code {status}"));
        Self::Backend { status, message }
    }

    /// HTTP status, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The normalized, human-readable message.
    pub fn message(&self) -> String {
        self.to_string()
    }
}
