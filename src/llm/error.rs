//! LLM error types

use thiserror::Error;

/// LLM error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
    /// HTTP status when the provider answered at all
    pub status: Option<u16>,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Transport, message)
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unexpected, message)
    }

    /// Classify a non-success HTTP answer.
    ///
    /// `provider_message` is the `error.message` field of the body when one
    /// could be parsed. The resulting message is what the transcript shows:
    /// the provider's text when present, otherwise the status line.
    pub fn from_status(status: u16, reason: &str, provider_message: Option<&str>) -> Self {
        let message = match provider_message {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => format!("HTTP {status} {reason}").trim_end().to_string(),
        };
        let mentions_cors = provider_message
            .is_some_and(|m| m.to_lowercase().contains("cors"));

        let kind = match status {
            401 => LlmErrorKind::Auth,
            429 => LlmErrorKind::RateLimit,
            0 => LlmErrorKind::Transport,
            _ if mentions_cors => LlmErrorKind::Transport,
            _ => LlmErrorKind::Api,
        };

        Self::new(kind, message).with_status(status)
    }
}

/// Error classification for status reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Connection refused, timeouts, CORS-style rejections
    Transport,
    /// Rate limited (429)
    RateLimit,
    /// Authentication failed (401)
    Auth,
    /// Any other non-success answer from the provider
    Api,
    /// Parse failures and anything else not classified above
    Unexpected,
}

impl LlmErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::RateLimit => "rate_limit",
            Self::Auth => "auth",
            Self::Api => "api",
            Self::Unexpected => "unexpected",
        }
    }
}
