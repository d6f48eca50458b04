//! Events that can occur during a submission

use super::state::RequestToken;
use crate::llm::{Completion, LlmError, LlmErrorKind};

/// Reply shown when the provider answered without usable text
pub const FALLBACK_REPLY: &str = "I could not generate a response.";

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// User pressed send
    Submit { text: String, token: RequestToken },
    /// Outbound request about to be issued
    Dispatched,
    /// Request finished, one way or another
    Completed { outcome: Outcome },
    /// Cleanup after either outcome
    Settled,
}

/// Classified result of one completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { text: String },
    Failure { kind: LlmErrorKind, message: String },
}

impl Outcome {
    /// Classify the raw client result.
    ///
    /// Successful answers are trimmed; missing or blank text becomes
    /// [`FALLBACK_REPLY`].
    pub fn classify(result: Result<Completion, LlmError>) -> Self {
        match result {
            Ok(completion) => {
                let text = completion
                    .text
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .unwrap_or(FALLBACK_REPLY)
                    .to_string();
                Outcome::Success { text }
            }
            Err(e) => Outcome::Failure {
                kind: e.kind,
                message: if e.message.is_empty() {
                    "Failed to reach the AI.".to_string()
                } else {
                    e.message
                },
            },
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}
