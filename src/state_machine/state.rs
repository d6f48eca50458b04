//! Submission state types

use crate::llm::LlmErrorKind;
use std::fmt;

/// Identifies one submission. Tokens increase monotonically per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a single submission
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    /// Nothing in flight for this submission
    #[default]
    Idle,

    /// User turn recorded, request not yet issued
    Submitting { token: RequestToken },

    /// Request in flight
    AwaitingResponse { token: RequestToken },

    /// Assistant turn recorded
    Succeeded { token: RequestToken },

    /// Request failed; conversation left as it was after submission
    Failed {
        token: RequestToken,
        kind: LlmErrorKind,
    },
}

impl SubmissionState {
    #[allow(dead_code)] // Used in tests
    pub fn token(&self) -> Option<RequestToken> {
        match self {
            SubmissionState::Idle => None,
            SubmissionState::Submitting { token }
            | SubmissionState::AwaitingResponse { token }
            | SubmissionState::Succeeded { token }
            | SubmissionState::Failed { token, .. } => Some(*token),
        }
    }

    /// Check if the submission has an outcome and only awaits cleanup
    #[allow(dead_code)] // Used in tests
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            SubmissionState::Succeeded { .. } | SubmissionState::Failed { .. }
        )
    }
}
