//! Pure state transition function
//!
//! Given the same state and event this always yields the same new state and
//! effects; all I/O happens in the runtime that executes the effects.

use super::event::Outcome;
use super::{Effect, Event, SubmissionState};
use crate::format::format;
use crate::llm::{LlmErrorKind, Turn};
use crate::runtime::MessageBody;
use thiserror::Error;

pub const STATUS_SENDING: &str = "Sending to OpenAI…";
pub const STATUS_READY: &str = "Ready";
pub const STATUS_AUTH: &str = "Auth error (401). Check your API key.";
pub const STATUS_RATE_LIMIT: &str = "Rate limited (429). Try again in a bit.";
pub const STATUS_TRANSPORT: &str =
    "CORS/network error. Reach the endpoint over http(s), not file://";
pub const STATUS_UNEXPECTED: &str = "Request failed";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SubmissionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SubmissionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Status line for a failed request
pub fn failure_status(kind: LlmErrorKind, message: &str) -> String {
    match kind {
        LlmErrorKind::Auth => STATUS_AUTH.to_string(),
        LlmErrorKind::RateLimit => STATUS_RATE_LIMIT.to_string(),
        LlmErrorKind::Transport => STATUS_TRANSPORT.to_string(),
        LlmErrorKind::Api => format!("API error: {message}"),
        LlmErrorKind::Unexpected => STATUS_UNEXPECTED.to_string(),
    }
}

/// Pure transition function
pub fn transition(
    state: &SubmissionState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Idle + Submit (blank) -> Idle, nothing happens
        (SubmissionState::Idle, Event::Submit { text, .. }) if text.trim().is_empty() => {
            Ok(TransitionResult::new(SubmissionState::Idle))
        }

        // Idle + Submit -> Submitting
        (SubmissionState::Idle, Event::Submit { text, token }) => {
            let text = text.trim().to_string();
            Ok(TransitionResult::new(SubmissionState::Submitting { token })
                .with_effect(Effect::render_user(text.clone()))
                .with_effect(Effect::AppendTurn(Turn::user(text)))
                .with_effect(Effect::PersistHistory)
                .with_effect(Effect::status(STATUS_SENDING))
                .with_effect(Effect::ShowTyping))
        }

        // Submitting + Dispatched -> AwaitingResponse
        (SubmissionState::Submitting { token }, Event::Dispatched) => {
            Ok(TransitionResult::new(SubmissionState::AwaitingResponse { token: *token })
                .with_effect(Effect::RequestCompletion))
        }

        // AwaitingResponse + Completed(Success) -> Succeeded
        (
            SubmissionState::AwaitingResponse { token },
            Event::Completed {
                outcome: Outcome::Success { text },
            },
        ) => {
            let markup = format(&text);
            Ok(TransitionResult::new(SubmissionState::Succeeded { token: *token })
                .with_effects([
                    Effect::RemoveTyping,
                    Effect::render_assistant(MessageBody::Markup(markup)),
                    Effect::AppendTurn(Turn::assistant(text)),
                    Effect::TrimHistory,
                    Effect::PersistHistory,
                    Effect::status(STATUS_READY),
                ]))
        }

        // AwaitingResponse + Completed(Failure) -> Failed
        (
            SubmissionState::AwaitingResponse { token },
            Event::Completed {
                outcome: Outcome::Failure { kind, message },
            },
        ) => Ok(TransitionResult::new(SubmissionState::Failed {
            token: *token,
            kind,
        })
        .with_effects([
            Effect::RemoveTyping,
            Effect::error_status(failure_status(kind, &message)),
            Effect::render_assistant(MessageBody::Text(format!("Error: {message}"))),
        ])),

        // Succeeded | Failed + Settled -> Idle
        (SubmissionState::Succeeded { .. } | SubmissionState::Failed { .. }, Event::Settled) => {
            Ok(TransitionResult::new(SubmissionState::Idle).with_effect(Effect::ResetInput))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state:?} with event {event:?}"
        ))),
    }
}
