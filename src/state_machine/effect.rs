//! Effects produced by state transitions

use crate::llm::Turn;
use crate::runtime::{MessageBody, Sender};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a turn to the in-memory conversation
    AppendTurn(Turn),

    /// Bound the conversation with the configured trim policy
    TrimHistory,

    /// Write the conversation to storage
    PersistHistory,

    /// Append an entry to the transcript
    RenderMessage { sender: Sender, body: MessageBody },

    /// Show the typing placeholder for this submission
    ShowTyping,

    /// Remove this submission's typing placeholder
    RemoveTyping,

    /// Replace the status line
    ShowStatus { text: String, is_error: bool },

    /// Issue the outbound completion request
    RequestCompletion,

    /// Clear and refocus the input
    ResetInput,
}

impl Effect {
    pub fn status(text: impl Into<String>) -> Self {
        Effect::ShowStatus {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error_status(text: impl Into<String>) -> Self {
        Effect::ShowStatus {
            text: text.into(),
            is_error: true,
        }
    }

    pub fn render_user(text: impl Into<String>) -> Self {
        Effect::RenderMessage {
            sender: Sender::User,
            body: MessageBody::Text(text.into()),
        }
    }

    pub fn render_assistant(body: MessageBody) -> Self {
        Effect::RenderMessage {
            sender: Sender::Assistant,
            body,
        }
    }
}
