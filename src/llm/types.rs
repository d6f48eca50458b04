//! Common types for LLM interactions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in the conversation. Serialized as `{"role", "content"}`,
/// which is both the storage layout and the wire layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

/// Ordered turn history for a session
pub type Conversation = Vec<Turn>;

/// Sampling parameters sent with every request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParameters {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// LLM request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Conversation,
    pub params: RequestParameters,
}

/// LLM response
#[derive(Debug, Clone, Default)]
pub struct Completion {
    /// Assistant text, `None` when the provider returned no message content
    pub text: Option<String>,
    pub usage: Usage,
}

impl Completion {
    #[allow(dead_code)] // Used in tests
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            usage: Usage::default(),
        }
    }
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
