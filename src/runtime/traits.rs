//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the orchestrator with mock implementations.

use crate::db::Database;
use crate::format::Markup;
use crate::llm::{Completion, CompletionRequest, LlmError, LlmService};
use async_trait::async_trait;
use std::sync::Arc;

// ============================================================================
// Storage
// ============================================================================

/// Local persistent storage of named slots
pub trait SlotStore {
    /// Read a slot; `Ok(None)` when it was never written
    fn get(&self, key: &str) -> Result<Option<String>, String>;

    /// Write a slot
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
}

impl<T: SlotStore + ?Sized> SlotStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        (**self).set(key, value)
    }
}

impl SlotStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        self.get_slot(key).map_err(|e| e.to_string())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.set_slot(key, value).map_err(|e| e.to_string())
    }
}

// ============================================================================
// LLM
// ============================================================================

/// Client for making LLM requests
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete an LLM request
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Arc<T> {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        (**self).complete(request).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

/// Adapter to use any `LlmService` as `LlmClient`
pub struct ServiceLlmClient {
    service: Arc<dyn LlmService>,
}

impl ServiceLlmClient {
    pub fn new(service: Arc<dyn LlmService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl LlmClient for ServiceLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        self.service.complete(request).await
    }

    fn model_id(&self) -> &str {
        self.service.model_id()
    }
}

// ============================================================================
// Presentation
// ============================================================================

/// Who a transcript entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

/// Content handed to the presenter. Plain text is shown verbatim; markup
/// has already been escaped by the formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Markup(Markup),
}

/// Identifies a rendered transcript entry so it can be removed later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle(pub u64);

pub const DEFAULT_TEMPERATURE: f32 = 0.8;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 800;
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Current values of the user-adjustable sampling controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl Controls {
    /// Build controls, clamping temperature into range and replacing a
    /// zero token budget with the default.
    pub fn new(temperature: f32, max_output_tokens: u32) -> Self {
        let temperature = if temperature.is_finite() {
            temperature.clamp(0.0, MAX_TEMPERATURE)
        } else {
            DEFAULT_TEMPERATURE
        };
        let max_output_tokens = if max_output_tokens == 0 {
            DEFAULT_MAX_OUTPUT_TOKENS
        } else {
            max_output_tokens
        };
        Self {
            temperature,
            max_output_tokens,
        }
    }

    /// Parse a temperature control value; `None` if it is not a number
    pub fn parse_temperature(value: &str) -> Option<f32> {
        value
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|t| t.is_finite())
            .map(|t| t.clamp(0.0, MAX_TEMPERATURE))
    }

    /// Parse a max-output-tokens control value; `None` unless positive
    pub fn parse_max_output_tokens(value: &str) -> Option<u32> {
        value.trim().parse::<u32>().ok().filter(|n| *n > 0)
    }
}

/// Rendering collaborator driven by the orchestrator
pub trait Presenter {
    /// Append an entry to the visible transcript
    fn append_message(&mut self, sender: Sender, body: MessageBody) -> MessageHandle;

    /// Show a removable "typing" placeholder
    fn show_typing(&mut self) -> MessageHandle;

    /// Remove a previously rendered entry; unknown handles are ignored
    fn remove(&mut self, handle: MessageHandle);

    /// Replace the status line
    fn show_status(&mut self, text: &str, is_error: bool);

    /// Read the current sampling controls
    fn controls(&self) -> Controls;

    /// Clear the input field and return focus to it
    fn reset_input(&mut self);
}
