//! LLM provider abstraction
//!
//! One trait for the completion endpoint, one concrete OpenAI-compatible
//! service, and a logging decorator.

mod error;
mod openai;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use openai::{ApiDialect, OpenAIService, DEFAULT_BASE_URL};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Wraps a service and records one log line per completion call
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        tracing::debug!(
            model = %self.model_id,
            turns = request.messages.len(),
            temperature = request.params.temperature,
            max_output_tokens = request.params.max_output_tokens,
            "Calling completion endpoint"
        );

        let started = Instant::now();
        let result = self.inner.complete(request).await;
        let elapsed_ms = started.elapsed().as_millis();

        match &result {
            Ok(completion) => tracing::info!(
                model = %self.model_id,
                elapsed_ms = %elapsed_ms,
                reply_chars = completion.text.as_deref().map_or(0, str::len),
                input_tokens = completion.usage.input_tokens,
                output_tokens = completion.usage.output_tokens,
                "Completion call finished"
            ),
            Err(e) => tracing::error!(
                model = %self.model_id,
                elapsed_ms = %elapsed_ms,
                kind = e.kind.as_str(),
                status = ?e.status,
                error = %e.message,
                "Completion call failed"
            ),
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
