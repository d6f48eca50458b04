//! `OpenAI` and `OpenAI`-compatible provider implementation

use super::types::{Completion, CompletionRequest, Turn, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Wire shape of the completion endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiDialect {
    /// `POST /chat/completions`, text at `choices[0].message.content`
    #[default]
    ChatCompletions,
    /// `POST /responses`, text in the first `message` entry of `output`
    Responses,
}

impl ApiDialect {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "chat" | "chat_completions" => Some(Self::ChatCompletions),
            "responses" => Some(Self::Responses),
            _ => None,
        }
    }

    fn path(self) -> &'static str {
        match self {
            Self::ChatCompletions => "chat/completions",
            Self::Responses => "responses",
        }
    }
}

/// OpenAI-compatible service implementation
pub struct OpenAIService {
    client: Client,
    api_key: String,
    dialect: ApiDialect,
    endpoint: String,
    model_id: String,
}

impl OpenAIService {
    pub fn new(
        api_key: Option<String>,
        base_url: &str,
        model: impl Into<String>,
        dialect: ApiDialect,
    ) -> Result<Self, LlmError> {
        let endpoint = format!("{}/{}", base_url.trim_end_matches('/'), dialect.path());

        // No request timeout; a stalled call is left to the transport.
        let client = Client::builder()
            .build()
            .map_err(|e| LlmError::unexpected(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            // A missing key is still sent; the provider answers 401.
            api_key: api_key.unwrap_or_default(),
            dialect,
            endpoint,
            model_id: model.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn translate_chat_request(request: &CompletionRequest) -> ChatRequest<'_> {
        ChatRequest {
            model: &request.params.model,
            messages: &request.messages,
            temperature: request.params.temperature,
            max_tokens: request.params.max_output_tokens,
            stream: false,
        }
    }

    fn translate_responses_request(request: &CompletionRequest) -> ResponsesApiRequest<'_> {
        ResponsesApiRequest {
            model: &request.params.model,
            input: &request.messages,
            temperature: request.params.temperature,
            max_output_tokens: request.params.max_output_tokens,
        }
    }

    fn normalize_chat_response(resp: ChatResponse) -> Completion {
        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content);

        Completion {
            text,
            usage: resp
                .usage
                .map(|u| Usage {
                    input_tokens: u64::from(u.prompt_tokens),
                    output_tokens: u64::from(u.completion_tokens),
                })
                .unwrap_or_default(),
        }
    }

    fn normalize_responses_api_response(resp: ResponsesApiResponse) -> Completion {
        let text = resp
            .output
            .into_iter()
            .find(|output| output.r#type == "message")
            .and_then(|output| {
                output
                    .content
                    .into_iter()
                    .find(|item| item.r#type == "output_text")
            })
            .and_then(|item| item.text);

        Completion {
            text,
            usage: resp
                .usage
                .map(|u| Usage {
                    input_tokens: u64::from(u.input_tokens),
                    output_tokens: u64::from(u.output_tokens),
                })
                .unwrap_or_default(),
        }
    }

    fn map_send_error(e: &reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::transport(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            LlmError::transport(format!("Connection failed: {e}"))
        } else if e.is_builder() {
            // Unsupported schemes such as file:// land here
            LlmError::transport(format!("Invalid endpoint: {e}"))
        } else if e.to_string().to_lowercase().contains("cors") {
            LlmError::transport(format!("Request blocked: {e}"))
        } else {
            LlmError::unexpected(format!("Request failed: {e}"))
        }
    }
}

#[async_trait]
impl LlmService for OpenAIService {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let builder = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");

        let builder = match self.dialect {
            ApiDialect::ChatCompletions => builder.json(&Self::translate_chat_request(request)),
            ApiDialect::Responses => builder.json(&Self::translate_responses_request(request)),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_send_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let provider_message = serde_json::from_str::<OpenAIErrorResponse>(&body)
                .ok()
                .and_then(|resp| resp.error)
                .and_then(|err| err.message);
            tracing::debug!(status = status.as_u16(), body = %body, "Provider error payload");
            return Err(LlmError::from_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
                provider_message.as_deref(),
            ));
        }

        parse_success_body(self.dialect, &body)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Parse a 2xx body for the given dialect
fn parse_success_body(dialect: ApiDialect, body: &str) -> Result<Completion, LlmError> {
    let parse_error =
        |e: serde_json::Error| LlmError::unexpected(format!("Failed to parse response: {e}"));

    match dialect {
        ApiDialect::ChatCompletions => serde_json::from_str::<ChatResponse>(body)
            .map(OpenAIService::normalize_chat_response)
            .map_err(parse_error),
        ApiDialect::Responses => serde_json::from_str::<ResponsesApiResponse>(body)
            .map(OpenAIService::normalize_responses_api_response)
            .map_err(parse_error),
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    #[serde(default)]
    error: Option<OpenAIError>,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    #[serde(default)]
    message: Option<String>,
}

// Responses API types

#[derive(Debug, Serialize)]
struct ResponsesApiRequest<'a> {
    model: &'a str,
    input: &'a [Turn],
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ResponsesApiResponse {
    #[serde(default)]
    output: Vec<ResponsesApiOutput>,
    #[serde(default)]
    usage: Option<ResponsesApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ResponsesApiOutput {
    r#type: String,
    #[serde(default)]
    content: Vec<ResponsesApiContent>,
}

#[derive(Debug, Deserialize)]
struct ResponsesApiContent {
    r#type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponsesApiUsage {
    input_tokens: u32,
    output_tokens: u32,
}
