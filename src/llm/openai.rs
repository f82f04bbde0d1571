use serde::{Deserialize, Serialize};

use crate::llm::client::{ApiError, DEFAULT_BASE_URL, endpoint, post_json};
use crate::llm::message::ChatMessage;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Sampling and transport knobs of one completion call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompletionOptions {
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_secs: Option<u64>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: None,
        }
    }
}

/// Wire payload of `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl ChatCompletionRequest {
    pub fn new(
        model: impl Into<String>,
        messages: Vec<ChatMessage>,
        options: &CompletionOptions,
    ) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// Token accounting reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Completion {
    /// Trimmed text of the first choice.
    pub content: String,
    pub usage: Option<Usage>,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl CompletionClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sends `request` once and returns the first choice.
    pub async fn complete(
        &self,
        request: &ChatCompletionRequest,
        timeout_secs: Option<u64>,
    ) -> Result<Completion, ApiError> {
        let url = endpoint(&self.base_url, "chat/completions");
        tracing::debug!(
            %url,
            model = %request.model,
            messages = request.messages.len(),
            "sending completion request"
        );

        let response = post_json(&self.client, &url, &self.api_key, request, timeout_secs).await?;
        let body: ChatCompletionResponse = response.json().await?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(ApiError::EmptyResponse)?;

        Ok(Completion {
            content,
            usage: body.usage,
        })
    }
}
