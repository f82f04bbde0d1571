use serde::Serialize;

use crate::llm::client::{ApiError, DEFAULT_BASE_URL, endpoint, post_json};

pub const DEFAULT_TTS_MODEL: &str = "tts-1";
pub const DEFAULT_VOICE: &str = "alloy";

/// Wire payload of `POST /audio/speech`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeechRequest {
    pub model: String,
    pub input: String,
    pub voice: String,
    pub response_format: &'static str,
}

impl SpeechRequest {
    pub fn mp3(
        model: impl Into<String>,
        voice: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            voice: voice.into(),
            response_format: "mp3",
        }
    }
}

/// Client for an OpenAI-compatible speech synthesis endpoint.
#[derive(Debug, Clone)]
pub struct SpeechClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl SpeechClient {
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

    /// Returns the synthesized MP3 bytes.
    pub async fn synthesize(
        &self,
        request: &SpeechRequest,
        timeout_secs: Option<u64>,
    ) -> Result<Vec<u8>, ApiError> {
        let url = endpoint(&self.base_url, "audio/speech");
        tracing::debug!(
            %url,
            model = %request.model,
            voice = %request.voice,
            chars = request.input.len(),
            "sending speech request"
        );

        let response = post_json(&self.client, &url, &self.api_key, request, timeout_secs).await?;
        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(ApiError::EmptyResponse);
        }
        Ok(audio.to_vec())
    }
}
