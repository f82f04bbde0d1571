use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Root of the OpenAI REST API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Failure of a remote call. Every variant ends the current submission.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("response did not contain message content")]
    EmptyResponse,
}

/// Joins `base_url` and an endpoint path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Sends one authenticated JSON POST; non-2xx statuses become [`ApiError::Status`].
pub(crate) async fn post_json<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    payload: &T,
    timeout_secs: Option<u64>,
) -> Result<reqwest::Response, ApiError> {
    let mut request = client.post(url).bearer_auth(api_key).json(payload);
    if let Some(timeout_secs) = timeout_secs {
        request = request.timeout(Duration::from_secs(timeout_secs));
    }

    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(%status, "remote call rejected");
    Err(ApiError::Status { status, body })
}

#[cfg(test)]
mod tests {
    use super::endpoint;

    #[test]
    fn endpoint_joins_without_double_slashes() {
        assert_eq!(
            endpoint("https://api.openai.com/v1/", "/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            endpoint("http://127.0.0.1:9000", "audio/speech"),
            "http://127.0.0.1:9000/audio/speech"
        );
    }
}
