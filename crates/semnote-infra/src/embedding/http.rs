//! Shared HTTP plumbing for embedding backends.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use semnote_types::error::EmbeddingError;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Longest response body snippet carried in an error.
const MAX_ERROR_BODY: usize = 512;

/// POST `body` as JSON to `url` and decode a JSON response.
///
/// Non-2xx statuses become [`EmbeddingError::Status`] with a body snippet;
/// undecodable bodies become [`EmbeddingError::InvalidResponse`].
pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    url: &str,
    api_key: Option<&SecretString>,
    timeout: Duration,
    body: &B,
) -> Result<R, EmbeddingError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let mut request = client.post(url).timeout(timeout).json(body);
    if let Some(key) = api_key {
        request = request.bearer_auth(key.expose_secret());
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            EmbeddingError::Request(format!("request to {url} timed out after {timeout:?}"))
        } else {
            EmbeddingError::Request(e.to_string())
        }
    })?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| EmbeddingError::Request(e.to_string()))?;

    if !status.is_success() {
        return Err(EmbeddingError::Status {
            status: status.as_u16(),
            body: truncate(&text, MAX_ERROR_BODY),
        });
    }

    serde_json::from_str(&text).map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Reject blank input before it reaches a backend.
pub(crate) fn ensure_not_blank(text: &str) -> Result<(), EmbeddingError> {
    if text.trim().is_empty() {
        Err(EmbeddingError::EmptyInput)
    } else {
        Ok(())
    }
}
