//! OpenAI embedding backend.
//!
//! `POST {base_url}/embeddings` with a bearer API key. Works against any
//! server that speaks the OpenAI embeddings protocol.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use semnote_core::embedding::model::EmbeddingModel;
use semnote_core::embedding::resolver::ResolvedModelConfig;
use semnote_types::embedding::{EmbeddingModelDescriptor, EmbeddingProviderKind};
use semnote_types::error::{ConfigError, EmbeddingError};
use serde::{Deserialize, Serialize};

use super::http::{ensure_not_blank, post_json};

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
    encoding_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

/// OpenAI-backed `EmbeddingModel`.
///
/// The API key is stored as a [`SecretString`] and is only exposed when
/// building the `Authorization` header.
pub struct OpenAiEmbeddingModel {
    client: reqwest::Client,
    descriptor: EmbeddingModelDescriptor,
    base_url: String,
    api_key: SecretString,
    timeout: Duration,
}

impl OpenAiEmbeddingModel {
    /// Build from a resolved configuration. The API key is required.
    pub fn new(
        descriptor: EmbeddingModelDescriptor,
        config: &ResolvedModelConfig,
    ) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .as_ref()
            .map(|key| SecretString::from(key.expose_secret().to_string()))
            .ok_or(ConfigError::MissingField {
                provider: EmbeddingProviderKind::OpenAi,
                field: "api_key",
            })?;

        Ok(Self {
            client: reqwest::Client::new(),
            descriptor,
            base_url: config.base_url.clone(),
            api_key,
            timeout: config.timeout,
        })
    }

    fn url(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let body = EmbeddingsRequest {
            model: &self.descriptor.name,
            input: texts,
            encoding_format: "float",
        };
        let response: EmbeddingsResponse =
            post_json(&self.client, &self.url(), Some(&self.api_key), self.timeout, &body).await?;
        collect_ordered(response, texts.len())
    }
}

/// Order `data` by `index` and check one vector came back per input.
fn collect_ordered(
    response: EmbeddingsResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut data = response.data;
    if data.len() != expected {
        return Err(EmbeddingError::InvalidResponse(format!(
            "expected {expected} embeddings, got {}",
            data.len()
        )));
    }
    data.sort_by_key(|item| item.index);
    if data.iter().enumerate().any(|(i, item)| item.index != i) {
        return Err(EmbeddingError::InvalidResponse(
            "embedding indices are not contiguous".to_string(),
        ));
    }
    Ok(data.into_iter().map(|item| item.embedding).collect())
}

impl EmbeddingModel for OpenAiEmbeddingModel {
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        ensure_not_blank(text)?;
        let mut vectors = self.request(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty data array".to_string()))
    }

    async fn generate_embeddings(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        for text in texts {
            ensure_not_blank(text)?;
        }
        self.request(texts).await
    }

    fn descriptor(&self) -> &EmbeddingModelDescriptor {
        &self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(api_key: Option<&str>) -> ResolvedModelConfig {
        ResolvedModelConfig {
            provider: EmbeddingProviderKind::OpenAi,
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: api_key.map(|k| SecretString::from(k.to_string())),
            timeout: Duration::from_secs(30),
        }
    }

    fn descriptor() -> EmbeddingModelDescriptor {
        EmbeddingModelDescriptor::new(
            "text-embedding-3-small",
            1536,
            "",
            EmbeddingProviderKind::OpenAi,
        )
        .unwrap()
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = OpenAiEmbeddingModel::new(descriptor(), &resolved(None));
        assert!(matches!(result, Err(ConfigError::MissingField { field: "api_key", .. })));
    }

    #[test]
    fn test_url_and_descriptor() {
        let model = OpenAiEmbeddingModel::new(descriptor(), &resolved(Some("sk-test"))).unwrap();
        assert_eq!(model.url(), "https://api.openai.com/v1/embeddings");
        assert_eq!(model.descriptor().dimensions, 1536);
    }

    #[test]
    fn test_request_body_shape() {
        let input = vec!["hello".to_string()];
        let body = EmbeddingsRequest {
            model: "text-embedding-3-small",
            input: &input,
            encoding_format: "float",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "text-embedding-3-small");
        assert_eq!(json["input"][0], "hello");
        assert_eq!(json["encoding_format"], "float");
    }

    #[test]
    fn test_response_reordered_by_index() {
        let response: EmbeddingsResponse = serde_json::from_str(
            r#"{"object":"list","data":[
                {"object":"embedding","index":1,"embedding":[0.5,0.5]},
                {"object":"embedding","index":0,"embedding":[1.0,0.0]}
            ],"model":"text-embedding-3-small","usage":{"prompt_tokens":2,"total_tokens":2}}"#,
        )
        .unwrap();
        let vectors = collect_ordered(response, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.5, 0.5]]);
    }

    #[test]
    fn test_response_count_mismatch() {
        let response: EmbeddingsResponse =
            serde_json::from_str(r#"{"data":[{"index":0,"embedding":[1.0]}]}"#).unwrap();
        assert!(matches!(
            collect_ordered(response, 2),
            Err(EmbeddingError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_text_rejected_before_request() {
        let model = OpenAiEmbeddingModel::new(descriptor(), &resolved(Some("sk-test"))).unwrap();
        let err = model.generate_embedding("   ").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::EmptyInput));
    }
}
