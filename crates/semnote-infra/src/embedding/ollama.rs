//! Ollama embedding backend.
//!
//! `POST {base_url}/api/embed` with `{model, input}`; the batch endpoint
//! returns one vector per input in `embeddings`. An API key is optional and
//! sent as a bearer token when configured (for proxied deployments).

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use semnote_core::embedding::model::EmbeddingModel;
use semnote_core::embedding::resolver::ResolvedModelConfig;
use semnote_types::embedding::EmbeddingModelDescriptor;
use semnote_types::error::{ConfigError, EmbeddingError};
use serde::{Deserialize, Serialize};

use super::http::{ensure_not_blank, post_json};

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Ollama-backed `EmbeddingModel`.
pub struct OllamaEmbeddingModel {
    client: reqwest::Client,
    descriptor: EmbeddingModelDescriptor,
    base_url: String,
    api_key: Option<SecretString>,
    timeout: Duration,
}

impl OllamaEmbeddingModel {
    pub fn new(
        descriptor: EmbeddingModelDescriptor,
        config: &ResolvedModelConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            client: reqwest::Client::new(),
            descriptor,
            base_url: config.base_url.clone(),
            api_key: config
                .api_key
                .as_ref()
                .map(|key| SecretString::from(key.expose_secret().to_string())),
            timeout: config.timeout,
        })
    }

    fn url(&self) -> String {
        format!("{}/api/embed", self.base_url)
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let body = EmbedRequest {
            model: &self.descriptor.name,
            input: texts,
        };
        let response: EmbedResponse = post_json(
            &self.client,
            &self.url(),
            self.api_key.as_ref(),
            self.timeout,
            &body,
        )
        .await?;

        if response.embeddings.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.embeddings.len()
            )));
        }
        Ok(response.embeddings)
    }
}

impl EmbeddingModel for OllamaEmbeddingModel {
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        ensure_not_blank(text)?;
        let mut vectors = self.request(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidResponse("no embeddings returned".to_string()))
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
