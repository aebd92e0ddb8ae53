//! EmbeddingModel trait for text-to-vector conversion.
//!
//! Implementations (OpenAI, Ollama) live in semnote-infra.

use semnote_types::embedding::EmbeddingModelDescriptor;
use semnote_types::error::EmbeddingError;

/// Trait for converting text into embedding vectors.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// The returned vector SHOULD have `descriptor().dimensions` entries; callers
/// treat a different length as a soft mismatch, not an error.
pub trait EmbeddingModel: Send + Sync {
    /// Embed a single text.
    fn generate_embedding(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, EmbeddingError>> + Send;

    /// Embed several texts, one vector per input in input order.
    ///
    /// The default loops over [`generate_embedding`](Self::generate_embedding);
    /// backends with a batch endpoint override it.
    fn generate_embeddings(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send {
        async move {
            let mut vectors = Vec::with_capacity(texts.len());
            for text in texts {
                vectors.push(self.generate_embedding(text).await?);
            }
            Ok(vectors)
        }
    }

    /// Identity metadata: name, dimensions, description and provider.
    fn descriptor(&self) -> &EmbeddingModelDescriptor;
}
