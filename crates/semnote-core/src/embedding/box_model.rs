//! BoxEmbeddingModel -- object-safe dynamic dispatch wrapper for EmbeddingModel.
//!
//! 1. Define an object-safe `EmbeddingModelDyn` trait with boxed futures
//! 2. Blanket-impl `EmbeddingModelDyn` for all `T: EmbeddingModel`
//! 3. `BoxEmbeddingModel` wraps `Box<dyn EmbeddingModelDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use semnote_types::embedding::EmbeddingModelDescriptor;
use semnote_types::error::EmbeddingError;

use super::model::EmbeddingModel;

/// Object-safe version of [`EmbeddingModel`] with boxed futures.
///
/// This trait exists solely to enable dynamic dispatch (`dyn EmbeddingModelDyn`).
/// A blanket implementation is provided for all types implementing `EmbeddingModel`.
pub trait EmbeddingModelDyn: Send + Sync {
    fn generate_embedding_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, EmbeddingError>> + Send + 'a>>;

    fn generate_embeddings_boxed<'a>(
        &'a self,
        texts: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send + 'a>>;

    fn descriptor_dyn(&self) -> &EmbeddingModelDescriptor;
}

/// Blanket implementation: any `EmbeddingModel` automatically implements `EmbeddingModelDyn`.
impl<T: EmbeddingModel> EmbeddingModelDyn for T {
    fn generate_embedding_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, EmbeddingError>> + Send + 'a>> {
        Box::pin(self.generate_embedding(text))
    }

    fn generate_embeddings_boxed<'a>(
        &'a self,
        texts: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send + 'a>> {
        Box::pin(self.generate_embeddings(texts))
    }

    fn descriptor_dyn(&self) -> &EmbeddingModelDescriptor {
        self.descriptor()
    }
}

/// Type-erased embedding model for runtime selection.
///
/// Since `EmbeddingModel` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxEmbeddingModel` lets the vector service hold whichever
/// backend the factory built and swap it for another at runtime.
pub struct BoxEmbeddingModel {
    inner: Box<dyn EmbeddingModelDyn + Send + Sync>,
}

impl BoxEmbeddingModel {
    /// Wrap a concrete `EmbeddingModel` in a type-erased box.
    pub fn new<T: EmbeddingModel + 'static>(model: T) -> Self {
        Self {
            inner: Box::new(model),
        }
    }

    pub async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.inner.generate_embedding_boxed(text).await
    }

    pub async fn generate_embeddings(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.inner.generate_embeddings_boxed(texts).await
    }

    pub fn descriptor(&self) -> &EmbeddingModelDescriptor {
        self.inner.descriptor_dyn()
    }

    /// Shorthand for `descriptor().dimensions`.
    pub fn dimensions(&self) -> usize {
        self.descriptor().dimensions
    }
}

impl std::fmt::Debug for BoxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxEmbeddingModel")
            .field("descriptor", self.descriptor())
            .finish()
    }
}
