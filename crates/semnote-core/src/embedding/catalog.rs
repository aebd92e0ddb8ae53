//! Model catalog: name-indexed registry of embedding model descriptors.
//!
//! The catalog is an explicit value handed to whoever needs it, so tests and
//! hosts can register their own models next to (or instead of) the built-ins.

use std::collections::HashMap;

use semnote_types::embedding::{EmbeddingModelDescriptor, EmbeddingProviderKind};

/// Built-in models: (name, provider, dimensions, description).
const BUILTIN_MODELS: &[(&str, EmbeddingProviderKind, usize, &str)] = &[
    (
        "text-embedding-3-small",
        EmbeddingProviderKind::OpenAi,
        1536,
        "OpenAI third-generation small embedding model",
    ),
    (
        "text-embedding-3-large",
        EmbeddingProviderKind::OpenAi,
        3072,
        "OpenAI third-generation large embedding model",
    ),
    (
        "text-embedding-ada-002",
        EmbeddingProviderKind::OpenAi,
        1536,
        "OpenAI second-generation embedding model",
    ),
    (
        "nomic-embed-text",
        EmbeddingProviderKind::Ollama,
        768,
        "Nomic long-context text embedding model",
    ),
    (
        "mxbai-embed-large",
        EmbeddingProviderKind::Ollama,
        1024,
        "mixedbread.ai large embedding model",
    ),
    (
        "all-minilm",
        EmbeddingProviderKind::Ollama,
        384,
        "Sentence-transformers MiniLM, small and fast",
    ),
    (
        "snowflake-arctic-embed",
        EmbeddingProviderKind::Ollama,
        1024,
        "Snowflake Arctic retrieval embedding model",
    ),
];

/// Registry of known embedding models, indexed by name.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: HashMap<String, EmbeddingModelDescriptor>,
}

impl ModelCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-populated with the built-in OpenAI and Ollama models.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for &(name, provider, dimensions, description) in BUILTIN_MODELS {
            catalog.register(EmbeddingModelDescriptor {
                name: name.to_string(),
                dimensions,
                description: description.to_string(),
                provider,
            });
        }
        catalog
    }

    /// Register a model. An existing entry with the same name is replaced.
    pub fn register(&mut self, descriptor: EmbeddingModelDescriptor) {
        self.models.insert(descriptor.name.clone(), descriptor);
    }

    /// Look up a model by name.
    pub fn get_info(&self, name: &str) -> Option<&EmbeddingModelDescriptor> {
        self.models.get(name)
    }

    /// All models served by `provider`, sorted by name.
    pub fn list_for_provider(
        &self,
        provider: EmbeddingProviderKind,
    ) -> Vec<&EmbeddingModelDescriptor> {
        let mut models: Vec<_> = self
            .models
            .values()
            .filter(|d| d.provider == provider)
            .collect();
        models.sort_by(|a, b| a.name.cmp(&b.name));
        models
    }

    /// All models, sorted by provider then name.
    pub fn list(&self) -> Vec<&EmbeddingModelDescriptor> {
        let mut models: Vec<_> = self.models.values().collect();
        models.sort_by(|a, b| (a.provider, &a.name).cmp(&(b.provider, &b.name)));
        models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
