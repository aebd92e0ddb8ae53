//! Provider-keyed factory for embedding backends.
//!
//! Backends register a constructor per provider; `build_model` ties the
//! catalog, resolver and factory together to go from a model name in the
//! configuration to a ready-to-use `BoxEmbeddingModel`.

use std::collections::HashMap;

use semnote_types::embedding::{EmbeddingModelDescriptor, EmbeddingProviderKind, EmbeddingSettings};
use semnote_types::error::ConfigError;

use super::box_model::BoxEmbeddingModel;
use super::catalog::ModelCatalog;
use super::resolver::{ProviderConfigResolver, ResolvedModelConfig};

/// Constructor for one provider's backend.
pub type ModelConstructor = Box<
    dyn Fn(&EmbeddingModelDescriptor, &ResolvedModelConfig) -> Result<BoxEmbeddingModel, ConfigError>
        + Send
        + Sync,
>;

/// Registry of backend constructors, indexed by provider.
#[derive(Default)]
pub struct EmbeddingModelFactory {
    constructors: HashMap<EmbeddingProviderKind, ModelConstructor>,
}

impl EmbeddingModelFactory {
    /// Create an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the constructor for `provider`, replacing any previous one.
    pub fn register<F>(&mut self, provider: EmbeddingProviderKind, constructor: F)
    where
        F: Fn(&EmbeddingModelDescriptor, &ResolvedModelConfig) -> Result<BoxEmbeddingModel, ConfigError>
            + Send
            + Sync
            + 'static,
    {
        self.constructors.insert(provider, Box::new(constructor));
    }

    /// Build a backend for `descriptor` from its resolved configuration.
    pub fn create(
        &self,
        descriptor: &EmbeddingModelDescriptor,
        resolved: &ResolvedModelConfig,
    ) -> Result<BoxEmbeddingModel, ConfigError> {
        let constructor = self
            .constructors
            .get(&descriptor.provider)
            .ok_or(ConfigError::UnsupportedProvider(descriptor.provider))?;
        constructor(descriptor, resolved)
    }

    /// Providers with a registered constructor, sorted.
    pub fn providers(&self) -> Vec<EmbeddingProviderKind> {
        let mut providers: Vec<_> = self.constructors.keys().copied().collect();
        providers.sort();
        providers
    }
}

/// Look up `name` in the catalog, resolve its provider config and construct it.
pub fn build_model(
    catalog: &ModelCatalog,
    resolver: &ProviderConfigResolver,
    factory: &EmbeddingModelFactory,
    settings: &EmbeddingSettings,
    name: &str,
) -> Result<BoxEmbeddingModel, ConfigError> {
    let descriptor = catalog
        .get_info(name)
        .ok_or_else(|| ConfigError::UnknownModel(name.to_string()))?;
    let resolved = resolver.resolve(settings, descriptor)?;
    let model = factory.create(descriptor, &resolved)?;
    tracing::info!(
        model = %descriptor.name,
        provider = %descriptor.provider,
        dimensions = descriptor.dimensions,
        "embedding model constructed"
    );
    Ok(model)
}
