//! Embedding backend implementations.
//!
//! Contains concrete implementations of the [`EmbeddingModel`] trait defined
//! in `semnote-core`, and [`default_model_factory`], which registers each
//! of them under its provider.
//!
//! [`EmbeddingModel`]: semnote_core::embedding::model::EmbeddingModel

mod http;
pub mod ollama;
pub mod openai;

use semnote_core::embedding::box_model::BoxEmbeddingModel;
use semnote_core::embedding::factory::EmbeddingModelFactory;
use semnote_types::embedding::EmbeddingProviderKind;

use self::ollama::OllamaEmbeddingModel;
use self::openai::OpenAiEmbeddingModel;

/// A factory with the OpenAI and Ollama backends registered.
pub fn default_model_factory() -> EmbeddingModelFactory {
    let mut factory = EmbeddingModelFactory::new();
    factory.register(EmbeddingProviderKind::OpenAi, |descriptor, resolved| {
        OpenAiEmbeddingModel::new(descriptor.clone(), resolved).map(BoxEmbeddingModel::new)
    });
    factory.register(EmbeddingProviderKind::Ollama, |descriptor, resolved| {
        OllamaEmbeddingModel::new(descriptor.clone(), resolved).map(BoxEmbeddingModel::new)
    });
    factory
}

#[cfg(test)]
mod tests {
    use super::*;
    use semnote_core::embedding::catalog::ModelCatalog;
    use semnote_core::embedding::factory::build_model;
    use semnote_core::embedding::resolver::ProviderConfigResolver;
    use semnote_types::embedding::EmbeddingSettings;
    use semnote_types::error::ConfigError;

    #[test]
    fn test_default_factory_covers_every_provider() {
        assert_eq!(
            default_model_factory().providers(),
            vec![EmbeddingProviderKind::OpenAi, EmbeddingProviderKind::Ollama]
        );
    }

    #[test]
    fn test_builds_every_builtin_model() {
        let catalog = ModelCatalog::builtin();
        let factory = default_model_factory();
        let resolver = ProviderConfigResolver::new();
        let mut settings = EmbeddingSettings::default();
        settings.providers.entry(EmbeddingProviderKind::OpenAi).api_key = Some("sk-test".into());

        for descriptor in catalog.list() {
            let model =
                build_model(&catalog, &resolver, &factory, &settings, &descriptor.name).unwrap();
            assert_eq!(model.descriptor(), descriptor);
        }
    }

    #[test]
    fn test_openai_without_key_fails_before_network() {
        let err = build_model(
            &ModelCatalog::builtin(),
            &ProviderConfigResolver::new(),
            &default_model_factory(),
            &EmbeddingSettings::default(),
            "text-embedding-3-large",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { .. }));
    }
}
