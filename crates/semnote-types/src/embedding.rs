//! Embedding model types for semnote.
//!
//! These types describe *which* model produces embeddings and how its
//! backend is configured. They never perform embedding themselves.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Backend that serves an embedding model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// OpenAI (or any server speaking the OpenAI `/embeddings` protocol).
    OpenAi,
    /// A local or remote Ollama server.
    Ollama,
}

impl EmbeddingProviderKind {
    /// Whether this backend refuses requests without an API key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, EmbeddingProviderKind::OpenAi)
    }

    /// Endpoint used when the configuration does not override `base_url`.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            EmbeddingProviderKind::OpenAi => "https://api.openai.com/v1",
            EmbeddingProviderKind::Ollama => "http://localhost:11434",
        }
    }

    /// Environment variable consulted when no API key is configured.
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            EmbeddingProviderKind::OpenAi => "OPENAI_API_KEY",
            EmbeddingProviderKind::Ollama => "OLLAMA_API_KEY",
        }
    }
}

impl fmt::Display for EmbeddingProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingProviderKind::OpenAi => write!(f, "openai"),
            EmbeddingProviderKind::Ollama => write!(f, "ollama"),
        }
    }
}

impl FromStr for EmbeddingProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(EmbeddingProviderKind::OpenAi),
            "ollama" => Ok(EmbeddingProviderKind::Ollama),
            other => Err(format!("invalid embedding provider: '{other}'")),
        }
    }
}

/// Identity metadata for an embedding model.
///
/// `name` is the unique catalog key and the identifier sent to the backend.
/// `dimensions` is the expected output width and the column width of any
/// vector table created while this model is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingModelDescriptor {
    pub name: String,
    pub dimensions: usize,
    pub description: String,
    pub provider: EmbeddingProviderKind,
}

impl EmbeddingModelDescriptor {
    /// Build a descriptor, rejecting a zero width.
    pub fn new(
        name: impl Into<String>,
        dimensions: usize,
        description: impl Into<String>,
        provider: EmbeddingProviderKind,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if dimensions == 0 {
            return Err(ConfigError::InvalidDimensions { model: name });
        }
        Ok(Self {
            name,
            dimensions,
            description: description.into(),
            provider,
        })
    }
}

/// Caller-supplied configuration for one embedding backend.
///
/// Read-only to the core: it is validated by the resolver and forwarded
/// to the backend constructor. `extra` is an open key-value bag for
/// backend-specific knobs (e.g. `timeout_secs`).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("extra", &self.extra)
            .finish()
    }
}

/// Embedding section of the application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Name of the active model (a catalog key).
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-provider backend configuration.
    #[serde(default)]
    pub providers: ProviderSettings,
}

/// One optional configuration section per supported backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<ModelConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ollama: Option<ModelConfig>,
}

impl ProviderSettings {
    pub fn get(&self, provider: EmbeddingProviderKind) -> Option<&ModelConfig> {
        match provider {
            EmbeddingProviderKind::OpenAi => self.openai.as_ref(),
            EmbeddingProviderKind::Ollama => self.ollama.as_ref(),
        }
    }

    /// Mutable section for a provider, created empty on first access.
    pub fn entry(&mut self, provider: EmbeddingProviderKind) -> &mut ModelConfig {
        let slot = match provider {
            EmbeddingProviderKind::OpenAi => &mut self.openai,
            EmbeddingProviderKind::Ollama => &mut self.ollama,
        };
        slot.get_or_insert_with(ModelConfig::default)
    }
}

fn default_model() -> String {
    "nomic-embed-text".to_string()
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            providers: ProviderSettings::default(),
        }
    }
}

impl EmbeddingSettings {
    /// Configuration for a provider; an absent section is an empty config.
    pub fn provider_config(&self, provider: EmbeddingProviderKind) -> ModelConfig {
        self.providers.get(provider).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_roundtrip() {
        for kind in [EmbeddingProviderKind::OpenAi, EmbeddingProviderKind::Ollama] {
            let s = kind.to_string();
            let parsed: EmbeddingProviderKind = s.parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_provider_kind_serde() {
        let json = serde_json::to_string(&EmbeddingProviderKind::OpenAi).unwrap();
        assert_eq!(json, "\"openai\"");
        let parsed: EmbeddingProviderKind = serde_json::from_str("\"ollama\"").unwrap();
        assert_eq!(parsed, EmbeddingProviderKind::Ollama);
    }

    #[test]
    fn test_descriptor_rejects_zero_dimensions() {
        let err = EmbeddingModelDescriptor::new("broken", 0, "", EmbeddingProviderKind::Ollama)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_model_config_debug_masks_api_key() {
        let config = ModelConfig {
            base_url: None,
            api_key: Some("sk-very-secret".to_string()),
            extra: BTreeMap::new(),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("****"));
    }

    #[test]
    fn test_embedding_settings_from_toml() {
        let toml_str = r#"
model = "text-embedding-3-small"

[providers.openai]
api_key = "sk-test"

[providers.ollama]
base_url = "http://gpu-box:11434"

[providers.ollama.extra]
timeout_secs = "60"
"#;
        let settings: EmbeddingSettings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.model, "text-embedding-3-small");
        let openai = settings.provider_config(EmbeddingProviderKind::OpenAi);
        assert_eq!(openai.api_key.as_deref(), Some("sk-test"));
        let ollama = settings.provider_config(EmbeddingProviderKind::Ollama);
        assert_eq!(ollama.base_url.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(ollama.extra.get("timeout_secs").map(String::as_str), Some("60"));
    }

    #[test]
    fn test_embedding_settings_missing_provider_is_empty() {
        let settings = EmbeddingSettings::default();
        assert_eq!(settings.model, "nomic-embed-text");
        assert_eq!(
            settings.provider_config(EmbeddingProviderKind::OpenAi),
            ModelConfig::default()
        );
    }
}
