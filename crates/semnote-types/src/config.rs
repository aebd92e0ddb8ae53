//! Application configuration types for semnote.
//!
//! `SemnoteConfig` represents the top-level `config.toml` that selects the
//! active embedding model, configures its backends and names the vector table.

use serde::{Deserialize, Serialize};

use crate::embedding::EmbeddingSettings;

/// Top-level configuration.
///
/// Loaded from `~/.semnote/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemnoteConfig {
    #[serde(default)]
    pub embedding: EmbeddingSettings,

    #[serde(default)]
    pub store: StoreSettings,
}

/// Where and how vectors are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Name of the content table; the vector table is `{table_name}_vec`.
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Database file, relative to the data directory unless absolute.
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// Number of results returned by a search when no limit is given.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

fn default_table_name() -> String {
    "note_embeddings".to_string()
}

fn default_database_file() -> String {
    "semnote.db".to_string()
}

fn default_search_limit() -> usize {
    5
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            table_name: default_table_name(),
            database_file: default_database_file(),
            search_limit: default_search_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingProviderKind;

    #[test]
    fn test_config_default_values() {
        let config = SemnoteConfig::default();
        assert_eq!(config.embedding.model, "nomic-embed-text");
        assert_eq!(config.store.table_name, "note_embeddings");
        assert_eq!(config.store.database_file, "semnote.db");
        assert_eq!(config.store.search_limit, 5);
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: SemnoteConfig = toml::from_str("").unwrap();
        assert_eq!(config, SemnoteConfig::default());
    }

    #[test]
    fn test_config_deserialize_with_values() {
        let toml_str = r#"
[embedding]
model = "text-embedding-3-large"

[embedding.providers.openai]
api_key = "sk-abc"
base_url = "https://proxy.internal/v1"

[store]
table_name = "vault"
search_limit = 10
"#;
        let config: SemnoteConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.embedding.model, "text-embedding-3-large");
        let openai = config
            .embedding
            .provider_config(EmbeddingProviderKind::OpenAi);
        assert_eq!(openai.base_url.as_deref(), Some("https://proxy.internal/v1"));
        assert_eq!(config.store.table_name, "vault");
        assert_eq!(config.store.database_file, "semnote.db");
        assert_eq!(config.store.search_limit, 10);
    }

    #[test]
    fn test_config_serializes_back_to_toml() {
        let mut config = SemnoteConfig::default();
        config.embedding.model = "all-minilm".to_string();
        let rendered = toml::to_string_pretty(&config).unwrap();
        let reparsed: SemnoteConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(reparsed, config);
    }
}
