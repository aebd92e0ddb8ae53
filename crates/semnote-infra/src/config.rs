//! Configuration loader for semnote.
//!
//! Reads `config.toml` from the data directory (`~/.semnote/` in production)
//! and deserializes it into [`SemnoteConfig`]. Falls back to defaults when the
//! file is missing or malformed. API keys absent from the file are filled
//! from `OPENAI_API_KEY` / `OLLAMA_API_KEY`.

use std::path::{Path, PathBuf};

use semnote_types::config::SemnoteConfig;
use semnote_types::embedding::EmbeddingProviderKind;
use semnote_types::error::ConfigFileError;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SEMNOTE_DATA_DIR";

const CONFIG_FILE: &str = "config.toml";

/// Resolve the data directory: `SEMNOTE_DATA_DIR`, else `~/.semnote`, else `.semnote`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(".semnote"))
        .unwrap_or_else(|| PathBuf::from(".semnote"))
}

/// Path of the vector database for this configuration.
///
/// `store.database_file` is taken as-is when absolute, else relative to `data_dir`.
pub fn database_path(config: &SemnoteConfig, data_dir: &Path) -> PathBuf {
    let file = Path::new(&config.store.database_file);
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        data_dir.join(file)
    }
}

/// Load configuration from `{data_dir}/config.toml`, then fill missing API
/// keys from the environment.
pub async fn load_config(data_dir: &Path) -> SemnoteConfig {
    let mut config = read_config_file(data_dir).await;
    apply_env_api_keys(&mut config, |name| std::env::var(name).ok());
    config
}

/// Read `{data_dir}/config.toml` without consulting the environment.
///
/// - If the file does not exist, returns [`SemnoteConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and returns the default.
pub async fn read_config_file(data_dir: &Path) -> SemnoteConfig {
    match try_read_config_file(data_dir).await {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("{err}, using defaults");
            SemnoteConfig::default()
        }
    }
}

/// Strict variant of [`read_config_file`]: only a missing file yields defaults.
///
/// Callers that write the config back must use this, so a file that could
/// not be parsed is never replaced by defaults.
pub async fn try_read_config_file(data_dir: &Path) -> Result<SemnoteConfig, ConfigFileError> {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return Ok(SemnoteConfig::default());
        }
        Err(err) => {
            return Err(ConfigFileError::Read {
                path: config_path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    toml::from_str::<SemnoteConfig>(&content).map_err(|err| ConfigFileError::Parse {
        path: config_path.display().to_string(),
        message: err.to_string(),
    })
}

/// Fill each provider's missing `api_key` using `lookup` on its env var name.
///
/// A key already present in the file wins; blank values are ignored.
pub fn apply_env_api_keys(config: &mut SemnoteConfig, lookup: impl Fn(&str) -> Option<String>) {
    for provider in [EmbeddingProviderKind::OpenAi, EmbeddingProviderKind::Ollama] {
        let has_key = config
            .embedding
            .providers
            .get(provider)
            .and_then(|c| c.api_key.as_deref())
            .is_some_and(|k| !k.trim().is_empty());
        if has_key {
            continue;
        }
        if let Some(value) = lookup(provider.api_key_env_var()).filter(|v| !v.trim().is_empty()) {
            tracing::debug!(%provider, "using API key from {}", provider.api_key_env_var());
            config.embedding.providers.entry(provider).api_key = Some(value);
        }
    }
}

/// Write `config` to `{data_dir}/config.toml`, creating the directory if needed.
pub async fn save_config(data_dir: &Path, config: &SemnoteConfig) -> Result<(), ConfigFileError> {
    let config_path = data_dir.join(CONFIG_FILE);
    let write_err = |message: String| ConfigFileError::Write {
        path: config_path.display().to_string(),
        message,
    };

    let rendered = toml::to_string_pretty(config).map_err(|e| write_err(e.to_string()))?;
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| write_err(e.to_string()))?;
    tokio::fs::write(&config_path, rendered)
        .await
        .map_err(|e| write_err(e.to_string()))?;
    tracing::debug!("Wrote {}", config_path.display());
    Ok(())
}

/// Persist `model` as `embedding.model`, keeping every other setting in the file.
///
/// Fails without touching the file when it exists but cannot be read or parsed.
pub async fn set_active_model(data_dir: &Path, model: &str) -> Result<(), ConfigFileError> {
    let mut config = try_read_config_file(data_dir).await?;
    config.embedding.model = model.to_string();
    save_config(data_dir, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn read_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = read_config_file(tmp.path()).await;
        assert_eq!(config, SemnoteConfig::default());
    }

    #[tokio::test]
    async fn read_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[embedding]
model = "mxbai-embed-large"

[embedding.providers.ollama]
base_url = "http://gpu:11434"

[store]
table_name = "journal"
"#,
        )
        .await
        .unwrap();

        let config = read_config_file(tmp.path()).await;
        assert_eq!(config.embedding.model, "mxbai-embed-large");
        assert_eq!(config.store.table_name, "journal");
        assert_eq!(
            config
                .embedding
                .provider_config(EmbeddingProviderKind::Ollama)
                .base_url
                .as_deref(),
            Some("http://gpu:11434")
        );
    }

    #[tokio::test]
    async fn read_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();
        let config = read_config_file(tmp.path()).await;
        assert_eq!(config, SemnoteConfig::default());
    }

    #[tokio::test]
    async fn save_then_read_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested");
        let mut config = SemnoteConfig::default();
        config.embedding.model = "all-minilm".to_string();
        config.store.search_limit = 9;

        save_config(&dir, &config).await.unwrap();
        assert_eq!(read_config_file(&dir).await, config);
    }

    #[tokio::test]
    async fn try_read_distinguishes_missing_from_malformed() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(
            try_read_config_file(tmp.path()).await.unwrap(),
            SemnoteConfig::default()
        );

        tokio::fs::write(tmp.path().join("config.toml"), "[store]\nsearch_limit = \"five\"\n")
            .await
            .unwrap();
        assert!(matches!(
            try_read_config_file(tmp.path()).await,
            Err(ConfigFileError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn set_active_model_keeps_malformed_file_intact() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        let original = "[embedding.providers.openai]\napi_key = \"sk-keep\"\n\n[store]\nsearch_limit = \"five\"\n";
        tokio::fs::write(&path, original).await.unwrap();

        let err = set_active_model(tmp.path(), "all-minilm").await.unwrap_err();
        assert!(matches!(err, ConfigFileError::Parse { .. }));
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), original);
    }

    #[tokio::test]
    async fn set_active_model_preserves_other_settings() {
        let tmp = TempDir::new().unwrap();
        let mut config = SemnoteConfig::default();
        config.store.table_name = "journal".to_string();
        config
            .embedding
            .providers
            .entry(EmbeddingProviderKind::OpenAi)
            .api_key = Some("sk-keep".to_string());
        save_config(tmp.path(), &config).await.unwrap();

        set_active_model(tmp.path(), "all-minilm").await.unwrap();

        let saved = try_read_config_file(tmp.path()).await.unwrap();
        assert_eq!(saved.embedding.model, "all-minilm");
        assert_eq!(saved.store.table_name, "journal");
        assert_eq!(
            saved
                .embedding
                .provider_config(EmbeddingProviderKind::OpenAi)
                .api_key
                .as_deref(),
            Some("sk-keep")
        );
    }

    #[test]
    fn env_key_fills_missing_api_key() {
        let mut config = SemnoteConfig::default();
        apply_env_api_keys(&mut config, |name| {
            (name == "OPENAI_API_KEY").then(|| "sk-from-env".to_string())
        });
        let openai = config.embedding.provider_config(EmbeddingProviderKind::OpenAi);
        assert_eq!(openai.api_key.as_deref(), Some("sk-from-env"));
        assert!(config.embedding.providers.ollama.is_none());
    }

    #[test]
    fn env_key_does_not_override_file_key() {
        let mut config = SemnoteConfig::default();
        config
            .embedding
            .providers
            .entry(EmbeddingProviderKind::OpenAi)
            .api_key = Some("sk-from-file".to_string());
        apply_env_api_keys(&mut config, |_| Some("sk-from-env".to_string()));
        let openai = config.embedding.provider_config(EmbeddingProviderKind::OpenAi);
        assert_eq!(openai.api_key.as_deref(), Some("sk-from-file"));
    }

    #[test]
    fn database_path_relative_and_absolute() {
        let mut config = SemnoteConfig::default();
        let data_dir = Path::new("/data");
        assert_eq!(database_path(&config, data_dir), PathBuf::from("/data/semnote.db"));

        config.store.database_file = "/elsewhere/v.db".to_string();
        assert_eq!(database_path(&config, data_dir), PathBuf::from("/elsewhere/v.db"));
    }
}
