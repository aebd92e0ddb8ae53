//! Provider configuration resolution.
//!
//! Turns the loosely-typed `ModelConfig` a user wrote into a validated
//! `ResolvedModelConfig` that a backend can be built from. Every check
//! happens here, before any network call.

use std::time::Duration;

use secrecy::SecretString;
use semnote_types::embedding::{EmbeddingModelDescriptor, EmbeddingProviderKind, EmbeddingSettings};
use semnote_types::error::ConfigError;
use url::Url;

/// Request timeout used when `timeout_secs` is not configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Key in `ModelConfig::extra` holding the request timeout.
pub const TIMEOUT_KEY: &str = "timeout_secs";

/// Validated configuration for constructing one embedding backend.
///
/// The API key is wrapped in [`SecretString`] and is only exposed when
/// building the `Authorization` header.
#[derive(Debug)]
pub struct ResolvedModelConfig {
    pub provider: EmbeddingProviderKind,
    pub model: String,
    pub dimensions: usize,
    /// Absolute http(s) URL without a trailing slash.
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub timeout: Duration,
}

/// Resolves provider settings for a chosen model.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfigResolver;

impl ProviderConfigResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve and validate the configuration for `descriptor`'s provider.
    pub fn resolve(
        &self,
        settings: &EmbeddingSettings,
        descriptor: &EmbeddingModelDescriptor,
    ) -> Result<ResolvedModelConfig, ConfigError> {
        let provider = descriptor.provider;
        let config = settings.provider_config(provider);

        let base_url = validate_base_url(
            config
                .base_url
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(provider.default_base_url()),
        )?;

        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| SecretString::from(k.to_string()));
        if api_key.is_none() && provider.requires_api_key() {
            return Err(ConfigError::MissingField {
                provider,
                field: "api_key",
            });
        }

        let timeout = match config.extra.get(TIMEOUT_KEY) {
            Some(raw) => parse_timeout(raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        tracing::debug!(
            %provider,
            model = %descriptor.name,
            %base_url,
            timeout_secs = timeout.as_secs(),
            "resolved embedding provider config"
        );

        Ok(ResolvedModelConfig {
            provider,
            model: descriptor.name.clone(),
            dimensions: descriptor.dimensions,
            base_url,
            api_key,
            timeout,
        })
    }
}

fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim_end_matches('/');
    let invalid = |reason: &str| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host"));
    }
    Ok(trimmed.to_string())
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue {
            key: TIMEOUT_KEY.to_string(),
            value: raw.to_string(),
        }),
    }
}
