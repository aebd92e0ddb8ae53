use std::fmt;

use thiserror::Error;

use crate::embedding::EmbeddingProviderKind;
use crate::vector::CompatibilityReport;

/// The database action a [`VectorStoreError::Operation`] failed during.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAction {
    Create,
    Drop,
    Insert,
    Search,
    Count,
    Save,
}

impl fmt::Display for StoreAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreAction::Create => write!(f, "create"),
            StoreAction::Drop => write!(f, "drop"),
            StoreAction::Insert => write!(f, "insert"),
            StoreAction::Search => write!(f, "search"),
            StoreAction::Count => write!(f, "count"),
            StoreAction::Save => write!(f, "save"),
        }
    }
}

/// Errors from vector store operations (used by the `VectorStore` trait in semnote-core).
#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("vector store is not ready")]
    NotReady,

    #[error("invalid vector dimensions: {0} (must be positive)")]
    InvalidDimensions(usize),

    #[error("invalid table name: '{0}'")]
    InvalidTableName(String),

    #[error("database connection error: {0}")]
    Connection(String),

    #[error("{action} failed: {message}")]
    Operation { action: StoreAction, message: String },
}

impl VectorStoreError {
    /// Wrap an engine failure with the action it happened during.
    pub fn operation(action: StoreAction, err: impl fmt::Display) -> Self {
        VectorStoreError::Operation {
            action,
            message: err.to_string(),
        }
    }

    /// The failing action, if this error came from the database.
    pub fn action(&self) -> Option<StoreAction> {
        match self {
            VectorStoreError::Operation { action, .. } => Some(*action),
            _ => None,
        }
    }
}

/// Errors raised while resolving or constructing an embedding model.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{provider} configuration is missing required field '{field}'")]
    MissingField {
        provider: EmbeddingProviderKind,
        field: &'static str,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid value for '{key}': '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("unknown embedding model: '{0}'")]
    UnknownModel(String),

    #[error("no backend registered for provider '{0}'")]
    UnsupportedProvider(EmbeddingProviderKind),

    #[error("model '{model}' declares zero dimensions")]
    InvalidDimensions { model: String },
}

/// Errors reading or writing `config.toml`.
///
/// A missing file is not an error; it means "use defaults".
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("failed to write {path}: {message}")]
    Write { path: String, message: String },
}

/// Errors from embedding backends.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Request(String),

    #[error("embedding backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("cannot embed empty input")]
    EmptyInput,
}

/// Errors from the vector coordination service.
#[derive(Debug, Error)]
pub enum VectorServiceError {
    #[error(transparent)]
    Store(#[from] VectorStoreError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("vector table does not exist")]
    NoTable,

    #[error(
        "vector table width {table:?} conflicts with model width {model} after recreation",
        table = .0.table_dimensions,
        model = .0.model_dimensions
    )]
    Conflict(CompatibilityReport),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_error_carries_action() {
        let err = VectorStoreError::operation(StoreAction::Insert, "dimension mismatch");
        assert_eq!(err.action(), Some(StoreAction::Insert));
        assert_eq!(err.to_string(), "insert failed: dimension mismatch");
    }

    #[test]
    fn test_missing_field_message() {
        let err = ConfigError::MissingField {
            provider: EmbeddingProviderKind::OpenAi,
            field: "api_key",
        };
        assert_eq!(
            err.to_string(),
            "openai configuration is missing required field 'api_key'"
        );
    }

    #[test]
    fn test_config_file_error_names_the_file() {
        let err = ConfigFileError::Parse {
            path: "/data/config.toml".to_string(),
            message: "invalid type".to_string(),
        };
        assert_eq!(err.to_string(), "failed to parse /data/config.toml: invalid type");
    }

    #[test]
    fn test_service_error_wraps_store_error() {
        let err: VectorServiceError = VectorStoreError::NotReady.into();
        assert!(matches!(err, VectorServiceError::Store(VectorStoreError::NotReady)));
        assert_eq!(err.to_string(), "vector store is not ready");
    }
}
