//! VectorStore trait.
//!
//! A vector store owns exactly one table of `(id, content, embedding)` rows
//! in an embedded engine. Implementations (SQLite + sqlite-vec, in-memory)
//! live in semnote-infra.

use semnote_types::error::VectorStoreError;
use semnote_types::vector::{SearchHit, TableStatus};

/// Number of hits returned when a caller does not choose a limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Trait for a single-table vector store.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
///
/// Every operation except [`check_table_exists`](Self::check_table_exists)
/// fails with [`VectorStoreError::NotReady`] once the store is closed.
pub trait VectorStore: Send + Sync {
    /// True only while the underlying connection is open.
    fn is_ready(&self) -> bool;

    /// Presence and declared width of the table.
    ///
    /// Never fails: any error (including not-ready) is logged and reported
    /// as an absent table.
    fn check_table_exists(&self) -> impl std::future::Future<Output = TableStatus> + Send;

    /// Create the table with the configured dimensions.
    ///
    /// With `force`, any existing table and all of its rows are dropped
    /// first. Without it, an existing table is left as it is.
    fn create_table(
        &self,
        force: bool,
    ) -> impl std::future::Future<Output = Result<(), VectorStoreError>> + Send;

    /// Set the width used by future `create_table` calls. The physical
    /// table is not touched.
    fn set_dimensions(&self, dimensions: usize) -> Result<(), VectorStoreError>;

    /// The width used by future `create_table` calls.
    fn dimensions(&self) -> usize;

    /// Insert one row and return its assigned id.
    fn insert_vector(
        &self,
        content: &str,
        embedding: &[f32],
    ) -> impl std::future::Future<Output = Result<i64, VectorStoreError>> + Send;

    /// The `limit` rows closest to `query`, ascending by distance, ties by id.
    fn search_similar(
        &self,
        query: &[f32],
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<SearchHit>, VectorStoreError>> + Send;

    /// Number of stored rows; 0 when the table is absent.
    fn count(&self) -> impl std::future::Future<Output = Result<u64, VectorStoreError>> + Send;

    /// Flush state to durable storage. A no-op when not ready.
    fn save(&self) -> impl std::future::Future<Output = Result<(), VectorStoreError>> + Send;

    /// Release the connection. The store is not ready afterwards.
    fn close(&self) -> impl std::future::Future<Output = ()> + Send;
}

/// Check that `name` is a plain SQL identifier (`[A-Za-z_][A-Za-z0-9_]*`).
///
/// Table names are interpolated into DDL, so nothing else is accepted.
pub fn validate_table_name(name: &str) -> Result<(), VectorStoreError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(VectorStoreError::InvalidTableName(name.to_string()))
    }
}

/// Reject a zero width.
pub fn validate_dimensions(dimensions: usize) -> Result<usize, VectorStoreError> {
    if dimensions == 0 {
        Err(VectorStoreError::InvalidDimensions(dimensions))
    } else {
        Ok(dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_table_names() {
        for name in ["note_embeddings", "_private", "T1", "a"] {
            assert!(validate_table_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_table_names() {
        for name in ["", "1notes", "notes; DROP TABLE x", "my-notes", "notes\"", "naïve"] {
            assert!(
                matches!(
                    validate_table_name(name),
                    Err(VectorStoreError::InvalidTableName(_))
                ),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            validate_dimensions(0),
            Err(VectorStoreError::InvalidDimensions(0))
        ));
        assert_eq!(validate_dimensions(384).unwrap(), 384);
    }
}
