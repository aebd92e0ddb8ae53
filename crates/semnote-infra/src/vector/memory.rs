//! In-memory vector store.
//!
//! Brute-force cosine search over rows held in process memory. Vector width
//! is not enforced: rows of any length are accepted, and a search simply
//! skips rows whose width differs from the query. Nothing is persisted, so
//! `save` is a no-op.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::Utc;
use semnote_core::vector::distance::cosine_distance;
use semnote_core::vector::store::{VectorStore, validate_dimensions};
use semnote_types::error::{StoreAction, VectorStoreError};
use semnote_types::vector::{SearchHit, TableStatus, VectorRecord};
use tokio::sync::RwLock;

#[derive(Debug)]
struct MemoryTable {
    dimensions: usize,
    rows: Vec<VectorRecord>,
    next_id: i64,
}

/// Ephemeral implementation of `VectorStore`.
#[derive(Debug)]
pub struct InMemoryVectorStore {
    table: RwLock<Option<MemoryTable>>,
    dimensions: AtomicUsize,
    ready: AtomicBool,
}

impl InMemoryVectorStore {
    /// Create a store whose tables will be `dimensions` wide.
    pub fn new(dimensions: usize) -> Result<Self, VectorStoreError> {
        validate_dimensions(dimensions)?;
        Ok(Self {
            table: RwLock::new(None),
            dimensions: AtomicUsize::new(dimensions),
            ready: AtomicBool::new(true),
        })
    }

    /// Snapshot of all stored rows in insertion order.
    pub async fn records(&self) -> Vec<VectorRecord> {
        self.table
            .read()
            .await
            .as_ref()
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    fn ensure_ready(&self) -> Result<(), VectorStoreError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(VectorStoreError::NotReady)
        }
    }
}

impl VectorStore for InMemoryVectorStore {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    async fn check_table_exists(&self) -> TableStatus {
        if !self.is_ready() {
            tracing::warn!("in-memory store closed, reporting table absent");
            return TableStatus::absent();
        }
        match self.table.read().await.as_ref() {
            Some(table) => TableStatus::present(Some(table.dimensions)),
            None => TableStatus::absent(),
        }
    }

    async fn create_table(&self, force: bool) -> Result<(), VectorStoreError> {
        self.ensure_ready()?;
        let dimensions = self.dimensions();
        let mut table = self.table.write().await;
        if force || table.is_none() {
            *table = Some(MemoryTable {
                dimensions,
                rows: Vec::new(),
                next_id: 1,
            });
            tracing::info!(dimensions, force, "in-memory vector table created");
        }
        Ok(())
    }

    fn set_dimensions(&self, dimensions: usize) -> Result<(), VectorStoreError> {
        validate_dimensions(dimensions)?;
        self.dimensions.store(dimensions, Ordering::Release);
        Ok(())
    }

    fn dimensions(&self) -> usize {
        self.dimensions.load(Ordering::Acquire)
    }

    async fn insert_vector(
        &self,
        content: &str,
        embedding: &[f32],
    ) -> Result<i64, VectorStoreError> {
        self.ensure_ready()?;
        let mut guard = self.table.write().await;
        let table = guard
            .as_mut()
            .ok_or_else(|| VectorStoreError::operation(StoreAction::Insert, "no such table"))?;

        let id = table.next_id;
        table.next_id += 1;
        table.rows.push(VectorRecord {
            id,
            content: content.to_string(),
            embedding: embedding.to_vec(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn search_similar(
        &self,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchHit>, VectorStoreError> {
        self.ensure_ready()?;
        let guard = self.table.read().await;
        let table = guard
            .as_ref()
            .ok_or_else(|| VectorStoreError::operation(StoreAction::Search, "no such table"))?;

        let mut hits: Vec<SearchHit> = table
            .rows
            .iter()
            .filter_map(|row| {
                cosine_distance(query, &row.embedding).map(|distance| SearchHit {
                    id: row.id,
                    content: row.content.clone(),
                    distance,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn count(&self) -> Result<u64, VectorStoreError> {
        self.ensure_ready()?;
        Ok(self
            .table
            .read()
            .await
            .as_ref()
            .map_or(0, |t| t.rows.len() as u64))
    }

    async fn save(&self) -> Result<(), VectorStoreError> {
        Ok(())
    }

    async fn close(&self) {
        self.ready.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_dimensions_rejected() {
        assert!(matches!(
            InMemoryVectorStore::new(0),
            Err(VectorStoreError::InvalidDimensions(0))
        ));
    }

    #[tokio::test]
    async fn test_insert_without_table_fails() {
        let store = InMemoryVectorStore::new(2).unwrap();
        let err = store.insert_vector("x", &[1.0, 0.0]).await.unwrap_err();
        assert_eq!(err.action(), Some(StoreAction::Insert));
    }

    #[tokio::test]
    async fn test_accepts_any_width() {
        let store = InMemoryVectorStore::new(3).unwrap();
        store.create_table(false).await.unwrap();
        store.insert_vector("short", &[1.0, 0.0]).await.unwrap();
        store.insert_vector("exact", &[1.0, 0.0, 0.0]).await.unwrap();

        let records = store.records().await;
        assert_eq!(records[0].embedding.len(), 2);
        assert_eq!(records[1].embedding.len(), 3);

        let hits = store.search_similar(&[1.0, 0.0, 0.0], 5).await.unwrap();
        assert_eq!(hits.len(), 1, "rows of a different width are skipped");
        assert_eq!(hits[0].content, "exact");
    }

    #[tokio::test]
    async fn test_recreate_resets_rows_and_width() {
        let store = InMemoryVectorStore::new(2).unwrap();
        store.create_table(true).await.unwrap();
        store.insert_vector("a", &[1.0, 0.0]).await.unwrap();

        store.set_dimensions(4).unwrap();
        store.create_table(true).await.unwrap();
        store.create_table(true).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(
            store.check_table_exists().await,
            TableStatus::present(Some(4))
        );
    }

    #[tokio::test]
    async fn test_search_ascending_with_id_tiebreak() {
        let store = InMemoryVectorStore::new(2).unwrap();
        store.create_table(false).await.unwrap();
        store.insert_vector("orthogonal", &[0.0, 1.0]).await.unwrap();
        store.insert_vector("same-a", &[3.0, 0.0]).await.unwrap();
        store.insert_vector("same-b", &[1.0, 0.0]).await.unwrap();

        let hits = store.search_similar(&[1.0, 0.0], 3).await.unwrap();
        let contents: Vec<&str> = hits.iter().map(|h| h.content.as_str()).collect();
        assert_eq!(contents, vec!["same-a", "same-b", "orthogonal"]);
    }

    #[tokio::test]
    async fn test_closed_store() {
        let store = InMemoryVectorStore::new(2).unwrap();
        store.create_table(false).await.unwrap();
        store.close().await;
        assert!(!store.is_ready());
        assert_eq!(store.check_table_exists().await, TableStatus::absent());
        assert!(matches!(store.count().await, Err(VectorStoreError::NotReady)));
        assert!(store.save().await.is_ok());
    }
}
