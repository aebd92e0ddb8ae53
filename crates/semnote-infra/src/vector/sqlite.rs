//! SQLite vector store backed by sqlite-vec.
//!
//! Implements `VectorStore` from `semnote-core`. One logical table is kept as
//! two physical ones:
//!
//! - `{name}`: `id INTEGER PRIMARY KEY AUTOINCREMENT, content, created_at`
//! - `{name}_vec`: `vec0(embedding float[N] distance_metric=cosine)`
//!
//! linked by `{name}.id == {name}_vec.rowid`. Both rows are written in one
//! transaction, so a vector the engine rejects (wrong width) leaves no
//! orphaned content row.

use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use semnote_core::vector::store::{VectorStore, validate_dimensions, validate_table_name};
use semnote_types::error::{StoreAction, VectorStoreError};
use semnote_types::vector::{SearchHit, TableStatus};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use zerocopy::IntoBytes;

use super::extension::register_sqlite_vec;

/// Largest `k` a vec0 KNN query accepts.
const MAX_KNN: usize = 4096;

/// SQLite-backed implementation of `VectorStore`.
pub struct SqliteVectorStore {
    pool: SqlitePool,
    table: String,
    vec_table: String,
    dimensions: AtomicUsize,
    ready: AtomicBool,
}

impl SqliteVectorStore {
    /// Open (creating if missing) the database file at `path`.
    pub async fn open(
        path: &Path,
        table: &str,
        dimensions: usize,
    ) -> Result<Self, VectorStoreError> {
        Self::connect(&format!("sqlite://{}?mode=rwc", path.display()), table, dimensions).await
    }

    /// Connect to `database_url` and bind the store to `table`.
    ///
    /// Uses a single connection in WAL mode with a 5-second busy timeout.
    /// Nothing is created until `create_table` is called.
    pub async fn connect(
        database_url: &str,
        table: &str,
        dimensions: usize,
    ) -> Result<Self, VectorStoreError> {
        validate_table_name(table)?;
        validate_dimensions(dimensions)?;
        register_sqlite_vec();

        let opts = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?;

        tracing::debug!(database_url, table, dimensions, "vector store connected");

        Ok(Self {
            pool,
            table: table.to_string(),
            vec_table: format!("{table}_vec"),
            dimensions: AtomicUsize::new(dimensions),
            ready: AtomicBool::new(true),
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    fn ensure_ready(&self) -> Result<(), VectorStoreError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(VectorStoreError::NotReady)
        }
    }

    /// Declared DDL of a table, if it exists.
    async fn table_sql(&self, name: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }

    async fn table_status(&self) -> Result<TableStatus, VectorStoreError> {
        self.ensure_ready()?;
        let content = self
            .table_sql(&self.table)
            .await
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?;
        let vectors = self
            .table_sql(&self.vec_table)
            .await
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?;

        Ok(match (content, vectors) {
            (Some(_), Some(ddl)) => TableStatus::present(parse_vector_width(&ddl)),
            _ => TableStatus::absent(),
        })
    }
}

/// Extract `N` from the `float[N]` column declaration of a vec0 table.
fn parse_vector_width(ddl: &str) -> Option<usize> {
    let lower = ddl.to_ascii_lowercase();
    let start = lower.find("float[")? + "float[".len();
    let end = start + lower[start..].find(']')?;
    lower[start..end].trim().parse().ok()
}

impl VectorStore for SqliteVectorStore {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire) && !self.pool.is_closed()
    }

    async fn check_table_exists(&self) -> TableStatus {
        match self.table_status().await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(
                    table = %self.table,
                    error = %e,
                    "table status check failed, reporting absent"
                );
                TableStatus::absent()
            }
        }
    }

    async fn create_table(&self, force: bool) -> Result<(), VectorStoreError> {
        self.ensure_ready()?;
        let dimensions = self.dimensions();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| VectorStoreError::operation(StoreAction::Create, e))?;

        if force {
            for name in [&self.vec_table, &self.table] {
                sqlx::query(&format!("DROP TABLE IF EXISTS {name}"))
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| VectorStoreError::operation(StoreAction::Drop, e))?;
            }
        }

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            self.table
        ))
        .execute(&mut *tx)
        .await
        .map_err(|e| VectorStoreError::operation(StoreAction::Create, e))?;

        sqlx::query(&format!(
            "CREATE VIRTUAL TABLE IF NOT EXISTS {} USING vec0(
                embedding float[{dimensions}] distance_metric=cosine
            )",
            self.vec_table
        ))
        .execute(&mut *tx)
        .await
        .map_err(|e| VectorStoreError::operation(StoreAction::Create, e))?;

        tx.commit()
            .await
            .map_err(|e| VectorStoreError::operation(StoreAction::Create, e))?;

        tracing::info!(table = %self.table, dimensions, force, "vector table ready");
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
        let insert_err = |e: sqlx::Error| VectorStoreError::operation(StoreAction::Insert, e);

        let mut tx = self.pool.begin().await.map_err(insert_err)?;

        let id = sqlx::query(&format!(
            "INSERT INTO {} (content, created_at) VALUES (?, ?)",
            self.table
        ))
        .bind(content)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(insert_err)?
        .last_insert_rowid();

        sqlx::query(&format!(
            "INSERT INTO {} (rowid, embedding) VALUES (?, ?)",
            self.vec_table
        ))
        .bind(id)
        .bind(embedding.as_bytes())
        .execute(&mut *tx)
        .await
        .map_err(insert_err)?;

        tx.commit().await.map_err(insert_err)?;
        Ok(id)
    }

    async fn search_similar(
        &self,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchHit>, VectorStoreError> {
        self.ensure_ready()?;
        if limit == 0 {
            return Ok(Vec::new());
        }
        let k = limit.min(MAX_KNN);
        let started = Instant::now();

        // vec0 needs the `k` constraint on its own scan, so the KNN runs in a
        // CTE and the content join happens afterwards.
        let rows = sqlx::query(&format!(
            "WITH knn AS (
                SELECT rowid, distance FROM {vec} WHERE embedding MATCH ? AND k = ?
            )
            SELECT c.id AS id, c.content AS content, knn.distance AS distance
            FROM knn JOIN {table} c ON c.id = knn.rowid
            ORDER BY knn.distance ASC, c.id ASC",
            vec = self.vec_table,
            table = self.table,
        ))
        .bind(query.as_bytes())
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| VectorStoreError::operation(StoreAction::Search, e))?;

        let hits = rows
            .iter()
            .map(|row| {
                Ok(SearchHit {
                    id: row.try_get("id")?,
                    content: row.try_get("content")?,
                    distance: row.try_get::<f64, _>("distance")? as f32,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| VectorStoreError::operation(StoreAction::Search, e))?;

        tracing::debug!(
            hits = hits.len(),
            k,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "vector search"
        );
        Ok(hits)
    }

    async fn count(&self) -> Result<u64, VectorStoreError> {
        if !self.table_status().await?.exists {
            return Ok(0);
        }
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.table))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| VectorStoreError::operation(StoreAction::Count, e))?;
        Ok(count.max(0) as u64)
    }

    async fn save(&self) -> Result<(), VectorStoreError> {
        if !self.is_ready() {
            return Ok(());
        }
        sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await
            .map_err(|e| VectorStoreError::operation(StoreAction::Save, e))?;
        Ok(())
    }

    async fn close(&self) {
        if self.ready.swap(false, Ordering::AcqRel) {
            self.pool.close().await;
            tracing::debug!(table = %self.table, "vector store closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_store(dir: &TempDir, dimensions: usize) -> SqliteVectorStore {
        SqliteVectorStore::open(&dir.path().join("vectors.db"), "notes", dimensions)
            .await
            .unwrap()
    }

    #[test]
    fn test_parse_vector_width() {
        let ddl = "CREATE VIRTUAL TABLE notes_vec USING vec0(\n embedding float[384] distance_metric=cosine\n)";
        assert_eq!(parse_vector_width(ddl), Some(384));
        assert_eq!(parse_vector_width("CREATE VIRTUAL TABLE x USING vec0(e FLOAT[ 12 ])"), Some(12));
        assert_eq!(parse_vector_width("CREATE TABLE x (id INTEGER)"), None);
    }

    #[tokio::test]
    async fn test_rejects_bad_table_name() {
        let dir = TempDir::new().unwrap();
        let result =
            SqliteVectorStore::open(&dir.path().join("v.db"), "notes; DROP TABLE x", 4).await;
        assert!(matches!(result, Err(VectorStoreError::InvalidTableName(_))));
    }

    #[tokio::test]
    async fn test_absent_table_status() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 4).await;
        assert!(store.is_ready());
        assert_eq!(store.check_table_exists().await, TableStatus::absent());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_table_records_dimensions() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 4).await;
        store.create_table(true).await.unwrap();
        assert_eq!(store.check_table_exists().await, TableStatus::present(Some(4)));
    }

    #[tokio::test]
    async fn test_create_without_force_keeps_existing_table() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 4).await;
        store.create_table(false).await.unwrap();
        store.insert_vector("keep me", &[1.0, 0.0, 0.0, 0.0]).await.unwrap();

        store.set_dimensions(8).unwrap();
        store.create_table(false).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.check_table_exists().await.dimensions, Some(4));
    }

    #[tokio::test]
    async fn test_forced_recreation_is_idempotent_and_clears() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 3).await;
        store.create_table(true).await.unwrap();
        store.insert_vector("a", &[1.0, 0.0, 0.0]).await.unwrap();
        store.insert_vector("b", &[0.0, 1.0, 0.0]).await.unwrap();

        store.set_dimensions(5).unwrap();
        store.create_table(true).await.unwrap();
        store.create_table(true).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.check_table_exists().await.dimensions, Some(5));
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 2).await;
        store.create_table(false).await.unwrap();
        let first = store.insert_vector("one", &[1.0, 0.0]).await.unwrap();
        let second = store.insert_vector("two", &[0.0, 1.0]).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_wrong_width_insert_is_rejected_atomically() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 4).await;
        store.create_table(false).await.unwrap();

        let err = store.insert_vector("too short", &[1.0, 2.0]).await.unwrap_err();
        assert_eq!(err.action(), Some(StoreAction::Insert));
        assert_eq!(store.count().await.unwrap(), 0, "content row must roll back");
    }

    #[tokio::test]
    async fn test_search_orders_by_ascending_distance() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 3).await;
        store.create_table(false).await.unwrap();
        store.insert_vector("far", &[0.0, 0.0, 1.0]).await.unwrap();
        store.insert_vector("near", &[1.0, 0.1, 0.0]).await.unwrap();
        store.insert_vector("middle", &[1.0, 1.0, 0.0]).await.unwrap();

        let hits = store.search_similar(&[1.0, 0.0, 0.0], 5).await.unwrap();
        let contents: Vec<&str> = hits.iter().map(|h| h.content.as_str()).collect();
        assert_eq!(contents, vec!["near", "middle", "far"]);
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
        assert!(hits[0].distance < 0.01);
    }

    #[tokio::test]
    async fn test_search_respects_limit_and_breaks_ties_by_id() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 2).await;
        store.create_table(false).await.unwrap();
        let a = store.insert_vector("a", &[1.0, 0.0]).await.unwrap();
        let b = store.insert_vector("b", &[2.0, 0.0]).await.unwrap();
        store.insert_vector("c", &[0.0, 1.0]).await.unwrap();

        let hits = store.search_similar(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, a);
        assert_eq!(hits[1].id, b);
    }

    #[tokio::test]
    async fn test_save_and_reopen_restores_rows() {
        let dir = TempDir::new().unwrap();
        {
            let store = open_store(&dir, 2).await;
            store.create_table(false).await.unwrap();
            store.insert_vector("persisted", &[0.5, 0.5]).await.unwrap();
            store.save().await.unwrap();
            store.close().await;
        }

        let reopened = open_store(&dir, 2).await;
        assert_eq!(reopened.check_table_exists().await, TableStatus::present(Some(2)));
        let hits = reopened.search_similar(&[0.5, 0.5], 1).await.unwrap();
        assert_eq!(hits[0].content, "persisted");
    }

    #[tokio::test]
    async fn test_closed_store_is_not_ready() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 2).await;
        store.create_table(false).await.unwrap();
        store.close().await;

        assert!(!store.is_ready());
        assert_eq!(store.check_table_exists().await, TableStatus::absent());
        assert!(store.save().await.is_ok());
        assert!(matches!(
            store.insert_vector("x", &[1.0, 0.0]).await,
            Err(VectorStoreError::NotReady)
        ));
        assert!(matches!(
            store.create_table(true).await,
            Err(VectorStoreError::NotReady)
        ));
    }

    #[tokio::test]
    async fn test_set_dimensions_rejects_zero() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, 2).await;
        assert!(matches!(
            store.set_dimensions(0),
            Err(VectorStoreError::InvalidDimensions(0))
        ));
        assert_eq!(store.dimensions(), 2);
    }
}
