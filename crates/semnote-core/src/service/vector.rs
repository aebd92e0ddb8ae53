//! Vector coordination service.
//!
//! Composes the active embedding model with a vector store to index and
//! search note content, and runs the compatibility protocol that keeps the
//! stored table width in step with the model that produces embeddings.
//!
//! Destructive steps are never taken implicitly. When the table and the
//! model disagree, `insert_content` returns
//! [`InsertOutcome::RequiresConfirmation`] and the caller decides whether to
//! follow up with [`VectorService::insert_content_confirmed`]. Model swaps
//! follow the same shape: [`VectorService::plan_model_change`] previews,
//! [`VectorService::change_model`] applies.

use std::sync::Arc;

use semnote_types::embedding::EmbeddingModelDescriptor;
use semnote_types::error::VectorServiceError;
use semnote_types::vector::{
    CompatibilityReport, InsertOutcome, ModelChangePlan, ModelChangeReport, SimilarityResult,
};
use tokio::sync::{Mutex, RwLock};

use crate::embedding::box_model::BoxEmbeddingModel;
use crate::vector::distance::similarity_from_distance;
use crate::vector::store::{DEFAULT_SEARCH_LIMIT, VectorStore};

/// Service coordinating one embedding model and one vector store.
///
/// Generic over the store so the same protocol runs against SQLite and the
/// in-memory engine.
pub struct VectorService<S: VectorStore> {
    store: S,
    model: RwLock<Arc<BoxEmbeddingModel>>,
    /// Serializes check-then-act sequences (insert, recreate, model swap).
    write_lock: Mutex<()>,
    search_limit: usize,
}

impl<S: VectorStore> VectorService<S> {
    /// Create a service and point the store at the model's width.
    pub fn new(store: S, model: BoxEmbeddingModel) -> Result<Self, VectorServiceError> {
        store.set_dimensions(model.dimensions())?;
        Ok(Self {
            store,
            model: RwLock::new(Arc::new(model)),
            write_lock: Mutex::new(()),
            search_limit: DEFAULT_SEARCH_LIMIT,
        })
    }

    /// Override the number of hits returned when a search passes no limit.
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn current_model(&self) -> Arc<BoxEmbeddingModel> {
        self.model.read().await.clone()
    }

    /// Descriptor of the model currently producing embeddings.
    pub async fn active_model(&self) -> EmbeddingModelDescriptor {
        self.current_model().await.descriptor().clone()
    }

    /// Compare the stored table width with the active model.
    pub async fn check_compatibility(&self) -> CompatibilityReport {
        let status = self.store.check_table_exists().await;
        let model_dimensions = self.current_model().await.dimensions();
        CompatibilityReport::evaluate(status, model_dimensions)
    }

    /// Embed `text` and store it.
    ///
    /// Returns [`InsertOutcome::RequiresConfirmation`] without embedding or
    /// storing anything when the table was created for a different width.
    pub async fn insert_content(&self, text: &str) -> Result<InsertOutcome, VectorServiceError> {
        let _guard = self.write_lock.lock().await;
        self.insert_unlocked(text).await
    }

    /// Drop and recreate the table for the active model, then insert `text`.
    ///
    /// This is the apply step after a `RequiresConfirmation` outcome; all
    /// existing rows are discarded.
    pub async fn insert_content_confirmed(&self, text: &str) -> Result<i64, VectorServiceError> {
        let _guard = self.write_lock.lock().await;
        tracing::info!("recreating vector table before confirmed insert");
        self.store.create_table(true).await?;

        match self.insert_unlocked(text).await? {
            InsertOutcome::Inserted { id } => Ok(id),
            InsertOutcome::RequiresConfirmation(report) => {
                tracing::error!(
                    table_dimensions = ?report.table_dimensions,
                    model_dimensions = report.model_dimensions,
                    "vector table still incompatible after recreation"
                );
                Err(VectorServiceError::Conflict(report))
            }
        }
    }

    async fn insert_unlocked(&self, text: &str) -> Result<InsertOutcome, VectorServiceError> {
        let model = self.current_model().await;
        let status = self.store.check_table_exists().await;
        let report = CompatibilityReport::evaluate(status, model.dimensions());

        if !report.compatible {
            tracing::warn!(
                table_dimensions = ?report.table_dimensions,
                model_dimensions = report.model_dimensions,
                "vector table width does not match the active model"
            );
            return Ok(InsertOutcome::RequiresConfirmation(report));
        }

        if !status.exists {
            self.store.create_table(false).await?;
        }

        let embedding = model.generate_embedding(text).await.map_err(|e| {
            tracing::error!(model = %model.descriptor().name, error = %e, "embedding failed");
            e
        })?;
        if embedding.len() != model.dimensions() {
            tracing::warn!(
                model = %model.descriptor().name,
                expected = model.dimensions(),
                actual = embedding.len(),
                "embedding width differs from model dimensions"
            );
        }

        let id = self
            .store
            .insert_vector(text, &embedding)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to store embedding");
                e
            })?;
        self.store.save().await?;

        tracing::debug!(id, chars = text.len(), "content indexed");
        Ok(InsertOutcome::Inserted { id })
    }

    /// The stored rows nearest to `text`, most similar first.
    ///
    /// `limit` defaults to the configured search limit.
    pub async fn search_similar(
        &self,
        text: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SimilarityResult>, VectorServiceError> {
        let status = self.store.check_table_exists().await;
        if !status.exists {
            return Err(VectorServiceError::NoTable);
        }

        let model = self.current_model().await;
        let query = model.generate_embedding(text).await?;
        let limit = limit.unwrap_or(self.search_limit);
        let hits = self.store.search_similar(&query, limit).await?;

        tracing::debug!(hits = hits.len(), limit, "similarity search complete");
        Ok(hits
            .into_iter()
            .map(|hit| SimilarityResult {
                similarity: similarity_from_distance(hit.distance),
                id: hit.id,
                content: hit.content,
                distance: hit.distance,
            })
            .collect())
    }

    /// Preview switching to `target` without changing anything.
    pub async fn plan_model_change(
        &self,
        target: &EmbeddingModelDescriptor,
    ) -> Result<ModelChangePlan, VectorServiceError> {
        let current = self.active_model().await;
        let status = self.store.check_table_exists().await;
        let report = CompatibilityReport::evaluate(status, target.dimensions);
        let existing_records = if status.exists {
            self.store.count().await?
        } else {
            0
        };

        Ok(ModelChangePlan {
            dimensions_changed: current.dimensions != target.dimensions,
            old_dimensions: current.dimensions,
            new_dimensions: target.dimensions,
            table_dimensions: report.table_dimensions,
            requires_recreate: !report.compatible,
            existing_records,
            current,
            target: target.clone(),
        })
    }

    /// Make `model` the active model.
    ///
    /// The store is pointed at the new width, but the table is left alone;
    /// a width change surfaces on the next insert as `RequiresConfirmation`
    /// unless the caller recreates the table first.
    pub async fn change_model(
        &self,
        model: BoxEmbeddingModel,
    ) -> Result<ModelChangeReport, VectorServiceError> {
        let _guard = self.write_lock.lock().await;
        let new_dimensions = model.dimensions();
        self.store.set_dimensions(new_dimensions)?;

        let mut active = self.model.write().await;
        let old = active.descriptor().clone();
        *active = Arc::new(model);

        tracing::info!(
            from = %old.name,
            to = %active.descriptor().name,
            old_dimensions = old.dimensions,
            new_dimensions,
            "active embedding model changed"
        );
        Ok(ModelChangeReport {
            dimensions_changed: old.dimensions != new_dimensions,
            old_dimensions: Some(old.dimensions),
            new_dimensions,
        })
    }

    /// Drop every row and recreate the table at the active model's width.
    pub async fn recreate_table(&self) -> Result<(), VectorServiceError> {
        let _guard = self.write_lock.lock().await;
        self.store.create_table(true).await?;
        self.store.save().await?;
        tracing::info!(dimensions = self.store.dimensions(), "vector table recreated");
        Ok(())
    }

    /// Number of stored rows.
    pub async fn count(&self) -> Result<u64, VectorServiceError> {
        Ok(self.store.count().await?)
    }
}
