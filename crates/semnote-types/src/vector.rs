//! Vector table and search types for semnote.
//!
//! A vector table stores note content next to the embedding generated for
//! it. These types describe rows, search results and the decision states
//! produced when the active model and the stored table disagree on width.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::embedding::EmbeddingModelDescriptor;

/// One stored row: content plus the embedding generated for it.
///
/// Rows are never mutated; recreating the table is the only way to delete them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Auto-assigned, unique and monotonic per table.
    pub id: i64,
    pub content: String,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

/// A store-level search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: i64,
    pub content: String,
    /// Cosine distance to the query; lower is more similar.
    pub distance: f32,
}

/// A service-level search result with a derived similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub id: i64,
    pub content: String,
    pub distance: f32,
    /// Always `1 - distance`; not clamped when rounding pushes it past `[-1, 1]`.
    pub similarity: f32,
}

/// Presence and declared width of the vector table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStatus {
    pub exists: bool,
    /// `None` when the table is absent or its width could not be determined.
    pub dimensions: Option<usize>,
}

impl TableStatus {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn present(dimensions: Option<usize>) -> Self {
        Self {
            exists: true,
            dimensions,
        }
    }
}

/// Outcome of comparing the active model's width with the stored table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub compatible: bool,
    pub table_dimensions: Option<usize>,
    pub model_dimensions: usize,
}

impl CompatibilityReport {
    /// Compare a table status against a model width.
    ///
    /// An absent table, or one with no discoverable width, is always compatible.
    pub fn evaluate(status: TableStatus, model_dimensions: usize) -> Self {
        let compatible = match (status.exists, status.dimensions) {
            (true, Some(table)) => table == model_dimensions,
            _ => true,
        };
        Self {
            compatible,
            table_dimensions: if status.exists { status.dimensions } else { None },
            model_dimensions,
        }
    }
}

/// Result of an insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InsertOutcome {
    /// The content was embedded and stored under `id`.
    Inserted { id: i64 },
    /// The table width conflicts with the active model; nothing was stored.
    /// The caller must confirm a destructive recreation to proceed.
    RequiresConfirmation(CompatibilityReport),
}

/// Preview of switching the active model. Computing it mutates nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelChangePlan {
    pub current: EmbeddingModelDescriptor,
    pub target: EmbeddingModelDescriptor,
    pub dimensions_changed: bool,
    pub old_dimensions: usize,
    pub new_dimensions: usize,
    pub table_dimensions: Option<usize>,
    /// True when the existing table would be incompatible with the target model.
    pub requires_recreate: bool,
    /// Rows that a recreation would discard.
    pub existing_records: u64,
}

/// What happened when the active model was swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelChangeReport {
    pub dimensions_changed: bool,
    pub old_dimensions: Option<usize>,
    pub new_dimensions: usize,
}
