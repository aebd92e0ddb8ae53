//! Embedding and vector-store coordination for semnote.
//!
//! This crate defines the "ports" (the `EmbeddingModel` and `VectorStore`
//! traits) that the infrastructure layer implements, plus the model
//! catalog, provider configuration resolver and the `VectorService` that
//! composes a model with a store. It depends only on `semnote-types` --
//! never on `semnote-infra` or any database/IO crate.

pub mod embedding;
pub mod service;
pub mod vector;
