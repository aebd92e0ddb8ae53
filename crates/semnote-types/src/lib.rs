//! Shared domain types for semnote.
//!
//! Embedding model descriptors, provider configuration, vector records and
//! search results, plus the error enums shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, chrono and thiserror.

pub mod config;
pub mod embedding;
pub mod error;
pub mod vector;
