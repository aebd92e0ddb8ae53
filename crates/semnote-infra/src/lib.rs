//! Infrastructure implementations for semnote.
//!
//! SQLite (sqlx + sqlite-vec) and in-memory vector stores, the OpenAI and
//! Ollama embedding backends, and the `config.toml` loader.

pub mod config;
pub mod embedding;
pub mod vector;
