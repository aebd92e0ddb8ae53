//! Vector store implementations.
//!
//! - [`sqlite::SqliteVectorStore`]: durable, sqlite-vec `vec0` table, engine-enforced width
//! - [`memory::InMemoryVectorStore`]: ephemeral, brute-force cosine, permissive width

pub mod extension;
pub mod memory;
pub mod sqlite;
