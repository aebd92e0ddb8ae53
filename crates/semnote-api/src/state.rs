//! Application state wiring the store, catalog and active model together.
//!
//! `VectorService` is generic over its store; the CLI pins it to SQLite.

use std::path::PathBuf;

use anyhow::Context;
use semnote_core::embedding::box_model::BoxEmbeddingModel;
use semnote_core::embedding::catalog::ModelCatalog;
use semnote_core::embedding::factory::{EmbeddingModelFactory, build_model};
use semnote_core::embedding::resolver::ProviderConfigResolver;
use semnote_core::service::vector::VectorService;
use semnote_infra::config::{database_path, load_config, resolve_data_dir};
use semnote_infra::embedding::default_model_factory;
use semnote_infra::vector::sqlite::SqliteVectorStore;
use semnote_types::config::SemnoteConfig;

pub type ConcreteVectorService = VectorService<SqliteVectorStore>;

/// Everything a command needs, built once per invocation.
pub struct AppState {
    pub data_dir: PathBuf,
    pub database: PathBuf,
    pub config: SemnoteConfig,
    pub catalog: ModelCatalog,
    pub factory: EmbeddingModelFactory,
    pub resolver: ProviderConfigResolver,
    pub vector_service: ConcreteVectorService,
}

impl AppState {
    /// Load config, build the configured model and open the vector store.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let config = load_config(&data_dir).await;
        let catalog = ModelCatalog::builtin();
        let factory = default_model_factory();
        let resolver = ProviderConfigResolver::new();

        let model = build_model(
            &catalog,
            &resolver,
            &factory,
            &config.embedding,
            &config.embedding.model,
        )
        .with_context(|| {
            format!(
                "cannot use embedding model '{}' (check config.toml in {})",
                config.embedding.model,
                data_dir.display()
            )
        })?;

        let database = database_path(&config, &data_dir);
        let store = SqliteVectorStore::open(&database, &config.store.table_name, model.dimensions())
            .await
            .with_context(|| format!("failed to open {}", database.display()))?;

        let vector_service = VectorService::new(store, model)?
            .with_search_limit(config.store.search_limit);

        tracing::debug!(
            data_dir = %data_dir.display(),
            database = %database.display(),
            table = %config.store.table_name,
            "application state ready"
        );

        Ok(Self {
            data_dir,
            database,
            config,
            catalog,
            factory,
            resolver,
            vector_service,
        })
    }

    /// Construct the named catalog model with the loaded provider settings.
    pub fn build_model(&self, name: &str) -> anyhow::Result<BoxEmbeddingModel> {
        build_model(
            &self.catalog,
            &self.resolver,
            &self.factory,
            &self.config.embedding,
            name,
        )
        .with_context(|| format!("cannot use embedding model '{name}'"))
    }
}
