//! Application state wiring the adapter to its concrete infrastructure.
//!
//! `AdapterService` is generic over catalog, backend and sink; `AppState`
//! pins it to the file store, the OpenAI backend and the stdout sink.

use std::path::PathBuf;
use std::sync::Arc;

use aiplug_core::model::catalog::{RefreshingCatalog, StoreCatalog, seed_defaults};
use aiplug_core::service::adapter::AdapterService;
use aiplug_core::service::secret::SecretService;
use aiplug_infra::config::{load_config, resolve_data_dir, store_path};
use aiplug_infra::llm::openai::OpenAiBackend;
use aiplug_infra::secret::chain::build_secret_chain;
use aiplug_infra::store::FileStore;

use crate::cli::sink::StdoutSink;

pub type ConcreteCatalog = RefreshingCatalog<StoreCatalog<FileStore>>;

pub type ConcreteAdapter = AdapterService<ConcreteCatalog, OpenAiBackend, StdoutSink>;

/// Shared application state used by every command.
#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<ConcreteAdapter>,
    pub store: FileStore,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load configuration, open the store and wire the adapter.
    ///
    /// The default catalog is seeded into the store when absent.
    pub async fn init(json: bool) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;
        let store = FileStore::new(store_path(&data_dir, &config));

        match seed_defaults(&store).await {
            Ok(written) if !written.is_empty() => {
                tracing::info!(keys = ?written, "seeded default model catalog");
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %err, "could not seed model catalog"),
        }

        let secrets = SecretService::new(build_secret_chain(store.clone(), config.env_secrets));
        let catalog = RefreshingCatalog::new(StoreCatalog::new(store.clone()), config.catalog.refresh);
        let adapter = AdapterService::new(
            secrets,
            catalog,
            OpenAiBackend::new(),
            StdoutSink::new(json),
            config,
        );

        Ok(Self {
            adapter: Arc::new(adapter),
            store,
            data_dir,
        })
    }
}
