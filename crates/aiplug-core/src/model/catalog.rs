//! Read-only model catalog snapshots and where they come from.
//!
//! A [`CatalogSnapshot`] pairs the capability map with the token-limit table.
//! Request handling only ever sees a snapshot; reloading is decided by a
//! [`CatalogRefresh`] policy wrapped around a [`CatalogSource`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;

use aiplug_types::config::CatalogRefresh;
use aiplug_types::error::RepositoryError;
use aiplug_types::model::{Capability, CapabilityMap, ModelInfo, TokenLimitTable};

use crate::repository::config_store::{CAPABILITIES_MAP_KEY, ConfigStore, TOKEN_LIMITS_KEY};

use super::resolver;

const COMPLETION_MODELS: &[&str] = &["gpt-3.5-turbo-instruct", "babbage-002", "davinci-002"];

const CHAT_MODELS: &[&str] = &[
    "gpt-4",
    "gpt-4-0613",
    "gpt-4-32k",
    "gpt-4-32k-0613",
    "gpt-3.5-turbo",
    "gpt-3.5-turbo-0613",
    "gpt-3.5-turbo-16k",
    "gpt-3.5-turbo-16k-0613",
];

const EMBEDDING_MODELS: &[&str] = &["text-embedding-ada-002"];

const TOKEN_LIMITS: &[(&str, Option<u32>)] = &[
    ("gpt-3.5-turbo-instruct", Some(4_096)),
    ("babbage-002", Some(16_384)),
    ("davinci-002", Some(16_384)),
    ("gpt-4", Some(8_192)),
    ("gpt-4-0613", Some(8_192)),
    ("gpt-4-32k", Some(32_768)),
    ("gpt-4-32k-0613", Some(32_768)),
    ("gpt-3.5-turbo", Some(4_096)),
    ("gpt-3.5-turbo-0613", Some(4_096)),
    ("gpt-3.5-turbo-16k", Some(16_385)),
    ("gpt-3.5-turbo-16k-0613", Some(16_385)),
    ("text-embedding-ada-002", None),
];

fn owned(models: &[&str]) -> Vec<String> {
    models.iter().map(|m| m.to_string()).collect()
}

/// The capability map seeded into a fresh config store.
pub fn default_capability_map() -> CapabilityMap {
    let mut buckets = BTreeMap::new();
    buckets.insert(Capability::Completion, owned(COMPLETION_MODELS));
    buckets.insert(Capability::ChatCompletion, owned(CHAT_MODELS));
    buckets.insert(Capability::Embeddings, owned(EMBEDDING_MODELS));
    CapabilityMap(buckets)
}

/// The token-limit table seeded into a fresh config store.
pub fn default_token_limits() -> TokenLimitTable {
    TokenLimitTable(
        TOKEN_LIMITS
            .iter()
            .map(|(model, limit)| (model.to_string(), *limit))
            .collect::<HashMap<_, _>>(),
    )
}

/// Capability map and token limits as of one load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub capabilities: CapabilityMap,
    pub token_limits: TokenLimitTable,
}

impl CatalogSnapshot {
    pub fn defaults() -> Self {
        Self {
            capabilities: default_capability_map(),
            token_limits: default_token_limits(),
        }
    }

    pub fn model_info(&self, model_id: &str) -> ModelInfo {
        resolver::build_model_info(model_id, self)
    }

    /// Every model id listed in any bucket, sorted and deduplicated.
    pub fn known_models(&self) -> Vec<String> {
        self.capabilities
            .0
            .values()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Where catalog snapshots come from.
pub trait CatalogSource: Send + Sync {
    fn load(&self) -> impl Future<Output = Result<Arc<CatalogSnapshot>, RepositoryError>> + Send;
}

/// Loads snapshots from the platform config store.
///
/// A missing key falls back to the built-in table for that key.
pub struct StoreCatalog<S> {
    store: S,
}

impl<S: ConfigStore> StoreCatalog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn read<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, RepositoryError> {
        match self.store.get(key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| RepositoryError::Corrupt(format!("{key}: {e}"))),
            None => Ok(None),
        }
    }
}

impl<S: ConfigStore> CatalogSource for StoreCatalog<S> {
    async fn load(&self) -> Result<Arc<CatalogSnapshot>, RepositoryError> {
        let capabilities = match self.read::<CapabilityMap>(CAPABILITIES_MAP_KEY).await? {
            Some(map) => map,
            None => {
                tracing::warn!(key = CAPABILITIES_MAP_KEY, "capability map missing, using built-in defaults");
                default_capability_map()
            }
        };

        let token_limits = match self.read::<TokenLimitTable>(TOKEN_LIMITS_KEY).await? {
            Some(table) => table,
            None => {
                tracing::debug!(key = TOKEN_LIMITS_KEY, "token limit table missing, using built-in defaults");
                default_token_limits()
            }
        };

        Ok(Arc::new(CatalogSnapshot {
            capabilities,
            token_limits,
        }))
    }
}

/// Write the built-in tables into the store where they are missing.
///
/// Existing values are never overwritten. Returns the keys that were written.
pub async fn seed_defaults<S: ConfigStore>(store: &S) -> Result<Vec<&'static str>, RepositoryError> {
    let mut written = Vec::new();

    if store.get(CAPABILITIES_MAP_KEY).await?.is_none() {
        let value = serde_json::to_value(default_capability_map())
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))?;
        store.put(CAPABILITIES_MAP_KEY, value).await?;
        written.push(CAPABILITIES_MAP_KEY);
    }

    if store.get(TOKEN_LIMITS_KEY).await?.is_none() {
        let value = serde_json::to_value(default_token_limits())
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))?;
        store.put(TOKEN_LIMITS_KEY, value).await?;
        written.push(TOKEN_LIMITS_KEY);
    }

    if !written.is_empty() {
        tracing::info!(keys = ?written, "seeded model catalog defaults");
    }

    Ok(written)
}

/// Applies a [`CatalogRefresh`] policy to another source.
pub struct RefreshingCatalog<C> {
    inner: C,
    policy: CatalogRefresh,
    cached: OnceCell<Arc<CatalogSnapshot>>,
}

impl<C: CatalogSource> RefreshingCatalog<C> {
    pub fn new(inner: C, policy: CatalogRefresh) -> Self {
        Self {
            inner,
            policy,
            cached: OnceCell::new(),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: CatalogSource> CatalogSource for RefreshingCatalog<C> {
    async fn load(&self) -> Result<Arc<CatalogSnapshot>, RepositoryError> {
        match self.policy {
            CatalogRefresh::PerRequest => self.inner.load().await,
            CatalogRefresh::Once => self
                .cached
                .get_or_try_init(|| self.inner.load())
                .await
                .cloned(),
        }
    }
}
