//! Adapter configuration types.
//!
//! `AdapterConfig` represents the `aiplug.toml` file in the data directory.
//! Every field has a default so an empty or missing file is valid.

use serde::{Deserialize, Serialize};

/// Default OpenAI-compatible API base.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Default API flavor.
pub const DEFAULT_API_TYPE: &str = "openai";

/// Top-level adapter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Base URL used when settings carry no `api_base`.
    #[serde(default = "default_api_base")]
    pub default_api_base: String,

    /// API flavor used when settings carry no `api_type`.
    #[serde(default = "default_api_type")]
    pub default_api_type: String,

    /// Routing key stamped on every call descriptor.
    #[serde(default)]
    pub routing_key: Option<String>,

    /// Whether descriptors are marked as I/O-bound.
    #[serde(default = "default_io_bound")]
    pub io_bound: bool,

    #[serde(default)]
    pub catalog: CatalogConfig,

    /// JSON secret/config store, relative to the data directory.
    #[serde(default = "default_secrets_file")]
    pub secrets_file: String,

    /// Consult `AIPLUG_*` environment variables before the file store.
    #[serde(default = "default_env_secrets")]
    pub env_secrets: bool,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_api_type() -> String {
    DEFAULT_API_TYPE.to_string()
}

fn default_io_bound() -> bool {
    true
}

fn default_secrets_file() -> String {
    "store.json".to_string()
}

fn default_env_secrets() -> bool {
    true
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            default_api_base: default_api_base(),
            default_api_type: default_api_type(),
            routing_key: None,
            io_bound: default_io_bound(),
            catalog: CatalogConfig::default(),
            secrets_file: default_secrets_file(),
            env_secrets: default_env_secrets(),
        }
    }
}

/// `[catalog]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub refresh: CatalogRefresh,
}

/// When the capability map and token-limit table are re-read from the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogRefresh {
    /// Load a fresh snapshot for every request.
    #[default]
    PerRequest,
    /// Load once and reuse the snapshot for the process lifetime.
    Once,
}
