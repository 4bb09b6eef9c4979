//! Config store trait definition.
//!
//! The platform keeps the model capability map and token-limit table as JSON
//! blobs in a key/value store shared by all workers.

use std::future::Future;

use aiplug_types::error::RepositoryError;

/// Store key of the capability map.
pub const CAPABILITIES_MAP_KEY: &str = "open_ai_capabilities_map";

/// Store key of the token-limit table.
pub const TOKEN_LIMITS_KEY: &str = "open_ai_token_limits";

/// Key/value store holding JSON configuration blobs.
pub trait ConfigStore: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<serde_json::Value>, RepositoryError>> + Send;

    /// Write `value` under `key`, replacing any previous value.
    fn put(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}
