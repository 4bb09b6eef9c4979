use thiserror::Error;

use crate::llm::LlmError;

/// Errors related to secret resolution.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret '{name}' not found in scope {scope}")]
    NotFound { name: String, scope: String },

    #[error("secret provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors from storage ports (secret providers, config store).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("corrupt data: {0}")]
    Corrupt(String),
}

/// Everything that can go wrong between ingress and the provider call.
///
/// All variants are turned into `{ok: false, error}` at the service boundary.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Unknown or unsupported model, missing required settings field.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Request body or settings fail their schema.
    #[error("validation error: {0}")]
    Validation(String),

    /// The provider call itself failed.
    #[error("upstream error: {0}")]
    Upstream(#[from] LlmError),

    /// The API token could not be unsecreted for the project scope.
    #[error("secret resolution error: {0}")]
    SecretResolution(#[from] SecretError),

    /// The catalog or secret store could not be read.
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}
