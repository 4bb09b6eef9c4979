//! Settings merge: stored settings + per-request overrides + defaults + the
//! resolved API key -> provider model parameters.
//!
//! Sampling parameters are sparse. A key absent from both the overrides and
//! the stored settings is absent from the result; no default value is ever
//! invented for it.

use aiplug_types::descriptor::ModelParams;
use aiplug_types::error::AdapterError;
use aiplug_types::secret::{ProjectId, Redacted};
use aiplug_types::settings::{IntegrationSettings, SettingsOverrides};

use crate::service::secret::SecretService;

/// Model name for a request: a non-empty override wins over the stored name.
pub fn resolve_model_name(
    stored: &IntegrationSettings,
    overrides: &SettingsOverrides,
) -> Result<String, AdapterError> {
    let name = overrides
        .model_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(&stored.model_name);

    if name.is_empty() {
        return Err(AdapterError::Configuration(
            "model_name is not set in integration settings".to_string(),
        ));
    }
    Ok(name.to_string())
}

fn base_url(stored: &IntegrationSettings, default_api_base: &str) -> String {
    stored
        .api_base
        .as_deref()
        .filter(|b| !b.is_empty())
        .unwrap_or(default_api_base)
        .trim_end_matches('/')
        .to_string()
}

/// Combine settings with an already resolved key. Pure; no I/O.
pub fn merge_params(
    stored: &IntegrationSettings,
    overrides: &SettingsOverrides,
    api_key: Redacted,
    default_api_base: &str,
    streaming: bool,
) -> Result<ModelParams, AdapterError> {
    Ok(ModelParams {
        model: resolve_model_name(stored, overrides)?,
        temperature: overrides.temperature.or(stored.temperature),
        max_tokens: overrides.max_tokens.or(stored.max_tokens),
        top_p: overrides.top_p.or(stored.top_p),
        api_key,
        base_url: base_url(stored, default_api_base),
        streaming,
    })
}

/// Parameters for client-level calls that need no model (settings check,
/// model listing).
pub fn client_params(
    stored: &IntegrationSettings,
    api_key: Redacted,
    default_api_base: &str,
) -> ModelParams {
    ModelParams {
        model: String::new(),
        temperature: None,
        max_tokens: None,
        top_p: None,
        api_key,
        base_url: base_url(stored, default_api_base),
        streaming: false,
    }
}

/// Resolve the API token for `project` and merge everything into call parameters.
///
/// With no project context the token is resolved in the global scope.
pub async fn merge(
    stored: &IntegrationSettings,
    overrides: &SettingsOverrides,
    secrets: &SecretService,
    project: Option<ProjectId>,
    default_api_base: &str,
    streaming: bool,
) -> Result<ModelParams, AdapterError> {
    // fail on a missing model before touching the secret store
    resolve_model_name(stored, overrides)?;
    let api_key = secrets.unsecret(&stored.api_token, project).await?;
    merge_params(stored, overrides, api_key, default_api_base, streaming)
}
