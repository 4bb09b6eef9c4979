//! Model capability and token-limit lookups.
//!
//! Matching is exact: a model id belongs to a capability bucket only when the
//! bucket lists that id verbatim. Prefix or substring matches (e.g. a dated
//! snapshot id against its base name) are not considered.

use aiplug_types::model::{
    Capabilities, Capability, CapabilityMap, DEFAULT_TOKEN_LIMIT, ModelInfo, TokenLimitTable,
};
use aiplug_types::settings::IntegrationSettings;

use super::catalog::CatalogSnapshot;

/// Which capability buckets list `model_id`. Unknown ids resolve to all-false.
pub fn resolve(model_id: &str, map: &CapabilityMap) -> Capabilities {
    let listed = |capability| {
        map.models_for(capability)
            .iter()
            .any(|candidate| candidate == model_id)
    };

    Capabilities {
        completion: listed(Capability::Completion),
        chat_completion: listed(Capability::ChatCompletion),
        embeddings: listed(Capability::Embeddings),
    }
}

/// Token limit for `model_id`.
///
/// - stored number -> that number
/// - stored `null` -> `None` (limit unknown, kept as such)
/// - id absent from the table -> [`DEFAULT_TOKEN_LIMIT`]
pub fn token_limit(model_id: &str, table: &TokenLimitTable) -> Option<u32> {
    match table.0.get(model_id) {
        Some(stored) => *stored,
        None => Some(DEFAULT_TOKEN_LIMIT),
    }
}

/// Build the immutable [`ModelInfo`] record for a model id.
pub fn build_model_info(model_id: &str, snapshot: &CatalogSnapshot) -> ModelInfo {
    ModelInfo {
        id: model_id.to_string(),
        name: model_id.to_string(),
        capabilities: resolve(model_id, &snapshot.capabilities),
        token_limit: token_limit(model_id, &snapshot.token_limits),
        token_limit_set: true,
    }
}

/// Fill every configured model from `snapshot`.
///
/// Capabilities come from map membership, merged with any flags the input
/// set. A model whose input had no `token_limit` key gets the table's limit;
/// an explicit value (including `null`) is kept.
pub fn complete_settings(settings: &mut IntegrationSettings, snapshot: &CatalogSnapshot) {
    for info in settings.models.iter_mut() {
        info.complete_from(&build_model_info(&info.id, snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};

    use crate::model::catalog::default_capability_map;

    #[test]
    fn test_resolve_every_listed_model() {
        let map = default_capability_map();
        for capability in Capability::ALL {
            for model in map.models_for(capability) {
                let caps = resolve(model, &map);
                assert!(caps.has(capability), "{model} should have {capability}");
            }
        }
    }

    #[test]
    fn test_resolve_exact_buckets() {
        let map = default_capability_map();

        let gpt4 = resolve("gpt-4", &map);
        assert!(gpt4.chat_completion);
        assert!(!gpt4.completion);
        assert!(!gpt4.embeddings);

        let instruct = resolve("gpt-3.5-turbo-instruct", &map);
        assert!(instruct.completion);
        assert!(!instruct.chat_completion);

        let ada = resolve("text-embedding-ada-002", &map);
        assert!(ada.embeddings);
        assert!(!ada.chat_completion);
    }

    #[test]
    fn test_resolve_unknown_is_all_false() {
        let map = default_capability_map();
        assert!(resolve("llama-3-70b", &map).is_empty());
        // no substring matching
        assert!(resolve("gpt-4-turbo", &map).is_empty());
        assert!(resolve("gpt", &map).is_empty());
    }

    #[test]
    fn test_resolve_model_in_several_buckets() {
        let mut buckets = BTreeMap::new();
        buckets.insert(Capability::Completion, vec!["dual".to_string()]);
        buckets.insert(Capability::ChatCompletion, vec!["dual".to_string()]);
        let caps = resolve("dual", &CapabilityMap(buckets));
        assert!(caps.completion && caps.chat_completion);
        assert!(!caps.embeddings);
    }

    #[test]
    fn test_token_limit_lookup() {
        let mut limits = HashMap::new();
        limits.insert("gpt-4".to_string(), Some(8192));
        limits.insert("text-embedding-ada-002".to_string(), None);
        let table = TokenLimitTable(limits);

        assert_eq!(token_limit("gpt-4", &table), Some(8192));
        assert_eq!(token_limit("unknown-model", &table), Some(8096));
        assert_eq!(token_limit("text-embedding-ada-002", &table), None);
    }

    #[test]
    fn test_build_model_info() {
        let snapshot = CatalogSnapshot::defaults();
        let info = build_model_info("gpt-3.5-turbo-16k", &snapshot);
        assert_eq!(info.name, "gpt-3.5-turbo-16k");
        assert!(info.capabilities.chat_completion);
        assert_eq!(info.token_limit, Some(16_385));

        let ada = build_model_info("text-embedding-ada-002", &snapshot);
        assert!(ada.token_limit.is_none());
    }

    #[test]
    fn test_complete_settings_token_limits() {
        let mut settings: IntegrationSettings = serde_json::from_value(serde_json::json!({
            "api_token": "k",
            "models": [
                {"id": "gpt-4", "capabilities": {"chat_completion": true}},
                {"id": "my-finetune", "capabilities": {"chat_completion": true}},
                {"id": "text-embedding-ada-002"},
                {"id": "gpt-3.5-turbo", "token_limit": 1000},
                {"id": "gpt-4-32k", "token_limit": null}
            ]
        }))
        .unwrap();
        complete_settings(&mut settings, &CatalogSnapshot::defaults());

        let limits: Vec<_> = settings.models.iter().map(|m| m.token_limit).collect();
        assert_eq!(
            limits,
            vec![Some(8192), Some(DEFAULT_TOKEN_LIMIT), None, Some(1000), None]
        );
        assert!(settings.models[1].capabilities.chat_completion);
        assert!(settings.models[2].capabilities.embeddings);
    }

    #[test]
    fn test_complete_settings_capabilities_from_map() {
        let mut settings: IntegrationSettings = serde_json::from_value(serde_json::json!({
            "api_token": "k",
            "models": [{"id": "davinci-002"}, {"id": "llama-3-70b"}]
        }))
        .unwrap();
        complete_settings(&mut settings, &CatalogSnapshot::defaults());

        assert!(settings.models[0].capabilities.completion);
        assert!(!settings.models[0].capabilities.chat_completion);
        assert!(settings.models[1].capabilities.is_empty());
        assert_eq!(settings.models[1].token_limit, Some(DEFAULT_TOKEN_LIMIT));
    }
}
