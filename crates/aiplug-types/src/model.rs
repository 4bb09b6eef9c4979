//! Model catalog types: capabilities, per-model info, and the two reference
//! tables (capability map and token limits) read from the config store.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Token limit assumed for models missing from the token limit table.
pub const DEFAULT_TOKEN_LIMIT: u32 = 8096;

/// A call style a model can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Completion,
    ChatCompletion,
    Embeddings,
}

impl Capability {
    pub const ALL: [Capability; 3] = [
        Capability::Completion,
        Capability::ChatCompletion,
        Capability::Embeddings,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Completion => write!(f, "completion"),
            Capability::ChatCompletion => write!(f, "chat_completion"),
            Capability::Embeddings => write!(f, "embeddings"),
        }
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completion" => Ok(Capability::Completion),
            "chat_completion" => Ok(Capability::ChatCompletion),
            "embeddings" => Ok(Capability::Embeddings),
            other => Err(format!("invalid capability: '{other}'")),
        }
    }
}

/// Which call styles a model supports. The flags are independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub completion: bool,
    #[serde(default)]
    pub chat_completion: bool,
    #[serde(default)]
    pub embeddings: bool,
}

impl Capabilities {
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Completion => self.completion,
            Capability::ChatCompletion => self.chat_completion,
            Capability::Embeddings => self.embeddings,
        }
    }

    pub fn union(self, other: Capabilities) -> Capabilities {
        Capabilities {
            completion: self.completion || other.completion,
            chat_completion: self.chat_completion || other.chat_completion,
            embeddings: self.embeddings || other.embeddings,
        }
    }

    /// True when no bucket matched.
    pub fn is_empty(&self) -> bool {
        !(self.completion || self.chat_completion || self.embeddings)
    }
}

/// One entry of `IntegrationSettings::models`.
///
/// `token_limit` always serializes, so a recorded "no limit" goes out as an
/// explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawModelInfo")]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub capabilities: Capabilities,
    /// `None` means the limit is unknown (e.g. pure embedding models).
    pub token_limit: Option<u32>,
    /// False when the input carried no `token_limit` key at all and the
    /// value still has to come from the token limit table.
    #[serde(skip)]
    pub token_limit_set: bool,
}

impl ModelInfo {
    /// Fill whatever the input left out from catalog data.
    ///
    /// Capability flags are merged, so a flag set by either side holds. The
    /// catalog limit is only used when the input had no `token_limit` key.
    pub fn complete_from(&mut self, catalog: &ModelInfo) {
        self.capabilities = self.capabilities.union(catalog.capabilities);
        if !self.token_limit_set {
            self.token_limit = catalog.token_limit;
            self.token_limit_set = true;
        }
    }
}

#[derive(Deserialize)]
struct RawModelInfo {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    capabilities: Capabilities,
    /// Outer `None`: key absent. `Some(None)`: explicit `null`.
    #[serde(default, deserialize_with = "present")]
    token_limit: Option<Option<u32>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<u32>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<u32>::deserialize(deserializer).map(Some)
}

impl From<RawModelInfo> for ModelInfo {
    fn from(raw: RawModelInfo) -> Self {
        let name = raw
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| raw.id.clone());
        Self {
            id: raw.id,
            name,
            capabilities: raw.capabilities,
            token_limit: raw.token_limit.flatten(),
            token_limit_set: raw.token_limit.is_some(),
        }
    }
}

/// Capability name -> model ids supporting it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityMap(pub BTreeMap<Capability, Vec<String>>);

impl CapabilityMap {
    pub fn models_for(&self, capability: Capability) -> &[String] {
        self.0.get(&capability).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Model id -> token limit. An explicit `null` entry records an unknown limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenLimitTable(pub HashMap<String, Option<u32>>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_roundtrip() {
        for capability in Capability::ALL {
            let parsed: Capability = capability.to_string().parse().unwrap();
            assert_eq!(capability, parsed);
        }
    }

    #[test]
    fn test_capability_map_json_shape() {
        let json = r#"{"completion":["davinci-002"],"chat_completion":["gpt-4"],"embeddings":[]}"#;
        let map: CapabilityMap = serde_json::from_str(json).unwrap();
        assert_eq!(map.models_for(Capability::ChatCompletion), ["gpt-4".to_string()]);
        assert!(map.models_for(Capability::Embeddings).is_empty());
    }

    #[test]
    fn test_token_limit_table_keeps_null() {
        let table: TokenLimitTable =
            serde_json::from_str(r#"{"gpt-4":8192,"text-embedding-ada-002":null}"#).unwrap();
        assert_eq!(table.0.get("gpt-4"), Some(&Some(8192)));
        assert_eq!(table.0.get("text-embedding-ada-002"), Some(&None));
    }

    #[test]
    fn test_model_info_name_defaults_to_id() {
        let info: ModelInfo = serde_json::from_str(r#"{"id":"gpt-4"}"#).unwrap();
        assert_eq!(info.name, "gpt-4");
        assert!(info.capabilities.is_empty());
        assert!(info.token_limit.is_none());
        assert!(!info.token_limit_set);
    }

    #[test]
    fn test_model_info_explicit_null_limit_is_kept() {
        let info: ModelInfo =
            serde_json::from_str(r#"{"id":"text-embedding-ada-002","token_limit":null}"#).unwrap();
        assert!(info.token_limit.is_none());
        assert!(info.token_limit_set);

        let sized: ModelInfo = serde_json::from_str(r#"{"id":"gpt-4","token_limit":8192}"#).unwrap();
        assert_eq!(sized.token_limit, Some(8192));
        assert!(sized.token_limit_set);
    }

    #[test]
    fn test_complete_from_catalog() {
        let catalog = ModelInfo {
            id: "gpt-4".into(),
            name: "gpt-4".into(),
            capabilities: Capabilities {
                chat_completion: true,
                ..Default::default()
            },
            token_limit: Some(8192),
            token_limit_set: true,
        };

        let mut bare: ModelInfo = serde_json::from_str(r#"{"id":"gpt-4"}"#).unwrap();
        bare.complete_from(&catalog);
        assert!(bare.capabilities.chat_completion);
        assert_eq!(bare.token_limit, Some(8192));

        let mut pinned: ModelInfo =
            serde_json::from_str(r#"{"id":"gpt-4","capabilities":{"completion":true},"token_limit":null}"#)
                .unwrap();
        pinned.complete_from(&catalog);
        assert!(pinned.capabilities.completion && pinned.capabilities.chat_completion);
        assert!(pinned.token_limit.is_none());
    }

    #[test]
    fn test_model_info_serializes_null_limit() {
        let info: ModelInfo =
            serde_json::from_str(r#"{"id":"text-embedding-ada-002","token_limit":null}"#).unwrap();
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["token_limit"], serde_json::Value::Null);
        assert!(value.as_object().unwrap().contains_key("token_limit"));
        assert!(!value.as_object().unwrap().contains_key("token_limit_set"));
    }

    #[test]
    fn test_capabilities_has() {
        let caps = Capabilities {
            chat_completion: true,
            ..Default::default()
        };
        assert!(caps.has(Capability::ChatCompletion));
        assert!(!caps.has(Capability::Completion));
        assert!(!caps.is_empty());
    }
}
