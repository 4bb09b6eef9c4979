//! Integration settings and their ingress normalization.
//!
//! The platform hands settings over in several shapes depending on the call
//! site. [`SettingsEnvelope`] accepts all of them and converts to a single
//! [`RequestContext`]; nothing past ingress sees the raw shapes.

use serde::{Deserialize, Serialize};

use crate::model::ModelInfo;
use crate::secret::{ProjectId, SecretField};

/// Stored configuration of one OpenAI integration.
///
/// Sampling parameters have no defaults here: an absent value stays absent
/// all the way into the provider call parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationSettings {
    pub api_token: SecretField,
    #[serde(default)]
    pub model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

impl IntegrationSettings {
    /// Look up a configured model by name, falling back to id.
    pub fn model_info(&self, model: &str) -> Option<&ModelInfo> {
        self.models
            .iter()
            .find(|m| m.name == model)
            .or_else(|| self.models.iter().find(|m| m.id == model))
    }

    /// Info for the currently selected `model_name`, if it is configured.
    pub fn selected_model(&self) -> Option<&ModelInfo> {
        self.model_info(&self.model_name)
    }
}

/// Per-request overrides layered over stored settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

/// Settings plus the project the request runs under.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub settings: IntegrationSettings,
    pub project: Option<ProjectId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntegrationRef {
    #[serde(default)]
    pub project_id: Option<ProjectId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationData {
    pub settings: IntegrationSettings,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
}

/// Every settings shape accepted at the boundary.
///
/// The shape is picked by its distinguishing key rather than by trial, so a
/// malformed field reports its own error instead of a generic mismatch.
#[derive(Debug, Clone)]
pub enum SettingsEnvelope {
    /// `{merged_settings: {...}, integration: {project_id}}`
    Merged {
        merged_settings: IntegrationSettings,
        integration: Option<IntegrationRef>,
    },
    /// `{integration_data: {settings: {...}}, model_name}` (embedding calls)
    IntegrationData {
        integration_data: IntegrationData,
        model_name: Option<String>,
    },
    /// `{settings: {...}, project_id}` (indexer calls)
    Nested {
        settings: IntegrationSettings,
        project_id: Option<ProjectId>,
    },
    /// Plain settings object.
    Bare(IntegrationSettings),
}

#[derive(Deserialize)]
struct MergedShape {
    merged_settings: IntegrationSettings,
    #[serde(default)]
    integration: Option<IntegrationRef>,
}

#[derive(Deserialize)]
struct IntegrationDataShape {
    integration_data: IntegrationData,
    #[serde(default)]
    model_name: Option<String>,
}

#[derive(Deserialize)]
struct NestedShape {
    settings: IntegrationSettings,
    #[serde(default)]
    project_id: Option<ProjectId>,
}

impl<'de> Deserialize<'de> for SettingsEnvelope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        SettingsEnvelope::from_value(value).map_err(serde::de::Error::custom)
    }
}

impl SettingsEnvelope {
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let shape = ["merged_settings", "integration_data", "settings"]
            .into_iter()
            .find(|key| value.get(key).is_some());

        Ok(match shape {
            Some("merged_settings") => {
                let MergedShape {
                    merged_settings,
                    integration,
                } = serde_json::from_value(value)?;
                SettingsEnvelope::Merged {
                    merged_settings,
                    integration,
                }
            }
            Some("integration_data") => {
                let IntegrationDataShape {
                    integration_data,
                    model_name,
                } = serde_json::from_value(value)?;
                SettingsEnvelope::IntegrationData {
                    integration_data,
                    model_name,
                }
            }
            Some(_) => {
                let NestedShape {
                    settings,
                    project_id,
                } = serde_json::from_value(value)?;
                SettingsEnvelope::Nested {
                    settings,
                    project_id,
                }
            }
            None => SettingsEnvelope::Bare(serde_json::from_value(value)?),
        })
    }

    pub fn into_context(self) -> RequestContext {
        match self {
            SettingsEnvelope::Merged {
                merged_settings,
                integration,
            } => RequestContext {
                settings: merged_settings,
                project: integration.and_then(|i| i.project_id),
            },
            SettingsEnvelope::IntegrationData {
                integration_data,
                model_name,
            } => {
                let mut settings = integration_data.settings;
                if let Some(name) = model_name.filter(|n| !n.is_empty()) {
                    settings.model_name = name;
                }
                RequestContext {
                    settings,
                    project: integration_data.project_id,
                }
            }
            SettingsEnvelope::Nested {
                settings,
                project_id,
            } => RequestContext {
                settings,
                project: project_id,
            },
            SettingsEnvelope::Bare(settings) => RequestContext {
                settings,
                project: None,
            },
        }
    }
}

impl From<SettingsEnvelope> for RequestContext {
    fn from(envelope: SettingsEnvelope) -> Self {
        envelope.into_context()
    }
}
