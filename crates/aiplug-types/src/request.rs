//! Provider-native request bodies accepted by the adapter.
//!
//! Bodies are strict: unknown fields fail deserialization and string fields
//! never coerce from numbers. Range constraints are declared with
//! `validator` and checked by `aiplug_core::validation`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::llm::MessageRole;

const TEMPERATURE_MIN: f64 = 0.0;
const TEMPERATURE_MAX: f64 = 2.0;
const TOP_P_MIN: f64 = 0.0;
const TOP_P_MAX: f64 = 1.0;
const PENALTY_MIN: f64 = -2.0;
const PENALTY_MAX: f64 = 2.0;

/// Maximum number of stop sequences.
pub const MAX_STOP_SEQUENCES: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestMessage {
    pub role: MessageRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: String,
}

/// `function_call` is either a mode string ("auto", "none") or `{"name": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FunctionCallMode {
    Mode(String),
    Named(HashMap<String, String>),
}

/// A single stop sequence or a short list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stop {
    Single(String),
    Many(Vec<String>),
}

/// A single prompt or a batch of prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptInput {
    Single(String),
    Many(Vec<String>),
}

fn validate_stop(stop: &Stop) -> Result<(), ValidationError> {
    match stop {
        Stop::Many(items) if items.len() > MAX_STOP_SEQUENCES => {
            let mut err = ValidationError::new("stop_too_long");
            err.message = Some(
                format!("at most {MAX_STOP_SEQUENCES} stop sequences are allowed").into(),
            );
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Fails when no model is known (after the `deployment_id` alias was applied).
pub fn require_model(model: &Option<String>) -> Result<(), ValidationError> {
    match model.as_deref() {
        Some(m) if !m.is_empty() => Ok(()),
        _ => {
            let mut err = ValidationError::new("model_required");
            err.message = Some("model (or deployment_id) is required".into());
            Err(err)
        }
    }
}

/// Chat completion request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ChatCompletionRequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Legacy alias for `model`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,
    pub messages: Vec<RequestMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<FunctionSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCallMode>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = TEMPERATURE_MIN, max = TEMPERATURE_MAX))]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = TOP_P_MIN, max = TOP_P_MAX))]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 128))]
    pub n: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_stop"))]
    pub stop: Option<Stop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = PENALTY_MIN, max = PENALTY_MAX))]
    pub presence_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = PENALTY_MIN, max = PENALTY_MAX))]
    pub frequency_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<HashMap<i64, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Legacy text completion request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CompletionRequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Legacy alias for `model`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<PromptInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = TEMPERATURE_MIN, max = TEMPERATURE_MAX))]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = TOP_P_MIN, max = TOP_P_MAX))]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<HashMap<i64, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 128))]
    pub n: Option<u32>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub echo: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_stop"))]
    pub stop: Option<Stop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = PENALTY_MIN, max = PENALTY_MAX))]
    pub presence_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = PENALTY_MIN, max = PENALTY_MAX))]
    pub frequency_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_of: Option<i32>,
}

/// Bodies that carry the `model` / `deployment_id` pair.
pub trait DeploymentAlias {
    fn model_mut(&mut self) -> &mut Option<String>;

    fn deployment_id(&self) -> Option<&str>;

    /// Fill an absent or empty `model` from `deployment_id`.
    fn apply_deployment_alias(&mut self) {
        let alias = self.deployment_id().map(str::to_owned);
        let model = self.model_mut();
        if model.as_deref().is_none_or(str::is_empty) {
            *model = alias;
        }
    }
}

impl DeploymentAlias for ChatCompletionRequestBody {
    fn model_mut(&mut self) -> &mut Option<String> {
        &mut self.model
    }

    fn deployment_id(&self) -> Option<&str> {
        self.deployment_id.as_deref()
    }
}

impl DeploymentAlias for CompletionRequestBody {
    fn model_mut(&mut self) -> &mut Option<String> {
        &mut self.model
    }

    fn deployment_id(&self) -> Option<&str> {
        self.deployment_id.as_deref()
    }
}
