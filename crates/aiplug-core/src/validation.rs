//! Strict validation of provider-native request bodies.
//!
//! Parsing enforces the shape (unknown fields, role names, strict strings);
//! `validator` then enforces ranges and the stop-sequence limit.

use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use aiplug_types::error::AdapterError;
use aiplug_types::request::{
    ChatCompletionRequestBody, CompletionRequestBody, DeploymentAlias, require_model,
};

fn parse_body<T>(value: serde_json::Value) -> Result<T, AdapterError>
where
    T: DeserializeOwned + Validate + DeploymentAlias,
{
    let mut body: T =
        serde_json::from_value(value).map_err(|e| AdapterError::Validation(e.to_string()))?;

    body.apply_deployment_alias();
    require_model(body.model_mut()).map_err(|e| {
        AdapterError::Validation(
            e.message
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string()),
        )
    })?;

    body.validate().map_err(|e| AdapterError::Validation(describe(&e)))?;
    Ok(body)
}

/// Flatten field errors into `field: message` pairs, sorted by field.
fn describe(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => format!("{field}: {message}"),
                None => format!("{field}: {}", err.code),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

/// Validate a chat completion body.
pub fn validate_chat_body(
    value: serde_json::Value,
) -> Result<ChatCompletionRequestBody, AdapterError> {
    parse_body(value)
}

/// Validate a legacy completion body.
pub fn validate_completion_body(
    value: serde_json::Value,
) -> Result<CompletionRequestBody, AdapterError> {
    parse_body(value)
}
