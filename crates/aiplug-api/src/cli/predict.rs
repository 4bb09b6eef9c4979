//! Prompt and OpenAI-style body commands: predict, chat-completion,
//! completion, parse-settings.

use anyhow::Result;

use super::input::{BodyRequest, PredictRequest, emit, read_input, read_json};
use super::{InputArgs, PredictPath};
use crate::state::AppState;

pub async fn predict(state: &AppState, input: &InputArgs, path: PredictPath, json: bool) -> Result<()> {
    let PredictRequest {
        settings,
        overrides,
        prompt,
    } = read_json(input).await?;

    let adapter = &state.adapter;
    let result = match path {
        PredictPath::Auto => adapter.predict(settings, overrides, prompt).await,
        PredictPath::Chat => adapter.predict_chat(settings, overrides, prompt).await,
        PredictPath::Text => adapter.predict_text(settings, overrides, prompt).await,
    };
    emit(&result, result.ok, json)
}

pub async fn chat_completion(state: &AppState, input: &InputArgs, json: bool) -> Result<()> {
    let BodyRequest { settings, body } = read_json(input).await?;
    let result = state.adapter.chat_completion(settings, body).await;
    emit(&result, result.ok, json)
}

pub async fn completion(state: &AppState, input: &InputArgs, json: bool) -> Result<()> {
    let BodyRequest { settings, body } = read_json(input).await?;
    let result = state.adapter.completion(settings, body).await;
    emit(&result, result.ok, json)
}

/// Settings arrive as raw JSON: shape errors belong in the envelope.
pub async fn parse_settings(state: &AppState, input: &InputArgs, json: bool) -> Result<()> {
    let raw = read_input(input).await?;
    let value: serde_json::Value = super::input::parse(&raw)?;
    let result = state.adapter.parse_settings(value).await;
    emit(&result, result.ok, json)
}
