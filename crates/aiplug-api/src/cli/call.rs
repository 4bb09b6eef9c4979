//! Descriptor-based commands: describe, execute, call, stream, and the
//! typed shortcuts built on them.

use anyhow::{Result, bail};

use aiplug_types::descriptor::CallDescriptor;

use super::InputArgs;
use super::input::{CountRequest, EmbedRequest, MethodRequest, StreamRequest, emit, read_json};
use crate::state::AppState;

pub async fn check_connection(state: &AppState, input: &InputArgs, json: bool) -> Result<()> {
    let settings: serde_json::Value = read_json(input).await?;
    let result = state.adapter.check_connection(settings).await;
    emit(&result, result.ok, json)
}

pub async fn describe(state: &AppState, input: &InputArgs, json: bool) -> Result<()> {
    let MethodRequest {
        settings,
        overrides,
        method,
    } = read_json(input).await?;
    let result = state.adapter.describe(settings, overrides, method).await;
    emit(&result, result.ok, json)
}

pub async fn execute(state: &AppState, input: &InputArgs, json: bool) -> Result<()> {
    let descriptor: CallDescriptor = read_json(input).await?;
    tracing::debug!(method = descriptor.method.name(), target = %descriptor.target, "executing descriptor");
    let result = state.adapter.execute(&descriptor).await;
    emit(&result, result.ok, json)
}

pub async fn call(state: &AppState, input: &InputArgs, json: bool) -> Result<()> {
    let MethodRequest {
        settings,
        overrides,
        method,
    } = read_json(input).await?;
    let result = state.adapter.call(settings, overrides, method).await;
    emit(&result, result.ok, json)
}

/// Stream events go to stdout as they arrive; the final envelope is printed
/// in `--json` mode, or in text mode only when the call failed.
pub async fn stream(
    state: &AppState,
    input: &InputArgs,
    stream_id: Option<String>,
    json: bool,
) -> Result<()> {
    let request: StreamRequest = read_json(input).await?;
    let stream_id = stream_id.unwrap_or_else(|| uuid::Uuid::now_v7().to_string());
    let method = request.method(stream_id)?;

    let result = state
        .adapter
        .call(request.settings, request.overrides, method)
        .await;

    if json || !result.ok {
        emit(&result, result.ok, json)
    } else {
        Ok(())
    }
}

pub async fn count_tokens(state: &AppState, input: &InputArgs, json: bool) -> Result<()> {
    let CountRequest {
        settings,
        overrides,
        data,
    } = read_json(input).await?;
    let result = state.adapter.count_tokens(settings, overrides, data).await;
    emit(&result, result.ok, json)
}

pub async fn embed(state: &AppState, input: &InputArgs, json: bool) -> Result<()> {
    let EmbedRequest {
        settings,
        texts,
        text,
    } = read_json(input).await?;

    match (texts, text) {
        (Some(texts), None) => {
            let result = state.adapter.embed_documents(settings, texts).await;
            emit(&result, result.ok, json)
        }
        (None, Some(text)) => {
            let result = state.adapter.embed_query(settings, text).await;
            emit(&result, result.ok, json)
        }
        _ => bail!("embed request needs exactly one of `texts` or `text`"),
    }
}

pub async fn indexer_config(state: &AppState, input: &InputArgs, model: &str, json: bool) -> Result<()> {
    let settings: serde_json::Value = read_json(input).await?;
    let result = state.adapter.indexer_config(settings, model).await;
    emit(&result, result.ok, json)
}

