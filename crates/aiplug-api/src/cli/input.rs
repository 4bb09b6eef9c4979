//! Request documents read by the CLI, and envelope output.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;

use aiplug_types::descriptor::Method;
use aiplug_types::llm::{ChatMessage, TokenCountData};
use aiplug_types::prompt::PromptStruct;
use aiplug_types::settings::SettingsOverrides;

use super::InputArgs;

// `settings` stays raw JSON in every request document: the adapter parses it
// and reports bad settings through the result envelope.

/// `{settings, overrides?, prompt}`
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub settings: serde_json::Value,
    #[serde(default)]
    pub overrides: SettingsOverrides,
    pub prompt: PromptStruct,
}

/// `{settings, body}`: an OpenAI-style request body.
#[derive(Debug, Deserialize)]
pub struct BodyRequest {
    pub settings: serde_json::Value,
    pub body: serde_json::Value,
}

/// `{settings, overrides?, method: {name, kwargs}}`
#[derive(Debug, Deserialize)]
pub struct MethodRequest {
    pub settings: serde_json::Value,
    #[serde(default)]
    pub overrides: SettingsOverrides,
    pub method: Method,
}

/// `{settings, overrides?, messages}` or `{settings, overrides?, text}`
#[derive(Debug, Deserialize)]
pub struct StreamRequest {
    pub settings: serde_json::Value,
    #[serde(default)]
    pub overrides: SettingsOverrides,
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub text: Option<String>,
}

impl StreamRequest {
    /// The streaming method for this request: chat when messages are given.
    pub fn method(&self, stream_id: String) -> Result<Method> {
        match (&self.messages, &self.text) {
            (Some(messages), None) => Ok(Method::ChatStream {
                messages: messages.clone(),
                stream_id,
            }),
            (None, Some(text)) => Ok(Method::LlmStream {
                text: text.clone(),
                stream_id,
            }),
            _ => bail!("stream request needs exactly one of `messages` or `text`"),
        }
    }
}

/// `{settings, overrides?, data}`
#[derive(Debug, Deserialize)]
pub struct CountRequest {
    pub settings: serde_json::Value,
    #[serde(default)]
    pub overrides: SettingsOverrides,
    pub data: TokenCountData,
}

/// `{settings, texts}` or `{settings, text}`
#[derive(Debug, Deserialize)]
pub struct EmbedRequest {
    pub settings: serde_json::Value,
    #[serde(default)]
    pub texts: Option<Vec<String>>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Read the request document named by `args` (stdin when absent or `-`).
pub async fn read_input(args: &InputArgs) -> Result<String> {
    match args.input.as_deref() {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

pub fn parse<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str(raw).context("invalid request document")
}

pub async fn read_json<T: DeserializeOwned>(args: &InputArgs) -> Result<T> {
    parse(&read_input(args).await?)
}

/// Print a result envelope; fails the command when `ok` is false.
pub fn emit<T: Serialize>(envelope: &T, ok: bool, json: bool) -> Result<()> {
    let rendered = if json {
        serde_json::to_string(envelope)?
    } else {
        serde_json::to_string_pretty(envelope)?
    };
    println!("{rendered}");

    if !ok {
        bail!("call failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_request_defaults_overrides() {
        let request: PredictRequest = parse(
            r#"{"settings": {"api_token": "k", "model_name": "gpt-4"}, "prompt": {"prompt": "hi"}}"#,
        )
        .unwrap();
        assert_eq!(request.overrides, SettingsOverrides::default());
        assert_eq!(request.prompt.prompt, "hi");
    }

    #[test]
    fn test_method_request_reads_tagged_method() {
        let request: MethodRequest = parse(
            r#"{
                "settings": {"api_token": "k", "model_name": "gpt-4"},
                "method": {"name": "embed_query", "kwargs": {"text": "q"}}
            }"#,
        )
        .unwrap();
        assert_eq!(request.method, Method::EmbedQuery { text: "q".into() });
    }

    #[test]
    fn test_stream_request_picks_method() {
        let chat: StreamRequest = parse(
            r#"{"settings": {"api_token": "k"}, "messages": [{"role": "user", "content": "hi"}]}"#,
        )
        .unwrap();
        assert!(matches!(chat.method("s1".into()).unwrap(), Method::ChatStream { stream_id, .. } if stream_id == "s1"));

        let text: StreamRequest = parse(r#"{"settings": {"api_token": "k"}, "text": "go"}"#).unwrap();
        assert_eq!(
            text.method("s2".into()).unwrap(),
            Method::LlmStream {
                text: "go".into(),
                stream_id: "s2".into()
            }
        );

        let neither: StreamRequest = parse(r#"{"settings": {"api_token": "k"}}"#).unwrap();
        assert!(neither.method("s3".into()).is_err());
    }

    #[test]
    fn test_malformed_settings_still_parse() {
        let request: PredictRequest = parse(
            r#"{"settings": {"model_name": "gpt-4", "temperature": "hot"}, "prompt": {"prompt": "hi"}}"#,
        )
        .unwrap();
        assert_eq!(request.settings["temperature"], "hot");
    }

    #[test]
    fn test_unknown_override_rejected() {
        let result = parse::<PredictRequest>(
            r#"{"settings": {"api_token": "k"}, "overrides": {"tempurature": 1}, "prompt": {}}"#,
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("req.json");
        tokio::fs::write(&path, r#"{"api_token": "k"}"#).await.unwrap();

        let raw = read_input(&InputArgs { input: Some(path) }).await.unwrap();
        assert_eq!(raw, r#"{"api_token": "k"}"#);
    }
}
