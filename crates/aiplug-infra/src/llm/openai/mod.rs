//! OpenAI [`ModelBackend`] implementation.
//!
//! One [`OpenAiBackend`] serves every integration: the key, base URL and
//! sampling values arrive with each call in [`ModelParams`], so it works
//! against api.openai.com and any OpenAI-compatible endpoint alike.
//!
//! Chat completions use [`async_openai`] for typed requests and built-in SSE
//! streaming. The legacy `/completions`, `/embeddings` and `/models`
//! endpoints are called with `reqwest`, streaming via `eventsource-stream`.

pub mod streaming;
pub mod types;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use eventsource_stream::Eventsource;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;

use aiplug_core::llm::backend::{ChunkStream, ModelBackend};
use aiplug_observe::genai_attrs;
use aiplug_types::descriptor::ModelParams;
use aiplug_types::llm::{ChatMessage, LlmError, MessageRole, TokenCountData};

use self::streaming::{map_chat_stream, map_completion_events};
use self::types::{
    CompletionRequestBody, CompletionResponseBody, EmbeddingRequestBody, EmbeddingResponseBody,
    ModelListBody,
};

/// Per-message overhead used by the token estimate (role and framing).
const MESSAGE_OVERHEAD_CHARS: usize = 10;

/// Backend for OpenAI and OpenAI-compatible APIs.
///
/// Does NOT derive Debug: per-call endpoints carry the API key.
pub struct OpenAiBackend {
    http: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new() -> Self {
        Self::with_http_client(reqwest::Client::new())
    }

    pub fn with_http_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Default for OpenAiBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Where and as whom a single call is made.
struct Endpoint {
    base_url: String,
    api_key: SecretString,
}

impl Endpoint {
    fn from_params(params: &ModelParams) -> Self {
        Self {
            base_url: params.base_url.trim_end_matches('/').to_string(),
            api_key: SecretString::from(params.api_key.expose().to_string()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn chat_client(&self) -> Client<OpenAIConfig> {
        let config = OpenAIConfig::new()
            .with_api_key(self.api_key.expose_secret())
            .with_api_base(&self.base_url);
        Client::with_config(config)
    }
}

impl OpenAiBackend {
    async fn post_json<T, R>(&self, endpoint: &Endpoint, path: &str, body: &T) -> Result<R, LlmError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self
            .http
            .post(endpoint.url(path))
            .bearer_auth(endpoint.api_key.expose_secret())
            .json(body);
        let response = send(request).await?;
        response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))
    }

    async fn get_json<R: DeserializeOwned>(&self, endpoint: &Endpoint, path: &str) -> Result<R, LlmError> {
        let request = self
            .http
            .get(endpoint.url(path))
            .bearer_auth(endpoint.api_key.expose_secret());
        let response = send(request).await?;
        response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))
    }
}

/// Send a request, turning non-2xx statuses into [`LlmError`]s.
async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, LlmError> {
    let response = request.send().await.map_err(|e| LlmError::Provider {
        message: format!("HTTP request failed: {e}"),
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after_ms = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| secs * 1000);
    let error_body = response.text().await.unwrap_or_default();
    Err(map_status(status.as_u16(), retry_after_ms, error_body))
}

/// Map an HTTP error status to an [`LlmError`].
fn map_status(status: u16, retry_after_ms: Option<u64>, body: String) -> LlmError {
    match status {
        400 | 404 | 422 => LlmError::InvalidRequest(format!("HTTP {status}: {body}")),
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited { retry_after_ms },
        503 | 529 => LlmError::Overloaded(body),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}

/// Convert platform messages to `async-openai` request messages.
///
/// Function messages carry no function name here, so they are sent as user
/// messages.
fn to_openai_messages(messages: &[ChatMessage]) -> Vec<ChatCompletionRequestMessage> {
    messages
        .iter()
        .map(|msg| match msg.role {
            MessageRole::System => {
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(msg.content.clone()),
                    name: None,
                })
            }
            MessageRole::User | MessageRole::Function => {
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
                    name: None,
                })
            }
            MessageRole::Assistant => {
                #[allow(deprecated)]
                ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                    content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                        msg.content.clone(),
                    )),
                    refusal: None,
                    name: None,
                    audio: None,
                    tool_calls: None,
                    function_call: None,
                })
            }
        })
        .collect()
}

/// Build a chat completion request from call parameters.
fn build_chat_request(
    params: &ModelParams,
    messages: &[ChatMessage],
    stream: bool,
) -> CreateChatCompletionRequest {
    CreateChatCompletionRequest {
        model: params.model.clone(),
        messages: to_openai_messages(messages),
        max_completion_tokens: params.max_tokens,
        temperature: params.temperature.map(|t| t as f32),
        top_p: params.top_p.map(|p| p as f32),
        stream: stream.then_some(true),
        ..Default::default()
    }
}

fn completion_body<'a>(params: &'a ModelParams, prompt: &'a str, stream: bool) -> CompletionRequestBody<'a> {
    CompletionRequestBody {
        model: &params.model,
        prompt,
        temperature: params.temperature.map(|t| t as f32),
        max_tokens: params.max_tokens,
        top_p: params.top_p.map(|p| p as f32),
        stream,
    }
}

/// Character-based estimate: ~4 chars per token.
fn estimate_tokens(data: &TokenCountData) -> u32 {
    let chars: usize = match data {
        TokenCountData::Text(text) => text.chars().count(),
        TokenCountData::Texts(texts) => texts.iter().map(|t| t.chars().count()).sum(),
        TokenCountData::Messages(messages) => messages
            .iter()
            .map(|m| m.content.chars().count() + MESSAGE_OVERHEAD_CHARS)
            .sum(),
    };
    u32::try_from(chars.div_ceil(4)).unwrap_or(u32::MAX)
}

impl ModelBackend for OpenAiBackend {
    fn name(&self) -> &str {
        genai_attrs::PROVIDER_OPENAI
    }

    #[tracing::instrument(
        name = "gen_ai.chat",
        skip_all,
        fields(
            gen_ai.operation.name = genai_attrs::OP_CHAT,
            gen_ai.provider.name = genai_attrs::PROVIDER_OPENAI,
            gen_ai.request.model = %params.model,
            gen_ai.request.max_tokens = ?params.max_tokens,
            gen_ai.request.temperature = ?params.temperature,
        )
    )]
    async fn chat(&self, params: &ModelParams, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let endpoint = Endpoint::from_params(params);
        let request = build_chat_request(params, messages, false);

        let response = endpoint
            .chat_client()
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                input_tokens = usage.prompt_tokens,
                output_tokens = usage.completion_tokens,
                "chat completion usage"
            );
        }

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    fn chat_stream(&self, params: ModelParams, messages: Vec<ChatMessage>) -> ChunkStream {
        let endpoint = Endpoint::from_params(&params);
        let request = build_chat_request(&params, &messages, true);
        tracing::debug!(model = %params.model, "opening chat stream");

        Box::pin(async_stream::try_stream! {
            let oai_stream = endpoint
                .chat_client()
                .chat()
                .create_stream(request)
                .await
                .map_err(map_openai_error)?;

            let mut inner = map_chat_stream(oai_stream);

            use futures_util::StreamExt;
            while let Some(chunk) = inner.next().await {
                yield chunk?;
            }
        })
    }

    #[tracing::instrument(
        name = "gen_ai.text_completion",
        skip_all,
        fields(
            gen_ai.operation.name = genai_attrs::OP_TEXT_COMPLETION,
            gen_ai.provider.name = genai_attrs::PROVIDER_OPENAI,
            gen_ai.request.model = %params.model,
            gen_ai.request.max_tokens = ?params.max_tokens,
            gen_ai.request.temperature = ?params.temperature,
        )
    )]
    async fn complete(&self, params: &ModelParams, prompt: &str) -> Result<String, LlmError> {
        let endpoint = Endpoint::from_params(params);
        let body: CompletionResponseBody = self
            .post_json(&endpoint, "completions", &completion_body(params, prompt, false))
            .await?;
        Ok(body.into_text())
    }

    fn complete_stream(&self, params: ModelParams, prompt: String) -> ChunkStream {
        let endpoint = Endpoint::from_params(&params);
        let http = self.http.clone();
        tracing::debug!(model = %params.model, "opening completion stream");

        Box::pin(async_stream::try_stream! {
            let request = http
                .post(endpoint.url("completions"))
                .bearer_auth(endpoint.api_key.expose_secret())
                .json(&completion_body(&params, &prompt, true));
            let response = send(request).await?;

            let mut inner = map_completion_events(response.bytes_stream().eventsource());

            use futures_util::StreamExt;
            while let Some(chunk) = inner.next().await {
                yield chunk?;
            }
        })
    }

    #[tracing::instrument(
        name = "gen_ai.embeddings",
        skip_all,
        fields(
            gen_ai.operation.name = genai_attrs::OP_EMBEDDINGS,
            gen_ai.provider.name = genai_attrs::PROVIDER_OPENAI,
            gen_ai.request.model = %params.model,
            inputs = texts.len(),
        )
    )]
    async fn embed(&self, params: &ModelParams, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let endpoint = Endpoint::from_params(params);
        let body: EmbeddingResponseBody = self
            .post_json(
                &endpoint,
                "embeddings",
                &EmbeddingRequestBody {
                    model: &params.model,
                    input: texts,
                },
            )
            .await?;

        let vectors = body.into_vectors();
        if vectors.len() != texts.len() {
            return Err(LlmError::Provider {
                message: format!(
                    "expected {} embeddings, provider returned {}",
                    texts.len(),
                    vectors.len()
                ),
            });
        }
        Ok(vectors)
    }

    #[tracing::instrument(skip_all, fields(gen_ai.provider.name = genai_attrs::PROVIDER_OPENAI))]
    async fn list_models(&self, params: &ModelParams) -> Result<Vec<String>, LlmError> {
        let endpoint = Endpoint::from_params(params);
        let body: ModelListBody = self.get_json(&endpoint, "models").await?;

        let mut ids: Vec<String> = body.data.into_iter().map(|m| m.id).collect();
        ids.sort();
        Ok(ids)
    }

    async fn count_tokens(&self, _params: &ModelParams, data: &TokenCountData) -> Result<u32, LlmError> {
        Ok(estimate_tokens(data))
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
                || api_err.message.contains("Invalid API key")
            {
                LlmError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                LlmError::RateLimited {
                    retry_after_ms: None,
                }
            } else if code == "context_length_exceeded"
                || code == "model_not_found"
                || error_type == "invalid_request_error"
            {
                LlmError::InvalidRequest(api_err.message.clone())
            } else if code == "server_error" || error_type == "overloaded_error" {
                LlmError::Overloaded(api_err.message.clone())
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status() {
            Some(status) => map_status(status.as_u16(), None, err.to_string()),
            None => LlmError::Provider {
                message: err.to_string(),
            },
        },
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::StreamError(stream_err) => LlmError::Stream(stream_err.to_string()),
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}
