//! The adapter's platform-facing surface.
//!
//! Every public method answers with an envelope: failures of any kind
//! (settings, secrets, validation, provider) are logged and returned as
//! `{ok: false, error}`; nothing propagates past this boundary.
//!
//! Settings arrive as raw JSON and are normalized here, once per request:
//! the envelope shape is unwrapped and every configured model is completed
//! from the catalog snapshot before any dispatch decision is made.

use aiplug_types::config::AdapterConfig;
use aiplug_types::descriptor::{CallDescriptor, IndexerConfig, Method};
use aiplug_types::error::AdapterError;
use aiplug_types::llm::{ChatMessage, TokenCountData};
use aiplug_types::prompt::PromptStruct;
use aiplug_types::request::{PromptInput, RequestMessage};
use aiplug_types::result::{DispatchOutput, ItemResult, RpcResult, StructuredResult};
use aiplug_types::settings::{IntegrationSettings, RequestContext, SettingsEnvelope, SettingsOverrides};
use serde_json::Value;

use crate::dispatch::descriptor::DescriptorFactory;
use crate::dispatch::executor::Executor;
use crate::dispatch::predict::{CallPath, PreparedInput, select_path};
use crate::llm::backend::ModelBackend;
use crate::llm::models::{ChatModel, CompletionModel};
use crate::llm::stream::StreamSink;
use crate::model::catalog::CatalogSource;
use crate::model::resolver::complete_settings;
use crate::prompt::prepare_result;
use crate::service::secret::SecretService;
use crate::settings::merge::{merge, resolve_model_name};
use crate::validation::{validate_chat_body, validate_completion_body};

/// Adapter service wiring secrets, catalog, backend and stream sink together.
pub struct AdapterService<C, B, S> {
    secrets: SecretService,
    catalog: C,
    backend: B,
    sink: S,
    config: AdapterConfig,
}

impl<C, B, S> AdapterService<C, B, S>
where
    C: CatalogSource,
    B: ModelBackend,
    S: StreamSink,
{
    pub fn new(secrets: SecretService, catalog: C, backend: B, sink: S, config: AdapterConfig) -> Self {
        Self {
            secrets,
            catalog,
            backend,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn secrets(&self) -> &SecretService {
        &self.secrets
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    fn descriptors(&self) -> DescriptorFactory<'_> {
        DescriptorFactory::new(&self.secrets, &self.config)
    }

    /// Unwrap the settings envelope and complete its models from the catalog.
    async fn context(&self, settings: Value) -> Result<RequestContext, AdapterError> {
        let envelope = SettingsEnvelope::from_value(settings)
            .map_err(|e| AdapterError::Configuration(format!("invalid settings: {e}")))?;
        let mut ctx = envelope.into_context();
        let snapshot = self.catalog.load().await?;
        complete_settings(&mut ctx.settings, &snapshot);
        Ok(ctx)
    }

    fn finish<T>(operation: &str, result: Result<T, AdapterError>) -> RpcResult<T> {
        match result {
            Ok(value) => RpcResult::success(value),
            Err(err) => {
                tracing::error!(operation, error = %err, "adapter call failed");
                RpcResult::failure(err.to_string())
            }
        }
    }

    /// Run a prompt through the path the model's capabilities select.
    pub async fn predict(
        &self,
        settings: Value,
        overrides: SettingsOverrides,
        prompt: PromptStruct,
    ) -> RpcResult<StructuredResult> {
        Self::finish("predict", self.try_predict(settings, &overrides, &prompt, None).await)
    }

    /// Run a prompt through the chat path regardless of capabilities.
    pub async fn predict_chat(
        &self,
        settings: Value,
        overrides: SettingsOverrides,
        prompt: PromptStruct,
    ) -> RpcResult<StructuredResult> {
        let result = self
            .try_predict(settings, &overrides, &prompt, Some(CallPath::Chat))
            .await;
        Self::finish("predict_chat", result)
    }

    /// Run a prompt through the legacy text path regardless of capabilities.
    pub async fn predict_text(
        &self,
        settings: Value,
        overrides: SettingsOverrides,
        prompt: PromptStruct,
    ) -> RpcResult<StructuredResult> {
        let result = self
            .try_predict(settings, &overrides, &prompt, Some(CallPath::Completion))
            .await;
        Self::finish("predict_text", result)
    }

    #[tracing::instrument(skip_all)]
    async fn try_predict(
        &self,
        settings: Value,
        overrides: &SettingsOverrides,
        prompt: &PromptStruct,
        forced: Option<CallPath>,
    ) -> Result<StructuredResult, AdapterError> {
        let ctx = self.context(settings).await?;
        let model = resolve_model_name(&ctx.settings, overrides)?;
        let path = match forced {
            Some(path) => path,
            None => select_path(&ctx.settings, &model)?,
        };
        tracing::debug!(%model, %path, "selected call path");

        let params = merge(
            &ctx.settings,
            overrides,
            &self.secrets,
            ctx.project,
            &self.config.default_api_base,
            false,
        )
        .await?;

        let content = match PreparedInput::for_path(path, prompt) {
            PreparedInput::Messages(messages) => {
                ChatModel::new(&self.backend, params).invoke(&messages).await?
            }
            PreparedInput::Text(text) => {
                CompletionModel::new(&self.backend, params).invoke(&text).await?
            }
        };

        Ok(prepare_result(content))
    }

    /// Validate a chat completion body and run it.
    pub async fn chat_completion(
        &self,
        settings: Value,
        body: Value,
    ) -> RpcResult<StructuredResult> {
        Self::finish("chat_completion", self.try_chat_completion(settings, body).await)
    }

    async fn try_chat_completion(&self, settings: Value, body: Value) -> Result<StructuredResult, AdapterError> {
        let ctx = self.context(settings).await?;
        let body = validate_chat_body(body)?;
        let overrides = SettingsOverrides {
            model_name: body.model.clone(),
            temperature: body.temperature,
            max_tokens: body.max_tokens,
            top_p: body.top_p,
        };
        let messages: Vec<ChatMessage> = body.messages.iter().map(to_chat_message).collect();

        let params = merge(
            &ctx.settings,
            &overrides,
            &self.secrets,
            ctx.project,
            &self.config.default_api_base,
            false,
        )
        .await?;
        let content = self.backend.chat(&params, &messages).await?;
        Ok(prepare_result(content))
    }

    /// Validate a legacy completion body and run it.
    pub async fn completion(
        &self,
        settings: Value,
        body: Value,
    ) -> RpcResult<StructuredResult> {
        Self::finish("completion", self.try_completion(settings, body).await)
    }

    async fn try_completion(&self, settings: Value, body: Value) -> Result<StructuredResult, AdapterError> {
        let ctx = self.context(settings).await?;
        let body = validate_completion_body(body)?;
        let text = match body.prompt {
            None => String::new(),
            Some(PromptInput::Single(text)) => text,
            Some(PromptInput::Many(mut texts)) if texts.len() == 1 => texts.remove(0),
            Some(PromptInput::Many(_)) => {
                return Err(AdapterError::Validation(
                    "batched prompts are not supported".to_string(),
                ));
            }
        };
        let overrides = SettingsOverrides {
            model_name: body.model.clone(),
            temperature: body.temperature,
            max_tokens: body.max_tokens,
            top_p: body.top_p,
        };

        let params = merge(
            &ctx.settings,
            &overrides,
            &self.secrets,
            ctx.project,
            &self.config.default_api_base,
            false,
        )
        .await?;
        let content = self.backend.complete(&params, &text).await?;
        Ok(prepare_result(content))
    }

    /// Validate settings and fill in catalog data for their models.
    ///
    /// Configured models are completed from the catalog; with no models
    /// configured at all, the selected model is added.
    pub async fn parse_settings(&self, settings: Value) -> ItemResult<IntegrationSettings> {
        match self.try_parse_settings(settings).await {
            Ok(item) => ItemResult::success(item),
            Err(err) => {
                tracing::error!(operation = "parse_settings", error = %err, "adapter call failed");
                ItemResult::failure(err.to_string())
            }
        }
    }

    async fn try_parse_settings(
        &self,
        settings: Value,
    ) -> Result<IntegrationSettings, AdapterError> {
        let mut settings: IntegrationSettings =
            serde_json::from_value(settings).map_err(|e| AdapterError::Validation(e.to_string()))?;
        let snapshot = self.catalog.load().await?;
        complete_settings(&mut settings, &snapshot);

        if settings.models.is_empty() && !settings.model_name.is_empty() {
            settings.models.push(snapshot.model_info(&settings.model_name));
        }

        Ok(settings)
    }

    /// List provider models with the resolved key.
    pub async fn check_connection(&self, settings: Value) -> RpcResult<DispatchOutput> {
        let overrides = SettingsOverrides::default();
        let result = self.call_method(settings, &overrides, Method::CheckSettings);
        Self::finish("check_connection", result.await)
    }

    /// Build the call descriptor for `method` without executing it.
    pub async fn describe(
        &self,
        settings: Value,
        overrides: SettingsOverrides,
        method: Method,
    ) -> RpcResult<CallDescriptor> {
        let operation = method.name();
        let result = match self.context(settings).await {
            Ok(ctx) => self.try_describe(&ctx, &overrides, method).await,
            Err(err) => Err(err),
        };
        Self::finish(operation, result)
    }

    async fn try_describe(
        &self,
        ctx: &RequestContext,
        overrides: &SettingsOverrides,
        method: Method,
    ) -> Result<CallDescriptor, AdapterError> {
        let factory = self.descriptors();
        match method {
            Method::CheckSettings => factory.check_settings(ctx).await,
            Method::GetModels => factory.get_models(ctx).await,
            Method::CountTokens { data } => factory.count_tokens(ctx, overrides, data).await,
            Method::LlmInvoke { text } => factory.llm_invoke(ctx, overrides, text).await,
            Method::LlmStream { text, stream_id } => {
                factory.llm_stream(ctx, overrides, text, stream_id).await
            }
            Method::ChatInvoke { messages } => factory.chat_invoke(ctx, overrides, messages).await,
            Method::ChatStream {
                messages,
                stream_id,
            } => factory.chat_stream(ctx, overrides, messages, stream_id).await,
            Method::EmbedDocuments { texts } => factory.embed_documents(ctx, texts).await,
            Method::EmbedQuery { text } => factory.embed_query(ctx, text).await,
        }
    }

    async fn run(&self, descriptor: &CallDescriptor) -> Result<DispatchOutput, AdapterError> {
        Executor::new(&self.backend, &self.sink).execute(descriptor).await
    }

    /// Execute a descriptor built elsewhere.
    pub async fn execute(&self, descriptor: &CallDescriptor) -> RpcResult<DispatchOutput> {
        Self::finish(descriptor.method.name(), self.run(descriptor).await)
    }

    /// Build and execute in one step.
    pub async fn call(
        &self,
        settings: Value,
        overrides: SettingsOverrides,
        method: Method,
    ) -> RpcResult<DispatchOutput> {
        let operation = method.name();
        Self::finish(operation, self.call_method(settings, &overrides, method).await)
    }

    async fn call_method(
        &self,
        settings: Value,
        overrides: &SettingsOverrides,
        method: Method,
    ) -> Result<DispatchOutput, AdapterError> {
        let ctx = self.context(settings).await?;
        let descriptor = self.try_describe(&ctx, overrides, method).await?;
        self.run(&descriptor).await
    }

    /// Token count for `data` as a bare number.
    pub async fn count_tokens(
        &self,
        settings: Value,
        overrides: SettingsOverrides,
        data: TokenCountData,
    ) -> RpcResult<u32> {
        let output = self.call(settings, overrides, Method::CountTokens { data }).await;
        unwrap_output(output, |out| match out {
            DispatchOutput::TokenCount(count) => Some(count),
            _ => None,
        })
    }

    /// One embedding vector per document.
    pub async fn embed_documents(
        &self,
        settings: Value,
        texts: Vec<String>,
    ) -> RpcResult<Vec<Vec<f32>>> {
        let output = self
            .call(settings, SettingsOverrides::default(), Method::EmbedDocuments { texts })
            .await;
        unwrap_output(output, |out| match out {
            DispatchOutput::Embeddings(vectors) => Some(vectors),
            _ => None,
        })
    }

    /// Embedding vector of a single query.
    pub async fn embed_query(&self, settings: Value, text: String) -> RpcResult<Vec<f32>> {
        let output = self
            .call(settings, SettingsOverrides::default(), Method::EmbedQuery { text })
            .await;
        unwrap_output(output, |out| match out {
            DispatchOutput::Embedding(vector) => Some(vector),
            _ => None,
        })
    }

    /// Model configuration for the document indexer.
    pub async fn indexer_config(&self, settings: Value, model: &str) -> RpcResult<IndexerConfig> {
        let result = match self.context(settings).await {
            Ok(ctx) => self.descriptors().indexer_config(&ctx, model).await,
            Err(err) => Err(err),
        };
        Self::finish("indexer_config", result)
    }
}

fn to_chat_message(message: &RequestMessage) -> ChatMessage {
    ChatMessage::new(message.role, message.content.clone().unwrap_or_default())
}

fn unwrap_output<T>(
    output: RpcResult<DispatchOutput>,
    pick: impl FnOnce(DispatchOutput) -> Option<T>,
) -> RpcResult<T> {
    match (output.response, output.error) {
        (Some(response), _) => match pick(response) {
            Some(value) => RpcResult::success(value),
            None => RpcResult::failure("unexpected output shape for this call"),
        },
        (None, Some(error)) => RpcResult::failure(error),
        (None, None) => RpcResult::failure("call produced no output"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use aiplug_types::descriptor::TargetModel;
    use aiplug_types::error::RepositoryError;
    use aiplug_types::llm::MessageRole;
    use aiplug_types::prompt::Example;
    use serde_json::json;

    use crate::llm::mock::{Call, MockBackend};
    use crate::llm::stream::tests::RecordingSink;
    use crate::model::catalog::CatalogSnapshot;

    struct DefaultCatalog;

    impl CatalogSource for DefaultCatalog {
        async fn load(&self) -> Result<Arc<CatalogSnapshot>, RepositoryError> {
            Ok(Arc::new(CatalogSnapshot::defaults()))
        }
    }

    type TestService = AdapterService<DefaultCatalog, MockBackend, RecordingSink>;

    fn service_with(backend: MockBackend) -> TestService {
        AdapterService::new(
            SecretService::new(Vec::new()),
            DefaultCatalog,
            backend,
            RecordingSink::default(),
            AdapterConfig::default(),
        )
    }

    fn envelope(model: &str) -> Value {
        json!({
            "merged_settings": {
                "api_token": "sk-test",
                "model_name": model,
                "models": [
                    {"id": "gpt-4", "capabilities": {"chat_completion": true}},
                    {"id": "davinci-002", "capabilities": {"completion": true}},
                    {"id": "text-embedding-ada-002", "capabilities": {"embeddings": true}}
                ]
            },
            "integration": {"project_id": 12}
        })
    }

    fn prompt() -> PromptStruct {
        PromptStruct {
            context: "C".into(),
            examples: vec![Example {
                input: "a".into(),
                output: "b".into(),
            }],
            prompt: "p".into(),
        }
    }

    #[tokio::test]
    async fn test_predict_chat_model_uses_messages() {
        let service = service_with(MockBackend::new());
        let result = service
            .predict(envelope("gpt-4"), SettingsOverrides::default(), prompt())
            .await;
        assert!(result.ok);
        assert_eq!(
            result.response.unwrap(),
            StructuredResult::text("chat reply (4 messages)")
        );

        match &service.backend.calls()[..] {
            [Call::Chat { messages, .. }] => {
                assert_eq!(messages[0], ChatMessage::new(MessageRole::System, "C"));
                assert_eq!(messages[3], ChatMessage::new(MessageRole::User, "p"));
            }
            other => panic!("unexpected calls: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_predict_completion_model_uses_text() {
        let service = service_with(MockBackend::new());
        let result = service
            .predict(envelope("davinci-002"), SettingsOverrides::default(), prompt())
            .await;
        assert!(result.ok);

        match &service.backend.calls()[..] {
            [Call::Complete { prompt, params }] => {
                assert_eq!(prompt, "C\ninput: a\noutput: b\ninput: p\noutput: ");
                assert_eq!(params.model, "davinci-002");
                assert!(!params.streaming);
            }
            other => panic!("unexpected calls: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_predict_unsupported_model_makes_no_call() {
        let service = service_with(MockBackend::new());
        let result = service
            .predict(envelope("text-embedding-ada-002"), SettingsOverrides::default(), prompt())
            .await;
        assert!(!result.ok);
        assert!(result.response.is_none());
        assert!(result.error.unwrap().contains("text-embedding-ada-002"));
        assert!(service.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_envelope() {
        let service = service_with(MockBackend::failing("rate limit reached"));
        let result = service
            .predict(envelope("gpt-4"), SettingsOverrides::default(), prompt())
            .await;
        assert!(!result.ok);
        let error = result.error.unwrap();
        assert!(!error.is_empty());
        assert!(error.contains("rate limit reached"));
    }

    #[tokio::test]
    async fn test_secret_failure_becomes_envelope() {
        let service = service_with(MockBackend::new());
        let envelope = json!({
            "api_token": {"value": "{{secret.missing}}", "from_secrets": true},
            "model_name": "gpt-4"
        });
        let result = service
            .predict(envelope, SettingsOverrides::default(), prompt())
            .await;
        assert!(!result.ok);
        assert!(result.error.unwrap().contains("missing"));
        assert!(service.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_forced_paths() {
        let service = service_with(MockBackend::new());
        let text = service
            .predict_text(envelope("gpt-4"), SettingsOverrides::default(), prompt())
            .await;
        assert_eq!(text.response.unwrap(), StructuredResult::text("text reply"));

        let chat = service
            .predict_chat(envelope("davinci-002"), SettingsOverrides::default(), prompt())
            .await;
        assert!(chat.ok);
    }

    #[tokio::test]
    async fn test_count_tokens_raw_number() {
        let service = service_with(MockBackend::new());
        let result = service
            .count_tokens(
                envelope("gpt-4"),
                SettingsOverrides::default(),
                TokenCountData::Text("abcdefgh".into()),
            )
            .await;
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({"ok": true, "response": 2}));
    }

    #[tokio::test]
    async fn test_embed_documents_raw_vectors() {
        let service = service_with(MockBackend::new());
        let result = service
            .embed_documents(envelope("text-embedding-ada-002"), vec!["ab".into(), "abc".into()])
            .await;
        assert_eq!(result.response.unwrap(), vec![vec![2.0, 1.0], vec![3.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_embed_query_from_integration_data_shape() {
        let service = service_with(MockBackend::new());
        let envelope = json!({
            "integration_data": {"settings": {"api_token": "k", "model_name": "gpt-4"}},
            "model_name": "text-embedding-ada-002"
        });
        let result = service.embed_query(envelope, "abcd".into()).await;
        assert_eq!(result.response.unwrap(), vec![4.0, 1.0]);
    }

    #[tokio::test]
    async fn test_chat_completion_body_validation_error() {
        let service = service_with(MockBackend::new());
        let result = service
            .chat_completion(
                envelope("gpt-4"),
                json!({"model": "gpt-4", "messages": [], "temperature": 3.0}),
            )
            .await;
        assert!(!result.ok);
        assert!(result.error.unwrap().contains("temperature"));
        assert!(service.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_completion_body_uses_deployment_id() {
        let service = service_with(MockBackend::new());
        let result = service
            .completion(
                envelope("gpt-4"),
                json!({"deployment_id": "davinci-002", "prompt": "Say hi", "max_tokens": 5}),
            )
            .await;
        assert!(result.ok);
        match &service.backend.calls()[..] {
            [Call::Complete { params, prompt }] => {
                assert_eq!(params.model, "davinci-002");
                assert_eq!(params.max_tokens, Some(5));
                assert_eq!(prompt, "Say hi");
            }
            other => panic!("unexpected calls: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_parse_settings_fills_catalog_data() {
        let service = service_with(MockBackend::new());
        let result = service
            .parse_settings(json!({"api_token": "k", "model_name": "gpt-3.5-turbo"}))
            .await;
        assert!(result.ok);
        let item = result.item.unwrap();
        assert_eq!(item.models.len(), 1);
        assert!(item.models[0].capabilities.chat_completion);
        assert_eq!(item.models[0].token_limit, Some(4_096));
    }

    #[tokio::test]
    async fn test_parse_settings_rejects_invalid() {
        let service = service_with(MockBackend::new());
        let result = service.parse_settings(json!({"model_name": "gpt-4"})).await;
        assert!(!result.ok);
        assert!(result.item.is_none());
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_describe_never_calls_backend() {
        let service = service_with(MockBackend::new());
        let result = service
            .describe(
                envelope("gpt-4"),
                SettingsOverrides::default(),
                Method::LlmInvoke { text: "x".into() },
            )
            .await;
        let descriptor = result.response.unwrap();
        assert_eq!(descriptor.target, TargetModel::CompletionModel);
        assert!(service.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_check_connection() {
        let service = service_with(MockBackend::new());
        let result = service.check_connection(envelope("gpt-4")).await;
        assert_eq!(result.response, Some(DispatchOutput::Connected(true)));

        let failing = service_with(MockBackend::failing("Incorrect API key"));
        let result = failing.check_connection(envelope("gpt-4")).await;
        assert!(!result.ok);
    }

    #[tokio::test]
    async fn test_indexer_config_unknown_model() {
        let service = service_with(MockBackend::new());
        let result = service.indexer_config(envelope("gpt-4"), "nope").await;
        assert_eq!(result.error.as_deref(), Some("configuration error: No model info found: nope"));
    }

    #[tokio::test]
    async fn test_predict_capabilities_come_from_catalog() {
        let service = service_with(MockBackend::new());
        let settings = json!({
            "api_token": "k",
            "model_name": "davinci-002",
            "models": [{"id": "davinci-002"}, {"id": "gpt-4"}]
        });
        let result = service
            .predict(settings.clone(), SettingsOverrides::default(), prompt())
            .await;
        assert!(result.ok, "{:?}", result.error);
        assert!(matches!(&service.backend.calls()[..], [Call::Complete { .. }]));

        let overrides = SettingsOverrides {
            model_name: Some("gpt-4".into()),
            ..Default::default()
        };
        let chat = service.predict(settings, overrides, prompt()).await;
        assert!(chat.ok);
        assert!(matches!(&service.backend.calls()[1..], [Call::Chat { .. }]));
    }

    #[tokio::test]
    async fn test_predict_unknown_configured_model_is_rejected() {
        let service = service_with(MockBackend::new());
        let settings = json!({
            "api_token": "k",
            "model_name": "llama-3-70b",
            "models": [{"id": "llama-3-70b"}]
        });
        let result = service
            .predict(settings, SettingsOverrides::default(), prompt())
            .await;
        assert!(!result.ok);
        assert!(result.error.unwrap().contains("llama-3-70b"));
        assert!(service.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_count_tokens_target_from_catalog() {
        let service = service_with(MockBackend::new());
        let settings = json!({
            "api_token": "k",
            "model_name": "gpt-4",
            "models": [{"id": "gpt-4"}]
        });
        let result = service
            .describe(
                settings,
                SettingsOverrides::default(),
                Method::CountTokens {
                    data: TokenCountData::Text("abcd".into()),
                },
            )
            .await;
        assert_eq!(result.response.unwrap().target, TargetModel::ChatModel);
    }

    #[tokio::test]
    async fn test_indexer_config_embedding_model_from_catalog() {
        let service = service_with(MockBackend::new());
        let settings = json!({
            "api_token": "k",
            "model_name": "gpt-4",
            "models": [{"id": "text-embedding-ada-002"}]
        });
        let result = service.indexer_config(settings, "text-embedding-ada-002").await;
        assert!(
            matches!(result.response, Some(IndexerConfig::Embedding { .. })),
            "{:?}",
            result.error
        );
    }

    #[tokio::test]
    async fn test_parse_settings_token_limits() {
        let service = service_with(MockBackend::new());
        let result = service
            .parse_settings(json!({
                "api_token": "k",
                "model_name": "gpt-4",
                "models": [
                    {"id": "gpt-4", "capabilities": {"chat_completion": true}},
                    {"id": "my-finetune", "capabilities": {"chat_completion": true}},
                    {"id": "text-embedding-ada-002"}
                ]
            }))
            .await;
        let item = result.item.unwrap();
        assert_eq!(item.models[0].token_limit, Some(8192));
        assert_eq!(item.models[1].token_limit, Some(8096));
        assert!(item.models[2].token_limit.is_none());

        let written = serde_json::to_value(&item).unwrap();
        assert_eq!(written["models"][0]["token_limit"], json!(8192));
        assert_eq!(written["models"][2]["token_limit"], Value::Null);
        assert!(written["models"][2].as_object().unwrap().contains_key("token_limit"));
    }

    #[tokio::test]
    async fn test_missing_token_becomes_envelope() {
        let service = service_with(MockBackend::new());
        let result = service
            .predict(
                json!({"model_name": "gpt-4"}),
                SettingsOverrides::default(),
                prompt(),
            )
            .await;
        assert!(!result.ok);
        let error = result.error.unwrap();
        assert!(error.starts_with("configuration error: invalid settings"), "{error}");
        assert!(error.contains("api_token"), "{error}");
        assert!(service.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_mistyped_setting_becomes_envelope() {
        let service = service_with(MockBackend::new());
        let settings = json!({
            "merged_settings": {"api_token": "k", "model_name": "gpt-4", "temperature": "hot"}
        });

        let predict = service
            .predict(settings.clone(), SettingsOverrides::default(), prompt())
            .await;
        assert!(!predict.ok);
        assert!(predict.error.unwrap().contains("invalid type"));

        let count = service
            .count_tokens(settings.clone(), SettingsOverrides::default(), TokenCountData::Text("x".into()))
            .await;
        assert!(!count.ok);

        let connection = service.check_connection(settings).await;
        assert!(!connection.ok);
        assert!(service.backend.calls().is_empty());
    }
}
