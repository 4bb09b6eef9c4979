//! Builders for every declarative call the platform can request.
//!
//! Each builder resolves the API key, merges parameters and picks the target
//! model kind; none of them talks to the provider.

use aiplug_types::config::AdapterConfig;
use aiplug_types::descriptor::{CallDescriptor, IndexerConfig, Method, ModelParams, TargetModel};
use aiplug_types::error::AdapterError;
use aiplug_types::llm::{ChatMessage, TokenCountData};
use aiplug_types::settings::{RequestContext, SettingsOverrides};

use crate::service::secret::SecretService;
use crate::settings::merge;

/// Builds [`CallDescriptor`]s for one adapter configuration.
pub struct DescriptorFactory<'a> {
    secrets: &'a SecretService,
    config: &'a AdapterConfig,
}

impl<'a> DescriptorFactory<'a> {
    pub fn new(secrets: &'a SecretService, config: &'a AdapterConfig) -> Self {
        Self { secrets, config }
    }

    fn descriptor(
        &self,
        target: TargetModel,
        params: ModelParams,
        introspect_client: bool,
        method: Method,
    ) -> CallDescriptor {
        CallDescriptor {
            routing_key: self.config.routing_key.clone(),
            target,
            params,
            introspect_client,
            io_bound: self.config.io_bound,
            method,
        }
    }

    async fn model_params(
        &self,
        ctx: &RequestContext,
        overrides: &SettingsOverrides,
        streaming: bool,
    ) -> Result<ModelParams, AdapterError> {
        merge::merge(
            &ctx.settings,
            overrides,
            self.secrets,
            ctx.project,
            &self.config.default_api_base,
            streaming,
        )
        .await
    }

    async fn client_params(&self, ctx: &RequestContext) -> Result<ModelParams, AdapterError> {
        let api_key = self
            .secrets
            .unsecret(&ctx.settings.api_token, ctx.project)
            .await?;
        Ok(merge::client_params(
            &ctx.settings,
            api_key,
            &self.config.default_api_base,
        ))
    }

    /// Key, model and base URL only; embedding endpoints take no sampling values.
    async fn embedding_params(
        &self,
        ctx: &RequestContext,
        model: &str,
    ) -> Result<ModelParams, AdapterError> {
        let mut params = self.client_params(ctx).await?;
        if model.is_empty() {
            return Err(AdapterError::Configuration(
                "model_name is not set in integration settings".to_string(),
            ));
        }
        params.model = model.to_string();
        Ok(params)
    }

    /// Test the connection with the configured key.
    pub async fn check_settings(&self, ctx: &RequestContext) -> Result<CallDescriptor, AdapterError> {
        let params = self.client_params(ctx).await?;
        Ok(self.descriptor(TargetModel::ChatModel, params, true, Method::CheckSettings))
    }

    /// List the models visible to the configured key.
    pub async fn get_models(&self, ctx: &RequestContext) -> Result<CallDescriptor, AdapterError> {
        let params = self.client_params(ctx).await?;
        Ok(self.descriptor(TargetModel::ChatModel, params, true, Method::GetModels))
    }

    /// Count tokens with the model kind the selected model is served by.
    ///
    /// Legacy completion is used only when the selected model is configured
    /// and lacks chat capability; everything else counts as chat.
    pub async fn count_tokens(
        &self,
        ctx: &RequestContext,
        overrides: &SettingsOverrides,
        data: TokenCountData,
    ) -> Result<CallDescriptor, AdapterError> {
        let params = self.model_params(ctx, overrides, false).await?;
        let legacy = ctx
            .settings
            .model_info(&params.model)
            .is_some_and(|info| !info.capabilities.chat_completion);
        let target = if legacy {
            TargetModel::CompletionModel
        } else {
            TargetModel::ChatModel
        };
        Ok(self.descriptor(target, params, false, Method::CountTokens { data }))
    }

    pub async fn llm_invoke(
        &self,
        ctx: &RequestContext,
        overrides: &SettingsOverrides,
        text: String,
    ) -> Result<CallDescriptor, AdapterError> {
        let params = self.model_params(ctx, overrides, false).await?;
        Ok(self.descriptor(TargetModel::CompletionModel, params, false, Method::LlmInvoke { text }))
    }

    pub async fn llm_stream(
        &self,
        ctx: &RequestContext,
        overrides: &SettingsOverrides,
        text: String,
        stream_id: String,
    ) -> Result<CallDescriptor, AdapterError> {
        let params = self.model_params(ctx, overrides, true).await?;
        Ok(self.descriptor(
            TargetModel::CompletionModel,
            params,
            false,
            Method::LlmStream { text, stream_id },
        ))
    }

    pub async fn chat_invoke(
        &self,
        ctx: &RequestContext,
        overrides: &SettingsOverrides,
        messages: Vec<ChatMessage>,
    ) -> Result<CallDescriptor, AdapterError> {
        let params = self.model_params(ctx, overrides, false).await?;
        Ok(self.descriptor(TargetModel::ChatModel, params, false, Method::ChatInvoke { messages }))
    }

    pub async fn chat_stream(
        &self,
        ctx: &RequestContext,
        overrides: &SettingsOverrides,
        messages: Vec<ChatMessage>,
        stream_id: String,
    ) -> Result<CallDescriptor, AdapterError> {
        let params = self.model_params(ctx, overrides, true).await?;
        Ok(self.descriptor(
            TargetModel::ChatModel,
            params,
            false,
            Method::ChatStream {
                messages,
                stream_id,
            },
        ))
    }

    pub async fn embed_documents(
        &self,
        ctx: &RequestContext,
        texts: Vec<String>,
    ) -> Result<CallDescriptor, AdapterError> {
        let params = self.embedding_params(ctx, &ctx.settings.model_name).await?;
        Ok(self.descriptor(TargetModel::EmbeddingModel, params, false, Method::EmbedDocuments { texts }))
    }

    pub async fn embed_query(
        &self,
        ctx: &RequestContext,
        text: String,
    ) -> Result<CallDescriptor, AdapterError> {
        let params = self.embedding_params(ctx, &ctx.settings.model_name).await?;
        Ok(self.descriptor(TargetModel::EmbeddingModel, params, false, Method::EmbedQuery { text }))
    }

    /// Model configuration for the document indexer.
    ///
    /// Embedding-capable models yield embedding params; models without chat
    /// capability yield completion params; the rest yield chat params.
    pub async fn indexer_config(
        &self,
        ctx: &RequestContext,
        model: &str,
    ) -> Result<IndexerConfig, AdapterError> {
        let info = ctx
            .settings
            .model_info(model)
            .ok_or_else(|| AdapterError::Configuration(format!("No model info found: {model}")))?;

        if info.capabilities.embeddings {
            return Ok(IndexerConfig::Embedding {
                embedding_model: TargetModel::EmbeddingModel,
                embedding_model_params: self.embedding_params(ctx, &info.id).await?,
            });
        }

        let overrides = SettingsOverrides {
            model_name: Some(info.id.clone()),
            ..Default::default()
        };
        let ai_model = if info.capabilities.chat_completion {
            TargetModel::ChatModel
        } else {
            TargetModel::CompletionModel
        };
        Ok(IndexerConfig::Llm {
            ai_model,
            ai_model_params: self.model_params(ctx, &overrides, false).await?,
        })
    }
}
