//! Typed model handles over a [`ModelBackend`].
//!
//! A [`CallDescriptor`](aiplug_types::descriptor::CallDescriptor) names a
//! [`TargetModel`]; [`ModelHandle::new`] turns it into one of three handles,
//! each exposing only the operations that model kind supports.

use aiplug_types::descriptor::{ModelParams, TargetModel};
use aiplug_types::llm::{ChatMessage, LlmError, TokenCountData};

use super::backend::{ChunkStream, ModelBackend};

/// A chat model bound to its parameters.
pub struct ChatModel<'a, B> {
    backend: &'a B,
    params: ModelParams,
}

impl<'a, B: ModelBackend> ChatModel<'a, B> {
    pub fn new(backend: &'a B, params: ModelParams) -> Self {
        Self { backend, params }
    }

    pub async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.backend.chat(&self.params, messages).await
    }

    pub fn stream(&self, messages: Vec<ChatMessage>) -> ChunkStream {
        self.backend.chat_stream(self.params.clone(), messages)
    }

    pub async fn count_tokens(&self, data: &TokenCountData) -> Result<u32, LlmError> {
        self.backend.count_tokens(&self.params, data).await
    }
}

/// A legacy completion model bound to its parameters.
pub struct CompletionModel<'a, B> {
    backend: &'a B,
    params: ModelParams,
}

impl<'a, B: ModelBackend> CompletionModel<'a, B> {
    pub fn new(backend: &'a B, params: ModelParams) -> Self {
        Self { backend, params }
    }

    pub async fn invoke(&self, text: &str) -> Result<String, LlmError> {
        self.backend.complete(&self.params, text).await
    }

    pub fn stream(&self, text: String) -> ChunkStream {
        self.backend.complete_stream(self.params.clone(), text)
    }

    pub async fn count_tokens(&self, data: &TokenCountData) -> Result<u32, LlmError> {
        self.backend.count_tokens(&self.params, data).await
    }
}

/// An embedding model bound to its parameters.
pub struct EmbeddingModel<'a, B> {
    backend: &'a B,
    params: ModelParams,
}

impl<'a, B: ModelBackend> EmbeddingModel<'a, B> {
    pub fn new(backend: &'a B, params: ModelParams) -> Self {
        Self { backend, params }
    }

    pub async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        self.backend.embed(&self.params, texts).await
    }

    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let mut vectors = self.backend.embed(&self.params, &[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| LlmError::Provider {
            message: "embedding response contained no vectors".to_string(),
        })
    }
}

/// One of the three model kinds.
pub enum ModelHandle<'a, B> {
    Chat(ChatModel<'a, B>),
    Completion(CompletionModel<'a, B>),
    Embedding(EmbeddingModel<'a, B>),
}

impl<'a, B: ModelBackend> ModelHandle<'a, B> {
    pub fn new(target: TargetModel, backend: &'a B, params: ModelParams) -> Self {
        match target {
            TargetModel::ChatModel => ModelHandle::Chat(ChatModel::new(backend, params)),
            TargetModel::CompletionModel => {
                ModelHandle::Completion(CompletionModel::new(backend, params))
            }
            TargetModel::EmbeddingModel => {
                ModelHandle::Embedding(EmbeddingModel::new(backend, params))
            }
        }
    }

    pub fn target(&self) -> TargetModel {
        match self {
            ModelHandle::Chat(_) => TargetModel::ChatModel,
            ModelHandle::Completion(_) => TargetModel::CompletionModel,
            ModelHandle::Embedding(_) => TargetModel::EmbeddingModel,
        }
    }

    /// Provider client access for client-level calls (model listing).
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let (backend, params) = match self {
            ModelHandle::Chat(m) => (m.backend, &m.params),
            ModelHandle::Completion(m) => (m.backend, &m.params),
            ModelHandle::Embedding(m) => (m.backend, &m.params),
        };
        backend.list_models(params).await
    }
}
