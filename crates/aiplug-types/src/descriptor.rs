//! Declarative call plans handed to an executor.
//!
//! A [`CallDescriptor`] names which model kind to build, with which
//! parameters, and which typed method to run on it. Building one never
//! performs I/O; running one is the executor's job.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::llm::{ChatMessage, TokenCountData};
use crate::secret::Redacted;

/// The model kind an executor instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetModel {
    ChatModel,
    CompletionModel,
    EmbeddingModel,
}

impl fmt::Display for TargetModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetModel::ChatModel => write!(f, "chat_model"),
            TargetModel::CompletionModel => write!(f, "completion_model"),
            TargetModel::EmbeddingModel => write!(f, "embedding_model"),
        }
    }
}

/// Constructor parameters for a provider model.
///
/// Sampling fields are sparse: a `None` is never serialized. `streaming` is
/// serialized only when true, so non-streaming plans carry no such key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Empty for client-level calls (settings check, model listing).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    pub api_key: Redacted,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub streaming: bool,
}

/// The method to run on the instantiated model, with its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "kwargs", rename_all = "snake_case")]
pub enum Method {
    CheckSettings,
    GetModels,
    CountTokens {
        data: TokenCountData,
    },
    LlmInvoke {
        text: String,
    },
    LlmStream {
        text: String,
        stream_id: String,
    },
    ChatInvoke {
        messages: Vec<ChatMessage>,
    },
    ChatStream {
        messages: Vec<ChatMessage>,
        stream_id: String,
    },
    EmbedDocuments {
        texts: Vec<String>,
    },
    EmbedQuery {
        text: String,
    },
}

impl Method {
    pub fn name(&self) -> &'static str {
        match self {
            Method::CheckSettings => "check_settings",
            Method::GetModels => "get_models",
            Method::CountTokens { .. } => "count_tokens",
            Method::LlmInvoke { .. } => "llm_invoke",
            Method::LlmStream { .. } => "llm_stream",
            Method::ChatInvoke { .. } => "chat_invoke",
            Method::ChatStream { .. } => "chat_stream",
            Method::EmbedDocuments { .. } => "embed_documents",
            Method::EmbedQuery { .. } => "embed_query",
        }
    }

    /// Stream correlation id, for streaming methods.
    pub fn stream_id(&self) -> Option<&str> {
        match self {
            Method::LlmStream { stream_id, .. } | Method::ChatStream { stream_id, .. } => {
                Some(stream_id)
            }
            _ => None,
        }
    }
}

/// How to run one provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallDescriptor {
    #[serde(default)]
    pub routing_key: Option<String>,
    pub target: TargetModel,
    pub params: ModelParams,
    /// The method needs the raw provider client rather than a model wrapper.
    #[serde(default)]
    pub introspect_client: bool,
    /// Hint for the executor to run the call on an I/O-oriented pool.
    #[serde(default = "default_io_bound")]
    pub io_bound: bool,
    pub method: Method,
}

fn default_io_bound() -> bool {
    true
}

/// Model configuration handed to the document indexer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexerConfig {
    Embedding {
        embedding_model: TargetModel,
        embedding_model_params: ModelParams,
    },
    Llm {
        ai_model: TargetModel,
        ai_model_params: ModelParams,
    },
}
