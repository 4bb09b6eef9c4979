//! Normalized outputs and the `{ok, response | error}` envelope returned
//! across the platform boundary.

use serde::{Deserialize, Serialize};

/// Kind of a normalized result message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMessage {
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub content: String,
}

/// `{messages: [{type: "text", content}]}`: the shape of every predict result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredResult {
    pub messages: Vec<ResultMessage>,
}

impl StructuredResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            messages: vec![ResultMessage {
                kind: ContentType::Text,
                content: content.into(),
            }],
        }
    }
}

/// What a dispatched call produced. Each mode keeps its own shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DispatchOutput {
    Messages(StructuredResult),
    TokenCount(u32),
    Text(String),
    Connected(bool),
    Embedding(Vec<f32>),
    Embeddings(Vec<Vec<f32>>),
    Models(Vec<String>),
}

/// Result envelope for platform calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResult<T> {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> RpcResult<T> {
    pub fn success(response: T) -> Self {
        Self {
            ok: true,
            response: Some(response),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            response: None,
            error: Some(error.into()),
        }
    }
}

/// Result envelope for settings parsing (`item` instead of `response`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResult<T> {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ItemResult<T> {
    pub fn success(item: T) -> Self {
        Self {
            ok: true,
            item: Some(item),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            item: None,
            error: Some(error.into()),
        }
    }
}
