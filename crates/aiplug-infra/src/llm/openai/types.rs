//! Wire types for the OpenAI endpoints called over plain HTTP.
//!
//! Chat completions go through `async-openai`; the legacy `/completions`,
//! `/embeddings` and `/models` endpoints use these serde types.

use serde::{Deserialize, Serialize};

/// Request body for `POST /completions`.
#[derive(Debug, Serialize)]
pub struct CompletionRequestBody<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

/// Response body (and streamed chunk) of `/completions`.
#[derive(Debug, Deserialize)]
pub struct CompletionResponseBody {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub index: u32,
}

impl CompletionResponseBody {
    /// Text of the first choice.
    pub fn into_text(self) -> String {
        self.choices
            .into_iter()
            .min_by_key(|c| c.index)
            .map(|c| c.text)
            .unwrap_or_default()
    }
}

/// Request body for `POST /embeddings`.
#[derive(Debug, Serialize)]
pub struct EmbeddingRequestBody<'a> {
    pub model: &'a str,
    pub input: &'a [String],
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingResponseBody {
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingData {
    pub index: usize,
    pub embedding: Vec<f32>,
}

impl EmbeddingResponseBody {
    /// Vectors ordered by input index.
    pub fn into_vectors(mut self) -> Vec<Vec<f32>> {
        self.data.sort_by_key(|d| d.index);
        self.data.into_iter().map(|d| d.embedding).collect()
    }
}

/// Response body of `GET /models`.
#[derive(Debug, Deserialize)]
pub struct ModelListBody {
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ModelEntry {
    pub id: String,
}
