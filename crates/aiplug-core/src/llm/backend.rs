//! ModelBackend trait definition.
//!
//! The port every provider integration implements. Uses RPITIT for the
//! request/response calls and `Pin<Box<dyn Stream>>` for streaming, so the
//! returned streams can outlive the borrow of the backend.

use std::future::Future;
use std::pin::Pin;

use futures_util::Stream;

use aiplug_types::descriptor::ModelParams;
use aiplug_types::llm::{ChatMessage, LlmError, TokenCountData};

/// Stream of generated text fragments.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send + 'static>>;

/// Provider backend (OpenAI or any OpenAI-compatible endpoint).
///
/// Every call receives the full [`ModelParams`]: key, base URL and sampling
/// values travel with the call, so one backend serves any number of
/// integrations.
pub trait ModelBackend: Send + Sync {
    /// Provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Chat-style completion; returns the assistant message text.
    fn chat(
        &self,
        params: &ModelParams,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Streaming chat completion.
    fn chat_stream(&self, params: ModelParams, messages: Vec<ChatMessage>) -> ChunkStream;

    /// Legacy single-text completion; returns the generated text.
    fn complete(
        &self,
        params: &ModelParams,
        prompt: &str,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Streaming legacy completion.
    fn complete_stream(&self, params: ModelParams, prompt: String) -> ChunkStream;

    /// One embedding vector per input text, in input order.
    fn embed(
        &self,
        params: &ModelParams,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, LlmError>> + Send;

    /// Model ids visible with the given key.
    fn list_models(
        &self,
        params: &ModelParams,
    ) -> impl Future<Output = Result<Vec<String>, LlmError>> + Send;

    /// Count tokens of `data` for `params.model` without generating anything.
    fn count_tokens(
        &self,
        params: &ModelParams,
        data: &TokenCountData,
    ) -> impl Future<Output = Result<u32, LlmError>> + Send;
}
