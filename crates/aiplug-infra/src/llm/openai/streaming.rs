//! Stream adapters producing [`ChunkStream`]s of text fragments.
//!
//! - Chat: maps `async-openai`'s [`ChatCompletionResponseStream`].
//! - Legacy completions: maps server-sent events parsed by `eventsource-stream`.

use std::fmt::Display;

use async_openai::types::chat::ChatCompletionResponseStream;
use eventsource_stream::Event;
use futures_util::{Stream, StreamExt};

use aiplug_core::llm::backend::ChunkStream;
use aiplug_types::llm::LlmError;

use super::types::CompletionResponseBody;

/// SSE payload that terminates an OpenAI stream.
const DONE_MARKER: &str = "[DONE]";

/// Map a chat completion stream to its text deltas. Empty deltas are dropped.
pub fn map_chat_stream(stream: ChatCompletionResponseStream) -> ChunkStream {
    Box::pin(async_stream::try_stream! {
        let mut stream = stream;

        while let Some(result) = stream.next().await {
            let chunk = result.map_err(|e| LlmError::Stream(e.to_string()))?;

            for choice in chunk.choices {
                if let Some(text) = choice.delta.content {
                    if !text.is_empty() {
                        yield text;
                    }
                }
            }
        }
    })
}

/// Map legacy `/completions` server-sent events to text fragments.
///
/// Stops at the `[DONE]` marker; a payload that is not a completion chunk is
/// a deserialization error.
pub fn map_completion_events<S, E>(events: S) -> ChunkStream
where
    S: Stream<Item = Result<Event, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::try_stream! {
        let mut events = Box::pin(events);

        while let Some(result) = events.next().await {
            let event = result.map_err(|e| LlmError::Stream(e.to_string()))?;
            let data = event.data.trim();

            if data == DONE_MARKER {
                break;
            }
            if data.is_empty() {
                continue;
            }

            let chunk: CompletionResponseBody = serde_json::from_str(data).map_err(|e| {
                LlmError::Deserialization(format!("failed to parse stream chunk: {e}"))
            })?;
            let text = chunk.into_text();
            if !text.is_empty() {
                yield text;
            }
        }
    })
}
