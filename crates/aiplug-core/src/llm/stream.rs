//! Forwarding of streamed output to the platform, correlated by `stream_id`.

use std::future::Future;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};

use aiplug_types::llm::LlmError;

use super::backend::ChunkStream;

/// One event on a stream, as seen by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Start { stream_id: String },
    Chunk { stream_id: String, content: String },
    End { stream_id: String },
    Error { stream_id: String, message: String },
}

/// Receiver of stream events (event bus, socket, stdout...).
pub trait StreamSink: Send + Sync {
    fn send(&self, event: StreamEvent) -> impl Future<Output = ()> + Send;
}

/// Drain `chunks` into `sink` and return the full text.
///
/// A `Start` event always precedes the chunks; the stream ends with `End`,
/// or with `Error` when the provider stream fails.
pub async fn forward<S: StreamSink>(
    stream_id: &str,
    mut chunks: ChunkStream,
    sink: &S,
) -> Result<String, LlmError> {
    sink.send(StreamEvent::Start {
        stream_id: stream_id.to_string(),
    })
    .await;

    let mut full = String::new();
    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(content) => {
                if content.is_empty() {
                    continue;
                }
                full.push_str(&content);
                sink.send(StreamEvent::Chunk {
                    stream_id: stream_id.to_string(),
                    content,
                })
                .await;
            }
            Err(err) => {
                sink.send(StreamEvent::Error {
                    stream_id: stream_id.to_string(),
                    message: err.to_string(),
                })
                .await;
                return Err(err);
            }
        }
    }

    sink.send(StreamEvent::End {
        stream_id: stream_id.to_string(),
    })
    .await;
    Ok(full)
}
