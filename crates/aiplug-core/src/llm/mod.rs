//! Provider abstractions for aiplug.
//!
//! - `ModelBackend`: RPITIT trait implemented by concrete providers (infra)
//! - `ChatModel` / `CompletionModel` / `EmbeddingModel`: typed handles built
//!   from a descriptor's target
//! - `StreamSink`: where streamed chunks go, keyed by stream id

pub mod backend;
pub mod models;
pub mod stream;

#[cfg(test)]
pub(crate) mod mock;
