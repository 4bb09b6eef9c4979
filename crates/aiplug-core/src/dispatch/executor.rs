//! Runs a [`CallDescriptor`] against a [`ModelBackend`].

use aiplug_types::descriptor::{CallDescriptor, Method};
use aiplug_types::error::AdapterError;
use aiplug_types::result::DispatchOutput;

use crate::llm::backend::ModelBackend;
use crate::llm::models::ModelHandle;
use crate::llm::stream::{StreamSink, forward};

/// Executes call descriptors; streamed output goes to the sink.
pub struct Executor<'a, B, S> {
    backend: &'a B,
    sink: &'a S,
}

impl<'a, B: ModelBackend, S: StreamSink> Executor<'a, B, S> {
    pub fn new(backend: &'a B, sink: &'a S) -> Self {
        Self { backend, sink }
    }

    /// Run one descriptor. Exactly one provider call is made; nothing is retried.
    #[tracing::instrument(
        skip_all,
        fields(
            provider = self.backend.name(),
            target = %descriptor.target,
            method = descriptor.method.name(),
            model = %descriptor.params.model,
            io_bound = descriptor.io_bound,
        )
    )]
    pub async fn execute(&self, descriptor: &CallDescriptor) -> Result<DispatchOutput, AdapterError> {
        let handle = ModelHandle::new(descriptor.target, self.backend, descriptor.params.clone());

        let output = match (&descriptor.method, &handle) {
            (Method::CheckSettings, _) => {
                handle.list_models().await?;
                DispatchOutput::Connected(true)
            }
            (Method::GetModels, _) => DispatchOutput::Models(handle.list_models().await?),
            (Method::CountTokens { data }, ModelHandle::Chat(model)) => {
                DispatchOutput::TokenCount(model.count_tokens(data).await?)
            }
            (Method::CountTokens { data }, ModelHandle::Completion(model)) => {
                DispatchOutput::TokenCount(model.count_tokens(data).await?)
            }
            (Method::LlmInvoke { text }, ModelHandle::Completion(model)) => {
                DispatchOutput::Text(model.invoke(text).await?)
            }
            (Method::LlmStream { text, stream_id }, ModelHandle::Completion(model)) => {
                let chunks = model.stream(text.clone());
                DispatchOutput::Text(forward(stream_id, chunks, self.sink).await?)
            }
            (Method::ChatInvoke { messages }, ModelHandle::Chat(model)) => {
                DispatchOutput::Text(model.invoke(messages).await?)
            }
            (Method::ChatStream { messages, stream_id }, ModelHandle::Chat(model)) => {
                let chunks = model.stream(messages.clone());
                DispatchOutput::Text(forward(stream_id, chunks, self.sink).await?)
            }
            (Method::EmbedDocuments { texts }, ModelHandle::Embedding(model)) => {
                DispatchOutput::Embeddings(model.embed_documents(texts).await?)
            }
            (Method::EmbedQuery { text }, ModelHandle::Embedding(model)) => {
                DispatchOutput::Embedding(model.embed_query(text).await?)
            }
            (method, handle) => {
                return Err(AdapterError::Configuration(format!(
                    "method '{}' is not available on {}",
                    method.name(),
                    handle.target()
                )));
            }
        };

        tracing::debug!("call completed");
        Ok(output)
    }
}
