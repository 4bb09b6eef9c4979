//! In-memory backend shared by the core unit tests.

use std::sync::Mutex;

use aiplug_types::descriptor::ModelParams;
use aiplug_types::llm::{ChatMessage, LlmError, TokenCountData};

use super::backend::{ChunkStream, ModelBackend};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Chat {
        params: ModelParams,
        messages: Vec<ChatMessage>,
    },
    Complete {
        params: ModelParams,
        prompt: String,
    },
    Embed {
        texts: Vec<String>,
    },
    ListModels,
    CountTokens,
}

pub(crate) struct MockBackend {
    pub(crate) calls: Mutex<Vec<Call>>,
    pub(crate) fail_with: Option<String>,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), LlmError> {
        self.calls.lock().unwrap().push(call);
        match &self.fail_with {
            Some(message) => Err(LlmError::Provider {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl ModelBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(&self, params: &ModelParams, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.record(Call::Chat {
            params: params.clone(),
            messages: messages.to_vec(),
        })?;
        Ok(format!("chat reply ({} messages)", messages.len()))
    }

    fn chat_stream(&self, params: ModelParams, messages: Vec<ChatMessage>) -> ChunkStream {
        let result = self.record(Call::Chat { params, messages });
        Box::pin(futures_util::stream::iter(match result {
            Ok(()) => vec![Ok("chat ".to_string()), Ok("stream".to_string())],
            Err(e) => vec![Err(e)],
        }))
    }

    async fn complete(&self, params: &ModelParams, prompt: &str) -> Result<String, LlmError> {
        self.record(Call::Complete {
            params: params.clone(),
            prompt: prompt.to_string(),
        })?;
        Ok("text reply".to_string())
    }

    fn complete_stream(&self, params: ModelParams, prompt: String) -> ChunkStream {
        let result = self.record(Call::Complete { params, prompt });
        Box::pin(futures_util::stream::iter(match result {
            Ok(()) => vec![Ok("text ".to_string()), Ok("stream".to_string())],
            Err(e) => vec![Err(e)],
        }))
    }

    async fn embed(&self, _params: &ModelParams, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        self.record(Call::Embed {
            texts: texts.to_vec(),
        })?;
        Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
    }

    async fn list_models(&self, _params: &ModelParams) -> Result<Vec<String>, LlmError> {
        self.record(Call::ListModels)?;
        Ok(vec!["gpt-4".to_string(), "davinci-002".to_string()])
    }

    async fn count_tokens(&self, _params: &ModelParams, data: &TokenCountData) -> Result<u32, LlmError> {
        self.record(Call::CountTokens)?;
        let chars = match data {
            TokenCountData::Text(text) => text.len(),
            TokenCountData::Texts(texts) => texts.iter().map(String::len).sum(),
            TokenCountData::Messages(messages) => messages.iter().map(|m| m.content.len()).sum(),
        };
        Ok(chars.div_ceil(4) as u32)
    }
}
