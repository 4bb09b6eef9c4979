//! Call-path selection for predict requests.

use std::fmt;

use aiplug_types::error::AdapterError;
use aiplug_types::llm::ChatMessage;
use aiplug_types::prompt::PromptStruct;
use aiplug_types::settings::IntegrationSettings;

use crate::prompt::{prepare_conversation, prepare_text_prompt};

/// How a predict request reaches the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPath {
    Chat,
    Completion,
}

impl fmt::Display for CallPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallPath::Chat => write!(f, "chat"),
            CallPath::Completion => write!(f, "completion"),
        }
    }
}

/// Pick the call path for `model`.
///
/// Chat wins when the model supports both styles. A model missing from the
/// configured `models` list is treated as a chat model. A configured model
/// supporting neither style is a configuration error.
pub fn select_path(settings: &IntegrationSettings, model: &str) -> Result<CallPath, AdapterError> {
    match settings.model_info(model) {
        None => Ok(CallPath::Chat),
        Some(info) if info.capabilities.chat_completion => Ok(CallPath::Chat),
        Some(info) if info.capabilities.completion => Ok(CallPath::Completion),
        Some(_) => Err(AdapterError::Configuration(format!(
            "model '{model}' supports neither chat nor text completion"
        ))),
    }
}

/// Provider input shaped for a call path.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedInput {
    Messages(Vec<ChatMessage>),
    Text(String),
}

impl PreparedInput {
    pub fn for_path(path: CallPath, prompt: &PromptStruct) -> Self {
        match path {
            CallPath::Chat => PreparedInput::Messages(prepare_conversation(prompt)),
            CallPath::Completion => PreparedInput::Text(prepare_text_prompt(prompt)),
        }
    }
}
