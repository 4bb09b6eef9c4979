//! Provider-facing LLM types.
//!
//! Messages exchanged with chat models, token-count inputs, and the error
//! type every provider backend reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a message in a chat conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Function,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::Function => write!(f, "function"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            "function" => Ok(MessageRole::Function),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Input for token counting: plain text, a batch of texts, or chat messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenCountData {
    Text(String),
    Messages(Vec<ChatMessage>),
    Texts(Vec<String>),
}

/// Errors from LLM provider operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("provider overloaded: {0}")]
    Overloaded(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_roundtrip() {
        for role in [
            MessageRole::System,
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::Function,
        ] {
            let parsed: MessageRole = role.to_string().parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_message_role_rejects_unknown() {
        assert!("tool".parse::<MessageRole>().is_err());
        assert!(serde_json::from_str::<MessageRole>("\"critic\"").is_err());
    }

    #[test]
    fn test_token_count_data_shapes() {
        let text: TokenCountData = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(text, TokenCountData::Text("hello".into()));

        let messages: TokenCountData =
            serde_json::from_str(r#"[{"role":"user","content":"hi"}]"#).unwrap();
        assert!(matches!(messages, TokenCountData::Messages(ref m) if m.len() == 1));

        let texts: TokenCountData = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(texts, TokenCountData::Texts(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::Provider {
            message: "HTTP 500".into(),
        };
        assert_eq!(err.to_string(), "provider error: HTTP 500");
    }
}
