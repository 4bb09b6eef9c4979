use serde::{Deserialize, Serialize};

/// One few-shot example of a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub input: String,
    pub output: String,
}

/// Platform-level prompt: system context, few-shot examples, user prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptStruct {
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub examples: Vec<Example>,
    #[serde(default)]
    pub prompt: String,
}
