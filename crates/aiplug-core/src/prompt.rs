//! Prompt shaping for the two call styles, and result normalization.

use aiplug_types::llm::{ChatMessage, MessageRole};
use aiplug_types::prompt::PromptStruct;
use aiplug_types::result::StructuredResult;

/// Build the chat message sequence for a prompt.
///
/// Order: system context (if any), then each example as a user/assistant
/// pair, then the user prompt (if any).
pub fn prepare_conversation(prompt: &PromptStruct) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(prompt.examples.len() * 2 + 2);

    if !prompt.context.is_empty() {
        messages.push(ChatMessage::new(MessageRole::System, &prompt.context));
    }

    for example in &prompt.examples {
        messages.push(ChatMessage::new(MessageRole::User, &example.input));
        messages.push(ChatMessage::new(MessageRole::Assistant, &example.output));
    }

    if !prompt.prompt.is_empty() {
        messages.push(ChatMessage::new(MessageRole::User, &prompt.prompt));
    }

    messages
}

/// Build the single text prompt for a legacy completion model.
///
/// `context`, then `"\ninput: {input}\noutput: {output}"` per example, then
/// `"\ninput: {prompt}\noutput: "` when the prompt is non-empty.
pub fn prepare_text_prompt(prompt: &PromptStruct) -> String {
    let mut text = prompt.context.clone();

    for example in &prompt.examples {
        text.push_str("\ninput: ");
        text.push_str(&example.input);
        text.push_str("\noutput: ");
        text.push_str(&example.output);
    }

    if !prompt.prompt.is_empty() {
        text.push_str("\ninput: ");
        text.push_str(&prompt.prompt);
        text.push_str("\noutput: ");
    }

    text
}

pub fn prepare_result(content: impl Into<String>) -> StructuredResult {
    StructuredResult::text(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiplug_types::prompt::Example;

    fn sample() -> PromptStruct {
        PromptStruct {
            context: "C".into(),
            examples: vec![Example {
                input: "a".into(),
                output: "b".into(),
            }],
            prompt: "p".into(),
        }
    }

    #[test]
    fn test_conversation_order() {
        let messages = prepare_conversation(&sample());
        assert_eq!(
            messages,
            vec![
                ChatMessage::new(MessageRole::System, "C"),
                ChatMessage::new(MessageRole::User, "a"),
                ChatMessage::new(MessageRole::Assistant, "b"),
                ChatMessage::new(MessageRole::User, "p"),
            ]
        );
    }

    #[test]
    fn test_conversation_skips_empty_context_and_prompt() {
        let prompt = PromptStruct {
            context: String::new(),
            prompt: String::new(),
            ..sample()
        };
        let messages = prepare_conversation(&prompt);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].role, MessageRole::Assistant);
    }

    #[test]
    fn test_text_prompt_literal() {
        assert_eq!(
            prepare_text_prompt(&sample()),
            "C\ninput: a\noutput: b\ninput: p\noutput: "
        );
    }

    #[test]
    fn test_text_prompt_without_prompt_has_no_trailing_block() {
        let prompt = PromptStruct {
            prompt: String::new(),
            ..sample()
        };
        assert_eq!(prepare_text_prompt(&prompt), "C\ninput: a\noutput: b");
    }

    #[test]
    fn test_prepare_result_shape() {
        let result = prepare_result("done");
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].content, "done");
    }
}
