//! Stream sink printing events to stdout.

use std::io::Write;

use console::style;

use aiplug_core::llm::stream::{StreamEvent, StreamSink};

/// Prints stream events: JSON lines in `--json` mode, otherwise the chunks
/// inline followed by a newline when the stream ends.
pub struct StdoutSink {
    json: bool,
}

impl StdoutSink {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Text to print for `event`, if any.
    fn render(&self, event: &StreamEvent) -> Option<String> {
        if self.json {
            return serde_json::to_string(event).ok().map(|line| format!("{line}\n"));
        }

        match event {
            StreamEvent::Start { .. } => None,
            StreamEvent::Chunk { content, .. } => Some(content.clone()),
            StreamEvent::End { .. } => Some("\n".to_string()),
            StreamEvent::Error { message, .. } => {
                Some(format!("\n{} {message}\n", style("stream error:").red().bold()))
            }
        }
    }
}

impl StreamSink for StdoutSink {
    async fn send(&self, event: StreamEvent) {
        if let Some(text) = self.render(&event) {
            let mut stdout = std::io::stdout().lock();
            if let Err(err) = stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
                tracing::warn!(error = %err, "failed to write stream event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_mode_renders_lines() {
        let sink = StdoutSink::new(true);
        let line = sink
            .render(&StreamEvent::Chunk {
                stream_id: "s".into(),
                content: "hi".into(),
            })
            .unwrap();
        assert_eq!(line, "{\"type\":\"chunk\",\"stream_id\":\"s\",\"content\":\"hi\"}\n");
    }

    #[test]
    fn test_text_mode_prints_chunks_only() {
        let sink = StdoutSink::new(false);
        assert!(sink.render(&StreamEvent::Start { stream_id: "s".into() }).is_none());
        assert_eq!(
            sink.render(&StreamEvent::Chunk {
                stream_id: "s".into(),
                content: "hi".into()
            })
            .as_deref(),
            Some("hi")
        );
        assert_eq!(sink.render(&StreamEvent::End { stream_id: "s".into() }).as_deref(), Some("\n"));
    }
}
