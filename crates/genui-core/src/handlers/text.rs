use serde_json::Value;

use crate::errors::HandlerError;
use crate::event::{EventKind, StreamEvent};
use crate::handler::{EventHandler, HandlerContext};

/// Streams model text chunks into one text fragment per model run.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextChunkHandler;

#[async_trait::async_trait]
impl EventHandler for TextChunkHandler {
    fn name(&self) -> &str {
        "text_chunk"
    }

    async fn handle(&self, event: &StreamEvent, ctx: &mut HandlerContext) -> Result<(), HandlerError> {
        if event.event != EventKind::ChatModelStream {
            return Ok(());
        }
        let Some(chunk) = event.chunk_object() else {
            return Ok(());
        };
        let text = chunk.get("content").map(chunk_text).unwrap_or_default();

        let HandlerContext { ui, streams, .. } = ctx;
        let stream = streams.get_or_open(&event.run_id, ui).await;
        if !text.is_empty() {
            stream.append(ui, &text).await;
        }
        Ok(())
    }
}

/// Text of a message chunk's content: a plain string, or the `text` parts of
/// a content list.
fn chunk_text(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| match part {
                Value::String(text) => Some(text.as_str()),
                Value::Object(obj) => obj.get("text").and_then(Value::as_str),
                _ => None,
            })
            .collect(),
        _ => String::new(),
    }
}
