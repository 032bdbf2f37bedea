use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::HandlerError;
use crate::event::StreamEvent;
use crate::handler::{EventHandler, HandlerContext, ToolSelection};
use crate::tools::ToolKind;
use crate::ui::Fragment;

/// Graph node that invokes the model.
pub const MODEL_NODE: &str = "invoke_model";

/// Shows a tool's loading component when the model decides to call a tool.
///
/// Only the first tool call of a turn is rendered.
#[derive(Clone, Debug)]
pub struct ModelInvocationHandler {
    node: String,
}

impl ModelInvocationHandler {
    /// Watches end events of a differently named model node.
    pub fn for_node(node: impl Into<String>) -> Self {
        Self { node: node.into() }
    }
}

impl Default for ModelInvocationHandler {
    fn default() -> Self {
        Self::for_node(MODEL_NODE)
    }
}

#[async_trait::async_trait]
impl EventHandler for ModelInvocationHandler {
    fn name(&self) -> &str {
        "model_invocation"
    }

    async fn handle(&self, event: &StreamEvent, ctx: &mut HandlerContext) -> Result<(), HandlerError> {
        if !event.is_end_of(&self.node) {
            return Ok(());
        }
        let Some(first_call) = event
            .output_object()
            .and_then(|output| output.get("tool_calls"))
            .and_then(Value::as_array)
            .and_then(|calls| calls.first())
        else {
            return Ok(());
        };
        if ctx.tool != ToolSelection::Unselected {
            debug!(run_id = %event.run_id, "tool component already selected for this turn");
            return Ok(());
        }

        let tag = first_call.get("type").and_then(Value::as_str).unwrap_or_default();
        let kind = match ToolKind::from_tag(tag) {
            Ok(kind) => kind,
            Err(err) => {
                warn!(run_id = %event.run_id, error = %err, "skipping tool call without a component");
                return Ok(());
            }
        };
        let fragment = ctx.ui.append(Fragment::Tool(kind.loading())).await;
        ctx.tool = ToolSelection::Loading { kind, fragment };
        debug!(run_id = %event.run_id, tool = %kind, %fragment, "tool component loading");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::handlers::testing::context;
    use crate::ui::UiUpdate;
    use serde_json::json;

    fn model_end(calls: serde_json::Value) -> StreamEvent {
        StreamEvent::new(EventKind::ChainEnd, MODEL_NODE, "m1").with_output(json!({ "tool_calls": calls }))
    }

    #[tokio::test]
    async fn first_tool_call_wins() {
        let (mut ctx, reader) = context();
        let handler = ModelInvocationHandler::default();
        handler
            .handle(&model_end(json!([{"type": "weather-data", "args": {}}])), &mut ctx)
            .await
            .expect("handle");
        handler
            .handle(&model_end(json!([{"type": "github-repo", "args": {}}])), &mut ctx)
            .await
            .expect("handle");
        assert!(matches!(ctx.tool, ToolSelection::Loading { kind: ToolKind::WeatherData, .. }));
        ctx.close().await;

        let appended = reader
            .collect_updates()
            .await
            .into_iter()
            .filter(|u| matches!(u, UiUpdate::Appended { .. }))
            .count();
        assert_eq!(appended, 1);
    }

    #[tokio::test]
    async fn ignores_text_results_and_other_nodes() {
        let (mut ctx, _reader) = context();
        let handler = ModelInvocationHandler::default();
        let text_result = StreamEvent::new(EventKind::ChainEnd, MODEL_NODE, "m1")
            .with_output(json!({"result": "hi"}));
        let empty_calls = model_end(json!([]));
        let start = StreamEvent::new(EventKind::ChainStart, MODEL_NODE, "m1")
            .with_output(json!({"tool_calls": [{"type": "weather-data"}]}));
        let other_node = StreamEvent::new(EventKind::ChainEnd, "router", "m1")
            .with_output(json!({"tool_calls": [{"type": "weather-data"}]}));
        for event in [text_result, empty_calls, start, other_node] {
            handler.handle(&event, &mut ctx).await.expect("handle");
        }
        assert_eq!(ctx.tool, ToolSelection::Unselected);
        assert!(ctx.ui.is_empty());
    }

    #[tokio::test]
    async fn unknown_tool_kind_is_skipped_and_leaves_selection_open() {
        let (mut ctx, _reader) = context();
        let handler = ModelInvocationHandler::default();
        handler
            .handle(&model_end(json!([{"type": "stock-quote"}])), &mut ctx)
            .await
            .expect("unknown kinds are not fatal");
        assert_eq!(ctx.tool, ToolSelection::Unselected);
        handler
            .handle(&model_end(json!([{"type": "invoice-parser"}])), &mut ctx)
            .await
            .expect("handle");
        assert!(matches!(ctx.tool, ToolSelection::Loading { kind: ToolKind::InvoiceParser, .. }));
    }
}
