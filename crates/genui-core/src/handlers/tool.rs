use serde_json::Value;
use tracing::debug;

use crate::errors::HandlerError;
use crate::event::StreamEvent;
use crate::handler::{EventHandler, HandlerContext, ToolSelection};
use crate::ui::Fragment;

/// Graph node that runs the selected tool.
pub const TOOLS_NODE: &str = "invoke_tools";

/// Replaces the loading tool component with its final rendering once the
/// tool returns.
#[derive(Clone, Debug)]
pub struct ToolInvocationHandler {
    node: String,
}

impl ToolInvocationHandler {
    pub fn for_node(node: impl Into<String>) -> Self {
        Self { node: node.into() }
    }
}

impl Default for ToolInvocationHandler {
    fn default() -> Self {
        Self::for_node(TOOLS_NODE)
    }
}

#[async_trait::async_trait]
impl EventHandler for ToolInvocationHandler {
    fn name(&self) -> &str {
        "tool_invocation"
    }

    async fn handle(&self, event: &StreamEvent, ctx: &mut HandlerContext) -> Result<(), HandlerError> {
        if !event.is_end_of(&self.node) {
            return Ok(());
        }
        let Some(output) = event.output_object() else {
            return Ok(());
        };
        let ToolSelection::Loading { kind, fragment } = ctx.tool else {
            return Ok(());
        };

        let result = output.get("tool_result").cloned().unwrap_or(Value::Null);
        ctx.ui.replace(fragment, Fragment::Tool(kind.finalize(result))).await;
        ctx.ui.close_fragment(fragment).await;
        ctx.tool = ToolSelection::Finalized { kind, fragment };
        debug!(run_id = %event.run_id, tool = %kind, %fragment, "tool component finalized");
        Ok(())
    }
}
