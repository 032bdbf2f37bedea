//! Built-in handlers for the remote agent's graph events.
mod model;
mod text;
mod tool;

use std::sync::Arc;

pub use model::{MODEL_NODE, ModelInvocationHandler};
pub use text::TextChunkHandler;
pub use tool::{TOOLS_NODE, ToolInvocationHandler};

use crate::handler::EventHandler;

/// Model, tool and text-chunk handlers, in that order.
pub fn default_handlers() -> Vec<Arc<dyn EventHandler>> {
    vec![
        Arc::new(ModelInvocationHandler::default()),
        Arc::new(ToolInvocationHandler::default()),
        Arc::new(TextChunkHandler),
    ]
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::handler::HandlerContext;
    use crate::ui::{UiStream, UiStreamReader};

    pub(crate) fn context() -> (HandlerContext, UiStreamReader) {
        let (ui, reader) = UiStream::channel(64);
        (HandlerContext::new(ui), reader)
    }
}
