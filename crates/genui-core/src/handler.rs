use std::sync::Arc;

use tracing::debug;

use crate::errors::HandlerError;
use crate::event::StreamEvent;
use crate::tools::ToolKind;
use crate::ui::{FragmentId, OutputStreams, UiStream};

/// Tool component selection for one turn.
///
/// Moves `Unselected -> Loading -> Finalized` and never back.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ToolSelection {
    #[default]
    Unselected,
    Loading { kind: ToolKind, fragment: FragmentId },
    Finalized { kind: ToolKind, fragment: FragmentId },
}

/// Per-turn state shared by every handler.
pub struct HandlerContext {
    /// UI stream for the turn.
    pub ui: UiStream,
    /// Open text streams keyed by run id.
    pub streams: OutputStreams,
    /// Tool component selected for the turn, if any.
    pub tool: ToolSelection,
}

impl HandlerContext {
    pub fn new(ui: UiStream) -> Self {
        Self {
            ui,
            streams: OutputStreams::default(),
            tool: ToolSelection::Unselected,
        }
    }

    /// Closes every open text stream, a tool component still loading, and
    /// finally the UI stream itself.
    pub async fn close(mut self) {
        let closed = self.streams.close_all(&mut self.ui).await;
        if let ToolSelection::Loading { kind, fragment } = self.tool {
            debug!(tool = %kind, %fragment, "closing tool component left loading");
            self.ui.close_fragment(fragment).await;
        }
        debug!(text_streams = closed, "closed turn output streams");
        self.ui.close();
    }
}

/// Reacts to stream events by updating the turn's UI.
///
/// Handlers run sequentially: every handler sees an event before the adapter
/// pulls the next one. Events a handler does not recognize are skipped
/// without error.
#[async_trait::async_trait]
pub trait EventHandler: Send + Sync {
    /// Short name used in logs and failure reports.
    fn name(&self) -> &str;

    async fn handle(&self, event: &StreamEvent, ctx: &mut HandlerContext) -> Result<(), HandlerError>;
}

type HandlerFn = dyn Fn(&StreamEvent, &mut HandlerContext) -> Result<(), HandlerError> + Send + Sync;

/// Handler backed by a synchronous closure.
pub struct FnHandler {
    name: String,
    f: Box<HandlerFn>,
}

#[async_trait::async_trait]
impl EventHandler for FnHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, event: &StreamEvent, ctx: &mut HandlerContext) -> Result<(), HandlerError> {
        (self.f)(event, ctx)
    }
}

/// Wraps a closure as an [`EventHandler`].
pub fn fn_handler<F>(name: impl Into<String>, f: F) -> Arc<dyn EventHandler>
where
    F: Fn(&StreamEvent, &mut HandlerContext) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    Arc::new(FnHandler {
        name: name.into(),
        f: Box::new(f),
    })
}
