use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::adapter::{AbortHandle, AdaptedRun, StreamAdapter, TerminalPredicate};
use crate::content::TurnInput;
use crate::errors::GenUiError;
use crate::handler::EventHandler;
use crate::handlers::default_handlers;
use crate::history::ChatHistory;
use crate::options::AdapterOptions;
use crate::remote::{RemoteConfig, RemoteRunnable};
use crate::source::EventSource;
use crate::ui::{UiStreamReader, UiView};

pub(crate) struct AgentInner {
    source: Arc<dyn EventSource>,
    adapter: StreamAdapter,
}

/// Entry point for running chat turns against one remote agent.
#[derive(Clone)]
pub struct Agent {
    pub(crate) inner: Arc<AgentInner>,
}

impl Agent {
    /// Starts a builder with the built-in handlers preinstalled.
    pub fn builder() -> AgentBuilder {
        AgentBuilder::default()
    }

    /// Agent backed by a [`RemoteRunnable`] with the default handlers.
    pub fn remote(config: RemoteConfig) -> Result<Self, GenUiError> {
        Self::builder()
            .source(Arc::new(RemoteRunnable::new(config)?))
            .build()
    }

    pub fn endpoint(&self) -> &str {
        self.inner.source.endpoint()
    }

    /// Starts a turn.
    ///
    /// Returns as soon as the turn is running; its UI updates, final result
    /// and abort handle live on the returned [`Turn`].
    pub fn submit(&self, input: TurnInput) -> Result<Turn, GenUiError> {
        input.validate()?;
        let runnable_input = input.to_runnable_input();
        let source = self.inner.source.clone();
        let run = self
            .inner
            .adapter
            .start(async move { source.stream_events(runnable_input).await });
        info!(
            turn_id = %run.turn_id,
            endpoint = self.endpoint(),
            history = input.history.len(),
            attachment = input.file.is_some(),
            "turn submitted"
        );
        Ok(Turn {
            message: input.message,
            history: input.history,
            run,
        })
    }
}

/// Builder for [`Agent`].
pub struct AgentBuilder {
    source: Option<Arc<dyn EventSource>>,
    handlers: Vec<Arc<dyn EventHandler>>,
    terminal: TerminalPredicate,
    options: AdapterOptions,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self {
            source: None,
            handlers: default_handlers(),
            terminal: TerminalPredicate::default(),
            options: AdapterOptions::default(),
        }
    }
}

impl AgentBuilder {
    pub fn source(mut self, source: Arc<dyn EventSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Appends a handler after the ones already installed.
    pub fn handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Replaces the whole handler list.
    pub fn handlers(mut self, handlers: Vec<Arc<dyn EventHandler>>) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn terminal_predicate(mut self, terminal: TerminalPredicate) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn options(mut self, options: AdapterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<Agent, GenUiError> {
        let source = self
            .source
            .ok_or_else(|| GenUiError::Config("agent needs an event source".into()))?;
        let adapter = StreamAdapter::new(self.handlers)
            .terminal_predicate(self.terminal)
            .options(self.options)?;
        debug!(endpoint = source.endpoint(), handlers = ?adapter.handler_names(), "agent built");
        Ok(Agent {
            inner: Arc::new(AgentInner { source, adapter }),
        })
    }
}

/// A running chat turn.
pub struct Turn {
    message: String,
    history: ChatHistory,
    run: AdaptedRun,
}

/// Everything a finished turn produced.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnOutcome {
    pub final_value: Option<Value>,
    /// History with this turn folded in.
    pub history: ChatHistory,
    pub ui: UiView,
}

impl Turn {
    pub fn id(&self) -> uuid::Uuid {
        self.run.turn_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Live UI updates for the turn.
    pub fn ui(&mut self) -> &mut UiStreamReader {
        &mut self.run.ui
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.run.abort.clone()
    }

    /// Drains the remaining UI updates and waits for the final result.
    ///
    /// A failed or aborted turn leaves the history unchanged and returns the
    /// failure.
    pub async fn finish(self) -> Result<TurnOutcome, GenUiError> {
        let Turn {
            message,
            history,
            run,
        } = self;
        let turn_id = run.turn_id;
        let ui = run.ui.collect().await;
        let final_value = run.result.wait().await?;
        let history = history.with_turn(&message, final_value.as_ref());
        info!(%turn_id, fragments = ui.len(), history = history.len(), "turn finished");
        Ok(TurnOutcome {
            final_value,
            history,
            ui,
        })
    }
}
