//! Turns a remote agent's stream of execution events into live UI fragments.
//!
//! An [`Agent`] sends each chat turn to an [`EventSource`] (usually a
//! [`remote::RemoteRunnable`]) and pumps the returned events through an
//! ordered list of [`EventHandler`]s on a background task. Handlers append
//! tool components and streaming text to the turn's UI stream; the caller
//! renders updates as they arrive and receives the turn's final value once
//! the stream is exhausted.
//!
//! # Running a turn
//!
//! ```no_run
//! use genui_core::prelude::*;
//! use genui_core::remote::RemoteConfig;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), GenUiError> {
//! let agent = Agent::remote(RemoteConfig::from_env()?)?;
//!
//! let mut turn = agent.submit(TurnInput::new("What's the weather in SF?"))?;
//! while let Some(update) = turn.ui().next_update().await {
//!     println!("{update:?}");
//! }
//! let outcome = turn.finish().await?;
//! println!("history now has {} messages", outcome.history.len());
//! # Ok(())
//! # }
//! ```

/// Stream adapter, terminal predicates, and per-turn handles.
pub mod adapter;
/// Agent entry point, builder, and running turns.
pub mod agent;
/// Chat messages, file attachments, and runnable input.
pub mod content;
/// Public error types.
pub mod errors;
/// Stream events emitted by the remote agent.
pub mod event;
/// Event handler contract and per-turn handler state.
pub mod handler;
/// Built-in handlers for model, tool, and text events.
pub mod handlers;
/// Conversation history folding.
pub mod history;
/// Process-wide logging setup.
pub mod observability;
/// Adapter tuning options.
pub mod options;
/// Common imports for typical usage.
pub mod prelude;
/// HTTP client for remote runnables.
pub mod remote;
/// Event source contract and replay source.
pub mod source;
/// Tool registry and tool presentation components.
pub mod tools;
/// UI stream writer, reader, and rendered view.
pub mod ui;

pub use adapter::{AbortHandle, AdaptedRun, FinalResult, StreamAdapter, TOP_LEVEL_GRAPH, TerminalPredicate};
pub use agent::{Agent, AgentBuilder, Turn, TurnOutcome};
pub use content::{ChatRole, FileAttachment, RunnableInput, TurnInput};
pub use errors::{GenUiError, HandlerError, SourceError, ToolError, TurnFailure};
pub use event::{EventKind, EventPhase, StreamEvent};
pub use handler::{EventHandler, HandlerContext, ToolSelection, fn_handler};
pub use history::ChatHistory;
pub use options::AdapterOptions;
pub use source::{EventSource, EventStream, ReplaySource};
pub use tools::{ToolComponent, ToolKind};
pub use ui::{Fragment, FragmentId, UiStream, UiStreamReader, UiUpdate, UiView};
