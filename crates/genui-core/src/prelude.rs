//! Common imports for typical usage.
//!
//! Exports the types needed to build an agent, run turns and render their
//! UI updates.
pub use crate::{
    AbortHandle, Agent, AgentBuilder, ChatHistory, ChatRole, EventSource, FileAttachment, Fragment,
    GenUiError, ReplaySource, StreamEvent, ToolKind, Turn, TurnFailure, TurnInput, TurnOutcome,
    UiUpdate, UiView,
};
