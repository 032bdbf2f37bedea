//! Client for agents served as remote runnables over HTTP.
//!
//! The agent is driven through its `stream_events` endpoint, which answers
//! with a server-sent event stream of [`crate::StreamEvent`]s.
mod config;
mod options;
mod runnable;
pub(crate) mod transport;

pub use config::{DEFAULT_API_URL, RemoteConfig};
pub use options::RunConfig;
pub use runnable::RemoteRunnable;
