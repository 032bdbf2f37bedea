use std::pin::Pin;

use futures::Stream;

use crate::content::RunnableInput;
use crate::errors::SourceError;
use crate::event::StreamEvent;

/// Ordered, finite sequence of events for one turn.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, SourceError>> + Send + 'static>>;

/// A remote agent that turns an input into a stream of events.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    /// Address or label used in logs and errors.
    fn endpoint(&self) -> &str;

    /// Starts the agent on `input` and returns its event stream.
    async fn stream_events(&self, input: RunnableInput) -> Result<EventStream, SourceError>;
}

/// Event source that replays a fixed list of events, one stream per call.
///
/// Useful offline and in tests; recorded sessions can be loaded from JSON
/// lines with [`ReplaySource::from_jsonl`].
#[derive(Clone, Debug, Default)]
pub struct ReplaySource {
    label: String,
    events: Vec<StreamEvent>,
}

impl ReplaySource {
    pub fn new(label: impl Into<String>, events: Vec<StreamEvent>) -> Self {
        Self {
            label: label.into(),
            events,
        }
    }

    /// Parses one event per non-empty line.
    pub fn from_jsonl(label: impl Into<String>, text: &str) -> Result<Self, SourceError> {
        let label = label.into();
        let mut events = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let event = serde_json::from_str(line).map_err(|e| {
                SourceError::protocol(label.clone(), format!("line {}: invalid event: {e}", idx + 1))
            })?;
            events.push(event);
        }
        Ok(Self { label, events })
    }

    pub fn events(&self) -> &[StreamEvent] {
        &self.events
    }
}

#[async_trait::async_trait]
impl EventSource for ReplaySource {
    fn endpoint(&self) -> &str {
        &self.label
    }

    async fn stream_events(&self, _input: RunnableInput) -> Result<EventStream, SourceError> {
        let events: Vec<Result<StreamEvent, SourceError>> = self.events.iter().cloned().map(Ok).collect();
        Ok(Box::pin(futures::stream::iter(events)))
    }
}
