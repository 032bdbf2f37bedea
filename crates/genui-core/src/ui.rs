//! Live UI stream shared between the adapter task (writer) and the
//! presentation layer (reader).
//!
//! The writer appends fragments and mutates them in place; every change is
//! delivered to the reader as a [`UiUpdate`] in the order it happened. The
//! reader folds updates into a [`UiView`] so it always holds the current
//! rendering.
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::adapter::cancelled;
use crate::tools::ToolComponent;

/// Position of a fragment in the UI stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct FragmentId(pub usize);

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A renderable piece of the turn's response.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Fragment {
    /// A tool's presentation component.
    Tool(ToolComponent),
    /// Model text that grows while chunks arrive.
    StreamingText(String),
}

/// One change to the UI stream.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum UiUpdate {
    /// A new fragment was appended.
    Appended { id: FragmentId, fragment: Fragment },
    /// A fragment was replaced by a new rendering.
    Replaced { id: FragmentId, fragment: Fragment },
    /// Text was appended to a streaming-text fragment.
    TextDelta { id: FragmentId, text: String },
    /// A fragment will receive no further updates.
    Closed { id: FragmentId },
}

/// Writer side of the UI stream. Owned by the adapter task.
///
/// Once the turn is aborted, updates that do not fit in the buffer are
/// dropped instead of waiting for the reader.
pub struct UiStream {
    tx: mpsc::Sender<UiUpdate>,
    abort: Option<watch::Receiver<bool>>,
    next_id: usize,
    reader_gone: bool,
}

impl UiStream {
    /// Creates a UI stream with a bounded update buffer.
    ///
    /// `capacity` must be greater than zero.
    pub fn channel(capacity: usize) -> (UiStream, UiStreamReader) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            UiStream {
                tx,
                abort: None,
                next_id: 0,
                reader_gone: false,
            },
            UiStreamReader {
                rx,
                view: UiView::default(),
            },
        )
    }

    /// Stops waiting on a full buffer once `abort` flips to true.
    pub(crate) fn abort_on(mut self, abort: watch::Receiver<bool>) -> Self {
        self.abort = Some(abort);
        self
    }

    /// Appends a fragment and returns its id.
    pub async fn append(&mut self, fragment: Fragment) -> FragmentId {
        let id = FragmentId(self.next_id);
        self.next_id += 1;
        self.send(UiUpdate::Appended { id, fragment }).await;
        id
    }

    /// Replaces the rendering of an existing fragment.
    pub async fn replace(&mut self, id: FragmentId, fragment: Fragment) {
        self.send(UiUpdate::Replaced { id, fragment }).await;
    }

    /// Appends text to a streaming-text fragment.
    pub async fn append_text(&mut self, id: FragmentId, text: impl Into<String>) {
        self.send(UiUpdate::TextDelta {
            id,
            text: text.into(),
        })
        .await;
    }

    /// Marks a fragment as final.
    pub async fn close_fragment(&mut self, id: FragmentId) {
        self.send(UiUpdate::Closed { id }).await;
    }

    /// Number of fragments appended so far.
    pub fn len(&self) -> usize {
        self.next_id
    }

    pub fn is_empty(&self) -> bool {
        self.next_id == 0
    }

    /// Closes the stream. The reader sees the end after draining pending updates.
    pub fn close(self) {
        debug!(fragments = self.next_id, "ui stream closed");
    }

    async fn send(&mut self, update: UiUpdate) {
        let Self {
            tx,
            abort,
            reader_gone,
            ..
        } = self;
        if *reader_gone {
            return;
        }
        let reserved = match abort {
            Some(abort) if *abort.borrow() => None,
            Some(abort) => tokio::select! {
                biased;
                _ = cancelled(abort) => None,
                permit = tx.reserve() => Some(permit),
            },
            None => Some(tx.reserve().await),
        };
        let closed = match reserved {
            Some(Ok(permit)) => {
                permit.send(update);
                false
            }
            Some(Err(_)) => true,
            None => match tx.try_send(update) {
                Ok(()) => false,
                Err(TrySendError::Full(_)) => {
                    debug!("ui buffer full after abort; update dropped");
                    false
                }
                Err(TrySendError::Closed(_)) => true,
            },
        };
        if closed {
            warn!("ui stream reader dropped; further updates are discarded");
            *reader_gone = true;
        }
    }
}

/// Streaming text bound to one fragment of the UI stream.
#[derive(Debug)]
pub struct TextStream {
    id: FragmentId,
    text: String,
}

impl TextStream {
    /// Appends a new streaming-text fragment to `ui` and returns its handle.
    pub async fn open(ui: &mut UiStream) -> Self {
        let id = ui.append(Fragment::StreamingText(String::new())).await;
        Self {
            id,
            text: String::new(),
        }
    }

    pub fn id(&self) -> FragmentId {
        self.id
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub async fn append(&mut self, ui: &mut UiStream, text: &str) {
        self.text.push_str(text);
        ui.append_text(self.id, text).await;
    }

    /// Closes the fragment. Consumes the handle so it cannot be closed twice.
    pub async fn close(self, ui: &mut UiStream) -> String {
        ui.close_fragment(self.id).await;
        self.text
    }
}

/// Registry of open text streams keyed by the run id that produced them.
#[derive(Debug, Default)]
pub struct OutputStreams {
    streams: HashMap<String, TextStream>,
}

impl OutputStreams {
    pub fn get_mut(&mut self, run_id: &str) -> Option<&mut TextStream> {
        self.streams.get_mut(run_id)
    }

    /// Returns the stream for `run_id`, opening one on `ui` if needed.
    pub async fn get_or_open(&mut self, run_id: &str, ui: &mut UiStream) -> &mut TextStream {
        match self.streams.entry(run_id.to_string()) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => {
                let stream = TextStream::open(ui).await;
                debug!(run_id, fragment = %stream.id(), "opened text stream");
                slot.insert(stream)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Closes every open stream in the order they were opened and empties
    /// the registry.
    pub async fn close_all(&mut self, ui: &mut UiStream) -> usize {
        let mut streams: Vec<TextStream> = self.streams.drain().map(|(_, s)| s).collect();
        streams.sort_by_key(TextStream::id);
        let closed = streams.len();
        for stream in streams {
            stream.close(ui).await;
        }
        closed
    }
}

/// A fragment as currently rendered by the reader.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedFragment {
    pub id: FragmentId,
    pub fragment: Fragment,
    pub closed: bool,
}

/// Current rendering of a UI stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UiView {
    fragments: Vec<RenderedFragment>,
}

impl UiView {
    pub fn fragments(&self) -> &[RenderedFragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn get(&self, id: FragmentId) -> Option<&RenderedFragment> {
        self.fragments.iter().find(|f| f.id == id)
    }

    /// Applies one update. Updates for unknown fragments are ignored.
    pub fn apply(&mut self, update: &UiUpdate) {
        match update {
            UiUpdate::Appended { id, fragment } => self.fragments.push(RenderedFragment {
                id: *id,
                fragment: fragment.clone(),
                closed: false,
            }),
            UiUpdate::Replaced { id, fragment } => {
                if let Some(slot) = self.slot_mut(*id) {
                    slot.fragment = fragment.clone();
                }
            }
            UiUpdate::TextDelta { id, text } => {
                if let Some(RenderedFragment {
                    fragment: Fragment::StreamingText(buf),
                    ..
                }) = self.slot_mut(*id)
                {
                    buf.push_str(text);
                }
            }
            UiUpdate::Closed { id } => {
                if let Some(slot) = self.slot_mut(*id) {
                    slot.closed = true;
                }
            }
        }
    }

    fn slot_mut(&mut self, id: FragmentId) -> Option<&mut RenderedFragment> {
        self.fragments.iter_mut().find(|f| f.id == id)
    }
}

/// Reader side of the UI stream, handed to the presentation layer.
pub struct UiStreamReader {
    rx: mpsc::Receiver<UiUpdate>,
    view: UiView,
}

impl UiStreamReader {
    /// Waits for the next update and applies it to the view.
    ///
    /// Returns `None` once the writer closed the stream and every update has
    /// been delivered.
    pub async fn next_update(&mut self) -> Option<UiUpdate> {
        let update = self.rx.recv().await?;
        self.view.apply(&update);
        Some(update)
    }

    /// Rendering after the updates received so far.
    pub fn view(&self) -> &UiView {
        &self.view
    }

    /// Drains the stream and returns the final rendering.
    pub async fn collect(mut self) -> UiView {
        while self.next_update().await.is_some() {}
        self.view
    }

    /// Drains the stream and returns every update in order.
    pub async fn collect_updates(mut self) -> Vec<UiUpdate> {
        let mut updates = Vec::new();
        while let Some(update) = self.next_update().await {
            updates.push(update);
        }
        updates
    }
}
