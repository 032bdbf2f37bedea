use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;

use futures::{FutureExt as _, StreamExt as _};
use serde_json::Value;
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use crate::errors::{GenUiError, SourceError, TurnFailure, turn_failure_from_source_error};
use crate::event::{EventKind, StreamEvent};
use crate::handler::{EventHandler, HandlerContext};
use crate::options::AdapterOptions;
use crate::source::EventStream;
use crate::ui::{UiStream, UiStreamReader};

/// Name of the top-level graph whose chain-end marks the end of a turn.
pub const TOP_LEVEL_GRAPH: &str = "LangGraph";

type EventMatcher = dyn Fn(&StreamEvent) -> bool + Send + Sync;

/// Decides which event freezes a turn's final result.
///
/// Only the first matching event counts; later matches (for example nested
/// sub-graphs ending after the top-level graph) are ignored.
#[derive(Clone)]
pub enum TerminalPredicate {
    /// The event's `data.chunk` carries `name` and `event == kind`.
    PayloadSentinel { name: String, kind: EventKind },
    /// The event itself has `name` and `kind`.
    EventSentinel { name: String, kind: EventKind },
    /// Caller-supplied predicate.
    Custom(Arc<EventMatcher>),
}

impl TerminalPredicate {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&StreamEvent) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    pub fn matches(&self, event: &StreamEvent) -> bool {
        match self {
            Self::PayloadSentinel { name, kind } => {
                let Some(chunk) = event.chunk_object() else {
                    return false;
                };
                chunk.get("name").and_then(Value::as_str) == Some(name.as_str())
                    && chunk.get("event").and_then(Value::as_str) == Some(kind.as_str())
            }
            Self::EventSentinel { name, kind } => event.name == *name && event.event == *kind,
            Self::Custom(f) => f(event),
        }
    }
}

impl Default for TerminalPredicate {
    fn default() -> Self {
        Self::PayloadSentinel {
            name: TOP_LEVEL_GRAPH.to_string(),
            kind: EventKind::ChainEnd,
        }
    }
}

impl fmt::Debug for TerminalPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayloadSentinel { name, kind } => f
                .debug_struct("PayloadSentinel")
                .field("name", name)
                .field("kind", kind)
                .finish(),
            Self::EventSentinel { name, kind } => f
                .debug_struct("EventSentinel")
                .field("name", name)
                .field("kind", kind)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Handle used to abort a running turn.
#[derive(Clone)]
pub struct AbortHandle {
    tx: watch::Sender<bool>,
}

impl AbortHandle {
    /// Requests cancellation.
    ///
    /// Takes effect the next time the adapter waits for an event. Open
    /// streams are still closed and the final result resolves with
    /// `TurnFailure::Cancelled`.
    pub fn abort(&self) {
        let _ = self.tx.send(true);
    }
}

/// Final value of a turn, available once the event stream is exhausted.
pub struct FinalResult {
    rx: oneshot::Receiver<Result<Option<Value>, TurnFailure>>,
}

impl FinalResult {
    /// Waits for the turn to finish.
    ///
    /// `Ok(None)` means the turn ended without a recognizable output.
    pub async fn wait(self) -> Result<Option<Value>, GenUiError> {
        match self.rx.await {
            Ok(result) => result.map_err(GenUiError::TurnFailed),
            Err(_) => Err(GenUiError::protocol_msg(
                "adapter task ended without a final result",
            )),
        }
    }
}

/// Live outputs of a started turn.
pub struct AdaptedRun {
    pub turn_id: uuid::Uuid,
    /// Live UI updates. Must be drained or dropped; a full buffer pauses the turn.
    pub ui: UiStreamReader,
    pub result: FinalResult,
    pub abort: AbortHandle,
}

/// Future that starts the remote agent and yields its event stream.
pub type SourceCall = Pin<Box<dyn Future<Output = Result<EventStream, SourceError>> + Send + 'static>>;

/// Pumps one turn's events through an ordered list of handlers.
#[derive(Clone)]
pub struct StreamAdapter {
    handlers: Vec<Arc<dyn EventHandler>>,
    terminal: TerminalPredicate,
    options: AdapterOptions,
}

impl StreamAdapter {
    pub fn new(handlers: Vec<Arc<dyn EventHandler>>) -> Self {
        Self {
            handlers,
            terminal: TerminalPredicate::default(),
            options: AdapterOptions::default(),
        }
    }

    pub fn terminal_predicate(mut self, terminal: TerminalPredicate) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn options(mut self, options: AdapterOptions) -> Result<Self, GenUiError> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Starts a turn on a detached task and returns its live outputs at once.
    ///
    /// `source_call` is polled only inside the task. Must be called from
    /// within a tokio runtime.
    pub fn start<F>(&self, source_call: F) -> AdaptedRun
    where
        F: Future<Output = Result<EventStream, SourceError>> + Send + 'static,
    {
        let turn_id = uuid::Uuid::new_v4();
        let (final_tx, final_rx) = oneshot::channel();
        let (abort_tx, abort_rx) = watch::channel(false);
        let (ui, reader) = UiStream::channel(self.options.ui_buffer_capacity.max(1));
        let ui = ui.abort_on(abort_rx.clone());

        tokio::spawn(turn_task(
            turn_id,
            Box::pin(source_call),
            self.handlers.clone(),
            self.terminal.clone(),
            HandlerContext::new(ui),
            final_tx,
            abort_rx,
        ));

        AdaptedRun {
            turn_id,
            ui: reader,
            result: FinalResult { rx: final_rx },
            abort: AbortHandle { tx: abort_tx },
        }
    }
}

async fn turn_task(
    turn_id: uuid::Uuid,
    source_call: SourceCall,
    handlers: Vec<Arc<dyn EventHandler>>,
    terminal: TerminalPredicate,
    mut ctx: HandlerContext,
    final_tx: oneshot::Sender<Result<Option<Value>, TurnFailure>>,
    mut abort_rx: watch::Receiver<bool>,
) {
    info!(%turn_id, handlers = handlers.len(), "turn started");
    let outcome = pump(turn_id, source_call, &handlers, &terminal, &mut ctx, &mut abort_rx).await;
    let resolved = match outcome {
        Ok(candidate) => {
            let value = candidate.and_then(|event| event.final_value());
            info!(%turn_id, has_output = value.is_some(), "turn finished");
            Ok(value)
        }
        Err(failure) => {
            warn!(%turn_id, error = %failure, "turn failed");
            Err(failure)
        }
    };
    let _ = final_tx.send(resolved);
    ctx.close().await;
}

async fn pump(
    turn_id: uuid::Uuid,
    source_call: SourceCall,
    handlers: &[Arc<dyn EventHandler>],
    terminal: &TerminalPredicate,
    ctx: &mut HandlerContext,
    abort_rx: &mut watch::Receiver<bool>,
) -> Result<Option<StreamEvent>, TurnFailure> {
    let mut events = tokio::select! {
        biased;
        _ = cancelled(abort_rx) => return Err(TurnFailure::Cancelled),
        started = source_call => started.map_err(|e| turn_failure_from_source_error(&e))?,
    };

    let mut candidate: Option<StreamEvent> = None;
    let mut recording = true;
    let mut seq = 0_u64;
    loop {
        let next = tokio::select! {
            biased;
            _ = cancelled(abort_rx) => return Err(TurnFailure::Cancelled),
            next = events.next() => next,
        };
        let event = match next {
            Some(Ok(event)) => event,
            Some(Err(err)) => return Err(turn_failure_from_source_error(&err)),
            None => break,
        };
        debug!(%turn_id, seq, event = %event.event, name = %event.name, run_id = %event.run_id, "stream event");
        seq = seq.saturating_add(1);

        for handler in handlers {
            tokio::select! {
                biased;
                _ = cancelled(abort_rx) => return Err(TurnFailure::Cancelled),
                handled = run_handler(handler.as_ref(), &event, ctx) => handled?,
            }
        }

        if recording {
            let is_terminal = terminal.matches(&event);
            candidate = Some(event);
            if is_terminal {
                debug!(%turn_id, seq, "terminal event seen; final result frozen");
                recording = false;
            }
        }
    }
    Ok(candidate)
}

async fn run_handler(
    handler: &dyn EventHandler,
    event: &StreamEvent,
    ctx: &mut HandlerContext,
) -> Result<(), TurnFailure> {
    match AssertUnwindSafe(handler.handle(event, ctx)).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(TurnFailure::Handler {
            handler: handler.name().to_string(),
            message: err.to_string(),
        }),
        Err(panic) => Err(TurnFailure::Handler {
            handler: handler.name().to_string(),
            message: panic_message(panic.as_ref()),
        }),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}

/// Resolves once cancellation was requested; never resolves if every abort
/// handle is dropped first.
pub(crate) async fn cancelled(abort_rx: &mut watch::Receiver<bool>) {
    loop {
        if *abort_rx.borrow_and_update() {
            return;
        }
        if abort_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HandlerError;
    use crate::handler::fn_handler;
    use crate::handlers::{MODEL_NODE, TOOLS_NODE, default_handlers};
    use crate::tools::ToolKind;
    use crate::ui::{Fragment, FragmentId, UiUpdate};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    fn events_call(events: Vec<StreamEvent>) -> impl Future<Output = Result<EventStream, SourceError>> + Send + 'static {
        async move {
            let items: Vec<Result<StreamEvent, SourceError>> = events.into_iter().map(Ok).collect();
            Ok(Box::pin(futures::stream::iter(items)) as EventStream)
        }
    }

    fn model_end_with_tool(tag: &str) -> StreamEvent {
        StreamEvent::new(EventKind::ChainEnd, MODEL_NODE, "m1")
            .with_output(json!({"tool_calls": [{"type": tag, "args": {}}]}))
    }

    fn tools_end(result: Value) -> StreamEvent {
        StreamEvent::new(EventKind::ChainEnd, TOOLS_NODE, "t1").with_output(json!({ "tool_result": result }))
    }

    fn text_chunk(run_id: &str, text: &str) -> StreamEvent {
        StreamEvent::new(EventKind::ChatModelStream, "ChatOpenAI", run_id).with_chunk(json!({ "content": text }))
    }

    fn sentinel(output: Value) -> StreamEvent {
        StreamEvent::new(EventKind::ChainStream, TOP_LEVEL_GRAPH, "g").with_chunk(json!({
            "name": TOP_LEVEL_GRAPH,
            "event": "on_chain_end",
            "data": {"output": output}
        }))
    }

    fn close_counts(updates: &[UiUpdate]) -> HashMap<FragmentId, usize> {
        let mut counts = HashMap::new();
        for update in updates {
            match update {
                UiUpdate::Appended { id, .. } => {
                    counts.entry(*id).or_insert(0);
                }
                UiUpdate::Closed { id } => *counts.entry(*id).or_insert(0) += 1,
                _ => {}
            }
        }
        counts
    }

    #[tokio::test]
    async fn handlers_run_in_list_order_for_every_event_in_arrival_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = |name: &'static str| {
            let log = log.clone();
            fn_handler(name, move |event, _ctx| {
                log.lock().expect("log").push(format!("{name}:{}", event.run_id));
                Ok(())
            })
        };
        let adapter = StreamAdapter::new(vec![handler("a"), handler("b"), handler("c")]);
        let run = adapter.start(events_call(vec![
            StreamEvent::new(EventKind::ChainStart, "x", "1"),
            StreamEvent::new(EventKind::ChainStream, "x", "2"),
        ]));
        assert!(run.ui.collect().await.is_empty());
        run.result.wait().await.expect("result");

        assert_eq!(
            *log.lock().expect("log"),
            vec!["a:1", "b:1", "c:1", "a:2", "b:2", "c:2"]
        );
    }

    #[tokio::test]
    async fn weather_tool_component_moves_from_loading_to_final() {
        let adapter = StreamAdapter::new(default_handlers());
        let run = adapter.start(events_call(vec![
            model_end_with_tool("weather-data"),
            tools_end(json!({"temp": 72})),
        ]));

        let updates = run.ui.collect_updates().await;
        let tool_states: Vec<(bool, Option<Value>)> = updates
            .iter()
            .filter_map(|u| match u {
                UiUpdate::Appended { fragment: Fragment::Tool(c), .. }
                | UiUpdate::Replaced { fragment: Fragment::Tool(c), .. } => Some((c.is_loading(), c.payload())),
                _ => None,
            })
            .collect();
        assert_eq!(tool_states, vec![(true, None), (false, Some(json!({"temp": 72})))]);
        assert_eq!(
            updates.iter().filter(|u| matches!(u, UiUpdate::Appended { .. })).count(),
            1
        );
        assert_eq!(
            run.result.wait().await.expect("result"),
            Some(json!({"tool_result": {"temp": 72}}))
        );
    }

    #[tokio::test]
    async fn repeated_tool_calls_activate_one_component() {
        let adapter = StreamAdapter::new(default_handlers());
        let run = adapter.start(events_call(vec![
            model_end_with_tool("weather-data"),
            model_end_with_tool("github-repo"),
            model_end_with_tool("weather-data"),
            tools_end(json!({"temp": 72})),
        ]));
        let view = run.ui.collect().await;
        assert_eq!(view.len(), 1);
        assert!(matches!(
            &view.fragments()[0].fragment,
            Fragment::Tool(c) if c.kind == ToolKind::WeatherData && !c.is_loading()
        ));
    }

    #[tokio::test]
    async fn text_chunks_for_one_run_share_one_fragment() {
        let adapter = StreamAdapter::new(default_handlers());
        let run = adapter.start(events_call(vec![
            text_chunk("r1", "Hel"),
            text_chunk("r1", "lo "),
            text_chunk("r1", "world"),
        ]));
        let updates = run.ui.collect_updates().await;
        let counts = close_counts(&updates);
        assert_eq!(counts.len(), 1);
        assert!(counts.values().all(|closes| *closes == 1));

        let mut view = crate::ui::UiView::default();
        updates.iter().for_each(|u| view.apply(u));
        assert_eq!(view.fragments()[0].fragment, Fragment::StreamingText("Hello world".into()));
        assert!(view.fragments()[0].closed);
    }

    #[tokio::test]
    async fn every_opened_stream_is_closed_exactly_once() {
        let adapter = StreamAdapter::new(default_handlers());
        let run = adapter.start(events_call(vec![
            text_chunk("r1", "a"),
            text_chunk("r2", "b"),
            model_end_with_tool("invoice-parser"),
            text_chunk("r3", "c"),
            text_chunk("r1", "d"),
        ]));
        let updates = run.ui.collect_updates().await;
        let counts = close_counts(&updates);
        assert_eq!(counts.len(), 4);
        assert!(counts.values().all(|closes| *closes == 1), "{counts:?}");
    }

    #[tokio::test]
    async fn sentinel_freezes_candidate_but_later_events_reach_handlers() {
        let seen = Arc::new(Mutex::new(0_usize));
        let counter = {
            let seen = seen.clone();
            fn_handler("count", move |_event, _ctx| {
                *seen.lock().expect("count") += 1;
                Ok(())
            })
        };
        let adapter = StreamAdapter::new(vec![counter]);
        let run = adapter.start(events_call(vec![
            StreamEvent::new(EventKind::ChainStart, TOP_LEVEL_GRAPH, "g"),
            sentinel(json!([{"invoke_model": {"result": "hi"}}])),
            StreamEvent::new(EventKind::ChainEnd, "late", "g").with_output(json!("late-1")),
            StreamEvent::new(EventKind::ChainEnd, "later", "g").with_output(json!("late-2")),
        ]));
        drop(run.ui);
        assert_eq!(
            run.result.wait().await.expect("result"),
            Some(json!([{"invoke_model": {"result": "hi"}}]))
        );
        assert_eq!(*seen.lock().expect("count"), 4);
    }

    #[tokio::test]
    async fn event_sentinel_predicate_is_configurable() {
        let adapter = StreamAdapter::new(Vec::new()).terminal_predicate(TerminalPredicate::EventSentinel {
            name: "outer".into(),
            kind: EventKind::ChainEnd,
        });
        let run = adapter.start(events_call(vec![
            StreamEvent::new(EventKind::ChainEnd, "outer", "o").with_output(json!(1)),
            StreamEvent::new(EventKind::ChainEnd, "outer", "o2").with_output(json!(2)),
        ]));
        drop(run.ui);
        assert_eq!(run.result.wait().await.expect("result"), Some(json!(1)));
    }

    #[tokio::test]
    async fn empty_sequence_closes_ui_and_resolves_empty() {
        let adapter = StreamAdapter::new(default_handlers());
        let run = adapter.start(events_call(Vec::new()));
        assert!(run.ui.collect().await.is_empty());
        assert_eq!(run.result.wait().await.expect("result"), None);
    }

    #[tokio::test]
    async fn result_waits_for_the_stream_to_end() {
        let (tx, rx) = futures::channel::mpsc::unbounded::<Result<StreamEvent, SourceError>>();
        let adapter = StreamAdapter::new(default_handlers());
        let run = adapter.start(async move { Ok(Box::pin(rx) as EventStream) });
        drop(run.ui);

        tx.unbounded_send(Ok(sentinel(json!({"done": true})))).expect("send");
        let waiter = tokio::spawn(run.result.wait());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(tx);
        let value = waiter.await.expect("join").expect("result");
        assert_eq!(value, Some(json!({"done": true})));
    }

    #[tokio::test]
    async fn handler_error_fails_turn_and_still_closes_streams() {
        let mut handlers = default_handlers();
        handlers.push(fn_handler("strict", |event, _ctx| {
            if event.run_id == "boom" {
                return Err(HandlerError::failed("unexpected event"));
            }
            Ok(())
        }));
        let adapter = StreamAdapter::new(handlers);
        let run = adapter.start(events_call(vec![
            text_chunk("r1", "partial"),
            model_end_with_tool("weather-data"),
            StreamEvent::new(EventKind::ChainStart, "x", "boom"),
            text_chunk("r1", " never"),
        ]));

        let updates = run.ui.collect_updates().await;
        let counts = close_counts(&updates);
        assert_eq!(counts.len(), 2);
        assert!(counts.values().all(|closes| *closes == 1));
        let mut view = crate::ui::UiView::default();
        updates.iter().for_each(|u| view.apply(u));
        assert_eq!(view.fragments()[0].fragment, Fragment::StreamingText("partial".into()));

        let err = run.result.wait().await.expect_err("handler failure");
        assert!(matches!(
            err,
            GenUiError::TurnFailed(TurnFailure::Handler { handler, message })
                if handler == "strict" && message == "unexpected event"
        ));
    }

    #[tokio::test]
    async fn handler_panic_is_reported_and_streams_close() {
        let mut handlers = default_handlers();
        handlers.push(fn_handler("fragile", |event, _ctx| {
            if event.run_id == "boom" {
                panic!("bad state");
            }
            Ok(())
        }));
        let adapter = StreamAdapter::new(handlers);
        let run = adapter.start(events_call(vec![
            text_chunk("r1", "x"),
            StreamEvent::new(EventKind::ChainStart, "x", "boom"),
        ]));
        let view = run.ui.collect().await;
        assert!(view.fragments().iter().all(|f| f.closed));
        let err = run.result.wait().await.expect_err("panic");
        assert!(matches!(
            err,
            GenUiError::TurnFailed(TurnFailure::Handler { message, .. }) if message.contains("bad state")
        ));
    }

    #[tokio::test]
    async fn source_start_failure_resolves_with_error_and_empty_ui() {
        let adapter = StreamAdapter::new(default_handlers());
        let run = adapter.start(async {
            Err::<EventStream, _>(SourceError::remote("http://agent", "unavailable", Some(503)))
        });
        assert!(run.ui.collect().await.is_empty());
        assert!(matches!(
            run.result.wait().await,
            Err(GenUiError::TurnFailed(TurnFailure::Remote { status_code: Some(503), .. }))
        ));
    }

    #[tokio::test]
    async fn mid_stream_failure_keeps_partial_ui() {
        let adapter = StreamAdapter::new(default_handlers());
        let run = adapter.start(async {
            let items = vec![
                Ok(text_chunk("r1", "so far")),
                Err(SourceError::transport("http://agent", "connection reset")),
                Ok(text_chunk("r1", " lost")),
            ];
            Ok(Box::pin(futures::stream::iter(items)) as EventStream)
        });
        let view = run.ui.collect().await;
        assert_eq!(view.len(), 1);
        assert_eq!(view.fragments()[0].fragment, Fragment::StreamingText("so far".into()));
        assert!(view.fragments()[0].closed);
        assert!(matches!(
            run.result.wait().await,
            Err(GenUiError::TurnFailed(TurnFailure::Transport { .. }))
        ));
    }

    #[tokio::test]
    async fn abort_stops_pending_stream_and_closes_everything() {
        let (tx, rx) = futures::channel::mpsc::unbounded::<Result<StreamEvent, SourceError>>();
        let adapter = StreamAdapter::new(default_handlers());
        let mut run = adapter.start(async move { Ok(Box::pin(rx) as EventStream) });

        tx.unbounded_send(Ok(text_chunk("r1", "hi"))).expect("send");
        let first = run.ui.next_update().await.expect("appended");
        assert!(matches!(first, UiUpdate::Appended { .. }));
        run.abort.abort();

        let view = run.ui.collect().await;
        assert_eq!(view.len(), 1);
        assert!(view.fragments()[0].closed);
        assert!(matches!(
            run.result.wait().await,
            Err(GenUiError::TurnFailed(TurnFailure::Cancelled))
        ));
        drop(tx);
    }

    #[tokio::test]
    async fn abort_resolves_while_reader_is_not_draining() {
        let adapter = StreamAdapter::new(default_handlers())
            .options(AdapterOptions::default().ui_buffer_capacity(1))
            .expect("options");
        let chunks = (0..5).map(|i| text_chunk("r1", &format!("chunk {i} "))).collect();
        let run = adapter.start(events_call(chunks));
        let _stalled_reader = run.ui;

        tokio::time::sleep(Duration::from_millis(20)).await;
        run.abort.abort();
        let result = tokio::time::timeout(Duration::from_secs(2), run.result.wait())
            .await
            .expect("result resolves after abort");
        assert!(matches!(result, Err(GenUiError::TurnFailed(TurnFailure::Cancelled))));
    }

    struct StuckHandler;

    #[async_trait::async_trait]
    impl EventHandler for StuckHandler {
        fn name(&self) -> &str {
            "stuck"
        }

        async fn handle(&self, _event: &StreamEvent, _ctx: &mut HandlerContext) -> Result<(), HandlerError> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn abort_interrupts_a_handler_that_never_returns() {
        let adapter = StreamAdapter::new(vec![Arc::new(StuckHandler)]);
        let run = adapter.start(events_call(vec![StreamEvent::new(EventKind::ChainStart, "x", "1")]));

        tokio::time::sleep(Duration::from_millis(20)).await;
        run.abort.abort();
        let view = tokio::time::timeout(Duration::from_secs(2), run.ui.collect())
            .await
            .expect("ui closes after abort");
        assert!(view.is_empty());
        assert!(matches!(
            run.result.wait().await,
            Err(GenUiError::TurnFailed(TurnFailure::Cancelled))
        ));
    }

    #[test]
    fn payload_sentinel_requires_name_and_kind() {
        let predicate = TerminalPredicate::default();
        assert!(predicate.matches(&sentinel(json!(null))));
        let nested = StreamEvent::new(EventKind::ChainStream, "sub", "s")
            .with_chunk(json!({"name": "sub_graph", "event": "on_chain_end"}));
        assert!(!predicate.matches(&nested));
        let start = StreamEvent::new(EventKind::ChainStream, "g", "s")
            .with_chunk(json!({"name": TOP_LEVEL_GRAPH, "event": "on_chain_start"}));
        assert!(!predicate.matches(&start));
        assert!(TerminalPredicate::custom(|e| e.name == "sub").matches(&nested));
    }

    #[test]
    fn zero_capacity_options_are_rejected() {
        let result = StreamAdapter::new(Vec::new()).options(AdapterOptions::default().ui_buffer_capacity(0));
        assert!(matches!(result, Err(GenUiError::Validation(_))));
    }
}
