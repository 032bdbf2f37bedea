use std::collections::VecDeque;
use std::pin::Pin;

use futures::StreamExt as _;
use futures::stream;
use serde_json::{Value, json};
use tracing::debug;

use crate::content::RunnableInput;
use crate::errors::{GenUiError, SourceError};
use crate::event::StreamEvent;
use crate::source::{EventSource, EventStream};

use super::config::RemoteConfig;
use super::options::RunConfig;
use super::transport::{FrameOutcome, SseDecoder, map_frame};

type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static>>;

/// Client for an agent served as a remote runnable, streamed through its
/// `stream_events` endpoint.
pub struct RemoteRunnable {
    client: reqwest::Client,
    endpoint: String,
    run_config: RunConfig,
}

impl RemoteRunnable {
    pub fn new(config: RemoteConfig) -> Result<Self, GenUiError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenUiError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.stream_events_url(),
            run_config: RunConfig::default(),
        })
    }

    /// Creates a client from `GENUI_API_URL` / `GENUI_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, GenUiError> {
        Self::new(RemoteConfig::from_env()?)
    }

    /// Sets the `config` object sent with every run.
    pub fn run_config(mut self, run_config: RunConfig) -> Self {
        self.run_config = run_config;
        self
    }
}

#[async_trait::async_trait]
impl EventSource for RemoteRunnable {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn stream_events(&self, input: RunnableInput) -> Result<EventStream, SourceError> {
        let body = build_request_body(&input, &self.run_config)
            .map_err(|e| SourceError::protocol(&self.endpoint, format!("failed to encode input: {e}")))?;
        debug!(endpoint = %self.endpoint, messages = input.input.len(), "starting remote event stream");

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| SourceError::transport(&self.endpoint, format!("request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SourceError::remote(
                &self.endpoint,
                format!("stream_events request failed with status {status}: {body}"),
                Some(status.as_u16()),
            ));
        }

        let bytes_stream: ByteStream = Box::pin(response.bytes_stream());
        Ok(Box::pin(remote_event_stream(self.endpoint.clone(), bytes_stream)))
    }
}

pub(crate) fn build_request_body(
    input: &RunnableInput,
    run_config: &RunConfig,
) -> Result<Value, serde_json::Error> {
    Ok(json!({
        "input": serde_json::to_value(input)?,
        "config": serde_json::to_value(run_config)?,
        "kwargs": {},
        "diff": false,
    }))
}

fn remote_event_stream(
    endpoint: String,
    bytes_stream: ByteStream,
) -> impl futures::Stream<Item = Result<StreamEvent, SourceError>> + Send + 'static {
    struct State {
        endpoint: String,
        bytes_stream: ByteStream,
        decoder: SseDecoder,
        pending: VecDeque<StreamEvent>,
        done: bool,
    }

    stream::try_unfold(
        State {
            endpoint,
            bytes_stream,
            decoder: SseDecoder::default(),
            pending: VecDeque::new(),
            done: false,
        },
        |mut state| async move {
            loop {
                if let Some(event) = state.pending.pop_front() {
                    return Ok(Some((event, state)));
                }
                if state.done {
                    return Ok(None);
                }

                match state.bytes_stream.next().await {
                    Some(Ok(chunk)) => {
                        for frame in state.decoder.push_chunk(&chunk) {
                            match map_frame(&state.endpoint, &frame)? {
                                FrameOutcome::Event(event) => state.pending.push_back(*event),
                                FrameOutcome::End => {
                                    state.done = true;
                                    break;
                                }
                                FrameOutcome::Skip => {}
                            }
                        }
                    }
                    Some(Err(e)) => {
                        return Err(SourceError::transport(
                            state.endpoint,
                            format!("event stream read failed: {e}"),
                        ));
                    }
                    None => {
                        if let Some(frame) = state.decoder.finish()
                            && let FrameOutcome::Event(event) = map_frame(&state.endpoint, &frame)?
                        {
                            state.pending.push_back(*event);
                        }
                        state.done = true;
                    }
                }
            }
        },
    )
}
