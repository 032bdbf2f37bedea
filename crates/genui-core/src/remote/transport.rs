use serde_json::Value;

use crate::errors::SourceError;
use crate::event::StreamEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

#[derive(Default)]
pub(crate) struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some((idx, delim_len)) = find_frame_delimiter(&self.buf) {
            let frame_bytes = self.buf[..idx].to_vec();
            self.buf.drain(..idx + delim_len);
            if let Some(frame) = parse_sse_frame(&frame_bytes) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Parses whatever is left once the byte stream ended without a trailing
    /// blank line.
    pub fn finish(&mut self) -> Option<SseFrame> {
        let rest = std::mem::take(&mut self.buf);
        parse_sse_frame(&rest)
    }
}

fn find_frame_delimiter(buf: &[u8]) -> Option<(usize, usize)> {
    let mut i = 0;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
        if i + 3 < buf.len()
            && buf[i] == b'\r'
            && buf[i + 1] == b'\n'
            && buf[i + 2] == b'\r'
            && buf[i + 3] == b'\n'
        {
            return Some((i, 4));
        }
        i += 1;
    }
    None
}

fn parse_sse_frame(bytes: &[u8]) -> Option<SseFrame> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    let mut event: Option<String> = None;
    let mut data_lines: Vec<String> = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("event:") {
            event = Some(rest.trim_start().to_string());
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.trim_start().to_string());
        }
    }
    if event.is_none() && data_lines.is_empty() {
        return None;
    }
    Some(SseFrame {
        event,
        data: data_lines.join("\n"),
    })
}

/// What one server-sent frame means for the event stream.
#[derive(Debug, PartialEq)]
pub(crate) enum FrameOutcome {
    Event(Box<StreamEvent>),
    End,
    Skip,
}

/// Maps a runnable `stream_events` frame: `data` frames carry one event,
/// `error` frames end the stream with a remote error, `end` closes it.
pub(crate) fn map_frame(endpoint: &str, frame: &SseFrame) -> Result<FrameOutcome, SourceError> {
    match frame.event.as_deref() {
        Some("end") => Ok(FrameOutcome::End),
        Some("error") => Err(remote_error(endpoint, &frame.data)),
        Some("data") | None => {
            if frame.data.trim().is_empty() {
                return Ok(FrameOutcome::Skip);
            }
            let value: Value = serde_json::from_str(&frame.data).map_err(|e| {
                SourceError::protocol(endpoint, format!("invalid SSE JSON frame: {e}"))
            })?;
            if !value.is_object() {
                return Err(SourceError::protocol(endpoint, "stream event is not a JSON object"));
            }
            let event: StreamEvent = serde_json::from_value(value).map_err(|e| {
                SourceError::protocol(endpoint, format!("invalid stream event: {e}"))
            })?;
            Ok(FrameOutcome::Event(Box::new(event)))
        }
        Some(_) => Ok(FrameOutcome::Skip),
    }
}

fn remote_error(endpoint: &str, data: &str) -> SourceError {
    let parsed: Option<Value> = serde_json::from_str(data).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| {
            if data.trim().is_empty() {
                "remote agent reported an error".to_string()
            } else {
                data.to_string()
            }
        });
    let status_code = parsed
        .as_ref()
        .and_then(|v| v.get("status_code"))
        .and_then(Value::as_u64)
        .and_then(|code| u16::try_from(code).ok());
    SourceError::remote(endpoint, message, status_code)
}
