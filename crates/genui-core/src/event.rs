use std::fmt;

use serde_json::{Map, Value};

/// Phase suffix of an event kind (`on_<component>_<phase>`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EventPhase {
    Start,
    Stream,
    End,
}

/// Kind tag of a stream event, e.g. `on_chain_end` or `on_chat_model_stream`.
///
/// Unknown kinds are kept verbatim in [`EventKind::Other`] so new remote event
/// types never fail deserialization.
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    ChainStart,
    ChainStream,
    ChainEnd,
    ChatModelStart,
    ChatModelStream,
    ChatModelEnd,
    LlmStart,
    LlmStream,
    LlmEnd,
    ToolStart,
    ToolEnd,
    RetrieverStart,
    RetrieverEnd,
    PromptStart,
    PromptEnd,
    ParserStart,
    ParserStream,
    ParserEnd,
    Other(String),
}

impl EventKind {
    /// Returns the wire tag for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ChainStart => "on_chain_start",
            Self::ChainStream => "on_chain_stream",
            Self::ChainEnd => "on_chain_end",
            Self::ChatModelStart => "on_chat_model_start",
            Self::ChatModelStream => "on_chat_model_stream",
            Self::ChatModelEnd => "on_chat_model_end",
            Self::LlmStart => "on_llm_start",
            Self::LlmStream => "on_llm_stream",
            Self::LlmEnd => "on_llm_end",
            Self::ToolStart => "on_tool_start",
            Self::ToolEnd => "on_tool_end",
            Self::RetrieverStart => "on_retriever_start",
            Self::RetrieverEnd => "on_retriever_end",
            Self::PromptStart => "on_prompt_start",
            Self::PromptEnd => "on_prompt_end",
            Self::ParserStart => "on_parser_start",
            Self::ParserStream => "on_parser_stream",
            Self::ParserEnd => "on_parser_end",
            Self::Other(tag) => tag,
        }
    }

    /// Returns the phase encoded in the tag suffix, if any.
    pub fn phase(&self) -> Option<EventPhase> {
        let tag = self.as_str();
        if tag.ends_with("_start") {
            Some(EventPhase::Start)
        } else if tag.ends_with("_stream") {
            Some(EventPhase::Stream)
        } else if tag.ends_with("_end") {
            Some(EventPhase::End)
        } else {
            None
        }
    }
}

impl From<String> for EventKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "on_chain_start" => Self::ChainStart,
            "on_chain_stream" => Self::ChainStream,
            "on_chain_end" => Self::ChainEnd,
            "on_chat_model_start" => Self::ChatModelStart,
            "on_chat_model_stream" => Self::ChatModelStream,
            "on_chat_model_end" => Self::ChatModelEnd,
            "on_llm_start" => Self::LlmStart,
            "on_llm_stream" => Self::LlmStream,
            "on_llm_end" => Self::LlmEnd,
            "on_tool_start" => Self::ToolStart,
            "on_tool_end" => Self::ToolEnd,
            "on_retriever_start" => Self::RetrieverStart,
            "on_retriever_end" => Self::RetrieverEnd,
            "on_prompt_start" => Self::PromptStart,
            "on_prompt_end" => Self::PromptEnd,
            "on_parser_start" => Self::ParserStart,
            "on_parser_stream" => Self::ParserStream,
            "on_parser_end" => Self::ParserEnd,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for EventKind {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<EventKind> for String {
    fn from(value: EventKind) -> Self {
        match value {
            EventKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl Default for EventKind {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a stream event. Any field may be absent; `null` is read as absent.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EventData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk: Option<Value>,
}

/// One tagged event emitted by the remote agent while it runs a turn.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StreamEvent {
    #[serde(default)]
    pub event: EventKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub run_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub data: EventData,
}

impl StreamEvent {
    pub fn new(event: impl Into<EventKind>, name: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            name: name.into(),
            run_id: run_id.into(),
            ..Self::default()
        }
    }

    pub fn with_output(mut self, output: Value) -> Self {
        self.data.output = Some(output);
        self
    }

    pub fn with_chunk(mut self, chunk: Value) -> Self {
        self.data.chunk = Some(chunk);
        self
    }

    /// Returns true when this is an end-phase event emitted by `name`.
    ///
    /// Any `_end` kind counts (`on_chain_end`, `on_chat_model_end`, ...), not
    /// only three-part kinds.
    pub fn is_end_of(&self, name: &str) -> bool {
        self.event.phase() == Some(EventPhase::End) && self.name == name
    }

    /// Output payload when it is a JSON object.
    pub fn output_object(&self) -> Option<&Map<String, Value>> {
        self.data.output.as_ref().and_then(Value::as_object)
    }

    /// Chunk payload when it is a JSON object.
    pub fn chunk_object(&self) -> Option<&Map<String, Value>> {
        self.data.chunk.as_ref().and_then(Value::as_object)
    }

    /// Value a turn resolves to when this event is its final event: the
    /// structured output if present, else the chunk's nested `data.output`.
    pub fn final_value(&self) -> Option<Value> {
        if let Some(output) = self.data.output.as_ref().filter(|v| is_truthy(v)) {
            return Some(output.clone());
        }
        self.data
            .chunk
            .as_ref()
            .and_then(|chunk| chunk.get("data"))
            .and_then(|data| data.get("output"))
            .filter(|v| is_truthy(v))
            .cloned()
    }
}

/// Loose presence test shared by result extraction and history folding:
/// `null`, `false`, `0` and `""` count as missing.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}
