/// Errors returned by an event source before they are normalized into a turn
/// failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The remote agent answered with an application-level failure (HTTP
    /// status or an `error` frame in the event stream).
    #[error("remote error ({endpoint}): {message}")]
    Remote {
        endpoint: String,
        message: String,
        status_code: Option<u16>,
    },
    /// Connecting to or reading from the remote agent failed.
    #[error("transport error ({endpoint}): {message}")]
    Transport { endpoint: String, message: String },
    /// The remote agent produced bytes that are not a valid event stream.
    #[error("protocol error ({endpoint}): {message}")]
    Protocol { endpoint: String, message: String },
}

impl SourceError {
    /// Creates a remote-level error.
    pub fn remote(
        endpoint: impl Into<String>,
        message: impl Into<String>,
        status_code: Option<u16>,
    ) -> Self {
        Self::Remote {
            endpoint: endpoint.into(),
            message: message.into(),
            status_code,
        }
    }

    /// Creates a transport-level error.
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a protocol-level error.
    pub fn protocol(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Protocol {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Returns the endpoint associated with this error.
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Remote { endpoint, .. }
            | Self::Transport { endpoint, .. }
            | Self::Protocol { endpoint, .. } => endpoint,
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Remote { message, .. }
            | Self::Transport { message, .. }
            | Self::Protocol { message, .. } => message,
        }
    }
}

/// Error raised by an event handler while processing one event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    /// The handler could not apply an event it accepted.
    #[error("{0}")]
    Failed(String),
    /// A tool lookup failed in a way the handler chose not to skip.
    #[error(transparent)]
    Tool(#[from] ToolError),
}

impl HandlerError {
    /// Creates a generic handler failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Errors from the tool registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    /// No presentation component is registered for this tool tag.
    #[error("unknown tool kind: {0}")]
    UnknownKind(String),
}

/// Terminal failure of a turn, delivered through the deferred result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum TurnFailure {
    /// The remote agent reported a failure.
    #[error("remote failure ({endpoint}): {message}")]
    Remote {
        endpoint: String,
        message: String,
        status_code: Option<u16>,
    },
    /// The connection to the remote agent failed.
    #[error("transport failure ({endpoint}): {message}")]
    Transport { endpoint: String, message: String },
    /// The event stream was malformed.
    #[error("protocol failure: {message}")]
    Protocol { message: String },
    /// A handler returned an error or panicked.
    #[error("handler `{handler}` failed: {message}")]
    Handler { handler: String, message: String },
    /// The turn was aborted by the caller.
    #[error("turn cancelled")]
    Cancelled,
}

/// Top-level error type for the public API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenUiError {
    /// Invalid agent or client configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Invalid turn input.
    #[error("validation error: {0}")]
    Validation(String),
    /// Reading or encoding a file attachment failed.
    #[error("attachment error: {0}")]
    Attachment(String),
    /// Event source error surfaced outside a running turn.
    #[error(transparent)]
    Source(SourceError),
    /// Terminal failure returned from a started turn.
    #[error(transparent)]
    TurnFailed(TurnFailure),
    /// Internal protocol misuse or invariant violation.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl GenUiError {
    pub(crate) fn protocol_msg(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}

impl From<TurnFailure> for GenUiError {
    fn from(value: TurnFailure) -> Self {
        GenUiError::TurnFailed(value)
    }
}

impl From<SourceError> for GenUiError {
    fn from(value: SourceError) -> Self {
        GenUiError::Source(value)
    }
}

pub(crate) fn turn_failure_from_source_error(err: &SourceError) -> TurnFailure {
    match err {
        SourceError::Remote {
            endpoint,
            message,
            status_code,
        } => TurnFailure::Remote {
            endpoint: endpoint.clone(),
            message: message.clone(),
            status_code: *status_code,
        },
        SourceError::Transport { endpoint, message } => TurnFailure::Transport {
            endpoint: endpoint.clone(),
            message: message.clone(),
        },
        SourceError::Protocol { endpoint, message } => TurnFailure::Protocol {
            message: format!("endpoint={endpoint}: {message}"),
        },
    }
}
