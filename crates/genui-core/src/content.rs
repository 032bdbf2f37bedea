use std::fmt;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

use crate::errors::GenUiError;
use crate::history::ChatHistory;

/// Author of a conversation message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Human,
    Ai,
    System,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Ai => "ai",
            Self::System => "system",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File attached to a turn, base64-encoded for transfer.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FileAttachment {
    /// Standard base64 of the file bytes.
    pub base64: String,
    /// MIME subtype of the file, e.g. `png` or `jpeg`.
    pub extension: String,
}

impl FileAttachment {
    pub fn from_bytes(bytes: &[u8], extension: impl Into<String>) -> Self {
        Self {
            base64: B64.encode(bytes),
            extension: extension.into().to_ascii_lowercase(),
        }
    }

    /// Reads and encodes a file; the type tag comes from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, GenUiError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(mime_subtype)
            .ok_or_else(|| {
                GenUiError::Attachment(format!("{} has no file extension", path.display()))
            })?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| GenUiError::Attachment(format!("failed to read {}: {e}", path.display())))?;
        if bytes.is_empty() {
            return Err(GenUiError::Attachment(format!("{} is empty", path.display())));
        }
        Ok(Self::from_bytes(&bytes, extension))
    }

    /// `data:` URL embedding the file as an image.
    pub fn data_url(&self) -> String {
        format!("data:image/{};base64,{}", self.extension, self.base64)
    }

    /// Decoded size in bytes.
    pub fn decoded_len(&self) -> Result<usize, GenUiError> {
        B64.decode(&self.base64)
            .map(|bytes| bytes.len())
            .map_err(|e| GenUiError::Attachment(format!("invalid base64 payload: {e}")))
    }
}

fn mime_subtype(extension: &str) -> String {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" => "jpeg".to_string(),
        "svg" => "svg+xml".to_string(),
        "tif" => "tiff".to_string(),
        other => other.to_string(),
    }
}

/// Message content: plain text, or text plus attachments.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// One message as the remote agent expects it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "type")]
    pub role: ChatRole,
    pub content: MessageContent,
}

/// Input record sent to the remote agent.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunnableInput {
    pub input: Vec<ChatMessage>,
}

/// Everything the user submits for one turn.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnInput {
    pub message: String,
    pub history: ChatHistory,
    pub file: Option<FileAttachment>,
}

impl TurnInput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            history: ChatHistory::default(),
            file: None,
        }
    }

    pub fn history(mut self, history: ChatHistory) -> Self {
        self.history = history;
        self
    }

    pub fn file(mut self, file: FileAttachment) -> Self {
        self.file = Some(file);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), GenUiError> {
        if self.message.trim().is_empty() && self.file.is_none() {
            return Err(GenUiError::Validation(
                "a turn needs a message or an attached file".into(),
            ));
        }
        if let Some(file) = &self.file
            && (file.base64.is_empty() || file.extension.is_empty())
        {
            return Err(GenUiError::Validation(
                "attached file needs a payload and a type".into(),
            ));
        }
        Ok(())
    }

    /// History messages followed by the new human message.
    pub fn to_runnable_input(&self) -> RunnableInput {
        let mut input: Vec<ChatMessage> = self
            .history
            .entries()
            .iter()
            .map(|(role, content)| ChatMessage {
                role: *role,
                content: MessageContent::Text(content.clone()),
            })
            .collect();

        let content = match &self.file {
            None => MessageContent::Text(self.message.clone()),
            Some(file) => MessageContent::Parts(vec![
                ContentPart::Text {
                    text: self.message.clone(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: file.data_url(),
                    },
                },
            ]),
        };
        input.push(ChatMessage {
            role: ChatRole::Human,
            content,
        });
        RunnableInput { input }
    }
}
