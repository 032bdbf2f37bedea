use serde_json::Value;

use crate::content::ChatRole;
use crate::event::is_truthy;
use crate::handlers::{MODEL_NODE, TOOLS_NODE};

/// Conversation so far, as `(role, content)` pairs.
///
/// Never mutated in place: folding a finished turn returns a new history.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ChatHistory {
    entries: Vec<(ChatRole, String)>,
}

/// How a turn's final value extends the history.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Fold {
    Exchange(String),
    HumanOnly,
    Unchanged,
}

impl ChatHistory {
    pub fn entries(&self) -> &[(ChatRole, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns this history with one more entry.
    pub fn push(mut self, role: ChatRole, content: impl Into<String>) -> Self {
        self.entries.push((role, content.into()));
        self
    }

    /// Returns the history after a turn that sent `message` and resolved to
    /// `final_value`.
    ///
    /// A model text answer or a tool result is recorded as the AI reply. A
    /// graph result with neither records only the human message; anything
    /// else leaves the history untouched.
    pub fn with_turn(&self, message: &str, final_value: Option<&Value>) -> ChatHistory {
        match fold(final_value) {
            Fold::Exchange(reply) => self
                .clone()
                .push(ChatRole::Human, message)
                .push(ChatRole::Ai, reply),
            Fold::HumanOnly => self.clone().push(ChatRole::Human, message),
            Fold::Unchanged => {
                tracing::debug!("turn result not recorded in history");
                self.clone()
            }
        }
    }
}

fn fold(final_value: Option<&Value>) -> Fold {
    match final_value {
        Some(Value::Array(steps)) => {
            if let Some(result) = model_result(steps.first()) {
                Fold::Exchange(result)
            } else if let Some(tools) = steps.get(1).and_then(|step| step.get(TOOLS_NODE)).filter(|v| is_truthy(v)) {
                Fold::Exchange(tool_reply(tools))
            } else {
                Fold::HumanOnly
            }
        }
        Some(value @ Value::Object(_)) => {
            if let Some(result) = model_result(Some(value)) {
                Fold::Exchange(result)
            } else if let Some(tools) = value.get(TOOLS_NODE).filter(|t| t.get("tool_result").is_some()) {
                Fold::Exchange(tool_reply(tools))
            } else {
                Fold::Unchanged
            }
        }
        _ => Fold::Unchanged,
    }
}

fn model_result(step: Option<&Value>) -> Option<String> {
    let result = step?.get(MODEL_NODE)?.get("result")?;
    if !is_truthy(result) {
        return None;
    }
    Some(match result {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}

fn tool_reply(tools: &Value) -> String {
    let result = tools.get("tool_result").unwrap_or(&Value::Null);
    format!("Tool result: {result}")
}
