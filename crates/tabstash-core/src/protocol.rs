//! Request/response messages
//!
//! A request names an operation and carries an optional payload object:
//!
//! ```json
//! { "operation": "rename", "payload": { "oldName": "A", "newName": "B" } }
//! ```
//!
//! Every request is answered with `{ "ok": bool, "data"?: ..., "error"?: "..." }`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tabstash_session::{ImportMode, Snapshot};

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub operation: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl Request {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            payload: Value::Null,
        }
    }

    pub fn with_payload(operation: impl Into<String>, payload: Value) -> Self {
        Self {
            operation: operation.into(),
            payload,
        }
    }

    /// Decode the payload for the operation. A missing payload reads as an
    /// empty object.
    pub(crate) fn payload<T: DeserializeOwned>(&self) -> Result<T> {
        let value = match &self.payload {
            Value::Null => Value::Object(Default::default()),
            other => other.clone(),
        };
        serde_json::from_value(value).map_err(|e| CoreError::InvalidPayload {
            operation: self.operation.clone(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: String) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Operations the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Save,
    List,
    Get,
    AddToWindow,
    ReplaceWindow,
    Delete,
    Rename,
    Reorder,
    Import,
    Export,
    AddTab,
    Refresh,
    Clear,
}

impl Operation {
    pub const ALL: [Operation; 13] = [
        Operation::Save,
        Operation::List,
        Operation::Get,
        Operation::AddToWindow,
        Operation::ReplaceWindow,
        Operation::Delete,
        Operation::Rename,
        Operation::Reorder,
        Operation::Import,
        Operation::Export,
        Operation::AddTab,
        Operation::Refresh,
        Operation::Clear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Save => "save",
            Operation::List => "list",
            Operation::Get => "get",
            Operation::AddToWindow => "add-to-window",
            Operation::ReplaceWindow => "replace-window",
            Operation::Delete => "delete",
            Operation::Rename => "rename",
            Operation::Reorder => "reorder",
            Operation::Import => "import",
            Operation::Export => "export",
            Operation::AddTab => "add-tab",
            Operation::Refresh => "refresh",
            Operation::Clear => "clear",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Operation {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| CoreError::UnknownOperation(s.to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SavePayload {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamePayload {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RenamePayload {
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReorderPayload {
    pub order: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImportPayload {
    #[serde(default)]
    pub sessions: Vec<Snapshot>,
    #[serde(default)]
    pub mode: ImportMode,
}
