mod documents;
mod questions;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use toolhost_core::{DocumentError, SheetError, StatusParseError};
use tracing::{debug, error, warn};

pub use documents::DocumentTools;
pub use questions::{QuestionTools, NOT_CONFIGURED, SPREADSHEET_ID_MISSING};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Envelope returned for every tool call: a single text block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock {
                kind: "text".to_string(),
                text: text.into(),
            }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }

    pub fn text_content(&self) -> &str {
        self.content
            .first()
            .map(|block| block.text.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("{0}")]
    NotConfigured(String),
    #[error(transparent)]
    Sheet(#[from] SheetError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    InvalidStatus(#[from] StatusParseError),
}

/// A closed family of tools served by one process.
pub trait ToolSet: Send + Sync {
    fn definitions(&self) -> Vec<ToolDefinition>;
    fn call(&self, name: &str, arguments: Value) -> Result<ToolResult, ToolError>;
}

/// Run one tool call and fold every failure, panics included, into an envelope.
pub fn dispatch(tools: &dyn ToolSet, name: &str, arguments: Option<Value>) -> ToolResult {
    let arguments = arguments
        .filter(|args| !args.is_null())
        .unwrap_or_else(|| json!({}));

    debug!(tool = name, "calling tool");

    match panic::catch_unwind(AssertUnwindSafe(|| tools.call(name, arguments))) {
        Ok(Ok(result)) => result,
        Ok(Err(ToolError::UnknownTool(tool))) => {
            warn!(tool = %tool, "unknown tool requested");
            ToolResult::error(format!("Unknown tool: {}", tool))
        }
        Ok(Err(e)) => {
            warn!(tool = name, error = %e, "tool call failed");
            ToolResult::error(format!("Error: {}", e))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(tool = name, panic = %message, "tool handler panicked");
            ToolResult::error(format!("Error: tool '{}' panicked: {}", name, message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

pub(crate) fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}
