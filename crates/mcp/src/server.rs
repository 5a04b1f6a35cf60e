use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info};

use crate::tools::{dispatch, ToolSet};
use crate::transport::{
    JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR,
};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const PROTOCOL_VERSION: &str = "2024-11-05";

pub const SHEETS_SERVER_NAME: &str = "google-sheets";
pub const DOCUMENTS_SERVER_NAME: &str = "knowledge-base";

pub struct McpServer {
    name: String,
    tools: Box<dyn ToolSet>,
    initialized: AtomicBool,
}

impl McpServer {
    pub fn new(name: impl Into<String>, tools: impl ToolSet + 'static) -> Self {
        Self {
            name: name.into(),
            tools: Box::new(tools),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Handle one JSON-RPC message. Returns `None` for notifications.
    pub fn handle_request(&self, input: &str) -> Option<String> {
        let request: JsonRpcRequest = match serde_json::from_str(input) {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "unparseable message");
                return encode(&JsonRpcResponse::error(None, PARSE_ERROR, "Parse error"));
            }
        };

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }

        let response = match request.method.as_str() {
            "initialized" => {
                self.handle_notification(&request);
                return None;
            }
            "initialize" => self.handle_initialize(&request),
            "tools/list" => self.handle_tools_list(&request),
            "tools/call" => self.handle_tools_call(&request),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        encode(&response)
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "initialized" | "notifications/initialized" => {
                self.initialized.store(true, Ordering::SeqCst);
                info!(server = %self.name, "client initialized");
            }
            other => debug!(method = other, "ignoring notification"),
        }
    }

    fn handle_initialize(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(
            request.id.clone(),
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": self.name,
                    "version": SERVER_VERSION
                }
            }),
        )
    }

    fn handle_tools_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let tools = self.tools.definitions();
        JsonRpcResponse::success(request.id.clone(), json!({ "tools": tools }))
    }

    fn handle_tools_call(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let params = match &request.params {
            Some(p) if p.is_object() => p,
            _ => {
                return JsonRpcResponse::error(request.id.clone(), INVALID_PARAMS, "Missing params")
            }
        };

        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return JsonRpcResponse::error(
                request.id.clone(),
                INVALID_PARAMS,
                "Missing tool name",
            );
        };

        let arguments = params.get("arguments").cloned();
        let result = dispatch(self.tools.as_ref(), name, arguments);

        match serde_json::to_value(&result) {
            Ok(value) => JsonRpcResponse::success(request.id.clone(), value),
            Err(e) => JsonRpcResponse::error(request.id.clone(), INTERNAL_ERROR, e.to_string()),
        }
    }
}

pub(crate) fn encode(response: &JsonRpcResponse) -> Option<String> {
    serde_json::to_string(response)
        .map_err(|e| error!(error = %e, "failed to encode response"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ToolDefinition, ToolError, ToolResult};

    struct NoTools;

    impl ToolSet for NoTools {
        fn definitions(&self) -> Vec<ToolDefinition> {
            Vec::new()
        }

        fn call(&self, name: &str, _arguments: Value) -> Result<ToolResult, ToolError> {
            Err(ToolError::UnknownTool(name.to_string()))
        }
    }

    #[test]
    fn initialized_notification_sets_flag() {
        let server = McpServer::new("test", NoTools);
        assert!(!server.is_initialized());

        let resp = server.handle_request(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#);

        assert!(resp.is_none());
        assert!(server.is_initialized());
    }

    #[test]
    fn other_notifications_are_ignored() {
        let server = McpServer::new("test", NoTools);
        let resp = server.handle_request(r#"{"jsonrpc":"2.0","method":"notifications/cancelled"}"#);

        assert!(resp.is_none());
    }

    #[test]
    fn tools_call_requires_a_name() {
        let server = McpServer::new("test", NoTools);
        let resp = server
            .handle_request(r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{}}"#)
            .unwrap();
        let json: Value = serde_json::from_str(&resp).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["error"]["code"], INVALID_PARAMS);
    }

    #[test]
    fn server_name_is_reported() {
        let server = McpServer::new(DOCUMENTS_SERVER_NAME, NoTools);
        let resp = server
            .handle_request(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .unwrap();
        let json: Value = serde_json::from_str(&resp).unwrap();

        assert_eq!(json["result"]["serverInfo"]["name"], "knowledge-base");
        assert_eq!(json["result"]["protocolVersion"], PROTOCOL_VERSION);
    }
}
