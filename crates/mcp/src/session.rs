//! Line-delimited JSON-RPC session over async byte streams.
//!
//! One message is handled at a time. Tool handlers do blocking I/O, so each
//! message runs on the blocking pool while the loop awaits it.

use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::task;
use tracing::{debug, error};

use crate::server::{encode, McpServer};
use crate::transport::{JsonRpcResponse, INTERNAL_ERROR, PARSE_ERROR};

pub async fn serve<R, W>(server: Arc<McpServer>, mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(text) => text.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string(),
            Err(e) => {
                debug!(error = %e, "message is not valid UTF-8");
                let reply = encode(&JsonRpcResponse::error(None, PARSE_ERROR, "Parse error"));
                write_frame(&mut writer, reply).await?;
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let id = request_id(&line);
        let handler = Arc::clone(&server);
        let response = match task::spawn_blocking(move || handler.handle_request(&line)).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "request handler did not complete");
                id.and_then(|id| {
                    encode(&JsonRpcResponse::error(
                        Some(id),
                        INTERNAL_ERROR,
                        "Internal error: request handler did not complete",
                    ))
                })
            }
        };

        write_frame(&mut writer, response).await?;
    }

    debug!(server = server.name(), "input closed, ending session");
    Ok(())
}

pub async fn serve_stdio(server: Arc<McpServer>) -> Result<()> {
    serve(server, BufReader::new(io::stdin()), io::stdout()).await
}

/// The id of a request, if the line is an object carrying one.
fn request_id(line: &str) -> Option<Value> {
    serde_json::from_str::<Value>(line)
        .ok()
        .and_then(|message| message.get("id").cloned())
        .filter(|id| !id.is_null())
}

async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, frame: Option<String>) -> Result<()> {
    if let Some(frame) = frame {
        writer.write_all(frame.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ToolDefinition, ToolError, ToolResult, ToolSet};
    use serde_json::{json, Value};

    struct Flaky;

    impl ToolSet for Flaky {
        fn definitions(&self) -> Vec<ToolDefinition> {
            vec![ToolDefinition {
                name: "explode".to_string(),
                description: "Always panics".to_string(),
                input_schema: json!({ "type": "object", "properties": {} }),
            }]
        }

        fn call(&self, name: &str, _arguments: Value) -> Result<ToolResult, ToolError> {
            match name {
                "explode" => panic!("handler defect"),
                _ => Err(ToolError::UnknownTool(name.to_string())),
            }
        }
    }

    struct BrokenRegistry;

    impl ToolSet for BrokenRegistry {
        fn definitions(&self) -> Vec<ToolDefinition> {
            panic!("registry unavailable")
        }

        fn call(&self, name: &str, _arguments: Value) -> Result<ToolResult, ToolError> {
            Err(ToolError::UnknownTool(name.to_string()))
        }
    }

    fn responses(output: &[u8]) -> Vec<Value> {
        String::from_utf8_lossy(output)
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn answers_each_request_in_order() {
        let server = Arc::new(McpServer::new("test", Flaky));
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
        );
        let mut output = Vec::new();

        serve(server.clone(), input.as_bytes(), &mut output).await.unwrap();

        let replies = responses(&output);
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["id"], 1);
        assert_eq!(replies[1]["id"], 2);
        assert_eq!(replies[1]["result"]["tools"][0]["name"], "explode");
        assert!(server.is_initialized());
    }

    #[tokio::test]
    async fn survives_panicking_tool() {
        let server = Arc::new(McpServer::new("test", Flaky));
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"explode"}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
            "\n",
        );
        let mut output = Vec::new();

        serve(server, input.as_bytes(), &mut output).await.unwrap();

        let replies = responses(&output);
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["result"]["isError"], true);
        assert!(replies[0]["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("Error: tool 'explode' panicked"));
        assert_eq!(replies[1]["result"], json!({}));
    }

    #[tokio::test]
    async fn garbage_line_gets_parse_error_and_loop_continues() {
        let server = Arc::new(McpServer::new("test", Flaky));
        let input = "not json\n{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"ping\"}\n";
        let mut output = Vec::new();

        serve(server, input.as_bytes(), &mut output).await.unwrap();

        let replies = responses(&output);
        assert_eq!(replies[0]["error"]["code"], -32700);
        assert_eq!(replies[1]["id"], 3);
    }

    #[tokio::test]
    async fn invalid_utf8_line_gets_parse_error_and_loop_continues() {
        let server = Arc::new(McpServer::new("test", Flaky));
        let mut input = Vec::new();
        input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n");
        input.extend_from_slice(&[0xff, 0xfe, b'\n']);
        input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n");
        let mut output = Vec::new();

        serve(server, input.as_slice(), &mut output).await.unwrap();

        let replies = responses(&output);
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0]["id"], 1);
        assert_eq!(replies[1]["error"]["code"], PARSE_ERROR);
        assert!(replies[1]["id"].is_null());
        assert_eq!(replies[2]["id"], 2);
        assert_eq!(replies[2]["result"], json!({}));
    }

    #[tokio::test]
    async fn failed_handler_still_gets_a_reply() {
        let server = Arc::new(McpServer::new("test", BrokenRegistry));
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":5,"method":"ping"}"#,
            "\n",
        );
        let mut output = Vec::new();

        serve(server, input.as_bytes(), &mut output).await.unwrap();

        let replies = responses(&output);
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["id"], 4);
        assert_eq!(replies[0]["error"]["code"], INTERNAL_ERROR);
        assert_eq!(replies[1]["id"], 5);
    }

    #[test]
    fn request_id_ignores_notifications_and_garbage() {
        assert_eq!(request_id(r#"{"id":7,"method":"ping"}"#), Some(json!(7)));
        assert_eq!(request_id(r#"{"id":null,"method":"ping"}"#), None);
        assert_eq!(request_id(r#"{"method":"initialized"}"#), None);
        assert_eq!(request_id("not json"), None);
    }
}
