//! Model Context Protocol server speaking newline-delimited JSON-RPC 2.0.

use std::io::{self, BufRead, Write};

use docs_edit_core::{DocsService, DocumentStore};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::tools::{self, ToolCallError};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "docs-mcp";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
struct Request {
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct Response {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl Response {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

pub struct McpServer<S> {
    service: DocsService<S>,
}

impl<S: DocumentStore> McpServer<S> {
    pub fn new(service: DocsService<S>) -> Self {
        Self { service }
    }

    /// Answer messages from `reader` until it is exhausted.
    pub fn serve<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> io::Result<()> {
        info!("Serving {} over stdio", SERVER_NAME);
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line) {
                serde_json::to_writer(&mut writer, &response)?;
                writer.write_all(b"\n")?;
                writer.flush()?;
            }
        }
        info!("Input closed, shutting down");
        Ok(())
    }

    /// Response to one message, `None` for notifications.
    pub fn handle_line(&self, line: &str) -> Option<Value> {
        let response = match serde_json::from_str::<Value>(line) {
            Ok(message) => self.handle_message(message)?,
            Err(err) => {
                warn!("Unparseable message: {}", err);
                Response::failure(Value::Null, PARSE_ERROR, format!("parse error: {err}"))
            }
        };
        serde_json::to_value(response).ok()
    }

    fn handle_message(&self, message: Value) -> Option<Response> {
        // An explicit `"id": null` is still a request; only an absent id
        // marks a notification.
        let id = message.get("id").cloned();
        let request = match serde_json::from_value::<Request>(message) {
            Ok(request) if request.jsonrpc == "2.0" => request,
            Ok(_) => {
                return Some(Response::failure(
                    id.unwrap_or(Value::Null),
                    INVALID_REQUEST,
                    "jsonrpc must be \"2.0\"",
                ))
            }
            Err(err) => {
                return Some(Response::failure(
                    id.unwrap_or(Value::Null),
                    INVALID_REQUEST,
                    format!("invalid request: {err}"),
                ))
            }
        };

        let Some(id) = id else {
            debug!("Notification {}", request.method);
            return None;
        };

        debug!("Request {} ({})", request.method, id);
        let response = match self.dispatch(&request.method, request.params) {
            Ok(result) => Response::success(id, result),
            Err((code, message)) => Response::failure(id, code, message),
        };
        Some(response)
    }

    fn dispatch(&self, method: &str, params: Value) -> Result<Value, (i64, String)> {
        match method {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": { "listChanged": false } },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                },
            })),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tools::definitions() })),
            "tools/call" => {
                let params: CallParams = serde_json::from_value(params)
                    .map_err(|err| (INVALID_PARAMS, format!("invalid params: {err}")))?;
                tools::call(&self.service, &params.name, &params.arguments)
                    .map(tools::ToolOutput::into_result)
                    .map_err(|err: ToolCallError| (INVALID_PARAMS, err.to_string()))
            }
            other => Err((METHOD_NOT_FOUND, format!("method not found: {other}"))),
        }
    }
}
