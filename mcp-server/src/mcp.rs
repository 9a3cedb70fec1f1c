/// MCP protocol handling
/// JSON-RPC 2.0 envelopes and method dispatch shared by the stdio and HTTP transports

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::forward::ProofForwarder;
use crate::tools::{self, ToolCallError, ToolDefinition};

pub const JSONRPC_VERSION: &str = "2.0";
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "zkvm-nexus-server";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

#[derive(Debug, Clone, Deserialize)]
pub struct McpRequest {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl McpRequest {
    /// Requests without an id expect no response
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

impl McpResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(McpError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// MCP Initialize Response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InitializeResult {
    protocol_version: String,
    capabilities: Value,
    server_info: Value,
}

/// MCP Tools List Response
#[derive(Debug, Serialize)]
struct ToolsListResult {
    tools: Vec<ToolDefinition>,
}

/// MCP Tool Call Response
#[derive(Debug, Serialize)]
struct ToolCallResult {
    content: Vec<Value>,
    #[serde(rename = "isError")]
    is_error: bool,
}

/// Dispatches MCP requests to the registered tool.
/// Built once at startup and shared by reference across invocations.
#[derive(Debug, Clone)]
pub struct McpHandler {
    forwarder: ProofForwarder,
}

impl McpHandler {
    pub fn new(forwarder: ProofForwarder) -> Self {
        Self { forwarder }
    }

    /// Handle one raw JSON-RPC message; `None` means nothing should be written back
    pub async fn handle_message(&self, raw: &str) -> Option<McpResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("[MCP] Could not parse message: {}", e);
                return Some(McpResponse::failure(
                    None,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        if value.is_array() {
            return Some(McpResponse::failure(
                None,
                INVALID_REQUEST,
                "Batch requests are not supported",
            ));
        }

        // A present-but-null id is neither a request nor a notification
        if value.get("id").is_some_and(Value::is_null) {
            return Some(McpResponse::failure(
                None,
                INVALID_REQUEST,
                "Invalid request: id must not be null",
            ));
        }

        let id = value.get("id").cloned();
        match serde_json::from_value::<McpRequest>(value) {
            Ok(req) => self.handle(req).await,
            Err(e) => Some(McpResponse::failure(
                id,
                INVALID_REQUEST,
                format!("Invalid request: {}", e),
            )),
        }
    }

    /// Handle MCP protocol requests
    pub async fn handle(&self, req: McpRequest) -> Option<McpResponse> {
        tracing::info!("[MCP] Received request: method={}, id={:?}", req.method, req.id);

        if req.jsonrpc != JSONRPC_VERSION {
            if req.is_notification() {
                return None;
            }
            return Some(McpResponse::failure(
                req.id,
                INVALID_REQUEST,
                format!("Unsupported jsonrpc version '{}'", req.jsonrpc),
            ));
        }

        if req.method.starts_with("notifications/") {
            tracing::debug!("[MCP] Notification acknowledged: {}", req.method);
            return None;
        }

        let notification = req.is_notification();
        let response = match req.method.as_str() {
            "initialize" => McpResponse::success(req.id, self.initialize(req.params.as_ref())),

            "ping" => McpResponse::success(req.id, json!({})),

            "tools/list" => {
                let result = ToolsListResult {
                    tools: tools::tool_definitions(),
                };
                McpResponse::success(req.id, json!(result))
            }

            "tools/call" => self.tools_call(req.id, req.params.as_ref()).await,

            _ => McpResponse::failure(
                req.id,
                METHOD_NOT_FOUND,
                format!("Method '{}' not found", req.method),
            ),
        };

        if notification {
            return None;
        }
        Some(response)
    }

    async fn tools_call(&self, id: Option<Value>, params: Option<&Value>) -> McpResponse {
        let Some(params) = params else {
            return McpResponse::failure(id, INVALID_PARAMS, "Invalid params");
        };

        let Some(name) = params.get("name").and_then(|n| n.as_str()) else {
            return McpResponse::failure(id, INVALID_PARAMS, "Tool name required");
        };

        match self.call_tool(name, params.get("arguments")).await {
            Ok(text) => {
                let result = ToolCallResult {
                    content: vec![json!({ "type": "text", "text": text })],
                    is_error: false,
                };
                McpResponse::success(id, json!(result))
            }
            Err(e) => {
                tracing::warn!("[MCP] tools/call rejected: {}", e);
                McpResponse::failure(id, INVALID_PARAMS, e.to_string())
            }
        }
    }

    /// Run a tool by name; tool failures come back as text, only dispatch problems are errors
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<&Value>,
    ) -> Result<String, ToolCallError> {
        match name {
            tools::CREATE_ZKVM_PROOF => {
                let code = tools::code_argument(arguments)?;
                Ok(self.create_zkvm_proof(code).await)
            }
            other => Err(ToolCallError::UnknownTool(other.to_string())),
        }
    }

    pub async fn create_zkvm_proof(&self, code: &str) -> String {
        tracing::info!(
            "[CREATE-ZKVM-PROOF] Tool call received: {} bytes of code",
            code.len()
        );
        self.forwarder.forward(code).await
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let protocol_version = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);

        json!(InitializeResult {
            protocol_version: protocol_version.to_string(),
            capabilities: json!({ "tools": {} }),
            server_info: json!({
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn handler() -> McpHandler {
        let endpoint = reqwest::Url::parse("http://127.0.0.1:9/package").unwrap();
        McpHandler::new(ProofForwarder::new(endpoint, Duration::from_secs(1)))
    }

    #[tokio::test]
    async fn test_parse_error_has_null_id() {
        let response = handler().handle_message("{not json").await.unwrap();
        assert!(response.id.is_none());
        assert_eq!(response.error.unwrap().code, PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version() {
        let response = handler()
            .handle_message(r#"{"jsonrpc":"1.0","id":3,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(response.id, Some(json!(3)));
        assert_eq!(response.error.unwrap().code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_initialize_echoes_protocol_version() {
        let response = handler()
            .handle_message(
                r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26"}}"#,
            )
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_null_id_is_invalid_request() {
        let response = handler()
            .handle_message(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#)
            .await
            .unwrap();
        assert!(response.id.is_none());
        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let handler = handler();
        assert!(handler
            .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());
        assert!(handler
            .handle_message(r#"{"jsonrpc":"2.0","method":"tools/list"}"#)
            .await
            .is_none());
    }
}
