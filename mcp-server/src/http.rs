/// HTTP transport
/// Exposes the MCP endpoint and the tool as REST routes
/// - GET  /health
/// - GET  /tools                     - List all tools
/// - POST /tools/create-zkvm-proof   - Call create_zkvm_proof with {"code": "..."}
/// - POST /mcp                       - MCP protocol endpoint

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::mcp::McpHandler;
use crate::tools::{self, ToolDefinition};

/// Proof Tool Request
#[derive(Debug, Deserialize)]
pub struct CreateProofRequest {
    pub code: String,
}

/// Proof Tool Response
#[derive(Debug, Serialize)]
pub struct CreateProofResponse {
    pub result: String,
}

/// Tools List Response
#[derive(Debug, Serialize)]
struct ToolsResponse {
    tools: Vec<ToolDefinition>,
}

/// Standard Tool Response
#[derive(Debug, Serialize)]
struct ToolResponse<T: Serialize> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ToolResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Health check endpoint
async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "healthy"}))
}

/// List all available tools
async fn list_tools() -> Json<ToolsResponse> {
    tracing::info!("[LIST TOOLS] Received request to list available tools");
    Json(ToolsResponse {
        tools: tools::tool_definitions(),
    })
}

/// Create a zkVM proof; failures are reported inside the result text, never as an HTTP error
async fn create_zkvm_proof(
    Extension(handler): Extension<Arc<McpHandler>>,
    Json(req): Json<CreateProofRequest>,
) -> Json<ToolResponse<CreateProofResponse>> {
    let result = handler.create_zkvm_proof(&req.code).await;
    Json(ToolResponse::ok(CreateProofResponse { result }))
}

/// Body is taken raw so malformed JSON gets a JSON-RPC parse error instead of a 4xx rejection
async fn handle_mcp(Extension(handler): Extension<Arc<McpHandler>>, body: String) -> Response {
    match handler.handle_message(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

pub fn router(handler: Arc<McpHandler>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/create-zkvm-proof", post(create_zkvm_proof))
        .route("/mcp", post(handle_mcp))
        .layer(CorsLayer::permissive())
        .layer(Extension(handler))
}

pub async fn serve(handler: Arc<McpHandler>, port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("[INIT] ✓ zkVM MCP server running on http://{}", addr);
    tracing::info!("  GET  /tools                     — List all tools");
    tracing::info!("  POST /tools/create-zkvm-proof   — Create a zkVM proof");
    tracing::info!("  POST /mcp                       — MCP protocol endpoint");

    axum::serve(listener, router(handler)).await?;

    Ok(())
}
