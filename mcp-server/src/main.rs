/// zkVM MCP Server
///
/// Exposes create_zkvm_proof as an MCP tool over stdio (default) or HTTP.
/// The tool forwards a Rust snippet to the Nexus zkVM package server.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use zkvm_mcp_server::{http, stdio, McpHandler, ProofForwarder, ServerConfig, Transport};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = ServerConfig::from_env()?;

    tracing::info!("[INIT] Server configuration:");
    tracing::info!("  zkVM endpoint: {}", config.zkvm_endpoint);
    tracing::info!("  Request timeout: {}s", config.request_timeout.as_secs());
    tracing::info!("  Transport: {:?}", config.transport);

    let handler = Arc::new(McpHandler::new(ProofForwarder::from_config(&config)));

    match config.transport {
        Transport::Stdio => stdio::serve(handler, tokio::io::stdin(), tokio::io::stdout()).await,
        Transport::Http => http::serve(handler, config.port).await,
    }
}
