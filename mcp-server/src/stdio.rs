/// stdio transport
/// One JSON-RPC message per line on the reader, one response per line on the writer.
/// Each message is handled in its own task, so responses go out in completion order.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::mcp::{McpHandler, McpResponse};

/// Serve until the reader hits EOF and every in-flight request has been answered
pub async fn serve<R, W>(handler: Arc<McpHandler>, reader: R, writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<McpResponse>();

    // Single writer keeps lines from interleaving
    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(response) = rx.recv().await {
            let mut line = serde_json::to_string(&response)?;
            line.push('\n');
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await?;
        }
        Ok::<(), anyhow::Error>(())
    });

    tracing::info!("[STDIO] Waiting for MCP messages on stdin");

    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await.context("failed to read MCP message")? {
        if line.trim().is_empty() {
            continue;
        }

        let handler = Arc::clone(&handler);
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(response) = handler.handle_message(&line).await {
                if tx.send(response).is_err() {
                    tracing::warn!("[STDIO] Writer closed before response could be sent");
                }
            }
        });
    }

    tracing::info!("[STDIO] Host closed input, draining in-flight requests");
    drop(tx);

    writer_task
        .await
        .context("stdout writer task panicked")?
        .context("failed to write MCP response")?;

    Ok(())
}
