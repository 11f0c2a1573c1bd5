//! Stdio transport: one JSON-RPC message per line on stdin, one response
//! per line on stdout. Requests are handled in arrival order.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{McpState, dispatch_raw};

/// Serve MCP over the process's stdin/stdout until EOF or shutdown
pub async fn serve_stdio(state: Arc<McpState>, shutdown: CancellationToken) -> std::io::Result<()> {
    info!("Serving MCP over stdio");
    serve_lines(
        &state,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        shutdown,
    )
    .await
}

async fn serve_lines<R, W>(
    state: &McpState,
    reader: R,
    mut writer: W,
    shutdown: CancellationToken,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            debug!("stdin closed");
            break;
        };

        if line.trim().is_empty() {
            continue;
        }

        if let Some(response) = dispatch_raw(state, &line).await {
            let mut frame = serde_json::to_vec(&response)?;
            frame.push(b'\n');
            writer.write_all(&frame).await?;
            writer.flush().await?;
        }
    }

    Ok(())
}
