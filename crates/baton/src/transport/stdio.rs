//! Newline-delimited JSON-RPC over a byte stream.
//!
//! Each request runs on its own task so a slow tool call does not hold up
//! the rest. Replies funnel through one writer task, one JSON object per
//! line, in completion order.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use super::TransportError;
use crate::protocol::{handle_message, parse_message};
use crate::types::error::ErrorData;
use crate::types::jsonrpc::JsonRpcReply;
use crate::Handler;

/// Serve MCP on the process's stdin and stdout until stdin closes.
pub async fn serve_stdio<H: Handler>(handler: Arc<H>) -> Result<(), TransportError> {
    tracing::info!("MCP stdio transport ready");
    serve_stream(handler, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Serve MCP over any reader/writer pair.
///
/// Returns once the reader hits EOF and every in-flight request has replied.
pub async fn serve_stream<H, R, W>(handler: Arc<H>, reader: R, writer: W) -> Result<(), TransportError>
where
    H: Handler,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<JsonRpcReply>(64);
    let writer_task = tokio::spawn(write_replies(writer, rx));

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let parsed = match std::str::from_utf8(&buf) {
            Ok(text) => {
                let line = text.trim();
                if line.is_empty() {
                    continue;
                }
                parse_message(line)
            }
            Err(e) => Err(JsonRpcReply::failure(
                None,
                ErrorData::parse_error(format!("Parse error: {}", e)),
            )),
        };

        match parsed {
            Ok(message) => {
                let handler = Arc::clone(&handler);
                let tx = tx.clone();
                tokio::spawn(async move {
                    if let Some(reply) = handle_message(handler.as_ref(), &message).await {
                        if tx.send(reply).await.is_err() {
                            tracing::warn!(method = %message.method, "reply dropped, writer is gone");
                        }
                    }
                });
            }
            Err(reply) => {
                tracing::warn!(error = ?reply.error, "rejecting malformed message");
                if tx.send(reply).await.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!("stdio input closed, draining replies");
    drop(tx);
    writer_task.await?
}

async fn write_replies<W>(mut writer: W, mut rx: mpsc::Receiver<JsonRpcReply>) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(reply) = rx.recv().await {
        let mut line = serde_json::to_vec(&reply)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    Ok(())
}
