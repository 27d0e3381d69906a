//! MCP Transports
//!
//! ## stdio
//! Newline-delimited JSON-RPC on stdin/stdout. Logs must go to stderr.
//!
//! ## Streamable HTTP
//! - POST / - Send a JSON-RPC message, receive the response directly
//! - Session ID via Mcp-Session-Id header

pub mod stdio;
mod streamable;

pub use stdio::{serve_stdio, serve_stream};
pub use streamable::{streamable_handler, SESSION_HEADER};

use axum::Router;
use std::sync::Arc;

use crate::Handler;

/// Errors that end a transport loop.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode reply: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("reply writer task failed: {0}")]
    Writer(#[from] tokio::task::JoinError),
}

/// Build an axum Router for the Streamable HTTP transport.
///
/// Routes:
/// - POST / - JSON-RPC request/response
///
/// Mount it with `Router::nest` under the path clients should use.
pub fn streamable_router<H: Handler>(handler: Arc<H>) -> Router {
    Router::new()
        .route("/", axum::routing::post(streamable_handler::<H>))
        .with_state(handler)
}
