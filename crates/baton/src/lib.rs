//! baton - MCP (Model Context Protocol) server library
//!
//! A Rust implementation of the server side of MCP 2025-06-18: protocol
//! types, JSON-RPC dispatch onto a [`Handler`], and two transports.
//!
//! # Features
//!
//! - **Tools**: Expose callable tools to MCP clients
//! - **Resources**: Serve content via URI-based resources
//! - **Prompts**: Provide prompt templates with arguments
//! - **Transports**: newline-delimited stdio, Streamable HTTP via axum
//!
//! # Example
//!
//! ```rust,ignore
//! use baton::{CallToolResult, ErrorData, Handler, Implementation, Tool};
//! use async_trait::async_trait;
//!
//! struct MyHandler;
//!
//! #[async_trait]
//! impl Handler for MyHandler {
//!     fn server_info(&self) -> Implementation {
//!         Implementation::new("my-server", "0.1.0")
//!     }
//!
//!     async fn list_tools(&self) -> Vec<Tool> {
//!         vec![Tool::new("hello", "Say hello")]
//!     }
//!
//!     async fn call_tool(&self, _name: &str, _args: serde_json::Map<String, serde_json::Value>)
//!         -> Result<CallToolResult, ErrorData>
//!     {
//!         Ok(CallToolResult::text("Hello!"))
//!     }
//! }
//!
//! // stdio
//! baton::serve_stdio(std::sync::Arc::new(MyHandler)).await?;
//!
//! // or HTTP
//! let app = axum::Router::new().nest("/mcp", baton::streamable_router(std::sync::Arc::new(MyHandler)));
//! ```

pub mod protocol;
pub mod transport;
pub mod types;

pub use types::content::Content;
pub use types::error::ErrorData;
pub use types::jsonrpc::{JsonRpcMessage, JsonRpcReply, RequestId};
pub use types::prompt::{GetPromptResult, Prompt, PromptArgument, PromptMessage};
pub use types::protocol::{Implementation, ServerCapabilities, PROTOCOL_VERSION};
pub use types::resource::{ReadResourceResult, Resource, ResourceContents};
pub use types::tool::{CallToolResult, Tool, ToolAnnotations, ToolSchema};
pub use types::Role;

pub use protocol::{dispatch, handle_message, Handler};
pub use transport::{serve_stdio, serve_stream, streamable_router, TransportError};
