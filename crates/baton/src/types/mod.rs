//! MCP Protocol Types
//!
//! The subset of the MCP 2025-06-18 schema a tools/resources/prompts server
//! needs:
//!
//! - `jsonrpc` - JSON-RPC 2.0 envelopes
//! - `error` - error object and standard codes
//! - `protocol` - initialize handshake and capabilities
//! - `tool` - tool definitions and call results
//! - `content` - content items
//! - `resource` - resource definitions and contents
//! - `prompt` - prompt templates and messages

pub mod content;
pub mod error;
pub mod jsonrpc;
pub mod prompt;
pub mod protocol;
pub mod resource;
pub mod tool;

use serde::{Deserialize, Serialize};

/// Role in a conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}
