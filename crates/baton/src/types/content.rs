//! Content items carried by tool results and prompt messages.

use serde::{Deserialize, Serialize};

/// A single content item.
///
/// Only text is produced by servers built on this crate; the tag keeps the
/// wire shape (`{"type": "text", "text": ...}`) open for other kinds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Text { text: String },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text { text: text.into() }
    }
}
