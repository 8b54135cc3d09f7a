//! MCP tool implementations
//!
//! Each module owns the parameter types and handlers for one area of the
//! ETAPI surface. Handlers always produce a [`CallToolResult`]; failures are
//! flagged with `is_error` instead of being raised.

pub mod attributes;
pub mod notes;


pub use attributes::AttributeTools;
pub use notes::NoteTools;

use std::fmt::Display;

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

/// Pretty-printed JSON in a single text block.
pub(crate) fn json_result<T: Serialize>(value: &T) -> CallToolResult {
    match serde_json::to_string_pretty(value) {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => error_result(e),
    }
}

pub(crate) fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Flagged error envelope with an `Error: ` prefixed message.
pub(crate) fn error_result(err: impl Display) -> CallToolResult {
    CallToolResult::error(vec![Content::text(format!("Error: {}", err))])
}
