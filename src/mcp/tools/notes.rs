//! Note tool implementations
//!
//! Search, read, create, update and move notes.

use rmcp::{model::CallToolResult, schemars, schemars::JsonSchema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::etapi::{CreateNoteParams, TriliumClient, UpdateNoteParams};
use crate::mcp::tools::{error_result, json_result, text_result};

// =============================================================================
// Parameter Structs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchNotesParams {
    #[schemars(description = "The search query string", length(min = 1))]
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadNoteParams {
    #[schemars(description = "The ID of the note to read")]
    pub note_id: String,
}

fn default_note_type() -> String {
    "text".to_string()
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteToolParams {
    #[schemars(description = "The ID of the parent note")]
    pub parent_note_id: String,
    #[schemars(description = "The title of the new note")]
    pub title: String,
    #[serde(rename = "type", default = "default_note_type")]
    #[schemars(description = "The type of the note (e.g., text, code)")]
    pub note_type: String,
    #[schemars(description = "The initial content of the note")]
    pub content: Option<String>,
    #[schemars(description = "MIME type for the note")]
    pub mime: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteToolParams {
    #[schemars(description = "The ID of the note to update")]
    pub note_id: String,
    #[schemars(description = "New title")]
    pub title: Option<String>,
    #[serde(rename = "type")]
    #[schemars(description = "New type")]
    pub note_type: Option<String>,
    #[schemars(description = "New content")]
    pub content: Option<String>,
    #[schemars(description = "New MIME type")]
    pub mime: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveNoteParams {
    #[schemars(description = "The ID of the note to move")]
    pub note_id: String,
    #[schemars(description = "The ID of the new parent note")]
    pub parent_note_id: String,
}

// =============================================================================
// Note Tools
// =============================================================================

#[derive(Clone)]
pub struct NoteTools {
    client: Arc<TriliumClient>,
}

impl NoteTools {
    pub fn new(client: Arc<TriliumClient>) -> Self {
        Self { client }
    }

    pub async fn search_notes(&self, params: SearchNotesParams) -> CallToolResult {
        if params.query.is_empty() {
            return error_result("Search query must not be empty");
        }

        match self.client.search_notes(&params.query).await {
            Ok(results) => json_result(&results),
            Err(e) => {
                warn!(tool = "search_notes", error = %e, "ETAPI call failed");
                error_result(e)
            }
        }
    }

    /// Metadata and raw content, fetched in that order.
    pub async fn read_note(&self, params: ReadNoteParams) -> CallToolResult {
        let note = match self.client.get_note(&params.note_id).await {
            Ok(note) => note,
            Err(e) => {
                warn!(tool = "read_note", note_id = %params.note_id, error = %e, "ETAPI call failed");
                return error_result(e);
            }
        };
        let content = match self.client.get_note_content(&params.note_id).await {
            Ok(content) => content,
            Err(e) => {
                warn!(tool = "read_note", note_id = %params.note_id, error = %e, "ETAPI call failed");
                return error_result(e);
            }
        };

        match serde_json::to_string_pretty(&note) {
            Ok(metadata) => text_result(format!(
                "Metadata:\n{}\n\nContent:\n{}",
                metadata, content
            )),
            Err(e) => error_result(e),
        }
    }

    pub async fn create_note(&self, params: CreateNoteToolParams) -> CallToolResult {
        let request = CreateNoteParams {
            parent_note_id: params.parent_note_id,
            title: params.title,
            note_type: params.note_type,
            content: params.content,
            mime: params.mime,
        };

        match self.client.create_note(&request).await {
            Ok(created) => json_result(&created),
            Err(e) => {
                warn!(tool = "create_note", error = %e, "ETAPI call failed");
                error_result(e)
            }
        }
    }

    pub async fn update_note(&self, params: UpdateNoteToolParams) -> CallToolResult {
        let update = UpdateNoteParams {
            title: params.title,
            note_type: params.note_type,
            mime: params.mime,
            content: params.content,
        };

        match self.client.update_note(&params.note_id, &update).await {
            Ok(note) => json_result(&note),
            Err(e) => {
                warn!(tool = "update_note", note_id = %params.note_id, error = %e, "ETAPI call failed");
                error_result(e)
            }
        }
    }

    pub async fn move_note(&self, params: MoveNoteParams) -> CallToolResult {
        match self
            .client
            .move_note(&params.note_id, &params.parent_note_id)
            .await
        {
            Ok(note) => json_result(&note),
            Err(e) => {
                warn!(tool = "move_note", note_id = %params.note_id, error = %e, "ETAPI call failed");
                error_result(e)
            }
        }
    }
}
