//! MCP server implementation
//!
//! Declares the six tools and routes invocations to [`NoteTools`] and
//! [`AttributeTools`]. Every `tools/call` produces a well-formed result
//! envelope: unknown names and argument errors come back flagged with
//! `isError` instead of as protocol errors.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::ToolCallContext, wrapper::Parameters},
    model::*,
    service::RequestContext,
    tool, tool_router,
};
use tracing::{debug, warn};

use crate::etapi::TriliumClient;

use super::tools::attributes::ManageAttributesParams;
use super::tools::notes::{
    CreateNoteToolParams, MoveNoteParams, ReadNoteParams, SearchNotesParams,
    UpdateNoteToolParams,
};
use super::tools::{AttributeTools, NoteTools, error_result};

/// Main MCP server coordinator
///
/// Cheap to clone: all handlers share one [`TriliumClient`].
#[derive(Clone)]
pub struct TriliumServer {
    note_tools: NoteTools,
    attribute_tools: AttributeTools,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl TriliumServer {
    pub fn new(client: Arc<TriliumClient>) -> Self {
        Self {
            note_tools: NoteTools::new(Arc::clone(&client)),
            attribute_tools: AttributeTools::new(client),
            tool_router: Self::tool_router(),
        }
    }

    /// The fixed tool catalog with JSON input schemas.
    pub fn tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools().iter().any(|tool| tool.name == name)
    }

    #[tool(description = "Search for notes in Trilium")]
    pub async fn search_notes(
        &self,
        params: Parameters<SearchNotesParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.note_tools.search_notes(params.0).await)
    }

    #[tool(description = "Read a note's metadata and content")]
    pub async fn read_note(
        &self,
        params: Parameters<ReadNoteParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.note_tools.read_note(params.0).await)
    }

    #[tool(description = "Create a new note")]
    pub async fn create_note(
        &self,
        params: Parameters<CreateNoteToolParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.note_tools.create_note(params.0).await)
    }

    #[tool(description = "Update an existing note")]
    pub async fn update_note(
        &self,
        params: Parameters<UpdateNoteToolParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.note_tools.update_note(params.0).await)
    }

    #[tool(
        description = "Move a note to a new parent. Replaces all existing parents, so a cloned note is removed from its other locations."
    )]
    pub async fn move_note(
        &self,
        params: Parameters<MoveNoteParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.note_tools.move_note(params.0).await)
    }

    #[tool(description = "Manage note attributes (create, update, delete)")]
    pub async fn manage_attributes(
        &self,
        params: Parameters<ManageAttributesParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.attribute_tools.manage_attributes(params.0).await)
    }
}

/// Flagged result for a tool name outside the catalog.
pub(crate) fn unknown_tool(name: &str) -> CallToolResult {
    error_result(format!("Unknown tool: {}", name))
}

/// Fold router errors (mostly argument deserialization) into the envelope.
///
/// Depending on the rmcp release, argument failures arrive either as `Err` or
/// as an already flagged result with bare text; both end up as
/// `Error: <message>`.
pub(crate) fn into_envelope(outcome: Result<CallToolResult, McpError>) -> CallToolResult {
    match outcome {
        Ok(result) if result.is_error == Some(true) => {
            let message = result
                .content
                .iter()
                .filter_map(|content| match &content.raw {
                    RawContent::Text(text) => Some(text.text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n");
            if message.starts_with("Error: ") {
                result
            } else {
                error_result(message)
            }
        }
        Ok(result) => result,
        Err(e) => error_result(e.message),
    }
}

impl ServerHandler for TriliumServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build()).with_instructions(
            "Trilium MCP Server - Search, read, create, update and move notes, and manage their attributes",
        )
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tools(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        if !self.has_tool(&request.name) {
            warn!(tool = %request.name, "unknown tool requested");
            return Ok(unknown_tool(&request.name));
        }

        debug!(tool = %request.name, "dispatching tool call");
        let context = ToolCallContext::new(self, request, context);
        Ok(into_envelope(self.tool_router.call(context).await))
    }
}
