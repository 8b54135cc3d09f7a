//! Attribute tool implementation
//!
//! `manage_attributes` multiplexes create, update and delete over one tool.
//! Which optional fields are required depends on the action, so arguments are
//! checked again after schema validation and before any request is sent.

use rmcp::{model::CallToolResult, schemars, schemars::JsonSchema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::etapi::{AttributeType, TriliumClient};
use crate::mcp::tools::{error_result, json_result, text_result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttributeAction {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManageAttributesParams {
    #[schemars(description = "The action to perform")]
    pub action: AttributeAction,
    #[schemars(description = "The ID of the note (required for create)")]
    pub note_id: Option<String>,
    #[schemars(description = "The ID of the attribute (required for update/delete)")]
    pub attribute_id: Option<String>,
    #[serde(rename = "type")]
    #[schemars(description = "Type of attribute (required for create)")]
    pub attribute_type: Option<AttributeType>,
    #[schemars(description = "Name of the attribute (required for create)")]
    pub name: Option<String>,
    #[schemars(description = "Value of the attribute")]
    pub value: Option<String>,
    #[schemars(description = "Whether the attribute is inheritable")]
    pub is_inheritable: Option<bool>,
}

/// Action-specific argument check failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttributeArgsError {
    #[error("Missing required parameters for create attribute: {}", .0.join(", "))]
    Create(Vec<&'static str>),
    #[error("Missing required parameters for update attribute: {}", .0.join(", "))]
    Update(Vec<&'static str>),
    #[error("Missing attributeId for delete attribute")]
    Delete,
}

/// A fully specified attribute operation.
#[derive(Debug, PartialEq, Eq)]
pub enum AttributeCommand {
    Create {
        note_id: String,
        attribute_type: AttributeType,
        name: String,
        value: String,
        is_inheritable: bool,
    },
    Update {
        attribute_id: String,
        value: String,
        is_inheritable: Option<bool>,
    },
    Delete {
        attribute_id: String,
    },
}

/// Empty identifiers and names count as missing; an empty value does not.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<ManageAttributesParams> for AttributeCommand {
    type Error = AttributeArgsError;

    fn try_from(params: ManageAttributesParams) -> Result<Self, Self::Error> {
        match params.action {
            AttributeAction::Create => {
                let note_id = non_empty(params.note_id);
                let name = non_empty(params.name);

                match (note_id, params.attribute_type, name, params.value) {
                    (Some(note_id), Some(attribute_type), Some(name), Some(value)) => {
                        Ok(AttributeCommand::Create {
                            note_id,
                            attribute_type,
                            name,
                            value,
                            is_inheritable: params.is_inheritable.unwrap_or(false),
                        })
                    }
                    (note_id, attribute_type, name, value) => {
                        let mut missing = Vec::new();
                        if note_id.is_none() {
                            missing.push("noteId");
                        }
                        if attribute_type.is_none() {
                            missing.push("type");
                        }
                        if name.is_none() {
                            missing.push("name");
                        }
                        if value.is_none() {
                            missing.push("value");
                        }
                        Err(AttributeArgsError::Create(missing))
                    }
                }
            }
            AttributeAction::Update => match (non_empty(params.attribute_id), params.value) {
                (Some(attribute_id), Some(value)) => Ok(AttributeCommand::Update {
                    attribute_id,
                    value,
                    is_inheritable: params.is_inheritable,
                }),
                (attribute_id, value) => {
                    let mut missing = Vec::new();
                    if attribute_id.is_none() {
                        missing.push("attributeId");
                    }
                    if value.is_none() {
                        missing.push("value");
                    }
                    Err(AttributeArgsError::Update(missing))
                }
            },
            AttributeAction::Delete => non_empty(params.attribute_id)
                .map(|attribute_id| AttributeCommand::Delete { attribute_id })
                .ok_or(AttributeArgsError::Delete),
        }
    }
}

#[derive(Clone)]
pub struct AttributeTools {
    client: Arc<TriliumClient>,
}

impl AttributeTools {
    pub fn new(client: Arc<TriliumClient>) -> Self {
        Self { client }
    }

    pub async fn manage_attributes(&self, params: ManageAttributesParams) -> CallToolResult {
        let command = match AttributeCommand::try_from(params) {
            Ok(command) => command,
            Err(e) => return error_result(e),
        };

        let outcome = match command {
            AttributeCommand::Create {
                note_id,
                attribute_type,
                name,
                value,
                is_inheritable,
            } => self
                .client
                .create_attribute(&note_id, attribute_type, &name, &value, is_inheritable)
                .await
                .map(|attribute| json_result(&attribute)),
            AttributeCommand::Update {
                attribute_id,
                value,
                is_inheritable,
            } => self
                .client
                .update_attribute(&attribute_id, &value, is_inheritable)
                .await
                .map(|()| text_result("Attribute updated")),
            AttributeCommand::Delete { attribute_id } => self
                .client
                .delete_attribute(&attribute_id)
                .await
                .map(|()| text_result("Attribute deleted")),
        };

        outcome.unwrap_or_else(|e| {
            warn!(tool = "manage_attributes", error = %e, "ETAPI call failed");
            error_result(e)
        })
    }
}
