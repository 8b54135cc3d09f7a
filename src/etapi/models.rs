//! ETAPI data transfer objects.
//!
//! These mirror the JSON the remote service sends and accepts. The adapter
//! never owns or persists them; identifiers are always assigned remotely.

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub note_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub note_type: String,
    pub mime: String,
    #[serde(default)]
    pub is_protected: bool,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub date_modified: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_date_created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_date_modified: Option<String>,
    #[serde(default)]
    pub parent_note_ids: Vec<String>,
    #[serde(default)]
    pub child_note_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_branch_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_branch_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<Attribute>>,
}

/// Attribute kind. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    /// Simple tag, optionally carrying a value
    Label,
    /// Typed link whose value is the target note ID
    Relation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub attribute_id: String,
    pub note_id: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub is_inheritable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_date_modified: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub branch_id: String,
    pub note_id: String,
    pub parent_note_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_expanded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_date_modified: Option<String>,
}

/// Search hits in the order the service ranked them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub results: Vec<Note>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteWithBranch {
    pub note: Note,
    pub branch: Branch,
}

/// Reply of `POST /create-note`.
///
/// Trilium answers with the note and the branch placing it under its parent;
/// some proxies flatten this to the bare note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreatedNote {
    WithBranch(NoteWithBranch),
    Note(Note),
}

impl CreatedNote {
    pub fn note(&self) -> &Note {
        match self {
            CreatedNote::WithBranch(created) => &created.note,
            CreatedNote::Note(note) => note,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteParams {
    pub parent_note_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub note_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

/// Partial note update. Every present field triggers its own request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub note_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl UpdateNoteParams {
    /// Metadata half of the update, or `None` when no metadata field is set.
    pub fn metadata_patch(&self) -> Option<NoteMetadataPatch<'_>> {
        if self.title.is_none() && self.note_type.is_none() && self.mime.is_none() {
            return None;
        }
        Some(NoteMetadataPatch {
            title: self.title.as_deref(),
            note_type: self.note_type.as_deref(),
            mime: self.mime.as_deref(),
        })
    }
}

/// Body of `PATCH /notes/{noteId}` for metadata updates.
#[derive(Debug, Serialize)]
pub struct NoteMetadataPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub note_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime: Option<&'a str>,
}

/// Body of `PATCH /notes/{noteId}` for reparenting.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ParentPatch<'a> {
    pub parent_note_ids: [&'a str; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateAttributeRequest<'a> {
    pub note_id: &'a str,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    pub name: &'a str,
    pub value: &'a str,
    pub is_inheritable: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateAttributeRequest<'a> {
    pub value: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_inheritable: Option<bool>,
}
