use crate::models::dto::{ContactPatch, GroupPatch, NewContact, NewGroup};
use crate::view::{ActiveView, TagFilter};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ContactCommand {
    // ═══════════════════════════════════════════════════════════════════════
    // CONTACT COMMANDS
    // ═══════════════════════════════════════════════════════════════════════
    ListContacts {
        #[serde(default)]
        view: ActiveView,
        #[serde(default)]
        search: String,
        #[serde(default)]
        tag: TagFilter,
    },
    ViewCounts,
    AddContact {
        contact: NewContact,
    },
    UpdateContact {
        id: String,
        patch: ContactPatch,
    },
    DeleteContact {
        id: String,
    },
    ToggleFavorite {
        id: String,
    },
    BulkUpdate {
        ids: Vec<String>,
        patch: ContactPatch,
    },
    BulkDelete {
        ids: Vec<String>,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // GROUP COMMANDS
    // ═══════════════════════════════════════════════════════════════════════
    ListGroups,
    CreateGroup {
        group: NewGroup,
    },
    UpdateGroup {
        id: String,
        patch: GroupPatch,
    },
    DeleteGroup {
        id: String,
    },
    AddToGroup {
        ids: Vec<String>,
        group_id: String,
    },
    /// Create a group and move the given contacts into it
    CreateGroupWith {
        group: NewGroup,
        ids: Vec<String>,
    },
    RemoveFromGroup {
        id: String,
    },
    GroupMembers {
        group_id: String,
    },
    GroupCandidates {
        group_id: String,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // SYSTEM COMMANDS
    // ═══════════════════════════════════════════════════════════════════════
    Snapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    pub fn ok() -> Self { Self { success: true, error: None, data: None } }
    pub fn ok_with_data(data: serde_json::Value) -> Self { Self { success: true, error: None, data: Some(data) } }
    pub fn err(msg: impl Into<String>) -> Self { Self { success: false, error: Some(msg.into()), data: None } }
}
