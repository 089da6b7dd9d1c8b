// src/models/core.rs
//
// Core entity types - base types with no internal dependencies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CREATED_BY: &str = "current-user";

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=";

// ═══════════════════════════════════════════════════════════════════════════
// BASIC ENTITY TYPES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub group_id: Option<String>,
    pub created_date: DateTime<Utc>,
    #[serde(default = "default_created_by")]
    pub created_by: String,
    #[serde(default)]
    pub avatar: String,
}

impl Contact {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_in_group(&self, group_id: &str) -> bool {
        self.group_id.as_deref() == Some(group_id)
    }

    /// Renames the contact, keeping the avatar in step with the name.
    pub(crate) fn rename(&mut self, name: String) {
        if self.name != name {
            self.avatar = avatar_for(&name);
            self.name = name;
        }
    }
}

fn default_created_by() -> String {
    DEFAULT_CREATED_BY.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub member_count: usize,
    pub created_date: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════════════════════
// DERIVED FIELDS
// ═══════════════════════════════════════════════════════════════════════════

/// Avatar URL for a contact name. The only place the avatar is computed.
pub fn avatar_for(name: &str) -> String {
    format!("{AVATAR_BASE_URL}{}", urlencoding::encode(name))
}

/// Number of contacts whose `group_id` is `group_id`.
pub fn member_count(contacts: &[Contact], group_id: &str) -> usize {
    contacts.iter().filter(|c| c.is_in_group(group_id)).count()
}

/// Recomputes `member_count` on every group. Returns true if any count moved.
pub fn sync_member_counts(groups: &mut [Group], contacts: &[Contact]) -> bool {
    let mut changed = false;
    for group in groups.iter_mut() {
        let count = member_count(contacts, &group.id);
        if group.member_count != count {
            group.member_count = count;
            changed = true;
        }
    }
    changed
}
