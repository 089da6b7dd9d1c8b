// src/models/dto.rs
//
// Data Transfer Objects: creation inputs, typed partial updates and the
// combined snapshot used by tooling.

use crate::models::core::{Contact, Group};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// CONTACT INPUTS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub tags: Vec<String>,
}

impl NewContact {
    /// Checks the creation rules and returns the de-duplicated tag list.
    pub(crate) fn validate(&self) -> Result<Vec<String>, String> {
        if self.name.trim().is_empty() {
            return Err("name is required".into());
        }
        if self.email.trim().is_empty() {
            return Err("email is required".into());
        }
        if self.phone.trim().is_empty() {
            return Err("phone is required".into());
        }
        let tags = dedup_tags(&self.tags);
        if tags.is_empty() {
            return Err("at least one tag is required".into());
        }
        Ok(tags)
    }
}

/// Fields of a contact that may be changed after creation.
///
/// Identity, creation date, avatar and group membership are not patchable:
/// the first two never change, the avatar follows `name`, and
/// membership goes through the group operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
}

impl ContactPatch {
    pub fn favorite(value: bool) -> Self {
        Self { is_favorite: Some(value), ..Self::default() }
    }

    pub fn archived(value: bool) -> Self {
        Self { is_archived: Some(value), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn apply(&self, contact: &mut Contact) {
        if let Some(name) = &self.name {
            contact.rename(name.clone());
        }
        if let Some(email) = &self.email {
            contact.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            contact.phone = phone.clone();
        }
        if let Some(tags) = &self.tags {
            contact.tags = dedup_tags(tags);
        }
        if let Some(fav) = self.is_favorite {
            contact.is_favorite = fav;
        }
        if let Some(archived) = self.is_archived {
            contact.is_archived = archived;
        }
    }
}

fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

// ═══════════════════════════════════════════════════════════════════════════
// GROUP INPUTS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GroupPatch {
    pub(crate) fn apply(&self, group: &mut Group) {
        if let Some(name) = &self.name {
            group.name = name.clone();
        }
        if let Some(description) = &self.description {
            group.description = description.clone();
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SNAPSHOT DTO
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDTO {
    pub contacts: Vec<Contact>,
    pub groups: Vec<Group>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_contact_requires_a_tag() {
        let c = NewContact {
            name: "Ann".into(),
            email: "ann@example.com".into(),
            phone: "555".into(),
            tags: vec!["  ".into()],
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn tags_are_deduplicated_in_order() {
        let c = NewContact {
            name: "Ann".into(),
            email: "ann@example.com".into(),
            phone: "555".into(),
            tags: vec!["work".into(), "family".into(), "work".into()],
        };
        assert_eq!(c.validate().unwrap(), vec!["work", "family"]);
    }

    #[test]
    fn patch_ignores_non_patchable_fields() {
        let patch: ContactPatch =
            serde_json::from_str(r#"{"isFavorite":true,"groupId":"g1","avatar":"x"}"#).unwrap();
        assert_eq!(patch, ContactPatch::favorite(true));
    }
}
