// src/models/events.rs
//
// Change notifications sent from the store to subscribed UI components.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StoreEvent {
    /// Contacts collection was seeded from the bundled dataset
    ContactsSeeded { count: usize },
    /// Groups collection was seeded from the bundled dataset
    GroupsSeeded { count: usize },
    ContactAdded { id: String },
    ContactUpdated { id: String },
    /// One or more contacts removed in a single write
    ContactsDeleted { ids: Vec<String> },
    /// Same patch applied to several contacts in a single write
    ContactsUpdated { ids: Vec<String> },
    GroupCreated { id: String },
    GroupUpdated { id: String },
    /// Group removed; `released` are the contacts whose membership was cleared
    GroupDeleted { id: String, released: Vec<String> },
    /// Membership of `group_id` changed; carries the recomputed count
    MembershipChanged {
        group_id: String,
        contact_ids: Vec<String>,
        member_count: usize,
    },
}

impl StoreEvent {
    /// True when consumers holding a contact list should re-read it.
    pub fn touches_contacts(&self) -> bool {
        !matches!(
            self,
            StoreEvent::GroupsSeeded { .. }
                | StoreEvent::GroupCreated { .. }
                | StoreEvent::GroupUpdated { .. }
        )
    }
}
