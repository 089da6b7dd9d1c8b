// src/bridge.rs
//
// JSON command boundary for a UI shell.
//
// A host (webview, FFI wrapper, test) sends one JSON command per call and
// gets back `{"success": bool, "error"?: string, "data"?: value}`. Parsing or
// store failures become error responses; nothing here panics on bad input.

use serde::Serialize;

use crate::{
    error::{StoreError, StoreResult},
    models::commands::{CommandResponse, ContactCommand},
    storage::Storage,
    store::ContactStore,
    view::{self, ViewQuery},
};

pub struct ContactsBridge<'a, S: Storage> {
    store: &'a ContactStore<S>,
}

impl<'a, S: Storage> ContactsBridge<'a, S> {
    pub fn new(store: &'a ContactStore<S>) -> Self {
        Self { store }
    }

    pub fn handle_command(&self, json: &str) -> String {
        tracing::debug!("ContactsBridge received command: {}", json);
        let response = match serde_json::from_str::<ContactCommand>(json) {
            Ok(cmd) => self.dispatch(cmd),
            Err(e) => CommandResponse::err(format!("Invalid JSON: {}", e)),
        };
        let result = serde_json::to_string(&response).unwrap_or_else(|_| {
            r#"{"success":false,"error":"Serialization failed"}"#.to_string()
        });
        tracing::debug!("ContactsBridge response: {}", result);
        result
    }

    pub fn dispatch(&self, cmd: ContactCommand) -> CommandResponse {
        let store = self.store;
        match cmd {
            ContactCommand::ListContacts { view, search, tag } => {
                let contacts = store.load_contacts();
                let query = ViewQuery { view, search, tag };
                data(&view::project(&contacts, &query))
            }
            ContactCommand::ViewCounts => data(&view::view_counts(&store.load_contacts())),
            ContactCommand::AddContact { contact } => respond(store.add_contact(contact)),
            ContactCommand::UpdateContact { id, patch } => {
                respond(store.update_contact(&id, &patch))
            }
            ContactCommand::DeleteContact { id } => done(store.delete_contact(&id)),
            ContactCommand::ToggleFavorite { id } => respond(store.toggle_favorite(&id)),
            ContactCommand::BulkUpdate { ids, patch } => {
                respond(store.bulk_update_contacts(&ids, &patch))
            }
            ContactCommand::BulkDelete { ids } => respond(store.bulk_delete_contacts(&ids)),
            ContactCommand::ListGroups => data(&store.groups_with_live_counts()),
            ContactCommand::CreateGroup { group } => respond(store.create_group(group)),
            ContactCommand::UpdateGroup { id, patch } => respond(store.update_group(&id, &patch)),
            ContactCommand::DeleteGroup { id } => done(store.delete_group(&id)),
            ContactCommand::AddToGroup { ids, group_id } => {
                respond(store.add_contacts_to_group(&ids, &group_id))
            }
            ContactCommand::CreateGroupWith { group, ids } => {
                respond(store.create_group_with_members(group, &ids))
            }
            ContactCommand::RemoveFromGroup { id } => {
                done(store.remove_contact_from_group(&id))
            }
            ContactCommand::GroupMembers { group_id } => {
                data(&store.get_contacts_in_group(&group_id))
            }
            ContactCommand::GroupCandidates { group_id } => {
                data(&store.contacts_not_in_group(&group_id))
            }
            ContactCommand::Snapshot => data(&store.export_snapshot()),
        }
    }
}

fn data<T: Serialize + ?Sized>(value: &T) -> CommandResponse {
    match serde_json::to_value(value) {
        Ok(v) => CommandResponse::ok_with_data(v),
        Err(e) => CommandResponse::err(format!("Serialization failed: {}", e)),
    }
}

fn respond<T: Serialize>(result: StoreResult<T>) -> CommandResponse {
    match result {
        Ok(value) => data(&value),
        Err(e) => failed(e),
    }
}

/// For commands with nothing to return.
fn done(result: StoreResult<()>) -> CommandResponse {
    match result {
        Ok(()) => CommandResponse::ok(),
        Err(e) => failed(e),
    }
}

fn failed(e: StoreError) -> CommandResponse {
    tracing::warn!("Command failed: {}", e);
    CommandResponse::err(e.to_string())
}
