// src/groups.rs
//
// Group CRUD and membership operations on ContactStore.
//
// Membership writes always go contacts first, member counts second. Once the
// contacts write lands the operation succeeds; a failed count write is logged
// and the counts stay stale until the next membership change.

use chrono::Utc;

use crate::{
    error::{StoreError, StoreResult},
    models::{Contact, Group, GroupPatch, NewGroup, StoreEvent, member_count, sync_member_counts},
    storage::Storage,
    store::ContactStore,
};

impl<S: Storage> ContactStore<S> {
    // ========================================================================
    // Group CRUD
    // ========================================================================

    pub fn create_group(&self, data: NewGroup) -> StoreResult<Group> {
        if data.name.trim().is_empty() {
            return Err(StoreError::InvalidGroup("name is required".into()));
        }
        let mut groups = self.groups_for_write()?;
        let group = Group {
            id: uuid::Uuid::new_v4().to_string(),
            name: data.name,
            description: data.description,
            member_count: 0,
            created_date: Utc::now(),
        };
        groups.push(group.clone());
        self.save_groups(&groups)?;

        tracing::info!("Created group {} ({})", group.name, group.id);
        self.notify(StoreEvent::GroupCreated { id: group.id.clone() });
        Ok(group)
    }

    pub fn update_group(&self, id: &str, patch: &GroupPatch) -> StoreResult<Option<Group>> {
        let mut groups = self.groups_for_write()?;
        let Some(group) = groups.iter_mut().find(|g| g.id == id) else {
            tracing::debug!("Group {} not found; nothing to update", id);
            return Ok(None);
        };
        patch.apply(group);
        let updated = group.clone();
        self.save_groups(&groups)?;

        tracing::info!("Updated group {}", id);
        self.notify(StoreEvent::GroupUpdated { id: id.to_string() });
        Ok(Some(updated))
    }

    /// Removes the group and clears `group_id` on every contact that
    /// referenced it.
    pub fn delete_group(&self, id: &str) -> StoreResult<()> {
        let mut groups = self.peek_groups()?;
        let before = groups.len();
        groups.retain(|g| g.id != id);
        let group_removed = groups.len() != before;
        if group_removed {
            self.save_groups(&groups)?;
        }

        let mut contacts = self.contacts_for_write()?;
        let mut released = Vec::new();
        for contact in contacts.iter_mut().filter(|c| c.is_in_group(id)) {
            contact.group_id = None;
            released.push(contact.id.clone());
        }
        if !released.is_empty() {
            self.save_contacts(&contacts)?;
        }

        if !group_removed && released.is_empty() {
            tracing::debug!("Group {} not found; nothing to delete", id);
            return Ok(());
        }
        tracing::info!("Deleted group {} and released {} member(s)", id, released.len());
        self.notify(StoreEvent::GroupDeleted { id: id.to_string(), released });
        Ok(())
    }

    // ========================================================================
    // Membership
    // ========================================================================

    /// Moves the listed contacts into `group_id`. An unknown group is a
    /// no-op. Returns the number of contacts whose membership changed.
    pub fn add_contacts_to_group(&self, ids: &[String], group_id: &str) -> StoreResult<usize> {
        let groups = self.peek_groups()?;
        if !groups.iter().any(|g| g.id == group_id) {
            tracing::debug!("Group {} not found; membership unchanged", group_id);
            return Ok(0);
        }

        let mut contacts = self.contacts_for_write()?;
        let mut moved = Vec::new();
        for contact in contacts
            .iter_mut()
            .filter(|c| ids.contains(&c.id) && !c.is_in_group(group_id))
        {
            contact.group_id = Some(group_id.to_string());
            moved.push(contact.id.clone());
        }
        if moved.is_empty() {
            return Ok(0);
        }
        self.save_contacts(&contacts)?;
        self.refresh_member_counts(&contacts);

        let count = member_count(&contacts, group_id);
        tracing::info!(
            "Added {} contact(s) to group {} ({} members)",
            moved.len(),
            group_id,
            count
        );
        let changed = moved.len();
        self.notify(StoreEvent::MembershipChanged {
            group_id: group_id.to_string(),
            contact_ids: moved,
            member_count: count,
        });
        Ok(changed)
    }

    /// Creates a group and moves the listed contacts into it.
    pub fn create_group_with_members(&self, data: NewGroup, ids: &[String]) -> StoreResult<Group> {
        let mut group = self.create_group(data)?;
        self.add_contacts_to_group(ids, &group.id)?;
        group.member_count = member_count(&self.load_contacts(), &group.id);
        Ok(group)
    }

    /// Clears the contact's group. No-op when the contact is unknown or
    /// already ungrouped.
    pub fn remove_contact_from_group(&self, id: &str) -> StoreResult<()> {
        let mut contacts = self.contacts_for_write()?;
        let Some(contact) = contacts.iter_mut().find(|c| c.id == id) else {
            tracing::debug!("Contact {} not found; membership unchanged", id);
            return Ok(());
        };
        let Some(group_id) = contact.group_id.take() else {
            return Ok(());
        };
        self.save_contacts(&contacts)?;
        self.refresh_member_counts(&contacts);

        let count = member_count(&contacts, &group_id);
        tracing::info!("Removed contact {} from group {} ({} members)", id, group_id, count);
        self.notify(StoreEvent::MembershipChanged {
            group_id,
            contact_ids: vec![id.to_string()],
            member_count: count,
        });
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn get_contacts_in_group(&self, group_id: &str) -> Vec<Contact> {
        self.load_contacts()
            .into_iter()
            .filter(|c| c.is_in_group(group_id))
            .collect()
    }

    /// Contacts that could be added to `group_id`: everyone not already in it.
    pub fn contacts_not_in_group(&self, group_id: &str) -> Vec<Contact> {
        self.load_contacts()
            .into_iter()
            .filter(|c| !c.is_in_group(group_id))
            .collect()
    }

    /// Groups with member counts recomputed from the current contacts,
    /// independent of what is persisted.
    pub fn groups_with_live_counts(&self) -> Vec<Group> {
        let contacts = self.load_contacts();
        let mut groups = self.load_groups();
        sync_member_counts(&mut groups, &contacts);
        groups
    }
}
