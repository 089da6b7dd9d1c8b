// src/store.rs
//
// ContactStore - sole owner of the persisted contact and group collections.
//
// Every mutation loads the full collection, applies the change and rewrites
// the full collection under its key. Reads are fail-soft (log and return an
// empty list); writes propagate errors to the caller.
//
// Group-specific operations live in groups.rs.

use std::{collections::HashSet, sync::Mutex};

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    config::StoreConfig,
    error::{StoreError, StoreResult},
    models::{
        Contact, ContactPatch, Group, NewContact, SnapshotDTO, StoreEvent, avatar_for,
        core::DEFAULT_CREATED_BY, sync_member_counts,
    },
    storage::Storage,
};

/// Receiving end of a store subscription. Every successful mutation queues
/// one event before the mutating call returns.
pub type StoreSubscription = UnboundedReceiver<StoreEvent>;

pub struct ContactStore<S: Storage> {
    pub(crate) storage: S,
    pub(crate) config: StoreConfig,
    subscribers: Mutex<Vec<UnboundedSender<StoreEvent>>>,
}

impl<S: Storage> ContactStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, StoreConfig::default())
    }

    pub fn with_config(storage: S, config: StoreConfig) -> Self {
        Self {
            storage,
            config,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    pub fn subscribe(&self) -> StoreSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    pub(crate) fn notify(&self, event: StoreEvent) {
        let mut subs = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subs.retain(|tx| tx.send(event.clone()).is_ok());
        tracing::trace!("Delivered {:?} to {} subscriber(s)", event, subs.len());
    }

    // ========================================================================
    // Collection IO
    // ========================================================================

    fn read_collection<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<Vec<T>>> {
        match self.storage.get(key)? {
            Some(blob) => serde_json::from_str(&blob)
                .map(Some)
                .map_err(|source| StoreError::Corrupt { key: key.to_string(), source }),
            None => Ok(None),
        }
    }

    fn write_collection<T: Serialize>(&self, key: &str, items: &[T]) -> StoreResult<()> {
        let blob = serde_json::to_string(items)
            .map_err(|source| StoreError::Serialize { key: key.to_string(), source })?;
        self.storage.set(key, &blob)?;
        Ok(())
    }

    /// Persisted collection, or the seed (persisted first) when the key is
    /// absent. A failed seed write is logged; the seed is still returned.
    fn load_or_seed<T: DeserializeOwned + Serialize>(
        &self,
        key: &str,
        seed_json: &str,
        seeded: fn(usize) -> StoreEvent,
    ) -> StoreResult<Vec<T>> {
        if let Some(items) = self.read_collection(key)? {
            return Ok(items);
        }
        let items: Vec<T> = serde_json::from_str(seed_json)
            .map_err(|source| StoreError::Corrupt { key: format!("seed:{key}"), source })?;
        match self.write_collection(key, &items) {
            Ok(()) => {
                tracing::info!("Seeded '{}' with {} records", key, items.len());
                self.notify(seeded(items.len()));
            }
            Err(e) => tracing::error!("Error saving seed for '{}': {}", key, e),
        }
        Ok(items)
    }

    pub(crate) fn contacts_for_write(&self) -> StoreResult<Vec<Contact>> {
        self.load_or_seed(
            &self.config.contacts_key,
            self.config.seed.contacts_json(),
            |count| StoreEvent::ContactsSeeded { count },
        )
    }

    pub(crate) fn groups_for_write(&self) -> StoreResult<Vec<Group>> {
        self.load_or_seed(
            &self.config.groups_key,
            self.config.seed.groups_json(),
            |count| StoreEvent::GroupsSeeded { count },
        )
    }

    pub(crate) fn save_contacts(&self, contacts: &[Contact]) -> StoreResult<()> {
        self.write_collection(&self.config.contacts_key, contacts)
    }

    pub(crate) fn save_groups(&self, groups: &[Group]) -> StoreResult<()> {
        self.write_collection(&self.config.groups_key, groups)
    }

    /// Groups as a write would see them, without persisting the seed when the
    /// key is absent. Used for existence checks that may end as no-ops.
    pub(crate) fn peek_groups(&self) -> StoreResult<Vec<Group>> {
        let key = &self.config.groups_key;
        match self.read_collection(key)? {
            Some(groups) => Ok(groups),
            None => serde_json::from_str(self.config.seed.groups_json())
                .map_err(|source| StoreError::Corrupt { key: format!("seed:{key}"), source }),
        }
    }

    /// Recomputes every group's member count from `contacts` and persists the
    /// groups collection if any count moved. Runs after the contacts write has
    /// landed, so a failure here is logged and the counts stay stale until
    /// the next membership change.
    pub(crate) fn refresh_member_counts(&self, contacts: &[Contact]) {
        let result = self.groups_for_write().and_then(|mut groups| {
            if sync_member_counts(&mut groups, contacts) {
                self.save_groups(&groups)?;
            }
            Ok(())
        });
        if let Err(e) = result {
            tracing::error!("Error refreshing group member counts: {}", e);
        }
    }

    // ========================================================================
    // Reads (fail-soft)
    // ========================================================================

    pub fn load_contacts(&self) -> Vec<Contact> {
        self.contacts_for_write().unwrap_or_else(|e| {
            tracing::error!("Error loading contacts: {}", e);
            Vec::new()
        })
    }

    pub fn load_groups(&self) -> Vec<Group> {
        self.groups_for_write().unwrap_or_else(|e| {
            tracing::error!("Error loading groups: {}", e);
            Vec::new()
        })
    }

    pub fn get_contact(&self, id: &str) -> Option<Contact> {
        self.load_contacts().into_iter().find(|c| c.id == id)
    }

    pub fn export_snapshot(&self) -> SnapshotDTO {
        SnapshotDTO {
            contacts: self.load_contacts(),
            groups: self.load_groups(),
        }
    }

    // ========================================================================
    // Contact mutations
    // ========================================================================

    pub fn add_contact(&self, data: NewContact) -> StoreResult<Contact> {
        let tags = data.validate().map_err(StoreError::InvalidContact)?;
        let mut contacts = self.contacts_for_write()?;

        let contact = Contact {
            id: uuid::Uuid::new_v4().to_string(),
            avatar: avatar_for(&data.name),
            name: data.name,
            email: data.email,
            phone: data.phone,
            tags,
            is_favorite: false,
            is_archived: false,
            group_id: None,
            created_date: Utc::now(),
            created_by: DEFAULT_CREATED_BY.to_string(),
        };
        contacts.push(contact.clone());
        self.save_contacts(&contacts)?;

        tracing::info!("Added contact {} ({})", contact.name, contact.id);
        self.notify(StoreEvent::ContactAdded { id: contact.id.clone() });
        Ok(contact)
    }

    pub fn update_contact(&self, id: &str, patch: &ContactPatch) -> StoreResult<Option<Contact>> {
        self.modify_contact(id, |contact| patch.apply(contact))
    }

    pub fn toggle_favorite(&self, id: &str) -> StoreResult<Option<Contact>> {
        self.modify_contact(id, |contact| contact.is_favorite = !contact.is_favorite)
    }

    fn modify_contact(
        &self,
        id: &str,
        change: impl FnOnce(&mut Contact),
    ) -> StoreResult<Option<Contact>> {
        let mut contacts = self.contacts_for_write()?;
        let Some(contact) = contacts.iter_mut().find(|c| c.id == id) else {
            tracing::debug!("Contact {} not found; nothing to update", id);
            return Ok(None);
        };
        change(contact);
        let updated = contact.clone();
        self.save_contacts(&contacts)?;

        tracing::info!("Updated contact {}", id);
        self.notify(StoreEvent::ContactUpdated { id: id.to_string() });
        Ok(Some(updated))
    }

    /// Removes the contact. Deleting an unknown id succeeds without writing.
    pub fn delete_contact(&self, id: &str) -> StoreResult<()> {
        self.bulk_delete_contacts(&[id.to_string()]).map(|_| ())
    }

    /// Applies `patch` to every listed contact in one write. Returns the
    /// number of contacts changed.
    pub fn bulk_update_contacts(&self, ids: &[String], patch: &ContactPatch) -> StoreResult<usize> {
        if patch.is_empty() {
            tracing::debug!("Bulk update with an empty patch; nothing to write");
            return Ok(0);
        }
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut contacts = self.contacts_for_write()?;

        let mut touched = Vec::new();
        for contact in contacts.iter_mut().filter(|c| wanted.contains(c.id.as_str())) {
            patch.apply(contact);
            touched.push(contact.id.clone());
        }
        if touched.is_empty() {
            tracing::debug!("Bulk update matched no contacts");
            return Ok(0);
        }
        self.save_contacts(&contacts)?;

        tracing::info!("Bulk updated {} contacts", touched.len());
        let count = touched.len();
        self.notify(StoreEvent::ContactsUpdated { ids: touched });
        Ok(count)
    }

    /// Removes every listed contact in one write, then brings group member
    /// counts back in line. Returns the number of contacts removed.
    pub fn bulk_delete_contacts(&self, ids: &[String]) -> StoreResult<usize> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let contacts = self.contacts_for_write()?;

        let (removed, kept): (Vec<Contact>, Vec<Contact>) = contacts
            .into_iter()
            .partition(|c| wanted.contains(c.id.as_str()));
        if removed.is_empty() {
            tracing::debug!("Delete matched no contacts");
            return Ok(0);
        }
        self.save_contacts(&kept)?;
        if removed.iter().any(|c| c.group_id.is_some()) {
            self.refresh_member_counts(&kept);
        }

        tracing::info!("Deleted {} contact(s)", removed.len());
        let ids: Vec<String> = removed.into_iter().map(|c| c.id).collect();
        let count = ids.len();
        self.notify(StoreEvent::ContactsDeleted { ids });
        Ok(count)
    }
}
