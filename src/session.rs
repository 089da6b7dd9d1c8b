// src/session.rs
//
// ContactsSession - the list screen's state: current query, the last loaded
// contacts, and the multi-select used for bulk actions.
//
// The session re-reads the store when a subscription event says contacts
// changed, so edits made elsewhere (the group screen, the bridge) show up on
// the next `sync`.

use crate::{
    error::StoreResult,
    models::{Contact, ContactPatch},
    storage::Storage,
    store::{ContactStore, StoreSubscription},
    view::{self, ActiveView, TagFilter, ViewCounts, ViewQuery},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkAction {
    Favorite,
    /// Archive, or unarchive when the archives view is active
    Archive,
    Delete,
    AddToGroup(String),
}

impl BulkAction {
    pub fn is_destructive(&self) -> bool {
        matches!(self, BulkAction::Delete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOutcome {
    Applied(usize),
    /// The user declined the confirmation; nothing was written
    Cancelled,
    NothingSelected,
}

pub struct ContactsSession<'a, S: Storage> {
    store: &'a ContactStore<S>,
    events: StoreSubscription,
    query: ViewQuery,
    contacts: Vec<Contact>,
    selection: Vec<String>,
    selection_mode: bool,
}

impl<'a, S: Storage> ContactsSession<'a, S> {
    pub fn new(store: &'a ContactStore<S>) -> Self {
        let events = store.subscribe();
        let contacts = store.load_contacts();
        Self {
            store,
            events,
            query: ViewQuery::default(),
            contacts,
            selection: Vec::new(),
            selection_mode: false,
        }
    }

    pub fn refresh(&mut self) {
        self.contacts = self.store.load_contacts();
        let known = &self.contacts;
        self.selection.retain(|id| known.iter().any(|c| &c.id == id));
    }

    /// Drains pending store events; re-reads contacts if any touched them.
    /// Returns true when a refresh happened.
    pub fn sync(&mut self) -> bool {
        let mut dirty = false;
        while let Ok(event) = self.events.try_recv() {
            dirty |= event.touches_contacts();
        }
        if dirty {
            self.refresh();
        }
        dirty
    }

    // ========================================================================
    // Query
    // ========================================================================

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn visible(&self) -> Vec<&Contact> {
        view::project(&self.contacts, &self.query)
    }

    pub fn counts(&self) -> ViewCounts {
        view::view_counts(&self.contacts)
    }

    /// Badge count for the active view.
    pub fn active_count(&self) -> usize {
        self.counts().get(self.query.view)
    }

    /// Switching views drops the selection and leaves selection mode.
    pub fn set_view(&mut self, view: ActiveView) {
        self.query.view = view;
        self.selection.clear();
        self.selection_mode = false;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.query.search = term.into();
    }

    pub fn set_tag(&mut self, tag: impl Into<TagFilter>) {
        self.query.tag = tag.into();
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn selection_mode(&self) -> bool {
        self.selection_mode
    }

    pub fn set_selection_mode(&mut self, on: bool) {
        self.selection_mode = on;
    }

    /// Flips `id` in the selection. Ignored outside selection mode.
    /// Returns whether `id` is selected afterwards.
    pub fn toggle_selection(&mut self, id: &str) -> bool {
        if !self.selection_mode {
            return false;
        }
        if let Some(pos) = self.selection.iter().position(|s| s == id) {
            self.selection.remove(pos);
            false
        } else {
            self.selection.push(id.to_string());
            true
        }
    }

    pub fn selected(&self) -> &[String] {
        &self.selection
    }

    fn end_selection(&mut self) {
        self.selection.clear();
        self.selection_mode = false;
    }

    // ========================================================================
    // Actions
    // ========================================================================

    pub fn toggle_favorite(&mut self, id: &str) -> StoreResult<Option<Contact>> {
        let updated = self.store.toggle_favorite(id)?;
        self.sync();
        Ok(updated)
    }

    /// Deletes one contact after `confirm` accepts a prompt naming it.
    /// Returns false when the user declined or the contact is unknown.
    pub fn delete_contact(
        &mut self,
        id: &str,
        confirm: impl FnOnce(&str) -> bool,
    ) -> StoreResult<bool> {
        self.sync();
        let Some(contact) = self.contacts.iter().find(|c| c.id == id) else {
            return Ok(false);
        };
        let prompt = format!("Are you sure you want to delete {}?", contact.name);
        if !confirm(&prompt) {
            return Ok(false);
        }
        self.store.delete_contact(id)?;
        self.selection.retain(|s| s != id);
        self.sync();
        Ok(true)
    }

    /// Prompt shown before a destructive bulk action, naming how many
    /// contacts it affects.
    pub fn confirmation_prompt(&self, action: &BulkAction) -> Option<String> {
        action.is_destructive().then(|| {
            format!(
                "Are you sure you want to delete {} selected contact(s)?",
                self.selection.len()
            )
        })
    }

    /// Applies `action` to the selection. Destructive actions ask `confirm`
    /// first; a declined prompt leaves store and selection untouched. On a
    /// store error the selection is kept so the user can retry.
    pub fn apply_bulk(
        &mut self,
        action: BulkAction,
        confirm: impl FnOnce(&str) -> bool,
    ) -> StoreResult<BulkOutcome> {
        if self.selection.is_empty() {
            return Ok(BulkOutcome::NothingSelected);
        }
        if let Some(prompt) = self.confirmation_prompt(&action) {
            if !confirm(&prompt) {
                tracing::debug!("Bulk {:?} cancelled by user", action);
                return Ok(BulkOutcome::Cancelled);
            }
        }

        let ids = self.selection.clone();
        let affected = match action {
            BulkAction::Favorite => self
                .store
                .bulk_update_contacts(&ids, &ContactPatch::favorite(true))?,
            BulkAction::Archive => {
                let archive = self.query.view != ActiveView::Archives;
                self.store
                    .bulk_update_contacts(&ids, &ContactPatch::archived(archive))?
            }
            BulkAction::Delete => self.store.bulk_delete_contacts(&ids)?,
            BulkAction::AddToGroup(group_id) => self.store.add_contacts_to_group(&ids, &group_id)?,
        };

        self.end_selection();
        self.sync();
        Ok(BulkOutcome::Applied(affected))
    }
}
