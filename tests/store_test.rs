// tests/store_test.rs
//
// STORE TEST - persistence, failure semantics and derived-field invariants
//
// Covers:
//   1. Seeding and fail-soft reads
//   2. Contact CRUD, idempotent delete, persist/load round-trip
//   3. Bulk operations land in a single write
//   4. Group cascade and member counts after every membership change
//   5. Write failures propagate and leave persisted state untouched
//   6. Subscriptions see every successful mutation
//   7. SQLite backend survives a reopen

use contacts_backend::{
    ContactPatch, ContactStore, GroupPatch, MemoryStorage, NewContact, NewGroup, SeedSource,
    SqliteStorage, StoreConfig, StoreError, StoreEvent,
    config::{CONTACTS_STORAGE_KEY, GROUPS_STORAGE_KEY},
    models::avatar_for,
    storage::Storage,
};

// ═══════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════

fn empty_store() -> ContactStore<MemoryStorage> {
    ContactStore::with_config(
        MemoryStorage::new(),
        StoreConfig::default().with_seed(SeedSource::Empty),
    )
}

fn new_contact(name: &str, tag: &str) -> NewContact {
    NewContact {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: "555-0100".to_string(),
        tags: vec![tag.to_string()],
    }
}

fn new_group(name: &str) -> NewGroup {
    NewGroup {
        name: name.to_string(),
        description: String::new(),
    }
}

fn assert_member_counts_consistent<S: Storage>(store: &ContactStore<S>) {
    let contacts = store.load_contacts();
    for group in store.load_groups() {
        let actual = contacts
            .iter()
            .filter(|c| c.group_id.as_deref() == Some(group.id.as_str()))
            .count();
        assert_eq!(
            group.member_count, actual,
            "group {} persisted count {} but has {} members",
            group.name, group.member_count, actual
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SEEDING AND READS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn first_load_seeds_and_persists_bundled_data() {
    let store = ContactStore::new(MemoryStorage::new());
    let mut events = store.subscribe();

    let contacts = store.load_contacts();
    assert!(!contacts.is_empty());
    assert!(store.storage().raw(CONTACTS_STORAGE_KEY).is_some());
    assert_eq!(
        events.try_recv().unwrap(),
        StoreEvent::ContactsSeeded { count: contacts.len() }
    );

    // Second load reads what was persisted, no reseed.
    assert_eq!(store.load_contacts(), contacts);
    assert!(events.try_recv().is_err());
    assert_member_counts_consistent(&store);
}

#[test]
fn seed_is_returned_even_when_it_cannot_be_persisted() {
    let store = ContactStore::new(MemoryStorage::new());
    store.storage().fail_writes(true);

    assert!(!store.load_contacts().is_empty());
    assert!(store.storage().raw(CONTACTS_STORAGE_KEY).is_none());
}

#[test]
fn unreadable_storage_degrades_to_empty() {
    let store = ContactStore::new(MemoryStorage::new());
    store.storage().fail_reads(true);

    assert!(store.load_contacts().is_empty());
    assert!(store.load_groups().is_empty());
}

#[test]
fn corrupt_collection_reads_empty_but_blocks_writes() {
    let storage = MemoryStorage::new().with_entry(CONTACTS_STORAGE_KEY, "{not json");
    let store = ContactStore::new(storage);

    assert!(store.load_contacts().is_empty());

    let err = store.add_contact(new_contact("Ann", "work")).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }));
    assert_eq!(
        store.storage().raw(CONTACTS_STORAGE_KEY).as_deref(),
        Some("{not json")
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// CONTACT CRUD
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn add_contact_assigns_identity_and_defaults() {
    let store = empty_store();
    let ann = store.add_contact(new_contact("Ann Lee", "work")).unwrap();
    let bo = store.add_contact(new_contact("Bo", "family")).unwrap();

    assert_ne!(ann.id, bo.id);
    assert!(!ann.is_favorite);
    assert!(!ann.is_archived);
    assert!(ann.group_id.is_none());
    assert_eq!(ann.avatar, avatar_for("Ann Lee"));
    assert_eq!(ann.created_by, "current-user");
}

#[test]
fn add_contact_requires_a_tag() {
    let store = empty_store();
    let mut data = new_contact("Ann", "work");
    data.tags.clear();

    assert!(matches!(
        store.add_contact(data),
        Err(StoreError::InvalidContact(_))
    ));
    assert_eq!(store.storage().write_count(), 0);
}

#[test]
fn persisted_contacts_round_trip() {
    let store = empty_store();
    let added = vec![
        store.add_contact(new_contact("Ann", "work")).unwrap(),
        store.add_contact(new_contact("Bo", "family")).unwrap(),
    ];

    assert_eq!(store.load_contacts(), added);
}

#[test]
fn update_merges_patch_and_tracks_avatar() {
    let store = empty_store();
    let ann = store.add_contact(new_contact("Ann", "work")).unwrap();

    let patch = ContactPatch {
        email: Some("ann@work.example".into()),
        ..ContactPatch::default()
    };
    let updated = store.update_contact(&ann.id, &patch).unwrap().unwrap();
    assert_eq!(updated.email, "ann@work.example");
    assert_eq!(updated.avatar, ann.avatar);
    assert_eq!(updated.created_date, ann.created_date);

    let renamed = store
        .update_contact(&ann.id, &ContactPatch { name: Some("Annie".into()), ..Default::default() })
        .unwrap()
        .unwrap();
    assert_eq!(renamed.avatar, avatar_for("Annie"));
}

#[test]
fn update_does_not_revalidate_tags() {
    let store = empty_store();
    let ann = store.add_contact(new_contact("Ann", "work")).unwrap();
    let patch = ContactPatch { tags: Some(vec![]), ..Default::default() };

    let updated = store.update_contact(&ann.id, &patch).unwrap().unwrap();
    assert!(updated.tags.is_empty());
}

#[test]
fn update_of_unknown_id_is_a_silent_no_op() {
    let store = empty_store();
    store.add_contact(new_contact("Ann", "work")).unwrap();
    let writes = store.storage().write_count();

    assert_eq!(
        store.update_contact("missing", &ContactPatch::favorite(true)).unwrap(),
        None
    );
    assert_eq!(store.toggle_favorite("missing").unwrap(), None);
    assert_eq!(store.storage().write_count(), writes);
}

#[test]
fn toggle_favorite_flips_and_persists() {
    let store = empty_store();
    let ann = store.add_contact(new_contact("Ann", "work")).unwrap();

    assert!(store.toggle_favorite(&ann.id).unwrap().unwrap().is_favorite);
    assert!(store.get_contact(&ann.id).unwrap().is_favorite);
    assert!(!store.toggle_favorite(&ann.id).unwrap().unwrap().is_favorite);
}

#[test]
fn deleting_twice_equals_deleting_once() {
    let store = empty_store();
    let ann = store.add_contact(new_contact("Ann", "work")).unwrap();
    let bo = store.add_contact(new_contact("Bo", "family")).unwrap();

    store.delete_contact(&ann.id).unwrap();
    let once = store.load_contacts();
    store.delete_contact(&ann.id).unwrap();

    assert_eq!(store.load_contacts(), once);
    assert_eq!(once, vec![bo]);
}

// ═══════════════════════════════════════════════════════════════════════════
// BULK OPERATIONS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn bulk_delete_is_one_write_and_never_half_applied() {
    let store = empty_store();
    let a = store.add_contact(new_contact("Ann", "work")).unwrap();
    let b = store.add_contact(new_contact("Bo", "family")).unwrap();
    let c = store.add_contact(new_contact("Cy", "friends")).unwrap();
    let writes = store.storage().write_count();

    let removed = store
        .bulk_delete_contacts(&[a.id.clone(), b.id.clone()])
        .unwrap();

    assert_eq!(removed, 2);
    assert_eq!(store.storage().write_count(), writes + 1);
    assert_eq!(store.load_contacts(), vec![c]);
}

#[test]
fn failed_bulk_delete_removes_nothing() {
    let store = empty_store();
    let a = store.add_contact(new_contact("Ann", "work")).unwrap();
    let b = store.add_contact(new_contact("Bo", "family")).unwrap();
    store.storage().fail_writes(true);

    let err = store.bulk_delete_contacts(&[a.id.clone(), b.id.clone()]);
    assert!(matches!(err, Err(StoreError::Storage(_))));

    store.storage().fail_writes(false);
    assert_eq!(store.load_contacts(), vec![a, b]);
}

#[test]
fn bulk_update_applies_patch_in_one_write() {
    let store = empty_store();
    let a = store.add_contact(new_contact("Ann", "work")).unwrap();
    let b = store.add_contact(new_contact("Bo", "family")).unwrap();
    let c = store.add_contact(new_contact("Cy", "friends")).unwrap();
    let writes = store.storage().write_count();

    let changed = store
        .bulk_update_contacts(&[a.id.clone(), c.id.clone(), "missing".into()], &ContactPatch::archived(true))
        .unwrap();

    assert_eq!(changed, 2);
    assert_eq!(store.storage().write_count(), writes + 1);
    let archived: Vec<_> = store
        .load_contacts()
        .into_iter()
        .filter(|x| x.is_archived)
        .map(|x| x.id)
        .collect();
    assert_eq!(archived, vec![a.id, c.id]);
    assert!(!store.get_contact(&b.id).unwrap().is_archived);
}

#[test]
fn bulk_update_with_empty_patch_writes_nothing() {
    let store = empty_store();
    let ann = store.add_contact(new_contact("Ann", "work")).unwrap();
    let writes = store.storage().write_count();

    let changed = store
        .bulk_update_contacts(&[ann.id.clone()], &ContactPatch::default())
        .unwrap();

    assert_eq!(changed, 0);
    assert_eq!(store.storage().write_count(), writes);
}

// ═══════════════════════════════════════════════════════════════════════════
// GROUPS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn group_crud() {
    let store = empty_store();
    let g = store.create_group(new_group("Book Club")).unwrap();
    assert_eq!(g.member_count, 0);

    let patch = GroupPatch { description: Some("Monthly".into()), ..Default::default() };
    let updated = store.update_group(&g.id, &patch).unwrap().unwrap();
    assert_eq!(updated.description, "Monthly");
    assert_eq!(updated.name, "Book Club");

    assert!(store.update_group("missing", &patch).unwrap().is_none());
    assert!(matches!(
        store.create_group(new_group("  ")),
        Err(StoreError::InvalidGroup(_))
    ));
}

#[test]
fn membership_changes_keep_member_count_exact() {
    let store = empty_store();
    let g = store.create_group(new_group("Team")).unwrap();
    let h = store.create_group(new_group("Family")).unwrap();
    let ids: Vec<String> = ["Ann", "Bo", "Cy"]
        .iter()
        .map(|n| store.add_contact(new_contact(n, "work")).unwrap().id)
        .collect();

    assert_eq!(store.add_contacts_to_group(&ids, &g.id).unwrap(), 3);
    assert_member_counts_consistent(&store);
    assert_eq!(store.get_contacts_in_group(&g.id).len(), 3);

    // Moving one contact updates both the old and the new group.
    store.add_contacts_to_group(&ids[..1], &h.id).unwrap();
    assert_member_counts_consistent(&store);

    store.remove_contact_from_group(&ids[1]).unwrap();
    assert_member_counts_consistent(&store);
    assert_eq!(store.get_contacts_in_group(&g.id).len(), 1);

    store.delete_contact(&ids[2]).unwrap();
    assert_member_counts_consistent(&store);
    assert!(store.get_contacts_in_group(&g.id).is_empty());
}

#[test]
fn adding_to_unknown_group_is_a_no_op() {
    let store = empty_store();
    let ann = store.add_contact(new_contact("Ann", "work")).unwrap();
    let writes = store.storage().write_count();
    let mut events = store.subscribe();

    assert_eq!(store.add_contacts_to_group(&[ann.id.clone()], "missing").unwrap(), 0);
    assert_eq!(store.storage().write_count(), writes);
    assert!(store.get_contact(&ann.id).unwrap().group_id.is_none());
    assert!(events.try_recv().is_err());
}

#[test]
fn deleting_unknown_group_is_a_no_op() {
    let store = empty_store();
    store.add_contact(new_contact("Ann", "work")).unwrap();
    let writes = store.storage().write_count();
    let mut events = store.subscribe();

    store.delete_group("missing").unwrap();

    assert_eq!(store.storage().write_count(), writes);
    assert!(events.try_recv().is_err());
}

#[test]
fn removing_ungrouped_or_unknown_contact_is_a_no_op() {
    let store = empty_store();
    let ann = store.add_contact(new_contact("Ann", "work")).unwrap();
    let writes = store.storage().write_count();
    let mut events = store.subscribe();

    store.remove_contact_from_group(&ann.id).unwrap();
    store.remove_contact_from_group("missing").unwrap();

    assert_eq!(store.storage().write_count(), writes);
    assert!(events.try_recv().is_err());
}

#[test]
fn deleting_a_group_releases_all_members() {
    let store = empty_store();
    let g = store.create_group(new_group("Team")).unwrap();
    let keep = store.create_group(new_group("Other")).unwrap();
    let members: Vec<String> = ["Ann", "Bo", "Cy"]
        .iter()
        .map(|n| store.add_contact(new_contact(n, "work")).unwrap().id)
        .collect();
    let outsider = store.add_contact(new_contact("Di", "family")).unwrap();
    store.add_contacts_to_group(&members, &g.id).unwrap();
    store.add_contacts_to_group(&[outsider.id.clone()], &keep.id).unwrap();
    let mut events = store.subscribe();

    store.delete_group(&g.id).unwrap();

    let contacts = store.load_contacts();
    let released = contacts.iter().filter(|c| members.contains(&c.id));
    assert_eq!(released.clone().count(), 3);
    assert!(released.into_iter().all(|c| c.group_id.is_none()));
    assert!(!contacts.iter().any(|c| c.group_id.as_deref() == Some(g.id.as_str())));
    assert_eq!(
        store.get_contact(&outsider.id).unwrap().group_id.as_deref(),
        Some(keep.id.as_str())
    );
    assert!(store.load_groups().iter().all(|x| x.id != g.id));
    assert!(matches!(
        events.try_recv().unwrap(),
        StoreEvent::GroupDeleted { ref released, .. } if released.len() == 3
    ));
    assert_member_counts_consistent(&store);
}

#[test]
fn candidates_and_live_counts() {
    let store = empty_store();
    let g = store.create_group(new_group("Team")).unwrap();
    let ann = store.add_contact(new_contact("Ann", "work")).unwrap();
    let bo = store.add_contact(new_contact("Bo", "work")).unwrap();
    store.add_contacts_to_group(&[ann.id.clone()], &g.id).unwrap();

    let candidates: Vec<String> = store
        .contacts_not_in_group(&g.id)
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(candidates, vec![bo.id.clone()]);

    let created = store
        .create_group_with_members(new_group("Pair"), &[bo.id.clone()])
        .unwrap();
    assert_eq!(created.member_count, 1);

    let live = store.groups_with_live_counts();
    assert_eq!(live.iter().find(|x| x.id == g.id).unwrap().member_count, 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// FAILURES AND NOTIFICATIONS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn write_failure_propagates_without_notifying() {
    let store = empty_store();
    store.add_contact(new_contact("Ann", "work")).unwrap();
    let mut events = store.subscribe();
    store.storage().fail_writes(true);

    assert!(matches!(
        store.add_contact(new_contact("Bo", "work")),
        Err(StoreError::Storage(_))
    ));
    assert!(events.try_recv().is_err());

    store.storage().fail_writes(false);
    assert_eq!(store.load_contacts().len(), 1);
}

#[test]
fn stale_counts_do_not_undo_a_landed_contacts_write() {
    let contacts = r#"[
        {"id":"c1","name":"Ann","groupId":"g1","createdDate":"2024-01-01T00:00:00Z"},
        {"id":"c2","name":"Bo","groupId":"g1","createdDate":"2024-01-01T00:00:00Z"}
    ]"#;
    let storage = MemoryStorage::new()
        .with_entry(CONTACTS_STORAGE_KEY, contacts)
        .with_entry(GROUPS_STORAGE_KEY, "{not json");
    let store = ContactStore::new(storage);
    let mut events = store.subscribe();

    store.delete_contact("c1").unwrap();
    assert_eq!(
        events.try_recv().unwrap(),
        StoreEvent::ContactsDeleted { ids: vec!["c1".into()] }
    );

    store.remove_contact_from_group("c2").unwrap();
    assert_eq!(
        events.try_recv().unwrap(),
        StoreEvent::MembershipChanged {
            group_id: "g1".into(),
            contact_ids: vec!["c2".into()],
            member_count: 0,
        }
    );

    let remaining = store.load_contacts();
    assert_eq!(remaining.len(), 1);
    assert!(remaining[0].group_id.is_none());
    assert_eq!(
        store.storage().raw(GROUPS_STORAGE_KEY).as_deref(),
        Some("{not json")
    );
}

#[test]
fn every_subscriber_sees_each_mutation() {
    let store = empty_store();
    store.load_contacts();
    let mut first = store.subscribe();
    let mut second = store.subscribe();
    let dropped = store.subscribe();
    drop(dropped);

    let ann = store.add_contact(new_contact("Ann", "work")).unwrap();
    store.toggle_favorite(&ann.id).unwrap();

    for rx in [&mut first, &mut second] {
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::ContactAdded { id: ann.id.clone() });
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::ContactUpdated { id: ann.id.clone() });
        assert!(rx.try_recv().is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SQLITE BACKEND
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::default().with_seed(SeedSource::Empty);

    let (ann, group) = {
        let store =
            ContactStore::with_config(SqliteStorage::open_in_dir(dir.path()).unwrap(), config.clone());
        let ann = store.add_contact(new_contact("Ann", "work")).unwrap();
        let group = store.create_group(new_group("Team")).unwrap();
        store.add_contacts_to_group(&[ann.id.clone()], &group.id).unwrap();
        (ann, group)
    };

    let store = ContactStore::with_config(SqliteStorage::open_in_dir(dir.path()).unwrap(), config);
    let contacts = store.load_contacts();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].id, ann.id);
    assert_eq!(contacts[0].group_id.as_deref(), Some(group.id.as_str()));
    assert_eq!(store.load_groups()[0].member_count, 1);
}
