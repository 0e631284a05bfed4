//! Contract Test: Contact CRUD
//!
//! Verifies the observable behavior of ContactService over every built-in
//! store:
//! - create then list includes the record under a fresh id
//! - update overwrites fields at the id and leaves other records alone
//! - delete removes the record; a second delete still succeeds
//! - list is sorted by name regardless of insertion order

mod common;

use common::*;
use phonebook_core::{ContactDraft, ContactPatch};
use std::collections::HashSet;

#[tokio::test]
async fn create_then_list_includes_record_with_fresh_id() {
    let dir = tempfile::tempdir().unwrap();

    for service in builtin_services(&dir).await {
        let mut seen = HashSet::new();
        for i in 0..5 {
            let draft = full_draft(&format!("Person {i}"), "9998887777");
            let created = service.create(draft.clone()).await.unwrap();
            assert!(
                seen.insert(created.id.clone()),
                "{} store reused an id",
                service.store_name()
            );

            let listed = service.list().await.unwrap();
            let found = listed
                .iter()
                .find(|c| c.id == created.id)
                .expect("created contact is listed");
            assert_eq!(found.name, draft.name);
            assert_eq!(found.phone_number, draft.phone_number);
            assert_eq!(found.birth_date, draft.birth_date);
            assert_eq!(found.address, draft.address);
        }
    }
}

#[tokio::test]
async fn duplicates_are_permitted() {
    let dir = tempfile::tempdir().unwrap();

    for service in builtin_services(&dir).await {
        let a = service
            .create(ContactDraft::new("Ann", "1112223333"))
            .await
            .unwrap();
        let b = service
            .create(ContactDraft::new("Ann", "1112223333"))
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(service.list().await.unwrap().len(), 2);
    }
}

#[tokio::test]
async fn update_overwrites_only_target_record() {
    let dir = tempfile::tempdir().unwrap();

    for service in builtin_services(&dir).await {
        let ann = service.create(full_draft("Ann", "1112223333")).await.unwrap();
        let bob = service.create(full_draft("Bob", "4445556666")).await.unwrap();

        let patch = ContactPatch::replace_with(
            ContactDraft::new("Ann Smith", "111 222 3333").with_address("9 Elm St"),
        );
        let updated = service.update(&ann.id, patch).await.unwrap();

        assert_eq!(updated.id, ann.id);
        assert_eq!(updated.created_at, ann.created_at);
        assert_eq!(updated.name, "Ann Smith");
        assert_eq!(updated.address.as_deref(), Some("9 Elm St"));
        // Full replace clears the birth date that the edit left empty
        assert_eq!(updated.birth_date, None);

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.contains(&updated));
        assert!(listed.contains(&bob), "unrelated record must be unchanged");
    }
}

#[tokio::test]
async fn partial_update_leaves_missing_fields() {
    let dir = tempfile::tempdir().unwrap();

    for service in builtin_services(&dir).await {
        let ann = service.create(full_draft("Ann", "1112223333")).await.unwrap();

        let patch = ContactPatch {
            phone_number: Some("0001112222".to_string()),
            ..Default::default()
        };
        let updated = service.update(&ann.id, patch).await.unwrap();

        assert_eq!(updated.phone_number, "0001112222");
        assert_eq!(updated.name, ann.name);
        assert_eq!(updated.birth_date, ann.birth_date);
        assert_eq!(updated.address, ann.address);
    }
}

#[tokio::test]
async fn delete_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();

    for service in builtin_services(&dir).await {
        let ann = service
            .create(ContactDraft::new("Ann", "1112223333"))
            .await
            .unwrap();

        service.delete(&ann.id).await.unwrap();
        assert!(service.list().await.unwrap().iter().all(|c| c.id != ann.id));

        // Second delete must not error
        service.delete(&ann.id).await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn list_sorted_regardless_of_insertion_order() {
    let dir = tempfile::tempdir().unwrap();

    for service in builtin_services(&dir).await {
        for name in ["Zoe", "bob", "Ann", "Carl", "Bob"] {
            service
                .create(ContactDraft::new(name, "1112223333"))
                .await
                .unwrap();
        }

        let names: Vec<String> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        // Binary collation: uppercase sorts before lowercase
        assert_eq!(names, vec!["Ann", "Bob", "Carl", "Zoe", "bob"]);
    }
}
