//! Test doubles and common utilities for contract tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use phonebook_core::error::{Error, Result};
use phonebook_core::{
    Contact, ContactDraft, ContactId, ContactPatch, ContactService, ContactStore,
    FileContactStore, MemoryContactStore,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A store that fails while `down` is set, otherwise delegates to memory
pub struct FlakyStore {
    inner: MemoryContactStore,
    down: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryContactStore::new(),
            down: Arc::new(AtomicBool::new(false)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle that toggles the outage from the test
    pub fn outage_switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.down)
    }

    /// Number of store calls observed
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    fn check(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(Error::store("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl ContactStore for FlakyStore {
    async fn list(&self) -> Result<Vec<Contact>> {
        self.check()?;
        self.inner.list().await
    }

    async fn insert(&self, draft: ContactDraft, created_at: DateTime<Utc>) -> Result<Contact> {
        self.check()?;
        self.inner.insert(draft, created_at).await
    }

    async fn update(&self, id: &ContactId, patch: &ContactPatch) -> Result<Option<Contact>> {
        self.check()?;
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: &ContactId) -> Result<bool> {
        self.check()?;
        self.inner.delete(id).await
    }

    async fn flush(&self) -> Result<()> {
        self.check()
    }

    fn store_name(&self) -> &'static str {
        "flaky"
    }
}

/// Services over every built-in store, each with its own backing data
pub async fn builtin_services(dir: &tempfile::TempDir) -> Vec<ContactService> {
    let file = FileContactStore::new(dir.path().join("contacts.json"))
        .await
        .expect("file store opens");

    vec![
        ContactService::new(Arc::new(MemoryContactStore::new())),
        ContactService::new(Arc::new(file)),
    ]
}

/// Draft with a birth date and address filled in
pub fn full_draft(name: &str, phone: &str) -> ContactDraft {
    ContactDraft::new(name, phone)
        .with_birth_date(chrono::NaiveDate::from_ymd_opt(1990, 5, 1).expect("valid date"))
        .with_address("12 Harbour Road")
}
