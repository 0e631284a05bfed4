// # Memory Contact Store
//
// In-memory implementation of ContactStore.
//
// ## Purpose
//
// A fast store that does not persist across restarts. Useful for tests,
// demos, and throwaway deployments.
//
// ## Crash Behavior
//
// - All contacts are lost on restart/crash
// - No recovery possible (state is in-memory only)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::StoreConfig;
use crate::model::{Contact, ContactDraft, ContactId, ContactPatch};
use crate::traits::contact_store::{ContactStore, ContactStoreFactory, sort_by_name};

/// In-memory contact store
///
/// Contacts live in a HashMap protected by a RwLock. Identifiers are
/// random UUIDs.
///
/// # Example
///
/// ```rust,no_run
/// use phonebook_core::{ContactDraft, ContactStore, MemoryContactStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryContactStore::new();
///
///     let ann = store
///         .insert(ContactDraft::new("Ann", "1112223333"), chrono::Utc::now())
///         .await?;
///
///     let contacts = store.list().await?;
///     assert_eq!(contacts[0].id, ann.id);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryContactStore {
    inner: Arc<RwLock<HashMap<ContactId, Contact>>>,
}

impl MemoryContactStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the number of contacts in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl Default for MemoryContactStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn list(&self) -> Result<Vec<Contact>, Error> {
        let guard = self.inner.read().await;
        let mut contacts: Vec<Contact> = guard.values().cloned().collect();
        sort_by_name(&mut contacts);
        Ok(contacts)
    }

    async fn insert(
        &self,
        draft: ContactDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Contact, Error> {
        let contact = Contact::from_draft(ContactId::generate(), draft, created_at);
        let mut guard = self.inner.write().await;
        guard.insert(contact.id.clone(), contact.clone());
        Ok(contact)
    }

    async fn update(&self, id: &ContactId, patch: &ContactPatch) -> Result<Option<Contact>, Error> {
        let mut guard = self.inner.write().await;
        Ok(guard.get_mut(id).map(|contact| {
            patch.apply_to(contact);
            contact.clone()
        }))
    }

    async fn delete(&self, id: &ContactId) -> Result<bool, Error> {
        let mut guard = self.inner.write().await;
        Ok(guard.remove(id).is_some())
    }

    async fn flush(&self) -> Result<(), Error> {
        // Nothing buffered
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}

/// Factory for the in-memory store
pub struct MemoryContactStoreFactory;

#[async_trait]
impl ContactStoreFactory for MemoryContactStoreFactory {
    async fn create(&self, config: &StoreConfig) -> Result<Arc<dyn ContactStore>, Error> {
        match config {
            StoreConfig::Memory => Ok(Arc::new(MemoryContactStore::new())),
            _ => Err(Error::config("Invalid config for memory store")),
        }
    }
}
