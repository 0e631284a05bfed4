// # Contact Store Trait
//
// Defines the interface for durable contact storage.
//
// ## Purpose
//
// The store owns the contact collection: it generates identifiers, keeps
// records durable, and returns them sorted by name. It enforces nothing
// beyond what a document store gives for free; required-field rules live
// in `ContactService`.
//
// ## Implementations
//
// - Memory: `MemoryContactStore` (tests, throwaway deployments)
// - File: `FileContactStore` (single JSON document with crash recovery)
// - MongoDB: `phonebook-store-mongo` crate
//
// ## Usage
//
// ```rust,ignore
// use phonebook_core::{ContactDraft, ContactStore};
//
// let store = /* ContactStore implementation */;
// let contact = store.insert(ContactDraft::new("Ann", "1112223333"), chrono::Utc::now()).await?;
// let all = store.list().await?;
// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::model::{Contact, ContactDraft, ContactId, ContactPatch};

/// Trait for contact store implementations
///
/// Implementations must be thread-safe and usable across async tasks. The
/// service calls them from concurrent request handlers without any
/// application-level locking.
///
/// ## Implementation Guidelines
///
/// - **Opaque ids**: Convert store-native identifiers to [`ContactId`]
///   strings; an id the store cannot parse is simply "not found"
/// - **Flat overwrite**: `update` replaces the fields present in the patch,
///   nothing is merged
/// - **No business rules**: Validation belongs to `ContactService`
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// List every contact sorted by name ascending
    ///
    /// Names compare byte-wise; ties fall back to creation time, then id.
    async fn list(&self) -> Result<Vec<Contact>, crate::Error>;

    /// Persist a new contact
    ///
    /// # Parameters
    ///
    /// - `draft`: Validated contact fields
    /// - `created_at`: Creation timestamp chosen by the service
    ///
    /// # Returns
    ///
    /// - `Ok(Contact)`: The persisted record including its generated id
    /// - `Err(Error)`: Storage error
    async fn insert(
        &self,
        draft: ContactDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Contact, crate::Error>;

    /// Overwrite the fields present in `patch`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Contact))`: The record after the update
    /// - `Ok(None)`: No contact has this id
    /// - `Err(Error)`: Storage error
    async fn update(
        &self,
        id: &ContactId,
        patch: &ContactPatch,
    ) -> Result<Option<Contact>, crate::Error>;

    /// Delete a contact
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: A record was removed
    /// - `Ok(false)`: No contact had this id
    /// - `Err(Error)`: Storage error
    async fn delete(&self, id: &ContactId) -> Result<bool, crate::Error>;

    /// Persist any pending changes
    ///
    /// Called once on shutdown. Write-through stores return immediately.
    async fn flush(&self) -> Result<(), crate::Error>;

    /// Short name of the backend, for logs
    fn store_name(&self) -> &'static str;
}

/// Helper trait for constructing contact stores from configuration
#[async_trait]
pub trait ContactStoreFactory: Send + Sync {
    /// Create a ContactStore instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: The store section of the phonebook configuration
    ///
    /// # Returns
    ///
    /// A shareable ContactStore trait object
    async fn create(
        &self,
        config: &crate::config::StoreConfig,
    ) -> Result<std::sync::Arc<dyn ContactStore>, crate::Error>;
}

/// Sort contacts the way every store lists them
pub fn sort_by_name(contacts: &mut [Contact]) {
    contacts.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}
