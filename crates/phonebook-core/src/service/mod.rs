//! Contact service
//!
//! The ContactService is responsible for:
//! - Enforcing the required fields before anything reaches the store
//! - Stamping the creation time of new contacts
//! - Turning "no such id" into the documented outcome per operation
//! - Tracing every operation's input and outcome
//!
//! ## Missing Ids
//!
//! | Operation | Unknown id |
//! |-----------|------------|
//! | update    | `Error::NotFound` |
//! | delete    | success, nothing removed |
//!
//! Delete is idempotent so a repeated delete never surfaces as a failure.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::model::{Contact, ContactDraft, ContactId, ContactPatch};
use crate::traits::ContactStore;

/// CRUD over the contact collection
///
/// Stateless apart from the shared store handle; cheap to clone and safe to
/// call from concurrent request handlers.
#[derive(Clone)]
pub struct ContactService {
    store: Arc<dyn ContactStore>,
}

impl ContactService {
    /// Create a service over a store
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    /// Name of the backing store
    pub fn store_name(&self) -> &'static str {
        self.store.store_name()
    }

    /// List every contact sorted by name
    pub async fn list(&self) -> Result<Vec<Contact>> {
        match self.store.list().await {
            Ok(contacts) => {
                info!("Found {} contacts", contacts.len());
                Ok(contacts)
            }
            Err(e) => {
                error!("Error fetching contacts: {}", e);
                Err(e)
            }
        }
    }

    /// Create a contact
    ///
    /// The phone number is stored exactly as given.
    pub async fn create(&self, draft: ContactDraft) -> Result<Contact> {
        debug!("Received contact data: {:?}", draft);

        if let Err(e) = draft.validate() {
            warn!("Rejected contact: {}", e);
            return Err(e);
        }

        match self.store.insert(draft, chrono::Utc::now()).await {
            Ok(contact) => {
                info!("Contact saved: {} ({})", contact.id, contact.name);
                debug!("Saved contact: {:?}", contact);
                Ok(contact)
            }
            Err(e) => {
                error!("Error saving contact: {}", e);
                Err(e)
            }
        }
    }

    /// Overwrite the fields present in `patch`
    ///
    /// # Returns
    ///
    /// - `Ok(Contact)`: The record after the update
    /// - `Err(Error::NotFound)`: No contact has this id
    /// - `Err(Error)`: Validation or storage error
    pub async fn update(&self, id: &ContactId, patch: ContactPatch) -> Result<Contact> {
        debug!("Updating contact {} with: {:?}", id, patch);

        if let Err(e) = patch.validate() {
            warn!("Rejected update for {}: {}", id, e);
            return Err(e);
        }

        match self.store.update(id, &patch).await {
            Ok(Some(contact)) => {
                info!("Contact updated: {} ({})", contact.id, contact.name);
                Ok(contact)
            }
            Ok(None) => {
                warn!("Update for unknown contact {}", id);
                Err(Error::not_found(id.to_string()))
            }
            Err(e) => {
                error!("Error updating contact {}: {}", id, e);
                Err(e)
            }
        }
    }

    /// Delete a contact; deleting an unknown id succeeds without effect
    pub async fn delete(&self, id: &ContactId) -> Result<()> {
        match self.store.delete(id).await {
            Ok(true) => {
                info!("Contact deleted: {}", id);
                Ok(())
            }
            Ok(false) => {
                debug!("Delete for unknown contact {}, nothing to do", id);
                Ok(())
            }
            Err(e) => {
                error!("Error deleting contact {}: {}", id, e);
                Err(e)
            }
        }
    }

    /// Flush the store before shutdown
    pub async fn flush(&self) -> Result<()> {
        self.store.flush().await?;
        info!("{} store flushed", self.store.store_name());
        Ok(())
    }
}
