// # File Contact Store
//
// File-based implementation of ContactStore with crash recovery.
//
// ## Purpose
//
// Keeps the contact collection in a single JSON document so a small
// deployment can run without a database server.
//
// ## Crash Recovery
//
// - Atomic writes: write-then-rename
// - Automatic backup: the previous file is kept as `.backup`
// - Recovery: falls back to the backup if the main file fails to parse
// - Write-through: a mutation is applied in memory only after it is on disk
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "contacts": [
//     {
//       "id": "0b1c6f0e-4d7e-4c4e-9a55-2f3e2a1d9c11",
//       "name": "Jane Doe",
//       "phoneNumber": "9998887777",
//       "createdAt": "2025-01-09T12:00:00Z"
//     }
//   ]
// }
// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::StoreConfig;
use crate::model::{Contact, ContactDraft, ContactId, ContactPatch};
use crate::traits::contact_store::{ContactStore, ContactStoreFactory, sort_by_name};

/// Contacts file format version
const CONTACTS_FILE_VERSION: &str = "1.0";

type ContactMap = HashMap<ContactId, Contact>;

/// File-based contact store with crash recovery
///
/// # Example
///
/// ```rust,no_run
/// use phonebook_core::{ContactDraft, ContactStore, FileContactStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileContactStore::new("/var/lib/phonebook/contacts.json").await?;
///
///     // Atomically written to disk before returning
///     store
///         .insert(ContactDraft::new("Ann", "1112223333"), chrono::Utc::now())
///         .await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileContactStore {
    path: PathBuf,
    contacts: Arc<RwLock<ContactMap>>,
}

/// Serializable contacts file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct ContactsFileFormat {
    version: String,
    contacts: Vec<Contact>,
}

impl FileContactStore {
    /// Create or load a file contact store
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Try to load the existing file
    /// 3. If it is corrupted, try the backup
    /// 4. If both fail to parse, start empty
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::config(format!(
                        "Failed to create contacts directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let contacts = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            contacts: Arc::new(RwLock::new(contacts)),
        })
    }

    /// Load contacts, falling back to the backup on corruption
    async fn load_with_recovery(path: &Path) -> Result<ContactMap, Error> {
        let err = match Self::load(path).await {
            Ok(contacts) => {
                tracing::debug!("Loaded contacts file: {} contacts", contacts.len());
                return Ok(contacts);
            }
            Err(err) => err,
        };

        // Only parse failures count as corruption; I/O errors propagate
        if !matches!(err, Error::Json(_)) {
            return Err(err);
        }

        tracing::warn!(
            "Contacts file {} appears corrupted: {}. Attempting recovery from backup.",
            path.display(),
            err
        );

        let backup_path = Self::backup_path(path);
        if !backup_path.exists() {
            tracing::warn!("No backup file found. Starting with an empty phonebook.");
            return Ok(HashMap::new());
        }

        match Self::load(&backup_path).await {
            Ok(contacts) => {
                tracing::info!("Recovered {} contacts from backup", contacts.len());
                if let Err(restore_err) = fs::copy(&backup_path, path).await {
                    tracing::error!("Failed to restore contacts file from backup: {}", restore_err);
                }
                Ok(contacts)
            }
            Err(backup_err) => {
                tracing::error!(
                    "Backup also unreadable: {}. Starting with an empty phonebook.",
                    backup_err
                );
                Ok(HashMap::new())
            }
        }
    }

    /// Load contacts from one file
    async fn load(path: &Path) -> Result<ContactMap, Error> {
        if !path.exists() {
            tracing::debug!("Contacts file does not exist: {}", path.display());
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::store(format!(
                "Failed to read contacts file {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: ContactsFileFormat = serde_json::from_str(&content)?;

        if file.version != CONTACTS_FILE_VERSION {
            tracing::warn!(
                "Contacts file version mismatch: expected {}, got {}. Attempting to load anyway.",
                CONTACTS_FILE_VERSION,
                file.version
            );
        }

        Ok(file
            .contacts
            .into_iter()
            .map(|contact| (contact.id.clone(), contact))
            .collect())
    }

    /// Write a snapshot to disk atomically
    async fn write_snapshot(&self, contacts: &ContactMap) -> Result<(), Error> {
        let mut ordered: Vec<Contact> = contacts.values().cloned().collect();
        sort_by_name(&mut ordered);

        let file = ContactsFileFormat {
            version: CONTACTS_FILE_VERSION.to_string(),
            contacts: ordered,
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| Error::store(format!("Failed to serialize contacts: {}", e)))?;

        let temp_path = self.temp_path();
        {
            let mut temp = fs::File::create(&temp_path).await.map_err(|e| {
                Error::store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            temp.write_all(json.as_bytes()).await.map_err(|e| {
                Error::store(format!(
                    "Failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            temp.flush().await.map_err(|e| {
                Error::store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists() {
            if let Err(e) = fs::copy(&self.path, Self::backup_path(&self.path)).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Contacts written to {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }

    /// Force an immediate write of the current contacts
    pub async fn sync(&self) -> Result<(), Error> {
        let guard = self.contacts.read().await;
        self.write_snapshot(&guard).await
    }
}

#[async_trait]
impl ContactStore for FileContactStore {
    async fn list(&self) -> Result<Vec<Contact>, Error> {
        let guard = self.contacts.read().await;
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

        let mut guard = self.contacts.write().await;
        let mut next = guard.clone();
        next.insert(contact.id.clone(), contact.clone());
        self.write_snapshot(&next).await?;
        *guard = next;

        Ok(contact)
    }

    async fn update(&self, id: &ContactId, patch: &ContactPatch) -> Result<Option<Contact>, Error> {
        let mut guard = self.contacts.write().await;
        let Some(current) = guard.get(id) else {
            return Ok(None);
        };

        let mut updated = current.clone();
        patch.apply_to(&mut updated);

        let mut next = guard.clone();
        next.insert(id.clone(), updated.clone());
        self.write_snapshot(&next).await?;
        *guard = next;

        Ok(Some(updated))
    }

    async fn delete(&self, id: &ContactId) -> Result<bool, Error> {
        let mut guard = self.contacts.write().await;
        if !guard.contains_key(id) {
            return Ok(false);
        }

        let mut next = guard.clone();
        next.remove(id);
        self.write_snapshot(&next).await?;
        *guard = next;

        Ok(true)
    }

    async fn flush(&self) -> Result<(), Error> {
        // Every mutation is already on disk
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "file"
    }
}

/// Factory for the file store
pub struct FileContactStoreFactory;

#[async_trait]
impl ContactStoreFactory for FileContactStoreFactory {
    async fn create(&self, config: &StoreConfig) -> Result<Arc<dyn ContactStore>, Error> {
        match config {
            StoreConfig::File { path } => Ok(Arc::new(FileContactStore::new(path).await?)),
            _ => Err(Error::config("Invalid config for file store")),
        }
    }
}
