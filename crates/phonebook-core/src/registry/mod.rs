//! Plugin-based store registry
//!
//! The registry lets contact stores be registered by type name at runtime,
//! so the daemon never hard-codes which backends exist.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use phonebook_core::{StoreConfig, StoreRegistry};
//!
//! let registry = StoreRegistry::with_builtin();
//! phonebook_store_mongo::register(&registry);
//!
//! let store = registry.create_store(&StoreConfig::mongo_default()).await?;
//! ```

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::store::{FileContactStoreFactory, MemoryContactStoreFactory};
use crate::traits::{ContactStore, ContactStoreFactory};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registry of contact store factories keyed by type name
///
/// ## Thread Safety
///
/// Interior mutability with RwLock: concurrent lookups, exclusive
/// registration.
#[derive(Default)]
pub struct StoreRegistry {
    stores: RwLock<HashMap<String, Arc<dyn ContactStoreFactory>>>,
}

impl StoreRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the memory and file stores registered
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register_store("memory", Box::new(MemoryContactStoreFactory));
        registry.register_store("file", Box::new(FileContactStoreFactory));
        registry
    }

    /// Register a store factory
    ///
    /// # Parameters
    ///
    /// - `name`: Store type name (e.g., "file", "mongo")
    /// - `factory`: Factory object for creating store instances
    pub fn register_store(&self, name: impl Into<String>, factory: Box<dyn ContactStoreFactory>) {
        let name = name.into();
        let mut stores = self
            .stores
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        stores.insert(name, Arc::from(factory));
    }

    /// Create a contact store from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Arc<dyn ContactStore>)`: Created store instance
    /// - `Err(Error)`: If the store type is not registered or creation fails
    pub async fn create_store(&self, config: &StoreConfig) -> Result<Arc<dyn ContactStore>> {
        config.validate()?;
        let store_type = config.type_name();

        // Release the lock before awaiting the factory
        let factory = {
            let stores = self
                .stores
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            stores
                .get(store_type)
                .cloned()
                .ok_or_else(|| Error::config(format!("Unknown store type: {}", store_type)))?
        };

        tracing::debug!("Creating {} contact store", store_type);
        factory.create(config).await
    }

    /// List all registered store types
    pub fn list_stores(&self) -> Vec<String> {
        let stores = self
            .stores
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut names: Vec<String> = stores.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a store type is registered
    pub fn has_store(&self, name: &str) -> bool {
        let stores = self
            .stores
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        stores.contains_key(name)
    }
}
