// # phonebook-core
//
// Core library for the phonebook contact service.
//
// ## Architecture Overview
//
// - **Contact**: The single persisted entity, plus its create/update payloads
// - **ContactStore**: Trait for durable contact storage (document-store style)
// - **ContactService**: List/create/update/delete over a store, with
//   required-field enforcement and operation tracing
// - **StoreRegistry**: Plugin-based registry for store implementations
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Storage backends know nothing about HTTP
// 2. **Plugin-Based**: Stores are registered by name, no hard-coded if-else
// 3. **Library-First**: The daemon and the tests drive the same service
// 4. **Opaque Identifiers**: Store-specific id types never leave the store

pub mod config;
pub mod error;
pub mod model;
pub mod registry;
pub mod service;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use config::{PhonebookConfig, ServerConfig, StoreConfig};
pub use error::{Error, Result};
pub use model::{Contact, ContactDraft, ContactId, ContactPatch};
pub use registry::StoreRegistry;
pub use service::ContactService;
pub use store::{FileContactStore, MemoryContactStore};
pub use traits::{ContactStore, ContactStoreFactory};
