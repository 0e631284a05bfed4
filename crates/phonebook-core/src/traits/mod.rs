//! Core traits for the phonebook service
//!
//! - [`ContactStore`]: Durable storage for the contact collection

pub mod contact_store;

pub use contact_store::{ContactStore, ContactStoreFactory};
