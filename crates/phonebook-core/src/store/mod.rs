// # Contact Store Implementations
//
// Built-in implementations of the ContactStore trait.

pub mod file;
pub mod memory;

pub use file::{FileContactStore, FileContactStoreFactory};
pub use memory::{MemoryContactStore, MemoryContactStoreFactory};
