mod interface;
mod memory_store;
mod json_store;
mod firestore;
mod config;

pub use interface::{Document, DocumentPath, DocumentStore, StoreError, StoreResult};
pub use memory_store::MemoryStore;
pub use json_store::JsonStore;
pub use firestore::{FirestoreConfig, FirestoreStore};
pub use config::StoreConfig;
