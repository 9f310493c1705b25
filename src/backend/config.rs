use std::path::PathBuf;
use std::sync::Arc;

use serde::{Serialize, Deserialize};

use crate::backend::{DocumentStore, FirestoreConfig, FirestoreStore, JsonStore, MemoryStore};

/// Which document store to talk to, as written in a config file:
///
/// ```toml
/// [store]
/// kind = "json"
/// path = "resources/funds.json"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    Memory,
    Json { path: PathBuf },
    Firestore(FirestoreConfig)
}

impl StoreConfig {
    pub fn open(&self) -> Arc<dyn DocumentStore> {
        match self {
            Self::Memory => Arc::new(MemoryStore::new()),
            Self::Json { path } => Arc::new(JsonStore::new(path)),
            Self::Firestore(config) => Arc::new(FirestoreStore::new(config.clone()))
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Json { path: PathBuf::from("resources/funds.json") }
    }
}
