use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::backend::interface::{Document, DocumentPath, DocumentStore, StoreError, StoreResult};

/// Document store kept in process memory. Nothing survives a restart.
///
/// Reads and writes can be switched to fail, which is how the ledger's
/// behaviour on an unreachable store is exercised.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<DocumentPath, Document>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn with_document(path: DocumentPath, document: Document) -> MemoryStore {
        let mut store = MemoryStore::default();
        store.documents.get_mut().insert(path, document);
        store
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("reads of {} disabled", path)));
        }
        Ok(self.documents.lock().await.get(path).cloned())
    }

    async fn set(&self, path: &DocumentPath, document: Document) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("writes to {} disabled", path)));
        }
        self.documents.lock().await.insert(path.clone(), document);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use crate::backend::{DocumentPath, DocumentStore, MemoryStore, StoreError};

    use serde_json::json;

    fn document(value: serde_json::Value) -> crate::backend::Document {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get(&DocumentPath::funds_progress()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_replaces_whole_document() {
        let path = DocumentPath::funds_progress();
        let store = MemoryStore::with_document(path.clone(), document(json!({"amount": 5, "note": "x"})));

        store.set(&path, document(json!({"amount": 10}))).await.unwrap();

        assert_eq!(store.get(&path).await.unwrap(), Some(document(json!({"amount": 10}))));
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn injected_failures() {
        let path = DocumentPath::funds_progress();
        let store = MemoryStore::new();
        store.fail_reads(true);
        store.fail_writes(true);

        assert!(matches!(store.get(&path).await, Err(StoreError::Unavailable(..))));
        assert!(matches!(store.set(&path, document(json!({"amount": 1}))).await, Err(StoreError::Unavailable(..))));
        assert_eq!(store.writes(), 0);

        store.fail_reads(false);
        assert_eq!(store.get(&path).await.unwrap(), None);
    }
}
