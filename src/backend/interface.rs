use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// A stored document: a JSON object of named fields.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Address of a document in the store, `collection/document`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct DocumentPath {
    pub collection: String,
    pub document: String
}

impl DocumentPath {
    pub fn new(collection: &str, document: &str) -> DocumentPath {
        DocumentPath { collection: collection.to_owned(), document: document.to_owned() }
    }

    /// The singleton holding the running total.
    pub fn funds_progress() -> DocumentPath {
        DocumentPath::new("funds", "progress")
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.document)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// The store answered, but refused the request.
    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    /// The stored or returned data could not be decoded.
    #[error("malformed document: {0}")]
    Malformed(String)
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Remote key-value document store.
///
/// Writes replace the whole document and create it when it does not
/// exist yet. There is no merge and no version token, so two writers
/// racing on one document simply overwrite each other.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches a document, `None` if nothing is stored at `path`.
    async fn get(&self, path: &DocumentPath) -> StoreResult<Option<Document>>;

    /// Replaces the document at `path`.
    async fn set(&self, path: &DocumentPath, document: Document) -> StoreResult<()>;
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    async fn get(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        (**self).get(path).await
    }

    async fn set(&self, path: &DocumentPath, document: Document) -> StoreResult<()> {
        (**self).set(path, document).await
    }
}
