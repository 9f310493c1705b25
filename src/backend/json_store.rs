use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;

use crate::backend::interface::{Document, DocumentPath, DocumentStore, StoreError, StoreResult};

/// Document store persisted to one JSON file, an object keyed by
/// `collection/document`:
///
/// ```json
/// { "funds/progress": { "amount": 500000 } }
/// ```
///
/// A missing file is an empty store. Writes through one `JsonStore` are
/// serialized; separate instances on the same file are not.
pub struct JsonStore {
    path: PathBuf,
    writer: Mutex<()>
}

impl JsonStore {
    pub fn new(path: impl AsRef<Path>) -> JsonStore {
        JsonStore { path: path.as_ref().to_path_buf(), writer: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> StoreResult<Document> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Document::new()),
            Err(err) => return Err(err.into())
        };
        if content.trim().is_empty() {
            return Ok(Document::new());
        }
        serde_json::from_str(&content)
            .map_err(|err| StoreError::Malformed(format!("{}: {}", self.path.display(), err)))
    }

    async fn write_all(&self, documents: &Document) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let serialized = serde_json::to_string_pretty(documents)
            .map_err(|err| StoreError::Malformed(err.to_string()))?;

        // write aside and rename, so readers never see a half written file
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, serialized).await?;
        fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonStore {
    async fn get(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        let mut documents = self.read_all().await?;
        match documents.remove(&path.to_string()) {
            None => Ok(None),
            Some(Value::Object(document)) => Ok(Some(document)),
            Some(other) => Err(StoreError::Malformed(format!("{} is not an object: {}", path, other)))
        }
    }

    async fn set(&self, path: &DocumentPath, document: Document) -> StoreResult<()> {
        // writers share the staging file and rewrite every document
        let _guard = self.writer.lock().await;
        let mut documents = self.read_all().await?;
        documents.insert(path.to_string(), Value::Object(document));
        self.write_all(&documents).await
    }
}
