use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use outline_flow::{OutlineError, OutlineSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

const METADATA_FILE: &str = "metadata.json";
const MINDMAP_FILE: &str = "mindmap.json";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("History item not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMetadata {
    pub id: String,
    pub document_name: String,
    pub created_at: String,
}

/// File-backed history of processed documents: one folder per document
/// id holding `metadata.json` and the generated `mindmap.json`.
pub struct HistoryStore {
    root: PathBuf,
}

impl HistoryStore {
    pub fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Register a document's generated mindmap, returning its metadata.
    pub fn create(&self, document_name: &str, mindmap: &Value) -> StorageResult<HistoryMetadata> {
        let metadata = HistoryMetadata {
            id: Uuid::new_v4().to_string(),
            document_name: document_name.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };
        let folder = self.root.join(&metadata.id);
        std::fs::create_dir_all(&folder)?;
        std::fs::write(
            folder.join(METADATA_FILE),
            serde_json::to_vec_pretty(&metadata)?,
        )?;
        std::fs::write(folder.join(MINDMAP_FILE), serde_json::to_vec_pretty(mindmap)?)?;
        Ok(metadata)
    }

    /// All history items, newest first. Entries with unreadable metadata
    /// are skipped with a warning rather than failing the listing.
    pub fn list(&self) -> StorageResult<Vec<(HistoryMetadata, bool)>> {
        let mut items = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let folder = entry.path();
            let metadata = match read_metadata(&folder) {
                Ok(metadata) => metadata,
                Err(err) => {
                    warn!(folder = %folder.display(), "skipping unreadable history entry: {err}");
                    continue;
                }
            };
            let has_mindmap = folder.join(MINDMAP_FILE).exists();
            items.push((metadata, has_mindmap));
        }
        items.sort_by(|a, b| b.0.created_at.cmp(&a.0.created_at));
        Ok(items)
    }

    pub fn metadata(&self, id: &str) -> StorageResult<HistoryMetadata> {
        read_metadata(&self.folder(id)?)
    }

    pub fn load_mindmap(&self, id: &str) -> StorageResult<Value> {
        let path = self.folder(id)?.join(MINDMAP_FILE);
        if !path.is_file() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn delete(&self, id: &str) -> StorageResult<()> {
        std::fs::remove_dir_all(self.folder(id)?)?;
        Ok(())
    }

    fn folder(&self, id: &str) -> StorageResult<PathBuf> {
        // Ids are UUIDs; anything that could traverse out of the store
        // root is treated as not found.
        if id.is_empty() || id.contains('/') || id.contains('\\') || id.contains("..") {
            return Err(StorageError::NotFound(id.to_string()));
        }
        let folder = self.root.join(id);
        if !folder.is_dir() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(folder)
    }
}

fn read_metadata(folder: &Path) -> StorageResult<HistoryMetadata> {
    let bytes = std::fs::read(folder.join(METADATA_FILE))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// The history store doubles as the outline source for the selection
/// session: selecting a history item fetches its stored mindmap.
#[async_trait]
impl OutlineSource for HistoryStore {
    async fn fetch_outline(&self, document_id: &str) -> outline_flow::Result<Value> {
        self.load_mindmap(document_id).map_err(|err| match err {
            StorageError::NotFound(id) => OutlineError::DocumentNotFound(id),
            other => OutlineError::Source(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> (tempfile::TempDir, HistoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn create_list_load_delete_round_trip() {
        let (_dir, store) = store();
        let mindmap = json!({"title": "Doc", "children": [{"title": "A"}]});

        let metadata = store.create("report.pdf", &mindmap).unwrap();
        assert_eq!(metadata.document_name, "report.pdf");

        let items = store.list().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].0.id, metadata.id);
        assert!(items[0].1);

        assert_eq!(store.load_mindmap(&metadata.id).unwrap(), mindmap);

        store.delete(&metadata.id).unwrap();
        assert!(matches!(
            store.load_mindmap(&metadata.id),
            Err(StorageError::NotFound(_))
        ));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn listing_is_newest_first() {
        let (_dir, store) = store();
        let first = store.create("first.pdf", &json!({"title": "1"})).unwrap();
        let second = store.create("second.pdf", &json!({"title": "2"})).unwrap();

        // created_at has sub-second precision; equal timestamps would
        // make this ordering assertion meaningless.
        if first.created_at != second.created_at {
            let items = store.list().unwrap();
            assert_eq!(items[0].0.id, second.id);
            assert_eq!(items[1].0.id, first.id);
        }
    }

    #[test]
    fn traversal_ids_are_rejected() {
        let (_dir, store) = store();
        assert!(matches!(
            store.load_mindmap("../outside"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn acts_as_an_outline_source() {
        let (_dir, store) = store();
        let metadata = store.create("doc.pdf", &json!({"title": "Doc"})).unwrap();

        let outline = store.fetch_outline(&metadata.id).await.unwrap();
        assert_eq!(outline, json!({"title": "Doc"}));
        assert!(store.fetch_outline("missing").await.is_err());
    }
}
