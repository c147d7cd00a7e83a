//! In-memory storage.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::ManeuverDocument;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Keeps documents in a map. Used in tests and for scratch plots.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: RwLock<BTreeMap<String, ManeuverDocument>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {e}"))
}

impl Storage for MemoryStorage {
    fn save(&self, name: &str, document: &ManeuverDocument) -> BoxFuture<'_, StorageResult<()>> {
        let name = name.to_string();
        let document = document.clone();
        Box::pin(async move {
            let mut docs = self.documents.write().map_err(lock_error)?;
            docs.insert(name, document);
            Ok(())
        })
    }

    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<ManeuverDocument>> {
        let name = name.to_string();
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            docs.get(&name).cloned().ok_or(StorageError::NotFound(name))
        })
    }

    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>> {
        let name = name.to_string();
        Box::pin(async move {
            let mut docs = self.documents.write().map_err(lock_error)?;
            docs.remove(&name);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            Ok(docs.keys().cloned().collect())
        })
    }

    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let name = name.to_string();
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            Ok(docs.contains_key(&name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{block_on, sample_document};

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let doc = sample_document();

        block_on(storage.save("harbour", &doc)).unwrap();
        let loaded = block_on(storage.load("harbour")).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_exists_and_delete() {
        let storage = MemoryStorage::new();
        let doc = sample_document();

        assert!(!block_on(storage.exists("harbour")).unwrap());
        block_on(storage.save("harbour", &doc)).unwrap();
        assert!(block_on(storage.exists("harbour")).unwrap());

        block_on(storage.delete("harbour")).unwrap();
        assert!(!block_on(storage.exists("harbour")).unwrap());
        block_on(storage.delete("harbour")).unwrap();
    }

    #[test]
    fn test_list_is_sorted() {
        let storage = MemoryStorage::new();
        let doc = sample_document();

        block_on(storage.save("b-approach", &doc)).unwrap();
        block_on(storage.save("a-berthing", &doc)).unwrap();

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list, vec!["a-berthing".to_string(), "b-approach".to_string()]);
    }
}
