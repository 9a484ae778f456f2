//! In-memory blob store for tests and local experiments

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{MixdownError, Result};

use super::{validate_key, BlobStore};

/// An object written through [`BlobStore::store`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// [`BlobStore`] that keeps everything in memory
///
/// Objects seeded with [`insert`](Self::insert) are fetchable by URL. Stored
/// objects get the URL `{base_url}/{key}` and become fetchable too.
pub struct TestDoubleBlobStore {
    base_url: String,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    stored: Mutex<HashMap<String, StoredObject>>,
}

impl Default for TestDoubleBlobStore {
    fn default() -> Self {
        Self::new("memory://blobs")
    }
}

impl TestDoubleBlobStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            objects: Mutex::new(HashMap::new()),
            stored: Mutex::new(HashMap::new()),
        }
    }

    /// Make `data` fetchable at `url`
    pub fn insert(&self, url: &str, data: Vec<u8>) {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.to_string(), data);
    }

    /// Object previously stored under `key`
    pub fn stored(&self, key: &str) -> Option<StoredObject> {
        self.stored
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// Number of objects stored so far
    pub fn stored_count(&self) -> usize {
        self.stored.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl BlobStore for TestDoubleBlobStore {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(url)
            .cloned()
            .ok_or_else(|| MixdownError::Storage(format!("{} not found", url)))
    }

    fn store(&self, key: &str, data: &[u8], content_type: &str) -> Result<String> {
        validate_key(key)?;
        let url = format!("{}/{}", self.base_url, key);
        self.stored.lock().unwrap_or_else(|e| e.into_inner()).insert(
            key.to_string(),
            StoredObject {
                data: data.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        self.insert(&url, data.to_vec());
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_seeded_object() {
        let store = TestDoubleBlobStore::default();
        store.insert("https://x.test/a.wav", vec![1, 2, 3]);
        assert_eq!(store.fetch("https://x.test/a.wav").unwrap(), vec![1, 2, 3]);
        assert!(matches!(store.fetch("https://x.test/b.wav"), Err(MixdownError::Storage(_))));
    }

    #[test]
    fn test_store_returns_fetchable_url() {
        let store = TestDoubleBlobStore::new("https://cdn.test/");
        let url = store.store("out/m.wav", b"RIFF", "audio/wav").unwrap();
        assert_eq!(url, "https://cdn.test/out/m.wav");
        assert_eq!(store.fetch(&url).unwrap(), b"RIFF".to_vec());
        assert_eq!(store.stored("out/m.wav").unwrap().content_type, "audio/wav");
        assert_eq!(store.stored_count(), 1);
    }
}
