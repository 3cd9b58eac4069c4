use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::error::StrataResult;
use crate::store::object::ObjectStore;

#[derive(Debug, Default)]
struct Inner {
    objects: BTreeMap<(String, String), Bytes>,
}

/// In-memory object store for testing and development purposes.
///
/// [`MemoryObjectStore`] keeps every object in a process-local map, making it
/// ideal for exercising the pipeline without cloud storage. All data is lost
/// when the process terminates.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryObjectStore {
    /// Creates a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored objects across all buckets.
    pub async fn object_count(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.objects.len()
    }
}

impl ObjectStore for MemoryObjectStore {
    async fn fetch(&self, bucket: &str, key: &str) -> StrataResult<Option<Bytes>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned())
    }

    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> StrataResult<()> {
        let mut inner = self.inner.lock().await;
        inner
            .objects
            .insert((bucket.to_string(), key.to_string()), body);

        Ok(())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> StrataResult<Vec<String>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .objects
            .keys()
            .filter(|(object_bucket, key)| object_bucket == bucket && key.starts_with(prefix))
            .map(|(_, key)| key.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_missing_key_is_none() {
        let store = MemoryObjectStore::new();

        assert_eq!(store.fetch("raw", "nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_then_fetch_round_trips() {
        let store = MemoryObjectStore::new();
        store
            .put("raw", "a/b", Bytes::from_static(b"payload"))
            .await
            .unwrap();

        let body = store.fetch("raw", "a/b").await.unwrap();
        assert_eq!(body, Some(Bytes::from_static(b"payload")));
    }

    #[tokio::test]
    async fn list_filters_by_bucket_and_prefix() {
        let store = MemoryObjectStore::new();
        store.put("raw", "a/1", Bytes::new()).await.unwrap();
        store.put("raw", "a/2", Bytes::new()).await.unwrap();
        store.put("raw", "b/1", Bytes::new()).await.unwrap();
        store.put("other", "a/3", Bytes::new()).await.unwrap();

        let keys = store.list("raw", "a/").await.unwrap();
        assert_eq!(keys, vec!["a/1".to_string(), "a/2".to_string()]);
    }
}
