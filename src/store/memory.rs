use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{page_sorted, BlobStore, ListPage, StoreError};

/// In-process store for tests, with switchable failures.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<(String, String), Bytes>>,
    failing_gets: Mutex<HashSet<String>>,
    fail_list: AtomicBool,
    fail_put: AtomicBool,
    list_calls: AtomicUsize,
    puts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Bytes>) {
        self.objects.lock().unwrap().insert((bucket.to_string(), key.to_string()), body.into());
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(&(bucket.to_string(), key.to_string())).cloned()
    }

    pub fn object_json(&self, bucket: &str, key: &str) -> Option<serde_json::Value> {
        self.object(bucket, key).map(|b| serde_json::from_slice(&b).unwrap())
    }

    pub fn fail_get(&self, key: &str) { self.failing_gets.lock().unwrap().insert(key.to_string()); }
    pub fn fail_list(&self) { self.fail_list.store(true, Ordering::SeqCst); }
    pub fn fail_put(&self) { self.fail_put.store(true, Ordering::SeqCst); }

    pub fn list_calls(&self) -> usize { self.list_calls.load(Ordering::SeqCst) }
    pub fn puts(&self) -> usize { self.puts.load(Ordering::SeqCst) }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        if self.failing_gets.lock().unwrap().contains(key) {
            return Err(StoreError::Backend(format!("injected read failure for {}", key)));
        }
        self.object(bucket, key).ok_or_else(|| StoreError::NotFound { bucket: bucket.to_string(), key: key.to_string() })
    }

    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StoreError> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(format!("injected write failure for {}", key)));
        }
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.insert(bucket, key, body);
        Ok(())
    }

    async fn list_page(&self, bucket: &str, prefix: &str, continuation: Option<&str>, max_keys: usize) -> Result<ListPage, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected listing failure".to_string()));
        }
        let sorted: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect();
        Ok(page_sorted(&sorted, continuation, max_keys))
    }
}
