use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use walkdir::WalkDir;

use super::{page_sorted, BlobStore, ListPage, StoreError};

const TMP_MARKER: &str = ".tmp-";

type ListingKey = (String, String);

/// Directory-backed store: `<root>/<bucket>/<key>`.
///
/// A listing walks the bucket once, on its first page; continued pages are served from
/// that sorted snapshot until the last page is returned.
pub struct FsStore {
    root: PathBuf,
    listings: Mutex<HashMap<ListingKey, Arc<Vec<String>>>>,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), listings: Mutex::new(HashMap::new()) }
    }

    fn listings(&self) -> Result<MutexGuard<'_, HashMap<ListingKey, Arc<Vec<String>>>>, StoreError> {
        self.listings.lock().map_err(|_| StoreError::Backend("listing cache poisoned".to_string()))
    }

    async fn scan(&self, bucket: &str, prefix: &str) -> Result<Arc<Vec<String>>, StoreError> {
        let dir = self.bucket_dir(bucket)?;
        let prefix = prefix.to_string();
        let sorted = tokio::task::spawn_blocking(move || scan_keys(&dir, &prefix))
            .await
            .map_err(|e| StoreError::Backend(format!("listing task failed: {}", e)))??;
        Ok(Arc::new(sorted))
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        let bucket_dir = self.bucket_dir(bucket)?;
        let rel = Path::new(key);
        let valid = !key.is_empty()
            && !key.ends_with('/')
            && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !valid { return Err(StoreError::InvalidKey(key.to_string())); }
        Ok(bucket_dir.join(rel))
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf, StoreError> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == "." || bucket == ".." {
            return Err(StoreError::InvalidKey(bucket.to_string()));
        }
        Ok(self.root.join(bucket))
    }
}

#[async_trait]
impl BlobStore for FsStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        let path = self.object_path(bucket, key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound { bucket: bucket.to_string(), key: key.to_string() }),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StoreError> {
        let path = self.object_path(bucket, key)?;
        let Some(parent) = path.parent() else { return Err(StoreError::InvalidKey(key.to_string())) };
        tokio::fs::create_dir_all(parent).await?;

        // write aside then rename, so a reader never sees a half-written object
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("object");
        let tmp = parent.join(format!(".{}{}{}", name, TMP_MARKER, uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, &body).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn list_page(&self, bucket: &str, prefix: &str, continuation: Option<&str>, max_keys: usize) -> Result<ListPage, StoreError> {
        let listing = (bucket.to_string(), prefix.to_string());
        let cached = match continuation {
            Some(_) => self.listings()?.get(&listing).cloned(),
            None => None,
        };
        let sorted = match cached {
            Some(sorted) => sorted,
            None => self.scan(bucket, prefix).await?,
        };

        let page = page_sorted(&sorted, continuation, max_keys);
        let mut listings = self.listings()?;
        if page.next.is_some() {
            listings.insert(listing, sorted);
        } else {
            listings.remove(&listing);
        }
        Ok(page)
    }
}

fn scan_keys(dir: &Path, prefix: &str) -> Result<Vec<String>, StoreError> {
    if !dir.exists() { return Ok(Vec::new()); }
    let mut keys = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|e| StoreError::Backend(e.to_string()))?;
        if !entry.file_type().is_file() { continue; }
        if entry.file_name().to_string_lossy().contains(TMP_MARKER) { continue; }
        let Ok(rel) = entry.path().strip_prefix(dir) else { continue };
        let key = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if key.starts_with(prefix) { keys.push(key); }
    }
    keys.sort();
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::list_all;

    #[tokio::test]
    async fn put_get_roundtrip_with_nested_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        store.put("raw", "uploads/2024/a.json", Bytes::from_static(b"[1,2]")).await.unwrap();
        let body = store.get("raw", "uploads/2024/a.json").await.unwrap();
        assert_eq!(&body[..], b"[1,2]");
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let err = store.get("raw", "nope.json").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        for key in ["../etc/passwd", "/abs.json", "", "dir/"] {
            let err = store.put("raw", key, Bytes::from_static(b"{}")).await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidKey(_)), "key {:?}", key);
        }
        assert!(store.get("../x", "a.json").await.is_err());
    }

    #[tokio::test]
    async fn lists_by_prefix_across_pages() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        for name in ["processed/b.json.summary.json", "processed/a.json.summary.json", "processed/sub/c.json.summary.json", "raw.json"] {
            store.put("bkt", name, Bytes::from_static(b"{}")).await.unwrap();
        }
        let keys = list_all(&store, "bkt", "processed/", 2).await.unwrap();
        assert_eq!(keys, vec![
            "processed/a.json.summary.json",
            "processed/b.json.summary.json",
            "processed/sub/c.json.summary.json",
        ]);
        assert!(list_all(&store, "empty", "", 10).await.unwrap().is_empty());
    }
    #[tokio::test]
    async fn continued_pages_reuse_first_scan() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        for name in ["p/a", "p/c", "p/e"] {
            store.put("bkt", name, Bytes::from_static(b"{}")).await.unwrap();
        }

        let first = store.list_page("bkt", "p/", None, 1).await.unwrap();
        assert_eq!(first.keys, vec!["p/a"]);
        // written after the walk, so not part of this listing
        store.put("bkt", "p/b", Bytes::from_static(b"{}")).await.unwrap();

        let second = store.list_page("bkt", "p/", first.next.as_deref(), 5).await.unwrap();
        assert_eq!(second.keys, vec!["p/c", "p/e"]);
        assert_eq!(second.next, None);
        assert!(store.listings().unwrap().is_empty());

        let fresh = list_all(&store, "bkt", "p/", 2).await.unwrap();
        assert_eq!(fresh, vec!["p/a", "p/b", "p/c", "p/e"]);
    }
}
