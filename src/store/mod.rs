use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod fs;
#[cfg(test)]
pub mod memory;

pub use fs::FsStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },
    #[error("invalid object key '{0}'")]
    InvalidKey(String),
    #[error("listing did not advance past continuation token '{0}'")]
    StalledListing(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// One page of a prefix listing. `next` is the token for the following page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub keys: Vec<String>,
    pub next: Option<String>,
}

/// Key-addressed object storage, organised in buckets.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError>;

    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StoreError>;

    /// List keys under `prefix` in lexicographic order, at most `max_keys` per page.
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<&str>,
        max_keys: usize,
    ) -> Result<ListPage, StoreError>;
}

/// Drain a listing page by page until the store reports no continuation.
pub async fn list_all(store: &dyn BlobStore, bucket: &str, prefix: &str, page_size: usize) -> Result<Vec<String>, StoreError> {
    let mut keys = Vec::new();
    let mut token: Option<String> = None;
    loop {
        let page = store.list_page(bucket, prefix, token.as_deref(), page_size.max(1)).await?;
        keys.extend(page.keys);
        match page.next {
            Some(next) if token.as_deref() == Some(next.as_str()) => return Err(StoreError::StalledListing(next)),
            Some(next) => token = Some(next),
            None => break,
        }
    }
    Ok(keys)
}

/// Shared paging over an already sorted key list; the token is the last key returned.
pub(crate) fn page_sorted(sorted: &[String], continuation: Option<&str>, max_keys: usize) -> ListPage {
    let start = continuation.map_or(0, |after| sorted.partition_point(|k| k.as_str() <= after));
    let rest = &sorted[start..];
    let take = max_keys.max(1).min(rest.len());
    let keys = rest[..take].to_vec();
    let next = if rest.len() > take { keys.last().cloned() } else { None };
    ListPage { keys, next }
}
