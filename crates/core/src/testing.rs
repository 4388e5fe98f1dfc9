//! Scripted object store for listing and explorer tests

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::Semaphore;

use crate::error::{Error, Result};
use crate::traits::{BucketInfo, ListPage, ListRequest, ObjectMetadata, ObjectStore, ObjectSummary};

/// Serves pre-built pages; page `n > 0` is requested with token `p{n}`
pub(crate) struct ScriptedStore {
    pages: Vec<ListPage>,
    failing_heads: HashSet<String>,
    hanging_heads: HashSet<String>,
    list_error_at: Option<usize>,
    gate_at: Option<usize>,
    gate: Arc<Semaphore>,
    pub list_calls: AtomicUsize,
    pub requests: Mutex<Vec<ListRequest>>,
}

impl ScriptedStore {
    /// `count` objects named `{prefix}obj-NNNN`, split into pages of `page_size`
    pub fn paged(prefix: &str, count: usize, page_size: usize) -> Self {
        let objects: Vec<ObjectSummary> = (0..count)
            .map(|i| ObjectSummary {
                key: format!("{prefix}obj-{i:04}"),
                size: i as u64,
                last_modified: Timestamp::from_second(1_700_000_000 + i as i64).ok(),
            })
            .collect();

        let mut pages: Vec<ListPage> = objects
            .chunks(page_size.max(1))
            .map(|chunk| ListPage {
                contents: chunk.to_vec(),
                ..Default::default()
            })
            .collect();
        if pages.is_empty() {
            pages.push(ListPage::default());
        }
        let last = pages.len() - 1;
        for (i, page) in pages.iter_mut().enumerate() {
            if i < last {
                page.next_continuation_token = Some(format!("p{}", i + 1));
            }
        }

        Self {
            pages,
            failing_heads: HashSet::new(),
            hanging_heads: HashSet::new(),
            list_error_at: None,
            gate_at: None,
            gate: Arc::new(Semaphore::new(0)),
            list_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Add common prefixes to the first page
    pub fn with_folders(mut self, folders: &[&str]) -> Self {
        self.pages[0]
            .common_prefixes
            .extend(folders.iter().map(|f| f.to_string()));
        self
    }

    /// Add a zero-byte object named after the prefix itself
    pub fn with_placeholder(mut self, key: &str) -> Self {
        self.pages[0].contents.insert(
            0,
            ObjectSummary {
                key: key.to_string(),
                size: 0,
                last_modified: None,
            },
        );
        self
    }

    pub fn with_failing_head(mut self, key: &str) -> Self {
        self.failing_heads.insert(key.to_string());
        self
    }

    /// Make `head_object` for `key` never return
    pub fn with_hanging_head(mut self, key: &str) -> Self {
        self.hanging_heads.insert(key.to_string());
        self
    }

    pub fn with_list_error_at(mut self, page: usize) -> Self {
        self.list_error_at = Some(page);
        self
    }

    /// Block the fetch of `page` until a permit is added to [`gate`](Self::gate)
    pub fn with_gate_at(mut self, page: usize) -> Self {
        self.gate_at = Some(page);
        self
    }

    pub fn gate(&self) -> Arc<Semaphore> {
        Arc::clone(&self.gate)
    }
}

#[async_trait]
impl ObjectStore for ScriptedStore {
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        Ok(vec![BucketInfo::new("bucket")])
    }

    async fn list_objects(&self, _bucket: &str, request: ListRequest) -> Result<ListPage> {
        let index = request
            .continuation_token
            .as_deref()
            .and_then(|t| t.strip_prefix('p'))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        self.requests.lock().unwrap().push(request);
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        if self.list_error_at == Some(index) {
            return Err(Error::store_request("ListObjectsV2", "bucket", "scripted failure"));
        }
        if self.gate_at == Some(index) {
            let permit = self.gate.acquire().await.map_err(|e| Error::General(e.to_string()))?;
            permit.forget();
        }
        Ok(self.pages[index].clone())
    }

    async fn head_object(&self, _bucket: &str, key: &str) -> Result<ObjectMetadata> {
        if self.hanging_heads.contains(key) {
            std::future::pending::<()>().await;
        }
        if self.failing_heads.contains(key) {
            return Err(Error::store_request("HeadObject", key, "access denied"));
        }
        Ok(ObjectMetadata {
            content_type: Some("text/plain".to_string()),
        })
    }

    async fn download_file(&self, bucket: &str, key: &str, _local_path: &Path) -> Result<()> {
        Err(Error::Download {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: "not scripted".to_string(),
        })
    }

    async fn presign_url(
        &self,
        bucket: &str,
        key: &str,
        _expires_in: Duration,
    ) -> Result<url::Url> {
        Ok(url::Url::parse(&format!("https://example.invalid/{bucket}/{key}"))?)
    }
}
