//! Download coordination
//!
//! Single objects are fetched into a sibling temporary file and renamed into
//! place, so the destination is either fully replaced or left untouched.
//! Folder downloads enumerate the whole prefix up front and then fetch one
//! key at a time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::path::relative_local_path;
use crate::traits::{DELIMITER, ListRequest, ObjectStore};

/// Progress after one completed file of a folder download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadProgress {
    /// 1-based index of the file just completed
    pub index: usize,
    pub total: usize,
    pub key: String,
}

/// Outcome of a folder download
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FolderDownload {
    /// Local paths written, in download order
    pub files: Vec<PathBuf>,
    /// Keys that could not be mapped to a safe local path
    pub skipped: Vec<String>,
}

/// Orchestrates object and folder downloads against a store
#[derive(Clone)]
pub struct DownloadCoordinator {
    store: Arc<dyn ObjectStore>,
}

impl DownloadCoordinator {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Download one object to `destination`, replacing it on success
    pub async fn download_object(&self, bucket: &str, key: &str, destination: &Path) -> Result<()> {
        let partial = partial_path(destination);

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        if let Err(e) = self.store.download_file(bucket, key, &partial).await {
            remove_partial(&partial).await;
            return Err(match e {
                Error::InvalidCredentials(_) | Error::Download { .. } => e,
                other => Error::Download {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    message: other.to_string(),
                },
            });
        }

        if let Err(e) = tokio::fs::rename(&partial, destination).await {
            remove_partial(&partial).await;
            return Err(e.into());
        }

        tracing::info!(bucket, key, destination = %destination.display(), "Downloaded object");
        Ok(())
    }

    /// Download every object below `prefix` into `destination_dir`
    ///
    /// Keys keep their path relative to `prefix`. Files are fetched strictly
    /// one after another and `progress` is called after each. The first
    /// failure aborts the remaining files; completed files stay on disk.
    pub async fn download_folder<F>(
        &self,
        bucket: &str,
        prefix: &str,
        destination_dir: &Path,
        mut progress: F,
    ) -> Result<FolderDownload>
    where
        F: FnMut(&DownloadProgress),
    {
        let keys = self.list_all_keys(bucket, prefix).await?;
        tokio::fs::create_dir_all(destination_dir).await?;

        let mut result = FolderDownload::default();
        let mut targets = Vec::with_capacity(keys.len());
        for key in keys {
            if key.ends_with(DELIMITER) {
                continue;
            }
            match relative_local_path(prefix, &key) {
                Some(relative) => targets.push((destination_dir.join(relative), key)),
                None => {
                    tracing::warn!(bucket, key = %key, "Skipping key that has no safe local path");
                    result.skipped.push(key);
                }
            }
        }

        let total = targets.len();
        tracing::info!(bucket, prefix, total, "Starting folder download");

        for (index, (path, key)) in targets.into_iter().enumerate() {
            self.download_object(bucket, &key, &path).await?;
            progress(&DownloadProgress {
                index: index + 1,
                total,
                key,
            });
            result.files.push(path);
        }

        Ok(result)
    }

    /// Issue a time-limited URL for a single object
    pub async fn share_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: std::time::Duration,
    ) -> Result<url::Url> {
        self.store.presign_url(bucket, key, expires_in).await
    }

    async fn list_all_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation = None;
        loop {
            let request = ListRequest::recursive(prefix).with_continuation(continuation);
            let page = self.store.list_objects(bucket, request).await?;
            keys.extend(page.contents.into_iter().map(|o| o.key));
            continuation = page.next_continuation_token;
            if continuation.is_none() {
                return Ok(keys);
            }
        }
    }
}

/// Temporary sibling used while a download is in flight
fn partial_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());
    destination.with_file_name(format!(".{name}.part"))
}

async fn remove_partial(partial: &Path) {
    if let Err(e) = tokio::fs::remove_file(partial).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %partial.display(), "Failed to remove partial download: {e}");
        }
    }
}
