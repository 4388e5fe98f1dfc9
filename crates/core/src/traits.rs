//! ObjectStore trait definition
//!
//! This trait defines the small set of remote operations the explorer needs.
//! It keeps the listing engine and download coordinator independent of the
//! AWS SDK, and lets tests substitute scripted stores.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Path delimiter used for folder-style listings
pub const DELIMITER: &str = "/";

/// Default lifetime of a presigned URL
pub const DEFAULT_PRESIGN_EXPIRY: Duration = Duration::from_secs(3600);

/// A bucket as reported by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketInfo {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<Timestamp>,
}

impl BucketInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            creation_date: None,
        }
    }
}

/// One object row of a list page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<Timestamp>,
}

/// Parameters of a single paged list call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// Prefix to scope the listing to (empty for bucket root)
    pub prefix: String,

    /// Delimiter for grouping; `None` lists every key under the prefix
    pub delimiter: Option<String>,

    /// Continuation token from the previous page
    pub continuation_token: Option<String>,

    /// Maximum number of keys to return per request
    pub max_keys: Option<i32>,
}

impl ListRequest {
    /// Folder-style listing of the direct children of `prefix`
    pub fn delimited(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: Some(DELIMITER.to_string()),
            ..Default::default()
        }
    }

    /// Flat listing of every key below `prefix`
    pub fn recursive(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    pub fn with_continuation(mut self, token: Option<String>) -> Self {
        self.continuation_token = token;
        self
    }
}

/// Result of one paged list call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Folder markers derived from the delimiter
    pub common_prefixes: Vec<String>,

    /// Real objects on this page
    pub contents: Vec<ObjectSummary>,

    /// Present when more pages remain
    pub next_continuation_token: Option<String>,
}

/// Per-key metadata returned by a head request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub content_type: Option<String>,
}

/// Trait for the remote object store
///
/// Implemented by the S3 adapter and mocked in tests. Every call is a
/// blocking network round trip from the caller's point of view.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List buckets visible to the current credentials
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>>;

    /// List a single page of objects
    async fn list_objects(&self, bucket: &str, request: ListRequest) -> Result<ListPage>;

    /// Get object metadata
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata>;

    /// Fetch an object into `local_path`, replacing any existing file
    async fn download_file(&self, bucket: &str, key: &str, local_path: &Path) -> Result<()>;

    /// Issue a time-limited direct-access URL
    async fn presign_url(&self, bucket: &str, key: &str, expires_in: Duration)
    -> Result<url::Url>;
}
