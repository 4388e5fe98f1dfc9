//! Path parsing and prefix arithmetic
//!
//! Handles `bucket[/key]` locations and the folder-prefix rules used by
//! navigation and recursive downloads.

use std::path::{Component, PathBuf};

use crate::error::{Error, Result};
use crate::traits::DELIMITER;

/// A location inside a bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPath {
    /// Bucket name
    pub bucket: String,
    /// Object key or folder prefix (empty for bucket root)
    pub key: String,
}

impl BucketPath {
    /// Create a new BucketPath
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Whether the key names a folder (root or delimiter-terminated)
    pub fn is_dir(&self) -> bool {
        is_folder_prefix(&self.key)
    }

    /// Key normalized to folder form (`a/b` → `a/b/`, root stays empty)
    pub fn as_prefix(&self) -> String {
        folder_prefix(&self.key)
    }
}

impl std::fmt::Display for BucketPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}", self.bucket)
        } else {
            write!(f, "{}/{}", self.bucket, self.key)
        }
    }
}

/// Parse a `bucket[/key]` string
///
/// An `s3://` scheme is accepted and ignored.
pub fn parse_bucket_path(path: &str) -> Result<BucketPath> {
    let path = path.strip_prefix("s3://").unwrap_or(path);
    if path.is_empty() {
        return Err(Error::InvalidPath("Path cannot be empty".into()));
    }

    let (bucket, key) = match path.split_once(DELIMITER) {
        Some((bucket, key)) => (bucket, key),
        None => (path, ""),
    };

    if bucket.is_empty() {
        return Err(Error::InvalidPath("Bucket name cannot be empty".into()));
    }

    Ok(BucketPath::new(bucket, key))
}

/// Whether `prefix` is the root or ends with the delimiter
pub fn is_folder_prefix(prefix: &str) -> bool {
    prefix.is_empty() || prefix.ends_with(DELIMITER)
}

/// Normalize a key to folder-prefix form
pub fn folder_prefix(key: &str) -> String {
    if is_folder_prefix(key) {
        key.to_string()
    } else {
        format!("{key}{DELIMITER}")
    }
}

/// Parent of a folder prefix (`a/b/` → `a/`, `a/` → ``), `None` at the root
pub fn parent_prefix(prefix: &str) -> Option<String> {
    if prefix.is_empty() {
        return None;
    }
    let trimmed = prefix.trim_end_matches(DELIMITER);
    match trimmed.rfind(DELIMITER) {
        Some(pos) => Some(format!("{}{DELIMITER}", &trimmed[..pos])),
        None => Some(String::new()),
    }
}

/// Local path for `key` below `prefix`, or `None` if the key cannot be
/// mapped safely (outside the prefix, empty, or containing `..`)
pub fn relative_local_path(prefix: &str, key: &str) -> Option<PathBuf> {
    let relative = key.strip_prefix(prefix)?.trim_start_matches(DELIMITER);
    if relative.is_empty() {
        return None;
    }

    let mut path = PathBuf::new();
    for part in relative.split(DELIMITER) {
        if part.is_empty() {
            return None;
        }
        let component = PathBuf::from(part);
        match component.components().next() {
            Some(Component::Normal(_)) if component.components().count() == 1 => {
                path.push(part)
            }
            _ => return None,
        }
    }
    Some(path)
}
