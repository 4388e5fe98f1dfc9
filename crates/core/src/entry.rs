//! Listing entries
//!
//! An [`Entry`] is one row of a folder view: either a folder marker derived
//! from a common prefix, or a real object with its metadata.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::traits::{DELIMITER, ObjectSummary};

/// Content type recorded for folder markers
pub const FOLDER_CONTENT_TYPE: &str = "folder";

/// Content type recorded when metadata could not be fetched
pub const UNKNOWN_CONTENT_TYPE: &str = "N/A";

/// One item of a bucket listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Full key, unique within the bucket
    pub key: String,

    /// Size in bytes (0 for folders)
    pub size: u64,

    /// Last modified timestamp (absent for folders)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,

    /// MIME type, `"folder"`, or `"N/A"`
    pub content_type: String,

    /// Whether this is a common-prefix marker
    pub is_folder: bool,
}

impl Entry {
    /// Create a folder marker from a common prefix
    pub fn folder(prefix: impl Into<String>) -> Self {
        Self {
            key: prefix.into(),
            size: 0,
            last_modified: None,
            content_type: FOLDER_CONTENT_TYPE.to_string(),
            is_folder: true,
        }
    }

    /// Create an object entry from a list row and its resolved content type
    pub fn object(summary: ObjectSummary, content_type: Option<String>) -> Self {
        Self {
            key: summary.key,
            size: summary.size,
            last_modified: summary.last_modified,
            content_type: content_type.unwrap_or_else(|| UNKNOWN_CONTENT_TYPE.to_string()),
            is_folder: false,
        }
    }

    /// Final path segment of the key, without a trailing delimiter
    pub fn name(&self) -> &str {
        final_segment(&self.key)
    }

    /// Key relative to `prefix` with the trailing delimiter stripped
    pub fn display_name(&self, prefix: &str) -> &str {
        self.key
            .strip_prefix(prefix)
            .unwrap_or(&self.key)
            .trim_end_matches(DELIMITER)
    }

    /// Human-readable size, empty for folders and zero-byte objects
    pub fn size_human(&self) -> String {
        if self.is_folder || self.size == 0 {
            String::new()
        } else {
            humansize::format_size(self.size, humansize::BINARY)
        }
    }
}

/// Last path segment of a key, ignoring one trailing delimiter
pub fn final_segment(key: &str) -> &str {
    let trimmed = key.strip_suffix(DELIMITER).unwrap_or(key);
    match trimmed.rfind(DELIMITER) {
        Some(pos) => &trimmed[pos + DELIMITER.len()..],
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_entry() {
        let entry = Entry::folder("photos/2024/");
        assert!(entry.is_folder);
        assert_eq!(entry.size, 0);
        assert_eq!(entry.content_type, "folder");
        assert_eq!(entry.name(), "2024");
        assert!(entry.last_modified.is_none());
    }

    #[test]
    fn test_object_entry_without_metadata() {
        let summary = ObjectSummary {
            key: "photos/cat.jpg".into(),
            size: 2048,
            last_modified: None,
        };
        let entry = Entry::object(summary, None);
        assert!(!entry.is_folder);
        assert_eq!(entry.content_type, "N/A");
        assert_eq!(entry.name(), "cat.jpg");
        assert_eq!(entry.size_human(), "2 KiB");
    }

    #[test]
    fn test_final_segment() {
        assert_eq!(final_segment("a/b/c.txt"), "c.txt");
        assert_eq!(final_segment("a/b/"), "b");
        assert_eq!(final_segment("top.txt"), "top.txt");
        assert_eq!(final_segment(""), "");
    }

    #[test]
    fn test_display_name() {
        let entry = Entry::folder("photos/2024/");
        assert_eq!(entry.display_name("photos/"), "2024");
        assert_eq!(entry.display_name(""), "photos/2024");
        assert_eq!(Entry::folder("x/").size_human(), "");
    }
}
