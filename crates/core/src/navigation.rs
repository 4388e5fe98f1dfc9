//! Bucket and prefix navigation state

use serde::Serialize;

use crate::path::{folder_prefix, parent_prefix};
use crate::traits::DELIMITER;

/// Current location of an explorer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavigationState {
    /// Selected bucket, `None` on the bucket list
    pub bucket: Option<String>,
    /// Current folder prefix, empty at the bucket root
    pub prefix: String,
}

/// Result of a navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationChange {
    /// Location changed; a new listing is needed
    Moved(NavigationState),
    /// `go_up` at a bucket root: the caller should return to the bucket list
    LeftBucket,
    /// Nothing to do (no bucket selected)
    Unchanged,
}

/// One clickable element of the breadcrumb trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub label: String,
    pub prefix: String,
}

/// Tracks the current bucket and prefix
#[derive(Debug, Default)]
pub struct NavigationController {
    state: NavigationState,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn bucket(&self) -> Option<&str> {
        self.state.bucket.as_deref()
    }

    pub fn prefix(&self) -> &str {
        &self.state.prefix
    }

    /// Open a bucket at its root
    pub fn enter_bucket(&mut self, name: impl Into<String>) -> NavigationChange {
        self.state = NavigationState {
            bucket: Some(name.into()),
            prefix: String::new(),
        };
        NavigationChange::Moved(self.state.clone())
    }

    /// Open a bucket directly at `prefix`
    pub fn open(&mut self, bucket: impl Into<String>, prefix: &str) -> NavigationChange {
        self.state = NavigationState {
            bucket: Some(bucket.into()),
            prefix: folder_prefix(prefix),
        };
        NavigationChange::Moved(self.state.clone())
    }

    /// Open a folder by its (delimiter-terminated) key
    pub fn enter_folder(&mut self, key: &str) -> NavigationChange {
        self.navigate_to(key)
    }

    /// Jump to an arbitrary prefix in the current bucket, e.g. from a breadcrumb
    pub fn navigate_to(&mut self, prefix: &str) -> NavigationChange {
        if self.state.bucket.is_none() {
            return NavigationChange::Unchanged;
        }
        self.state.prefix = folder_prefix(prefix);
        NavigationChange::Moved(self.state.clone())
    }

    /// Move to the parent folder, or leave the bucket from its root
    pub fn go_up(&mut self) -> NavigationChange {
        if self.state.bucket.is_none() {
            return NavigationChange::Unchanged;
        }
        match parent_prefix(&self.state.prefix) {
            Some(parent) => {
                self.state.prefix = parent;
                NavigationChange::Moved(self.state.clone())
            }
            None => {
                self.state = NavigationState::default();
                NavigationChange::LeftBucket
            }
        }
    }

    /// Bucket root followed by one crumb per path part
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        let Some(bucket) = &self.state.bucket else {
            return Vec::new();
        };

        let mut crumbs = vec![Breadcrumb {
            label: bucket.clone(),
            prefix: String::new(),
        }];
        let mut current = String::new();
        for part in self.state.prefix.split(DELIMITER).filter(|p| !p.is_empty()) {
            current.push_str(part);
            current.push_str(DELIMITER);
            crumbs.push(Breadcrumb {
                label: part.to_string(),
                prefix: current.clone(),
            });
        }
        crumbs
    }
}
