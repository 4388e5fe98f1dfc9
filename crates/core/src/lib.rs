//! bx-core: Core library for the bx S3 bucket explorer
//!
//! This crate provides the explorer's domain logic:
//! - Incremental, cancellable listing of a bucket prefix
//! - Client-side filtering, sorting and pagination of loaded entries
//! - Navigation state and breadcrumbs
//! - Single-object and folder downloads
//! - Configuration and AWS profile discovery
//!
//! Remote access goes through the [`ObjectStore`] trait, so nothing here
//! depends on a specific S3 SDK.

pub mod bucket;
pub mod config;
pub mod download;
pub mod entry;
pub mod error;
pub mod explorer;
pub mod listing;
pub mod navigation;
pub mod paginator;
pub mod path;
pub mod profile;
pub mod store;
pub mod traits;

#[cfg(test)]
mod testing;

pub use bucket::{BucketPage, bucket_page, filter_buckets};
pub use config::{Config, ConfigManager};
pub use download::{DownloadCoordinator, DownloadProgress, FolderDownload};
pub use entry::Entry;
pub use error::{Error, Result};
pub use explorer::{Explorer, ExplorerEvent};
pub use listing::{Batch, ListingEngine, ListingEvent, ListingSession};
pub use navigation::{Breadcrumb, NavigationChange, NavigationController, NavigationState};
pub use paginator::PAGE_SIZE;
pub use path::{BucketPath, parse_bucket_path};
pub use profile::{ProfileSources, discover_profiles};
pub use store::{ListingStore, Snapshot, SortColumn, SortDirection, SortOrder};
pub use traits::{BucketInfo, ListPage, ListRequest, ObjectMetadata, ObjectStore, ObjectSummary};
