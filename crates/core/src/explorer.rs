//! Bucket explorer
//!
//! [`Explorer`] is one browsing context: it owns the navigation state, at
//! most one active [`ListingSession`], and the [`ListingStore`] the session
//! feeds. Every location change stops and drains the previous session before
//! the store is reset and a new session is started, so batches from an old
//! prefix can never leak into the new view.
//!
//! The consumer drives ingestion by awaiting [`Explorer::next_event`] on its
//! own turn; that is the only place entries are appended.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;

use crate::download::{DownloadCoordinator, DownloadProgress, FolderDownload};
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::listing::{ListingEngine, ListingEvent, ListingSession};
use crate::navigation::{Breadcrumb, NavigationChange, NavigationController, NavigationState};
use crate::store::{ListingStore, Snapshot, SortColumn, SortDirection};
use crate::traits::{BucketInfo, ObjectStore};

/// Progress notification for the presentation layer
#[derive(Debug)]
pub enum ExplorerEvent {
    /// A batch was ingested into the store
    Loaded {
        received: usize,
        total: usize,
        is_first_batch: bool,
        is_complete: bool,
    },
    /// The listing failed; the session is over
    Failed(Error),
}

pub struct Explorer {
    store: Arc<dyn ObjectStore>,
    engine: ListingEngine,
    downloads: DownloadCoordinator,
    navigation: NavigationController,
    session: Option<ListingSession>,
    listing: Arc<RwLock<ListingStore>>,
    state_tx: watch::Sender<NavigationState>,
}

impl Explorer {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        let (state_tx, _) = watch::channel(NavigationState::default());
        Self {
            engine: ListingEngine::new(Arc::clone(&store)),
            downloads: DownloadCoordinator::new(Arc::clone(&store)),
            store,
            navigation: NavigationController::new(),
            session: None,
            listing: Arc::new(RwLock::new(ListingStore::new())),
            state_tx,
        }
    }

    /// Shared read handle to the listing store
    pub fn listing(&self) -> Arc<RwLock<ListingStore>> {
        Arc::clone(&self.listing)
    }

    /// Receive navigation state changes
    pub fn subscribe(&self) -> watch::Receiver<NavigationState> {
        self.state_tx.subscribe()
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.navigation.breadcrumbs()
    }

    pub fn downloads(&self) -> &DownloadCoordinator {
        &self.downloads
    }

    /// Whether a listing session is still producing batches
    pub fn is_loading(&self) -> bool {
        self.session.is_some()
    }

    pub async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        self.store.list_buckets().await
    }

    pub async fn enter_bucket(&mut self, name: &str) -> NavigationChange {
        let change = self.navigation.enter_bucket(name);
        self.apply(change).await
    }

    /// Open `bucket` directly at `prefix`
    pub async fn open(&mut self, bucket: &str, prefix: &str) -> NavigationChange {
        let change = self.navigation.open(bucket, prefix);
        self.apply(change).await
    }

    pub async fn enter_folder(&mut self, key: &str) -> NavigationChange {
        let change = self.navigation.enter_folder(key);
        self.apply(change).await
    }

    pub async fn navigate_to(&mut self, prefix: &str) -> NavigationChange {
        let change = self.navigation.navigate_to(prefix);
        self.apply(change).await
    }

    pub async fn go_up(&mut self) -> NavigationChange {
        let change = self.navigation.go_up();
        self.apply(change).await
    }

    /// Re-list the current location
    pub async fn refresh(&mut self) -> NavigationChange {
        let state = self.navigation.state().clone();
        if state.bucket.is_none() {
            return NavigationChange::Unchanged;
        }
        self.apply(NavigationChange::Moved(state)).await
    }

    /// Stop the active session, if any
    pub async fn stop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop().await;
        }
    }

    /// Wait for the next listing event and ingest it
    ///
    /// Returns `None` when no session is active. Cancel-safe: dropping the
    /// future before it completes loses no batch.
    pub async fn next_event(&mut self) -> Option<ExplorerEvent> {
        let session = self.session.as_mut()?;
        match session.next_event().await {
            Some(ListingEvent::Batch(batch)) => {
                let received = batch.entries.len();
                let is_first_batch = batch.is_first_batch;
                let is_complete = batch.is_complete;
                let total = {
                    let mut store = self.write_store();
                    store.ingest(batch);
                    store.total_loaded()
                };
                if is_complete {
                    self.session = None;
                }
                Some(ExplorerEvent::Loaded {
                    received,
                    total,
                    is_first_batch,
                    is_complete,
                })
            }
            Some(ListingEvent::Failed(e)) => {
                self.session = None;
                Some(ExplorerEvent::Failed(e))
            }
            None => {
                self.session = None;
                None
            }
        }
    }

    /// Drive the active session until it completes or fails
    pub async fn load_to_completion(&mut self) -> Result<()> {
        while let Some(event) = self.next_event().await {
            if let ExplorerEvent::Failed(e) = event {
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.read_store().snapshot()
    }

    /// Loaded entry with exactly this key
    pub fn entry(&self, key: &str) -> Option<Entry> {
        self.read_store().find(key).cloned()
    }

    pub fn set_filter(&self, text: &str) -> bool {
        self.write_store().set_filter(text)
    }

    pub fn set_sort(&self, column: SortColumn, direction: SortDirection) -> bool {
        self.write_store().set_sort(column, direction)
    }

    pub fn toggle_sort(&self, column: SortColumn) -> bool {
        self.write_store().toggle_sort(column)
    }

    pub fn next_page(&self) -> bool {
        self.write_store().next_page()
    }

    pub fn prev_page(&self) -> bool {
        self.write_store().prev_page()
    }

    pub fn set_page(&self, page: usize) -> Result<()> {
        self.write_store().set_page(page)
    }

    /// Download an entry of the current listing by key
    ///
    /// Objects are written to `destination`; folders are downloaded
    /// recursively into the `destination` directory.
    pub async fn download<F>(
        &self,
        key: &str,
        destination: &Path,
        progress: F,
    ) -> Result<FolderDownload>
    where
        F: FnMut(&DownloadProgress),
    {
        let bucket = self
            .navigation
            .bucket()
            .ok_or_else(|| Error::InvalidPath("No bucket selected".into()))?
            .to_string();
        let entry = self
            .read_store()
            .find(key)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("{bucket}/{key}")))?;

        if entry.is_folder {
            self.downloads
                .download_folder(&bucket, &entry.key, destination, progress)
                .await
        } else {
            self.downloads
                .download_object(&bucket, &entry.key, destination)
                .await?;
            Ok(FolderDownload {
                files: vec![destination.to_path_buf()],
                skipped: Vec::new(),
            })
        }
    }

    async fn apply(&mut self, change: NavigationChange) -> NavigationChange {
        match &change {
            NavigationChange::Moved(state) => {
                self.stop().await;
                self.write_store().reset();
                if let Some(bucket) = &state.bucket {
                    self.session = Some(self.engine.start(bucket.as_str(), state.prefix.as_str()));
                }
                self.state_tx.send_replace(state.clone());
            }
            NavigationChange::LeftBucket => {
                self.stop().await;
                self.write_store().reset();
                self.state_tx.send_replace(NavigationState::default());
            }
            NavigationChange::Unchanged => {}
        }
        change
    }

    fn read_store(&self) -> RwLockReadGuard<'_, ListingStore> {
        self.listing.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, ListingStore> {
        self.listing.write().unwrap_or_else(PoisonError::into_inner)
    }
}
