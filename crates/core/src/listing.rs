//! Incremental listing engine
//!
//! A [`ListingSession`] enumerates one bucket prefix in a background task and
//! delivers [`Batch`]es over a channel as pages arrive. The first batch is
//! released as soon as [`MAX_BATCH_SIZE`] entries are known so the consumer
//! can render something while the rest of a large prefix is still loading.
//!
//! Listings are always delimiter-scoped: the root and every sub-prefix are
//! listed with `/`, so only direct children appear as entries.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::traits::{ListRequest, ObjectStore};

/// Size of the first batch released to the consumer
pub const MAX_BATCH_SIZE: usize = 100;

/// Number of undelivered events buffered per session
const EVENT_BUFFER: usize = 16;

/// One increment of newly discovered entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub entries: Vec<Entry>,
    /// Set on the last batch of a listing
    pub is_complete: bool,
    /// Set on the first batch of a listing
    pub is_first_batch: bool,
}

/// Message posted by a listing worker
#[derive(Debug)]
pub enum ListingEvent {
    Batch(Batch),
    /// Terminal failure; no further events follow
    Failed(Error),
}

/// Starts listing sessions against an object store
#[derive(Clone)]
pub struct ListingEngine {
    store: Arc<dyn ObjectStore>,
}

impl ListingEngine {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Begin enumerating `prefix` in `bucket`
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, bucket: impl Into<String>, prefix: impl Into<String>) -> ListingSession {
        let bucket = bucket.into();
        let prefix = prefix.into();
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let cancel = CancellationToken::new();

        tracing::info!(bucket = %bucket, prefix = %prefix, "Starting listing session");

        let worker = Worker {
            store: Arc::clone(&self.store),
            bucket: bucket.clone(),
            prefix: prefix.clone(),
            tx,
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(worker.run());

        ListingSession {
            bucket,
            prefix,
            events: rx,
            cancel,
            worker: Some(handle),
        }
    }
}

/// One enumeration in flight for a (bucket, prefix) pair
pub struct ListingSession {
    bucket: String,
    prefix: String,
    events: mpsc::Receiver<ListingEvent>,
    cancel: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl ListingSession {
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the next event
    ///
    /// Returns `None` once the worker has finished and every event has been
    /// delivered, or immediately after [`stop`](Self::stop).
    pub async fn next_event(&mut self) -> Option<ListingEvent> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            event = self.events.recv() => event,
        }
    }

    /// Stop the session and wait until its worker is quiescent
    ///
    /// A store call still in flight is abandoned rather than awaited, so a
    /// hung request never holds up the caller. Once this returns,
    /// [`next_event`](Self::next_event) yields `None` forever.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        self.events.close();

        if let Some(handle) = self.worker.take() {
            if let Err(e) = handle.await {
                tracing::warn!(bucket = %self.bucket, prefix = %self.prefix, "Listing worker ended abnormally: {e}");
            }
        }

        let mut discarded = 0usize;
        while self.events.try_recv().is_ok() {
            discarded += 1;
        }
        tracing::debug!(
            bucket = %self.bucket,
            prefix = %self.prefix,
            discarded,
            "Listing session stopped"
        );
    }
}

impl Drop for ListingSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Worker {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    prefix: String,
    tx: mpsc::Sender<ListingEvent>,
    cancel: CancellationToken,
}

impl Worker {
    async fn run(self) {
        let mut continuation: Option<String> = None;
        let mut pending: Vec<Entry> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut first_sent = false;
        let mut pages = 0usize;
        let mut delivered = 0usize;

        loop {
            if self.cancel.is_cancelled() {
                return;
            }

            let request = ListRequest::delimited(self.prefix.as_str())
                .with_continuation(continuation.take());
            let page = match self.until_cancelled(self.store.list_objects(&self.bucket, request)).await {
                None => return,
                Some(Ok(page)) => page,
                Some(Err(e)) => {
                    tracing::warn!(bucket = %self.bucket, prefix = %self.prefix, "Listing failed: {e}");
                    self.emit(ListingEvent::Failed(e)).await;
                    return;
                }
            };
            if self.cancel.is_cancelled() {
                return;
            }
            pages += 1;
            tracing::debug!(
                bucket = %self.bucket,
                prefix = %self.prefix,
                page = pages,
                folders = page.common_prefixes.len(),
                objects = page.contents.len(),
                "Fetched listing page"
            );

            for folder in page.common_prefixes {
                if folder != self.prefix && seen.insert(folder.clone()) {
                    pending.push(Entry::folder(folder));
                }
            }

            for object in page.contents {
                if object.key == self.prefix || seen.contains(&object.key) {
                    continue;
                }
                let content_type = match self.until_cancelled(self.content_type(&object.key)).await {
                    None => return,
                    Some(Ok(content_type)) => content_type,
                    Some(Err(e)) => {
                        tracing::debug!(bucket = %self.bucket, "{e}");
                        None
                    }
                };
                seen.insert(object.key.clone());
                pending.push(Entry::object(object, content_type));
            }

            continuation = page.next_continuation_token;
            let complete = continuation.is_none();

            if !first_sent {
                if pending.len() < MAX_BATCH_SIZE && !complete {
                    continue;
                }
                let rest = if pending.len() > MAX_BATCH_SIZE {
                    pending.split_off(MAX_BATCH_SIZE)
                } else {
                    Vec::new()
                };
                let first = std::mem::replace(&mut pending, rest);
                let is_complete = complete && pending.is_empty();
                delivered += first.len();
                let batch = Batch {
                    entries: first,
                    is_complete,
                    is_first_batch: true,
                };
                if !self.emit(ListingEvent::Batch(batch)).await {
                    return;
                }
                first_sent = true;
                if is_complete {
                    break;
                }
            }

            if !pending.is_empty() || complete {
                delivered += pending.len();
                let batch = Batch {
                    entries: std::mem::take(&mut pending),
                    is_complete: complete,
                    is_first_batch: false,
                };
                if !self.emit(ListingEvent::Batch(batch)).await {
                    return;
                }
            }

            if complete {
                break;
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            prefix = %self.prefix,
            pages,
            entries = delivered,
            "Listing complete"
        );
    }

    /// Resolve the content type of one key
    async fn content_type(&self, key: &str) -> Result<Option<String>> {
        self.store
            .head_object(&self.bucket, key)
            .await
            .map(|metadata| metadata.content_type)
            .map_err(|e| Error::MetadataUnavailable(format!("{key} ({e})")))
    }

    /// Drive `fut` unless the session is stopped first; `None` means stopped
    async fn until_cancelled<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            output = fut => Some(output),
        }
    }

    /// Post an event unless the session has been stopped
    async fn emit(&self, event: ListingEvent) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.tx.send(event).await.is_ok()
    }
}
