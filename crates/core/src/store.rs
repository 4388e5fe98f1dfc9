//! Listing store
//!
//! [`ListingStore`] is the authoritative set of entries for the active prefix.
//! It owns the sort order and the text filter, and derives the view that the
//! paginator windows over.
//!
//! While a listing is still loading the view is the accumulated set in
//! arrival order. Sorting and filtering only take effect once the final
//! batch has been ingested, so the order of a half-loaded view never shifts
//! under the user as more data arrives.

use std::cmp::Reverse;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::listing::Batch;
use crate::paginator::{self, PAGE_SIZE};

/// Column a listing can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    Name,
    Size,
    LastModified,
    ContentType,
}

impl FromStr for SortColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "size" => Ok(Self::Size),
            "modified" | "last-modified" | "last_modified" | "date" => Ok(Self::LastModified),
            "type" | "content-type" | "content_type" => Ok(Self::ContentType),
            other => Err(Error::General(format!(
                "Unknown sort column '{other}' (expected name, size, modified or type)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Active sort column and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortOrder {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Header-click semantics: same column flips, another column starts ascending
    pub fn toggled(self, column: SortColumn) -> Self {
        if column == self.column {
            Self::new(column, self.direction.reversed())
        } else {
            Self::new(column, SortDirection::Ascending)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Text(String),
    Size(u64),
    Time(Option<Timestamp>),
}

fn sort_key(entry: &Entry, column: SortColumn) -> SortKey {
    match column {
        SortColumn::Name => SortKey::Text(entry.name().to_lowercase()),
        SortColumn::Size => SortKey::Size(if entry.is_folder { 0 } else { entry.size }),
        SortColumn::LastModified => SortKey::Time(entry.last_modified),
        SortColumn::ContentType => SortKey::Text(entry.content_type.to_lowercase()),
    }
}

/// Stable sort of `entries` by `order`
pub fn sort_entries(entries: &mut [Entry], order: SortOrder) {
    match order.direction {
        SortDirection::Ascending => entries.sort_by_cached_key(|e| sort_key(e, order.column)),
        SortDirection::Descending => {
            entries.sort_by_cached_key(|e| Reverse(sort_key(e, order.column)))
        }
    }
}

/// Search predicate; `query` must already be lowercase and non-empty
pub fn matches_filter(entry: &Entry, query: &str) -> bool {
    let name = entry.name().to_lowercase();
    name.contains(query)
        || entry.content_type.to_lowercase().contains(query)
        || (query.starts_with('.') && name.ends_with(query))
}

/// Point-in-time copy of the derived view
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Filtered and sorted entries (arrival order while loading)
    pub entries: Vec<Entry>,
    pub is_loading_complete: bool,
    /// Number of accumulated entries before filtering
    pub total_loaded: usize,
    pub filter: String,
    pub sort: SortOrder,
    pub page: usize,
    pub total_pages: usize,
}

impl Snapshot {
    /// Entries on the snapshot's current page
    pub fn page_entries(&self) -> &[Entry] {
        paginator::page(&self.entries, self.page, PAGE_SIZE).unwrap_or(&[])
    }
}

/// Authoritative entry set for the active prefix
#[derive(Debug, Default)]
pub struct ListingStore {
    entries: Vec<Entry>,
    /// Derived view, `None` while loading (arrival order)
    view: Option<Vec<Entry>>,
    filter: String,
    sort: SortOrder,
    page: usize,
    loading_complete: bool,
}

impl ListingStore {
    pub fn new() -> Self {
        Self {
            page: 1,
            ..Default::default()
        }
    }

    /// Drop all entries and the filter ahead of a new listing; sort order is kept
    pub fn reset(&mut self) {
        self.entries.clear();
        self.view = None;
        self.filter.clear();
        self.page = 1;
        self.loading_complete = false;
    }

    /// Append a batch delivered by the listing engine
    pub fn ingest(&mut self, batch: Batch) {
        self.entries.extend(batch.entries);
        if batch.is_complete {
            self.loading_complete = true;
            self.page = 1;
        }
        if self.loading_complete {
            self.recompute();
        }
    }

    /// Set the search text
    ///
    /// Returns `false` when the listing is still loading: the text is kept and
    /// applied the moment loading completes, but the view is not touched.
    pub fn set_filter(&mut self, text: &str) -> bool {
        self.filter = text.to_lowercase();
        if !self.loading_complete {
            return false;
        }
        self.page = 1;
        self.recompute();
        true
    }

    /// Set an explicit sort; ignored (returns `false`) while loading
    pub fn set_sort(&mut self, column: SortColumn, direction: SortDirection) -> bool {
        if !self.loading_complete {
            return false;
        }
        self.sort = SortOrder::new(column, direction);
        self.recompute();
        true
    }

    /// Header-click sort; ignored (returns `false`) while loading
    pub fn toggle_sort(&mut self, column: SortColumn) -> bool {
        if !self.loading_complete {
            return false;
        }
        self.sort = self.sort.toggled(column);
        self.recompute();
        true
    }

    pub fn is_loading_complete(&self) -> bool {
        self.loading_complete
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Number of entries ingested so far, ignoring the filter
    pub fn total_loaded(&self) -> usize {
        self.entries.len()
    }

    /// Derived view
    pub fn entries(&self) -> &[Entry] {
        self.view.as_deref().unwrap_or(&self.entries)
    }

    /// Look up an accumulated entry by key
    pub fn find(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        paginator::total_pages(self.entries().len(), PAGE_SIZE)
    }

    /// Jump to a page; out-of-range pages are rejected
    pub fn set_page(&mut self, page: usize) -> Result<()> {
        let total = self.total_pages();
        if page == 0 || page > total {
            return Err(Error::PageOutOfRange { page, total });
        }
        self.page = page;
        Ok(())
    }

    /// Advance one page if possible
    pub fn next_page(&mut self) -> bool {
        if self.page < self.total_pages() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page if possible
    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Entries on the current page
    pub fn page_entries(&self) -> &[Entry] {
        paginator::page(self.entries(), self.page, PAGE_SIZE).unwrap_or(&[])
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            entries: self.entries().to_vec(),
            is_loading_complete: self.loading_complete,
            total_loaded: self.entries.len(),
            filter: self.filter.clone(),
            sort: self.sort,
            page: self.page,
            total_pages: self.total_pages(),
        }
    }

    fn recompute(&mut self) {
        let mut view: Vec<Entry> = if self.filter.is_empty() {
            self.entries.clone()
        } else {
            self.entries
                .iter()
                .filter(|e| matches_filter(e, &self.filter))
                .cloned()
                .collect()
        };
        sort_entries(&mut view, self.sort);
        self.view = Some(view);

        if self.page > self.total_pages() {
            self.page = self.total_pages();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ObjectSummary;

    fn object(key: &str, size: u64, secs: Option<i64>, content_type: &str) -> Entry {
        Entry::object(
            ObjectSummary {
                key: key.to_string(),
                size,
                last_modified: secs.map(|s| Timestamp::from_second(s).unwrap()),
            },
            Some(content_type.to_string()),
        )
    }

    fn batch(entries: Vec<Entry>, is_complete: bool) -> Batch {
        Batch {
            entries,
            is_complete,
            is_first_batch: false,
        }
    }

    fn loaded(entries: Vec<Entry>) -> ListingStore {
        let mut store = ListingStore::new();
        store.ingest(batch(entries, true));
        store
    }

    fn sample() -> Vec<Entry> {
        vec![
            object("docs/b.txt", 30, Some(300), "text/plain"),
            Entry::folder("docs/img/"),
            object("docs/A.pdf", 10, Some(100), "application/pdf"),
            object("docs/c.TXT", 20, None, "text/plain"),
            Entry::folder("docs/archive/"),
        ]
    }

    fn keys(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.key.as_str()).collect()
    }

    #[test]
    fn test_loading_view_keeps_arrival_order() {
        let mut store = ListingStore::new();
        store.ingest(batch(sample(), false));
        assert!(!store.is_loading_complete());
        assert_eq!(keys(store.entries())[0], "docs/b.txt");
        assert!(!store.toggle_sort(SortColumn::Size));
        assert!(!store.set_sort(SortColumn::Size, SortDirection::Descending));
        assert_eq!(store.sort_order(), SortOrder::default());
    }

    #[test]
    fn test_completion_applies_default_sort() {
        let store = loaded(sample());
        assert_eq!(
            keys(store.entries()),
            vec![
                "docs/A.pdf",
                "docs/archive/",
                "docs/b.txt",
                "docs/c.TXT",
                "docs/img/"
            ]
        );
    }

    #[test]
    fn test_filter_during_loading_applies_on_completion() {
        let mut store = ListingStore::new();
        store.ingest(batch(sample(), false));
        assert!(!store.set_filter("TXT"));
        assert_eq!(store.entries().len(), 5);

        store.ingest(batch(vec![object("docs/z.txt", 1, None, "text/plain")], true));
        assert_eq!(
            keys(store.entries()),
            vec!["docs/b.txt", "docs/c.TXT", "docs/z.txt"]
        );
    }

    #[test]
    fn test_filter_predicate() {
        let entry = object("docs/Report.CSV", 1, None, "text/csv");
        assert!(matches_filter(&entry, "report"));
        assert!(matches_filter(&entry, "text/"));
        assert!(matches_filter(&entry, ".csv"));
        assert!(!matches_filter(&entry, "docs"));
        assert!(matches_filter(&Entry::folder("a/photos/"), "folder"));
    }

    #[test]
    fn test_clearing_filter_restores_everything() {
        let mut store = loaded(sample());
        store.set_filter("pdf");
        assert_eq!(store.entries().len(), 1);
        store.set_filter("nothing-matches");
        assert!(store.entries().is_empty());
        store.set_filter("");
        assert_eq!(store.entries().len(), 5);
    }

    #[test]
    fn test_filter_resets_page() {
        let entries = (0..250)
            .map(|i| object(&format!("k{i:03}"), 1, None, "text/plain"))
            .collect();
        let mut store = loaded(entries);
        store.set_page(3).unwrap();
        store.set_filter("k");
        assert_eq!(store.page(), 1);
        assert_eq!(store.total_pages(), 3);
    }

    #[test]
    fn test_toggle_sort() {
        let mut store = loaded(sample());
        let ascending = keys(store.entries()).join(",");

        assert!(store.toggle_sort(SortColumn::Name));
        assert_eq!(store.sort_order().direction, SortDirection::Descending);
        assert_eq!(keys(store.entries())[0], "docs/img/");

        store.toggle_sort(SortColumn::Name);
        assert_eq!(keys(store.entries()).join(","), ascending);

        store.toggle_sort(SortColumn::Size);
        assert_eq!(
            store.sort_order(),
            SortOrder::new(SortColumn::Size, SortDirection::Ascending)
        );
    }

    #[test]
    fn test_sort_by_size_is_stable() {
        let mut entries = sample();
        sort_entries(&mut entries, SortOrder::new(SortColumn::Size, SortDirection::Ascending));
        // Both folders have size 0 and keep their arrival order.
        assert_eq!(
            keys(&entries),
            vec![
                "docs/img/",
                "docs/archive/",
                "docs/A.pdf",
                "docs/c.TXT",
                "docs/b.txt"
            ]
        );

        sort_entries(
            &mut entries,
            SortOrder::new(SortColumn::Size, SortDirection::Descending),
        );
        assert_eq!(keys(&entries)[0], "docs/b.txt");
        assert_eq!(keys(&entries)[3..], ["docs/img/", "docs/archive/"]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        for column in [
            SortColumn::Name,
            SortColumn::Size,
            SortColumn::LastModified,
            SortColumn::ContentType,
        ] {
            for direction in [SortDirection::Ascending, SortDirection::Descending] {
                let order = SortOrder::new(column, direction);
                let mut once = sample();
                sort_entries(&mut once, order);
                let mut twice = once.clone();
                sort_entries(&mut twice, order);
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn test_missing_timestamp_sorts_first() {
        let mut entries = vec![
            object("with-time", 1, Some(1_700_000_000), "text/plain"),
            object("without-time", 1, None, "text/plain"),
        ];
        sort_entries(
            &mut entries,
            SortOrder::new(SortColumn::LastModified, SortDirection::Ascending),
        );
        assert_eq!(keys(&entries), vec!["without-time", "with-time"]);
    }

    #[test]
    fn test_sort_by_content_type() {
        let mut entries = sample();
        sort_entries(
            &mut entries,
            SortOrder::new(SortColumn::ContentType, SortDirection::Ascending),
        );
        assert_eq!(
            keys(&entries),
            vec![
                "docs/A.pdf",
                "docs/img/",
                "docs/archive/",
                "docs/b.txt",
                "docs/c.TXT"
            ]
        );
    }

    #[test]
    fn test_reset_keeps_sort() {
        let mut store = loaded(sample());
        store.toggle_sort(SortColumn::Size);
        store.set_filter("txt");
        store.reset();
        assert!(store.entries().is_empty());
        assert_eq!(store.filter(), "");
        assert!(!store.is_loading_complete());
        assert_eq!(store.sort_order().column, SortColumn::Size);
    }

    #[test]
    fn test_page_navigation_bounds() {
        let entries = (0..150)
            .map(|i| object(&format!("k{i:03}"), 1, None, "text/plain"))
            .collect();
        let mut store = loaded(entries);
        assert!(!store.prev_page());
        assert!(store.next_page());
        assert_eq!(store.page_entries().len(), 50);
        assert!(!store.next_page());
        assert!(store.set_page(3).is_err());

        let snapshot = store.snapshot();
        assert_eq!(snapshot.page, 2);
        assert_eq!(snapshot.total_pages, 2);
        assert_eq!(snapshot.page_entries()[0].key, "k100");
    }

    #[test]
    fn test_sort_column_from_str() {
        assert_eq!("Size".parse::<SortColumn>().unwrap(), SortColumn::Size);
        assert_eq!(
            "modified".parse::<SortColumn>().unwrap(),
            SortColumn::LastModified
        );
        assert_eq!(
            "type".parse::<SortColumn>().unwrap(),
            SortColumn::ContentType
        );
        assert!("owner".parse::<SortColumn>().is_err());
    }
}
