//! Human and JSON rendering of messages, folder listings and bucket pages

use serde::Serialize;

use bx_core::{BucketPage, Entry, Snapshot, SortOrder};

use super::OutputConfig;
use super::table::{bucket_table, entry_table};

/// JSON shape of one rendered folder page
#[derive(Debug, Serialize)]
struct ListingOutput<'a> {
    bucket: &'a str,
    prefix: &'a str,
    entries: &'a [Entry],
    page: usize,
    total_pages: usize,
    total_loaded: usize,
    total_matching: usize,
    is_loading_complete: bool,
    sort: SortOrder,
    filter: &'a str,
}

/// Writes command output in the mode selected by [`OutputConfig`]
///
/// In JSON mode stdout carries exactly one JSON document per result and
/// status messages are suppressed.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn is_quiet(&self) -> bool {
        self.config.quiet
    }

    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        println!("{} {message}", self.mark("\x1b[32m", "✓"));
    }

    /// Errors are printed even in quiet mode
    pub fn error(&self, message: &str) {
        if self.config.json {
            let error = serde_json::json!({ "error": message });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&error).unwrap_or_else(|_| message.to_string())
            );
        } else {
            eprintln!("{} {message}", self.mark("\x1b[31m", "✗"));
        }
    }

    pub fn warning(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        eprintln!("{} {message}", self.mark("\x1b[33m", "⚠"));
    }

    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    pub fn println(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        println!("{message}");
    }

    /// Print the current page of a folder view
    pub fn listing(&self, bucket: &str, prefix: &str, snapshot: &Snapshot) {
        if self.is_json() {
            self.json(&ListingOutput {
                bucket,
                prefix,
                entries: snapshot.page_entries(),
                page: snapshot.page,
                total_pages: snapshot.total_pages,
                total_loaded: snapshot.total_loaded,
                total_matching: snapshot.entries.len(),
                is_loading_complete: snapshot.is_loading_complete,
                sort: snapshot.sort,
                filter: &snapshot.filter,
            });
        } else {
            self.println(&self.render_listing(prefix, snapshot));
        }
    }

    /// Print one page of the bucket list
    pub fn buckets(&self, page: &BucketPage) {
        if self.is_json() {
            self.json(page);
        } else {
            self.println(&self.render_buckets(page));
        }
    }

    fn render_listing(&self, prefix: &str, snapshot: &Snapshot) -> String {
        if snapshot.entries.is_empty() {
            let message = match (snapshot.is_loading_complete, snapshot.filter.is_empty()) {
                (false, _) => "Loading...",
                (true, true) => "This folder is empty.",
                (true, false) => "No entries match the filter.",
            };
            return message.to_string();
        }

        // The arrow only appears once the view is actually sorted
        let sort = snapshot.is_loading_complete.then_some(snapshot.sort);
        let table = entry_table(snapshot.page_entries(), prefix, sort, self.colors_enabled());
        let status = if snapshot.is_loading_complete {
            format!("{} of {} entries", snapshot.entries.len(), snapshot.total_loaded)
        } else {
            format!("{} entries so far, still loading", snapshot.total_loaded)
        };
        format!(
            "{table}\nPage {}/{} ({status})",
            snapshot.page, snapshot.total_pages
        )
    }

    fn render_buckets(&self, page: &BucketPage) -> String {
        if page.buckets.is_empty() {
            return "No buckets found.".to_string();
        }
        let table = bucket_table(&page.buckets, self.colors_enabled());
        format!(
            "{table}\nPage {}/{} ({} buckets)",
            page.page, page.total_pages, page.total_matching
        )
    }

    fn mark(&self, color: &str, symbol: &str) -> String {
        if self.colors_enabled() {
            format!("{color}{symbol}\x1b[0m")
        } else {
            symbol.to_string()
        }
    }
}
