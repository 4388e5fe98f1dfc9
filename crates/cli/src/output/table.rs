//! Table rendering for listings and bucket lists

use bx_core::{BucketInfo, Entry, SortColumn, SortDirection, SortOrder};
use comfy_table::presets::{ASCII_BORDERS_ONLY_CONDENSED, UTF8_BORDERS_ONLY};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use jiff::Timestamp;

const COLUMNS: [(SortColumn, &str); 4] = [
    (SortColumn::Name, "Name"),
    (SortColumn::Size, "Size"),
    (SortColumn::LastModified, "Last Modified"),
    (SortColumn::ContentType, "Type"),
];

fn format_timestamp(ts: Option<Timestamp>) -> String {
    ts.map(|t| t.strftime("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn new_table(colors: bool) -> Table {
    let mut table = Table::new();
    table
        .load_preset(if colors {
            UTF8_BORDERS_ONLY
        } else {
            ASCII_BORDERS_ONLY_CONDENSED
        })
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Folder view table; the sorted column header carries an arrow
pub(super) fn entry_table(entries: &[Entry], prefix: &str, sort: Option<SortOrder>, colors: bool) -> Table {
    let mut table = new_table(colors);
    table.set_header(COLUMNS.iter().map(|(column, label)| match sort {
        Some(order) if order.column == *column => {
            let arrow = match order.direction {
                SortDirection::Ascending => "^",
                SortDirection::Descending => "v",
            };
            format!("{label} {arrow}")
        }
        _ => label.to_string(),
    }));

    for entry in entries {
        let name = if entry.is_folder {
            format!("{}/", entry.display_name(prefix))
        } else {
            entry.display_name(prefix).to_string()
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(entry.size_human()).set_alignment(CellAlignment::Right),
            Cell::new(format_timestamp(entry.last_modified)),
            Cell::new(&entry.content_type),
        ]);
    }
    table
}

pub(super) fn bucket_table(buckets: &[BucketInfo], colors: bool) -> Table {
    let mut table = new_table(colors);
    table.set_header(vec!["Bucket", "Created"]);
    for bucket in buckets {
        table.add_row(vec![
            bucket.name.clone(),
            format_timestamp(bucket.creation_date),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use bx_core::ObjectSummary;

    #[test]
    fn test_entry_table_names_are_relative() {
        let entries = vec![
            Entry::folder("photos/2024/"),
            Entry::object(
                ObjectSummary {
                    key: "photos/cat.jpg".into(),
                    size: 2048,
                    last_modified: Timestamp::from_second(0).ok(),
                },
                Some("image/jpeg".into()),
            ),
        ];
        let rendered = entry_table(&entries, "photos/", None, false).to_string();
        assert!(rendered.contains("2024/"));
        assert!(rendered.contains("cat.jpg"));
        assert!(rendered.contains("2 KiB"));
        assert!(rendered.contains("1970-01-01 00:00:00"));
        assert!(!rendered.contains("photos/cat.jpg"));
    }

    #[test]
    fn test_sorted_header_has_arrow() {
        let order = SortOrder::new(SortColumn::Size, SortDirection::Descending);
        let rendered = entry_table(&[], "", Some(order), false).to_string();
        assert!(rendered.contains("Size v"));
        assert!(!rendered.contains("Name ^"));
    }

    #[test]
    fn test_bucket_table() {
        let rendered = bucket_table(&[BucketInfo::new("logs")], false).to_string();
        assert!(rendered.contains("logs"));
        assert!(rendered.contains("Created"));
    }
}
