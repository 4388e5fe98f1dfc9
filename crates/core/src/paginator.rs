//! Fixed-size page windows over a sequence
//!
//! Pages are 1-based. Asking for a page past the end is a caller error; the
//! presentation layer is expected to disable navigation at the bounds.

use crate::error::{Error, Result};

/// Number of entries shown per page
pub const PAGE_SIZE: usize = 100;

/// Number of pages needed for `count` items, never less than one
pub fn total_pages(count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    count.div_ceil(page_size).max(1)
}

/// Slice of `items` shown on `page_number`
pub fn page<T>(items: &[T], page_number: usize, page_size: usize) -> Result<&[T]> {
    let total = total_pages(items.len(), page_size);
    if page_number == 0 || page_number > total {
        return Err(Error::PageOutOfRange {
            page: page_number,
            total,
        });
    }

    let page_size = page_size.max(1);
    let start = (page_number - 1) * page_size;
    let end = (start + page_size).min(items.len());
    Ok(&items[start.min(end)..end])
}
