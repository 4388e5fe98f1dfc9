//! Bucket list search and paging

use serde::Serialize;

use crate::error::Result;
use crate::paginator;
use crate::traits::BucketInfo;

/// Buckets whose name contains `query`, ignoring case
///
/// An empty or whitespace-only query keeps every bucket. Order is preserved.
pub fn filter_buckets<'a>(buckets: &'a [BucketInfo], query: &str) -> Vec<&'a BucketInfo> {
    let query = query.trim().to_lowercase();
    buckets
        .iter()
        .filter(|b| query.is_empty() || b.name.to_lowercase().contains(&query))
        .collect()
}

/// One page of a (possibly filtered) bucket list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketPage {
    pub buckets: Vec<BucketInfo>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matching: usize,
}

/// Filter then slice a bucket list
pub fn bucket_page(
    buckets: &[BucketInfo],
    query: &str,
    page: usize,
    page_size: usize,
) -> Result<BucketPage> {
    let matching = filter_buckets(buckets, query);
    let slice = paginator::page(&matching, page, page_size)?;
    Ok(BucketPage {
        buckets: slice.iter().map(|b| (*b).clone()).collect(),
        page,
        total_pages: paginator::total_pages(matching.len(), page_size),
        total_matching: matching.len(),
    })
}
