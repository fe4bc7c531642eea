//! Splitting a document's pages into contiguous ranges for parallel rasterization.

use crate::error::{ConversionError, Result};
use std::fmt;

/// A contiguous, inclusive, 1-indexed span of pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageRange {
    /// First page (1-indexed).
    pub start: usize,
    /// Last page, inclusive.
    pub end: usize,
}

impl PageRange {
    /// Create a range. Panics in debug builds if `start > end` or `start == 0`.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start >= 1 && start <= end, "invalid page range {}-{}", start, end);
        Self { start, end }
    }

    /// Number of pages in the range. Zero if `end` is before `start`.
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    /// Whether the range holds no pages.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Output file prefix for this range. Unique per range within one plan.
    pub fn prefix(&self) -> String {
        format!("range_{}_{}", self.start, self.end)
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Plan the page ranges for `total_pages` split across `num_threads` workers.
///
/// The step size is `max(1, total_pages / num_threads)` with floor division,
/// and the last range is clamped to `total_pages`. When the division is not
/// exact this yields more ranges than threads (10 pages over 4 threads gives
/// five ranges of two pages); the worker pool still caps concurrency at
/// `num_threads`.
pub fn plan_ranges(total_pages: usize, num_threads: usize) -> Result<Vec<PageRange>> {
    if total_pages == 0 {
        return Err(ConversionError::InvalidConfig(
            "cannot plan ranges for a document with no pages".to_string(),
        ));
    }
    if num_threads == 0 {
        return Err(ConversionError::InvalidConfig(
            "num_threads must be at least 1".to_string(),
        ));
    }

    let pages_per_thread = (total_pages / num_threads).max(1);

    Ok((1..=total_pages)
        .step_by(pages_per_thread)
        .map(|start| PageRange::new(start, (start + pages_per_thread - 1).min(total_pages)))
        .collect())
}
