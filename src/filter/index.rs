//! Ordered set of 1-based packet ordinals and ranges. Backed by sorted,
//! non-overlapping ranges so membership is a binary search rather than a
//! per-ordinal hash/tree entry.

use super::FilterMode;

/// An ordered set of 1-based packet ordinals and ranges, with an
/// include/exclude mode.
#[derive(Debug, Clone)]
pub struct IndexFilter {
    mode: FilterMode,
    // Sorted, non-overlapping, inclusive ranges.
    ranges: Vec<(u64, u64)>,
}

impl IndexFilter {
    /// Builds a filter from a list of inclusive `(start, end)` 1-based
    /// ranges (a single ordinal is `(n, n)`). Ranges are sorted and
    /// adjacent/overlapping ranges are merged.
    pub fn new(mode: FilterMode, mut ranges: Vec<(u64, u64)>) -> Self {
        ranges.sort_unstable();
        let mut merged: Vec<(u64, u64)> = Vec::with_capacity(ranges.len());
        for (start, end) in ranges {
            if let Some(last) = merged.last_mut() {
                if start <= last.1.saturating_add(1) {
                    last.1 = last.1.max(end);
                    continue;
                }
            }
            merged.push((start, end));
        }
        Self { mode, ranges: merged }
    }

    /// O(log n) membership test via binary search over the merged ranges.
    fn contains(&self, ordinal: u64) -> bool {
        match self.ranges.binary_search_by(|&(start, end)| {
            if ordinal < start {
                std::cmp::Ordering::Greater
            } else if ordinal > end {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Equal
            }
        }) {
            Ok(_) => true,
            Err(_) => false,
        }
    }

    /// Whether the packet at this ordinal passes the filter: include mode
    /// passes only listed ordinals, exclude mode passes everything *except*
    /// listed ordinals.
    pub fn passes(&self, ordinal: u64) -> bool {
        match self.mode {
            FilterMode::Include => self.contains(ordinal),
            FilterMode::Exclude => !self.contains(ordinal),
        }
    }
}
