/// One contiguous byte span `[start, end)` of a split download, owned by its
/// job until merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    /// Range index (0-based), also the merge position.
    pub index: u32,
    pub start: u64,
    /// Exclusive.
    pub end: u64,
}

impl RangeSpec {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Decision for one remote file: fetch it whole or as parallel ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangePlan {
    Whole,
    Split(Vec<RangeSpec>),
}

/// Decide whether a download of `size` bytes is split, and into what.
///
/// A file is split only when splitting is enabled (`split_count > 1`,
/// `min_split_bytes >= 0`) and the file is at least `min_split_bytes` long.
/// A split produces exactly `split_count` contiguous ranges of
/// `size / split_count` bytes each, with the final range extended to `size`
/// to absorb the remainder. The union of the ranges is exactly `[0, size)`.
///
/// Deterministic for identical inputs, which keeps replanning stable across
/// retries.
pub fn plan_ranges(size: u64, min_split_bytes: i64, split_count: i32) -> RangePlan {
    if split_count <= 1 || min_split_bytes < 0 || size == 0 {
        return RangePlan::Whole;
    }
    if size < min_split_bytes as u64 {
        return RangePlan::Whole;
    }

    let count = split_count as u64;
    let chunk = size / count;
    let mut ranges = Vec::with_capacity(split_count as usize);
    for i in 0..count {
        let start = i * chunk;
        let end = if i == count - 1 { size } else { start + chunk };
        ranges.push(RangeSpec {
            index: i as u32,
            start,
            end,
        });
    }
    RangePlan::Split(ranges)
}
