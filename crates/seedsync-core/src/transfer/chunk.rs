//! Byte ranges and chunk planning.

/// A byte range [start, end) (half-open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// Start offset (inclusive).
    pub start: u64,
    /// End offset (exclusive).
    pub end: u64,
}

impl ByteRange {
    /// Length of this range in bytes.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Range spec as curl expects it (inclusive end): `start-(end-1)`.
    pub fn curl_range(&self) -> String {
        format!("{}-{}", self.start, self.end.saturating_sub(1))
    }

    /// HTTP Range header value (inclusive end): `bytes=start-(end-1)`.
    pub fn range_header_value(&self) -> String {
        format!("bytes={}", self.curl_range())
    }
}

/// How one file is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferPlan {
    /// One plain GET for the whole body.
    Whole,
    /// Sequential ranged GETs covering [0, size) exactly once.
    Ranged(Vec<ByteRange>),
}

/// Files up to `threshold` bytes are fetched whole; larger ones in
/// `ceil(size / threshold)` ranges of `threshold` bytes, the last one holding
/// the remainder.
pub fn plan_transfer(total_size: u64, threshold: u64) -> TransferPlan {
    if threshold == 0 || total_size <= threshold {
        return TransferPlan::Whole;
    }
    let count = total_size.div_ceil(threshold);
    let ranges = (0..count)
        .map(|i| {
            let start = i * threshold;
            ByteRange {
                start,
                end: (start + threshold).min(total_size),
            }
        })
        .collect();
    TransferPlan::Ranged(ranges)
}
