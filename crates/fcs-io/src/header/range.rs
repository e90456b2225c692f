//! Byte ranges of FCS segments.

/// Inclusive byte range of a segment, as the header or TEXT describes it.
///
/// Offsets are 0-indexed positions from the start of the file. An all-zero
/// pair in the header means the range is recorded in TEXT instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteRange {
    /// First byte of the segment.
    pub start: u64,
    /// Last byte of the segment.
    pub end: u64,
    /// True only when both offsets were non-zero in the header.
    pub defined_in_header: bool,
}

impl ByteRange {
    /// Build a range read from header fields.
    #[must_use]
    pub fn from_header(start: u64, end: u64) -> Self {
        Self {
            start,
            end,
            defined_in_header: start != 0 && end != 0,
        }
    }

    /// Build a range from TEXT keywords or a computed layout.
    #[must_use]
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            start,
            end,
            defined_in_header: false,
        }
    }

    /// Whether the range covers any bytes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        (self.start == 0 && self.end == 0) || self.end < self.start
    }

    /// Number of bytes covered, 0 for an empty range.
    #[must_use]
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// Slice the segment out of a file buffer, if it lies inside it.
    #[must_use]
    pub fn slice<'a>(&self, data: &'a [u8]) -> Option<&'a [u8]> {
        if self.is_empty() {
            return Some(&[]);
        }
        let start = usize::try_from(self.start).ok()?;
        let end = usize::try_from(self.end).ok()?;
        data.get(start..=end)
    }
}
