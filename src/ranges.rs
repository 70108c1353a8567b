//! Offset annotations that survive wrapping and slide splits.

use core::ops::Range;
use serde::{Deserialize, Serialize};

/// What a styled span means to the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeKind {
    /// Ordinary spaces superscripted only to keep the left margin aligned
    /// with numbered lines.
    Space,
    /// The literal verse-number token.
    VerseNumber,
    /// Ordinal prefix of a list item; marks where paragraph spacing applies.
    ItemStart,
}

/// Byte span `[start, end)` into whatever text the range currently describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotatedRange {
    /// Meaning of the span.
    pub kind: RangeKind,
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl AnnotatedRange {
    /// Create a range. Callers guarantee `start < end`.
    pub fn new(kind: RangeKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    /// Span length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false for well-formed ranges.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Byte span as a `Range`.
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Convert the byte span to char indices within `text`.
    ///
    /// Presentation APIs that index by character need this; returns `None`
    /// when the span does not land on char boundaries of `text`.
    pub fn char_span(&self, text: &str) -> Option<Range<usize>> {
        if !text.is_char_boundary(self.start) || !text.is_char_boundary(self.end) {
            return None;
        }
        let start = text.get(..self.start)?.chars().count();
        let len = text.get(self.start..self.end)?.chars().count();
        Some(start..start + len)
    }
}

/// Accumulates ranges while text is emitted left to right.
///
/// The tracker owns a cursor: the byte length of everything produced so far.
/// Marks are given relative to the cursor, so producers never compute
/// absolute offsets themselves.
#[derive(Clone, Debug, Default)]
pub struct RangeTracker {
    cursor: usize,
    ranges: Vec<AnnotatedRange>,
}

impl RangeTracker {
    /// Empty tracker at offset zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current absolute offset.
    pub fn offset(&self) -> usize {
        self.cursor
    }

    /// Record `[cursor + rel_start, cursor + rel_end)`; empty spans are ignored.
    pub fn mark(&mut self, kind: RangeKind, rel_start: usize, rel_end: usize) {
        if rel_start >= rel_end {
            return;
        }
        self.ranges.push(AnnotatedRange::new(
            kind,
            self.cursor + rel_start,
            self.cursor + rel_end,
        ));
    }

    /// Move the cursor past `len` bytes of emitted text.
    pub fn advance(&mut self, len: usize) {
        self.cursor += len;
    }

    /// Ranges recorded so far.
    pub fn ranges(&self) -> &[AnnotatedRange] {
        &self.ranges
    }

    /// Ranges recorded since `from` (an index into [`ranges`](Self::ranges)).
    pub fn ranges_since(&self, from: usize) -> &[AnnotatedRange] {
        self.ranges.get(from..).unwrap_or(&[])
    }

    /// Consume the tracker.
    pub fn into_ranges(self) -> Vec<AnnotatedRange> {
        self.ranges
    }
}

/// Move ranges from the `slice` coordinate window to one starting at `new_base`.
///
/// Ranges not fully inside `slice` are dropped. For every retained range
/// `range.start - slice.start == rebased.start - new_base`.
pub fn rebase_ranges(
    ranges: &[AnnotatedRange],
    slice: Range<usize>,
    new_base: usize,
) -> Vec<AnnotatedRange> {
    ranges
        .iter()
        .filter(|r| r.start >= slice.start && r.end <= slice.end && r.start < r.end)
        .map(|r| AnnotatedRange {
            kind: r.kind,
            start: r.start - slice.start + new_base,
            end: r.end - slice.start + new_base,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<AnnotatedRange> {
        vec![
            AnnotatedRange::new(RangeKind::VerseNumber, 0, 1),
            AnnotatedRange::new(RangeKind::Space, 12, 14),
            AnnotatedRange::new(RangeKind::VerseNumber, 30, 32),
        ]
    }

    #[test]
    fn tracker_marks_relative_to_cursor() {
        let mut tracker = RangeTracker::new();
        tracker.mark(RangeKind::VerseNumber, 0, 1);
        tracker.advance(10);
        tracker.mark(RangeKind::Space, 0, 2);
        tracker.mark(RangeKind::Space, 3, 3);
        assert_eq!(tracker.offset(), 10);
        assert_eq!(
            tracker.into_ranges(),
            vec![
                AnnotatedRange::new(RangeKind::VerseNumber, 0, 1),
                AnnotatedRange::new(RangeKind::Space, 10, 12),
            ]
        );
    }

    #[test]
    fn rebase_to_own_base_is_noop() {
        let ranges = sample();
        assert_eq!(rebase_ranges(&ranges, 0..40, 0), ranges);
    }

    #[test]
    fn rebase_drops_ranges_outside_slice() {
        let ranges = sample();
        let rebased = rebase_ranges(&ranges, 10..30, 0);
        assert_eq!(rebased, vec![AnnotatedRange::new(RangeKind::Space, 2, 4)]);
    }

    #[test]
    fn rebase_straddling_range_is_dropped_not_clipped() {
        let ranges = vec![AnnotatedRange::new(RangeKind::Space, 8, 12)];
        assert!(rebase_ranges(&ranges, 10..20, 0).is_empty());
    }

    #[test]
    fn rebase_then_restore_recovers_original() {
        let ranges = sample();
        let rebased = rebase_ranges(&ranges, 25..40, 0);
        let restored = rebase_ranges(&rebased, 0..15, 25);
        assert_eq!(restored, vec![ranges[2]]);
    }

    #[test]
    fn char_span_counts_multibyte_chars() {
        let text = "é 12 x";
        let range = AnnotatedRange::new(RangeKind::VerseNumber, 3, 5);
        assert_eq!(&text[range.span()], "12");
        assert_eq!(range.char_span(text), Some(2..4));
        let bad = AnnotatedRange::new(RangeKind::Space, 1, 3);
        assert_eq!(bad.char_span(text), None);
    }
}
