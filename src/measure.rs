/// Visual width hook used for every line-fitting decision.
///
/// Implementations must be pure: the same string always measures the same,
/// and for ASCII text a longer prefix never measures narrower than a shorter
/// one. The wrapper's binary search relies on that monotonicity.
pub trait TextMeasurer: Send + Sync {
    /// Rendered width of `text` in layout units.
    fn measure_text(&self, text: &str) -> i32;

    /// Width of a single space, used to convert widths into space counts.
    ///
    /// Default measures `" "`.
    fn space_width(&self) -> i32 {
        self.measure_text(" ")
    }
}

/// Monospace measurer: every char advances by the same amount.
///
/// Useful as a stand-in when no font metrics are available, and in tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedAdvanceMeasurer {
    advance: i32,
}

impl FixedAdvanceMeasurer {
    /// Create a measurer with the given per-char advance (clamped to >= 1).
    pub fn new(advance: i32) -> Self {
        Self {
            advance: advance.max(1),
        }
    }
}

impl Default for FixedAdvanceMeasurer {
    fn default() -> Self {
        Self::new(1)
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn measure_text(&self, text: &str) -> i32 {
        let chars = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
        chars.saturating_mul(self.advance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_advance_counts_chars_not_bytes() {
        let measurer = FixedAdvanceMeasurer::new(10);
        assert_eq!(measurer.measure_text("abc"), 30);
        assert_eq!(measurer.measure_text("é—"), 20);
        assert_eq!(measurer.space_width(), 10);
    }

    #[test]
    fn advance_is_clamped_to_one() {
        assert_eq!(FixedAdvanceMeasurer::new(0).measure_text("ab"), 2);
    }
}
