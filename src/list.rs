use std::sync::Arc;

use crate::error::LayoutError;
use crate::layout::LayoutConfig;
use crate::measure::TextMeasurer;
use crate::paginate::{SlideGroup, SlidePaginator, WrappedUnit};
use crate::ranges::{RangeKind, RangeTracker};
use crate::wrap::{FormattedLine, LineWrapper};

/// Numbered lists (announcements, prayer items) cut into slides.
#[derive(Clone, Debug)]
pub struct NumberedListFormatter {
    cfg: LayoutConfig,
    wrapper: LineWrapper,
}

impl NumberedListFormatter {
    /// Create a formatter over a shared measurer.
    pub fn new(cfg: LayoutConfig, measurer: Arc<dyn TextMeasurer>) -> Self {
        Self {
            cfg,
            wrapper: LineWrapper::new(measurer),
        }
    }

    /// Prefix each item with `"{i}."`, wrap it, and paginate.
    ///
    /// Every item start is recorded both in [`SlideGroup::unit_starts`] and
    /// as an [`RangeKind::ItemStart`] range over its ordinal.
    pub fn format_list<S>(&self, items: &[S]) -> Result<Vec<SlideGroup>, LayoutError>
    where
        S: AsRef<str>,
    {
        self.cfg.validate()?;
        let constraints = self.cfg.constraints;

        let mut tracker = RangeTracker::new();
        let mut units = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            let ordinal = format!("{}.", idx + 1);
            let lines = self.wrapper.wrap(
                item.as_ref().trim(),
                constraints.max_visual_width,
                &ordinal,
                constraints.indent_width,
            )?;
            let first_range = tracker.ranges().len();
            tracker.mark(RangeKind::ItemStart, 0, ordinal.len());
            tracker.advance(lines.iter().map(FormattedLine::len).sum());
            let ranges = tracker.ranges_since(first_range).to_vec();
            units.push(WrappedUnit::new(lines, ranges));
        }

        SlidePaginator::new(self.cfg.heuristics).paginate(&units, constraints.max_lines_per_slide)
    }
}
