//! Balanced, unit-atomic distribution of wrapped lines across slides.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutPhase};
use crate::layout::LayoutHeuristics;
use crate::ranges::{rebase_ranges, AnnotatedRange, RangeKind};
use crate::wrap::FormattedLine;

/// A logical unit (verse, list item) that must stay on one slide.
///
/// `ranges` are expressed in the coordinate space of the whole formatted
/// sequence the unit belongs to, not relative to the unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WrappedUnit {
    /// Wrapped lines, in order.
    pub lines: Vec<FormattedLine>,
    /// Annotations falling inside this unit.
    pub ranges: Vec<AnnotatedRange>,
}

impl WrappedUnit {
    /// Bundle lines with their ranges.
    pub fn new(lines: Vec<FormattedLine>, ranges: Vec<AnnotatedRange>) -> Self {
        Self { lines, ranges }
    }

    /// Number of wrapped lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Byte length of the concatenated lines.
    pub fn byte_len(&self) -> usize {
        self.lines.iter().map(FormattedLine::len).sum()
    }

    /// Concatenated lines.
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.byte_len());
        for line in &self.lines {
            out.push_str(line.as_str());
        }
        out
    }
}

/// Finished text for exactly one slide.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideGroup {
    /// Text to write verbatim into the slide's text box.
    pub text: String,
    /// Styling spans, as byte offsets into `text`.
    pub ranges: Vec<AnnotatedRange>,
    /// Byte offset in `text` where each unit starts.
    pub unit_starts: Vec<usize>,
}

impl SlideGroup {
    /// Concatenate `units` into one slide.
    ///
    /// `global_start` is the offset of the first unit in the coordinate space
    /// the units' ranges use.
    pub(crate) fn from_units(units: &[WrappedUnit], global_start: usize) -> Self {
        let mut text = String::with_capacity(units.iter().map(WrappedUnit::byte_len).sum());
        let mut ranges = Vec::new();
        let mut unit_starts = Vec::with_capacity(units.len());
        for unit in units {
            let local = text.len();
            let unit_global = global_start + local;
            unit_starts.push(local);
            ranges.extend(rebase_ranges(
                &unit.ranges,
                unit_global..unit_global + unit.byte_len(),
                local,
            ));
            for line in &unit.lines {
                text.push_str(line.as_str());
            }
        }
        Self {
            text,
            ranges,
            unit_starts,
        }
    }

    /// True when the slide holds no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of newline-terminated lines.
    pub fn line_count(&self) -> usize {
        self.text.matches('\n').count()
    }

    /// Substrings covered by ranges of `kind`.
    pub fn styled_text(&self, kind: RangeKind) -> impl Iterator<Item = &str> + '_ {
        self.ranges
            .iter()
            .filter(move |range| range.kind == kind)
            .filter_map(|range| self.text.get(range.span()))
    }
}

/// Greedy bin-packer shared by scripture and list content.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SlidePaginator {
    heuristics: LayoutHeuristics,
}

impl SlidePaginator {
    /// Create a paginator with the given tuning.
    pub fn new(heuristics: LayoutHeuristics) -> Self {
        Self { heuristics }
    }

    /// Effective per-slide line budget for `total_lines` of content.
    ///
    /// The slide count is `total / max` when it divides evenly, otherwise
    /// `ceil(total / max + fudge)`; the budget is then the mean of the even
    /// share and `max`, which biases towards fuller slides.
    pub fn lines_per_slide(&self, total_lines: usize, max_lines_per_slide: usize) -> usize {
        let max = max_lines_per_slide.max(1);
        if total_lines == 0 {
            return max;
        }
        let slides = if total_lines % max == 0 {
            total_lines / max
        } else {
            let ratio = total_lines as f64 / max as f64;
            (ratio + f64::from(self.heuristics.slide_count_fudge)).ceil() as usize
        }
        .max(1);
        let even_share = total_lines as f64 / slides as f64;
        (((even_share + max as f64) / 2.0).round() as usize).max(1)
    }

    /// Distribute `units` across slides without ever splitting one.
    ///
    /// A unit joins the current slide when it is the slide's first unit or
    /// still fits the budget, so every slide holds at least one whole unit.
    /// Zero units yield a single empty slide.
    pub fn paginate(
        &self,
        units: &[WrappedUnit],
        max_lines_per_slide: usize,
    ) -> Result<Vec<SlideGroup>, LayoutError> {
        if max_lines_per_slide == 0 {
            return Err(LayoutError::new(
                LayoutPhase::Paginate,
                "LINES_PER_SLIDE_ZERO",
                "max_lines_per_slide must be greater than zero",
            ));
        }
        if units.is_empty() {
            return Ok(vec![SlideGroup::default()]);
        }

        let total_lines: usize = units.iter().map(WrappedUnit::line_count).sum();
        let budget = self.lines_per_slide(total_lines, max_lines_per_slide);
        log::debug!(
            "Paginating {} units / {} lines with budget {} (max {})",
            units.len(),
            total_lines,
            budget,
            max_lines_per_slide
        );

        let mut slides = Vec::new();
        let mut slide_first = 0usize;
        let mut slide_lines = 0usize;
        let mut slide_global_start = 0usize;
        let mut global = 0usize;
        for (idx, unit) in units.iter().enumerate() {
            let need = unit.line_count();
            if idx > slide_first && slide_lines + need > budget {
                slides.push(SlideGroup::from_units(
                    &units[slide_first..idx],
                    slide_global_start,
                ));
                slide_first = idx;
                slide_lines = 0;
                slide_global_start = global;
            }
            slide_lines += need;
            global += unit.byte_len();
        }
        slides.push(SlideGroup::from_units(
            &units[slide_first..],
            slide_global_start,
        ));
        Ok(slides)
    }
}
