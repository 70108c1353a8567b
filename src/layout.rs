use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutPhase};

/// Numeric budgets supplied per formatting call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConstraints {
    /// Maximum rendered width of one line's content, in measurer units.
    pub max_visual_width: i32,
    /// Nominal number of lines that fit on one slide.
    pub max_lines_per_slide: usize,
    /// Width, in spaces, of the hanging indent used for numbered units.
    pub indent_width: usize,
    /// Lyric blocks shorter than this try to merge with their successor.
    pub min_block_lines: usize,
    /// Lyric blocks longer than this are split.
    pub max_block_lines: usize,
}

impl Default for LayoutConstraints {
    fn default() -> Self {
        Self {
            max_visual_width: 16_000,
            max_lines_per_slide: 12,
            indent_width: 4,
            min_block_lines: 3,
            max_block_lines: 8,
        }
    }
}

impl LayoutConstraints {
    /// Reject budgets no layout can satisfy.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.max_visual_width <= 0 {
            return Err(LayoutError::new(
                LayoutPhase::Config,
                "WIDTH_NOT_POSITIVE",
                "max_visual_width must be greater than zero",
            )
            .with_value(i64::from(self.max_visual_width)));
        }
        if self.max_lines_per_slide == 0 {
            return Err(LayoutError::new(
                LayoutPhase::Config,
                "LINES_PER_SLIDE_ZERO",
                "max_lines_per_slide must be greater than zero",
            ));
        }
        if self.max_block_lines == 0 {
            return Err(LayoutError::new(
                LayoutPhase::Config,
                "BLOCK_LINES_ZERO",
                "max_block_lines must be greater than zero",
            ));
        }
        if self.min_block_lines > self.max_block_lines {
            return Err(LayoutError::new(
                LayoutPhase::Config,
                "BLOCK_LINES_INVERTED",
                "min_block_lines must not exceed max_block_lines",
            )
            .with_value(i64::try_from(self.min_block_lines).unwrap_or(i64::MAX)));
        }
        Ok(())
    }
}

/// Fractional window `[start, end]` of a line, by char position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitWindow {
    /// Window start as a fraction of the line length.
    pub start: f32,
    /// Window end as a fraction of the line length.
    pub end: f32,
}

impl SplitWindow {
    /// Char-index bounds of the window for a line of `len` chars.
    pub(crate) fn bounds(self, len: usize) -> (usize, usize) {
        let lo = (len as f32 * self.start).ceil() as usize;
        let hi = (len as f32 * self.end).floor() as usize;
        (lo.min(len), hi.min(len))
    }
}

/// Empirically tuned thresholds.
///
/// The defaults were picked by eye on real service slides. They are exposed
/// so deployments can tune them; changing them changes output.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutHeuristics {
    /// Added to `lines / max_lines` before rounding up the slide count.
    pub slide_count_fudge: f32,
    /// Extra lines kept free when merging two short lyric blocks.
    pub merge_margin_lines: usize,
    /// Run length at which identical adjacent lyric lines collapse.
    pub line_repeat_threshold: usize,
    /// Where an over-wide lyric line may break at punctuation.
    pub punctuation_window: SplitWindow,
    /// Where an over-wide lyric line may break at a space.
    pub space_window: SplitWindow,
    /// Fraction of the line width the source attribution is pushed towards.
    pub source_inset: f32,
}

impl Default for LayoutHeuristics {
    fn default() -> Self {
        Self {
            slide_count_fudge: 0.1,
            merge_margin_lines: 3,
            line_repeat_threshold: 3,
            punctuation_window: SplitWindow {
                start: 0.4,
                end: 0.8,
            },
            space_window: SplitWindow {
                start: 1.0 / 3.0,
                end: 2.0 / 3.0,
            },
            source_inset: 0.93,
        }
    }
}

/// Layout configuration for slide text construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Per-call budgets.
    pub constraints: LayoutConstraints,
    /// Tuned thresholds.
    pub heuristics: LayoutHeuristics,
}

impl LayoutConfig {
    /// Convenience for a width/lines pair with default everything else.
    pub fn for_slide(max_visual_width: i32, max_lines_per_slide: usize) -> Self {
        Self {
            constraints: LayoutConstraints {
                max_visual_width,
                max_lines_per_slide,
                ..LayoutConstraints::default()
            },
            heuristics: LayoutHeuristics::default(),
        }
    }

    /// Validate the constraint block.
    pub fn validate(&self) -> Result<(), LayoutError> {
        self.constraints.validate()
    }
}
