//! Greedy visual-width line wrapping.

use std::sync::Arc;

use crate::error::{LayoutError, LayoutPhase};
use crate::measure::TextMeasurer;

/// One wrapped, indented, newline-terminated line.
///
/// The line is atomic once produced: pagination moves whole lines and never
/// cuts inside one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormattedLine {
    text: String,
    lead_len: usize,
}

impl FormattedLine {
    pub(crate) fn new(lead: &str, content: &str) -> Self {
        let mut text = String::with_capacity(lead.len() + content.len() + 1);
        text.push_str(lead);
        text.push_str(content);
        text.push('\n');
        Self {
            text,
            lead_len: lead.len(),
        }
    }

    /// Full line text including lead and trailing `\n`.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Inserted prefix or indent.
    pub fn lead(&self) -> &str {
        &self.text[..self.lead_len]
    }

    /// Source text carried by this line (no lead, no newline).
    pub fn content(&self) -> &str {
        &self.text[self.lead_len..self.text.len() - 1]
    }

    /// Byte length of the full line.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Never true: a line always holds at least its newline.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Cuts text into lines no wider than a visual budget.
#[derive(Clone)]
pub struct LineWrapper {
    measurer: Arc<dyn TextMeasurer>,
}

impl core::fmt::Debug for LineWrapper {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LineWrapper").finish_non_exhaustive()
    }
}

impl LineWrapper {
    /// Create a wrapper over a shared measurer.
    pub fn new(measurer: Arc<dyn TextMeasurer>) -> Self {
        Self { measurer }
    }

    /// Shared measurer.
    pub fn measurer(&self) -> &Arc<dyn TextMeasurer> {
        &self.measurer
    }

    /// Wrap `text` so each line's content fits `max_visual_width`.
    ///
    /// The first line is led by `first_line_prefix` padded to `indent`
    /// spaces; continuation lines are led by `indent` spaces. Breaks happen
    /// only at spaces; the break spaces stay at the end of the line they
    /// follow, so concatenating every [`FormattedLine::content`] yields
    /// `text` unchanged. Those trailing spaces are not measured: the width
    /// bound applies to `content().trim_end()`. A single token wider than
    /// the budget is emitted whole on its own line.
    pub fn wrap(
        &self,
        text: &str,
        max_visual_width: i32,
        first_line_prefix: &str,
        indent: usize,
    ) -> Result<Vec<FormattedLine>, LayoutError> {
        if max_visual_width <= 0 {
            return Err(LayoutError::new(
                LayoutPhase::Wrap,
                "WIDTH_NOT_POSITIVE",
                "wrap width budget must be greater than zero",
            )
            .with_value(i64::from(max_visual_width)));
        }

        let first_lead = first_line_lead(first_line_prefix, indent);
        let continuation_lead = " ".repeat(indent);

        let mut lines = Vec::with_capacity(2);
        let mut rest = text;
        loop {
            let lead = if lines.is_empty() {
                first_lead.as_str()
            } else {
                continuation_lead.as_str()
            };
            let (content_end, consumed) = self.next_break(rest, max_visual_width);
            let width = self.measurer.measure_text(&rest[..content_end]);
            if width > max_visual_width {
                log::warn!(
                    "Token {:?} is wider than the line budget ({} > {}); emitting it on its own line",
                    &rest[..content_end],
                    width,
                    max_visual_width
                );
            }
            lines.push(FormattedLine::new(lead, &rest[..consumed]));
            rest = &rest[consumed..];
            if rest.is_empty() {
                break;
            }
        }
        Ok(lines)
    }

    /// Returns `(content_end, consumed)` for the next line of `rest`.
    ///
    /// `content_end` excludes the break spaces; `consumed` includes them.
    fn next_break(&self, rest: &str, budget: i32) -> (usize, usize) {
        if self.measurer.measure_text(rest) <= budget {
            return (rest.len(), rest.len());
        }

        let fit = self.fit_prefix_len(rest, budget);
        let content_end = if fit > 0 && rest[fit..].starts_with(' ') {
            Some(fit)
        } else {
            rest[..fit].rfind(' ').filter(|&idx| idx > 0)
        };

        let content_end = match content_end {
            Some(end) => end,
            // No space inside the budget: keep the whole token.
            None => rest
                .char_indices()
                .skip(1)
                .find(|(_, ch)| *ch == ' ')
                .map(|(idx, _)| idx)
                .unwrap_or(rest.len()),
        };
        let trailing_spaces = rest[content_end..]
            .bytes()
            .take_while(|b| *b == b' ')
            .count();
        (content_end, content_end + trailing_spaces)
    }

    /// Byte length of the longest char-aligned prefix of `rest` that fits.
    ///
    /// Caller guarantees the whole of `rest` does not fit.
    fn fit_prefix_len(&self, rest: &str, budget: i32) -> usize {
        let bounds: Vec<usize> = rest
            .char_indices()
            .map(|(idx, _)| idx)
            .chain(core::iter::once(rest.len()))
            .collect();
        let mut left = 0usize;
        let mut right = bounds.len() - 1;
        while right - left > 1 {
            let mid = left + (right - left) / 2;
            if self.measurer.measure_text(&rest[..bounds[mid]]) > budget {
                right = mid;
            } else {
                left = mid;
            }
        }
        bounds[left]
    }
}

fn first_line_lead(prefix: &str, indent: usize) -> String {
    if prefix.is_empty() {
        return " ".repeat(indent);
    }
    let pad = indent.saturating_sub(prefix.chars().count()).max(1);
    let mut lead = String::with_capacity(prefix.len() + pad);
    lead.push_str(prefix);
    lead.extend(core::iter::repeat(' ').take(pad));
    lead
}
