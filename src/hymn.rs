//! Lyric preprocessing: one processed block becomes one slide.
//!
//! Unlike scripture, lyrics are not paginated by line budget. Raw stanzas go
//! through a fixed sequence of passes (annotation stripping, repeat
//! collapsing, long-line splitting, short-block merging, long-block
//! splitting, periodicity collapsing) and each surviving block is a slide.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::LayoutError;
use crate::layout::{LayoutConfig, LayoutHeuristics, SplitWindow};
use crate::lookup::Lookup;
use crate::measure::TextMeasurer;
use crate::paginate::SlideGroup;

/// Break marks tried for over-wide lines, in preference order.
const BREAK_PUNCTUATION: [char; 4] = [',', ';', '!', '.'];

/// A processed stanza.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricBlock {
    lines: Vec<String>,
}

impl LyricBlock {
    /// Block from already-processed lines.
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Lines in order. Blank entries separate merged stanzas.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines, separators included.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Lines joined with `\n`, no trailing newline.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Slide text for this block.
    pub fn to_slide_group(&self) -> SlideGroup {
        SlideGroup {
            text: self.text(),
            ranges: Vec::new(),
            unit_starts: vec![0],
        }
    }

    fn append_repeat_suffix(&mut self, count: usize) {
        if let Some(last) = self.lines.last_mut() {
            last.push_str(&format!(" (x{})", count));
        }
    }
}

/// Slide header titles: `"TITLE (i/n)"` for each of `count` lyric slides.
pub fn hymn_slide_titles(title: &str, count: usize) -> Vec<String> {
    let upper = title.trim().to_uppercase();
    (1..=count)
        .map(|idx| format!("{} ({}/{})", upper, idx, count))
        .collect()
}

/// Turns raw lyrics into slide-sized blocks.
#[derive(Clone)]
pub struct HymnFormatter {
    cfg: LayoutConfig,
    measurer: Arc<dyn TextMeasurer>,
}

impl core::fmt::Debug for HymnFormatter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HymnFormatter")
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

impl HymnFormatter {
    /// Create a formatter over a shared measurer.
    pub fn new(cfg: LayoutConfig, measurer: Arc<dyn TextMeasurer>) -> Self {
        Self { cfg, measurer }
    }

    /// Run every lyric pass over `raw` and return one block per slide.
    pub fn format_lyrics(&self, raw: &str) -> Result<Vec<LyricBlock>, LayoutError> {
        self.cfg.validate()?;
        let constraints = self.cfg.constraints;
        let heuristics = &self.cfg.heuristics;

        let blocks = strip_annotations(raw);
        let blocks = collapse_repeated_blocks(blocks, constraints.max_block_lines);
        let blocks: Vec<LyricBlock> = blocks
            .into_iter()
            .map(|block| collapse_repeated_lines(block, heuristics.line_repeat_threshold))
            .map(|block| self.split_long_lines(block))
            .collect();
        let blocks = merge_short_blocks(
            blocks,
            constraints.min_block_lines,
            constraints.max_block_lines,
            heuristics.merge_margin_lines,
        );
        let blocks: Vec<LyricBlock> = split_long_blocks(blocks, constraints.max_block_lines)
            .into_iter()
            .map(collapse_periodic)
            .collect();

        log::debug!("Formatted lyrics into {} blocks", blocks.len());
        Ok(blocks)
    }

    /// [`format_lyrics`](Self::format_lyrics) as slide groups.
    pub fn slide_groups(&self, raw: &str) -> Result<Vec<SlideGroup>, LayoutError> {
        Ok(self
            .format_lyrics(raw)?
            .iter()
            .map(LyricBlock::to_slide_group)
            .collect())
    }

    /// Format a lookup result; a miss passes straight through.
    pub fn format_lookup(&self, raw: Lookup<&str>) -> Result<Lookup<Vec<LyricBlock>>, LayoutError> {
        match raw {
            Lookup::Found(text) => Ok(Lookup::Found(self.format_lyrics(text)?)),
            Lookup::NotFound => {
                log::debug!("Lyrics not found; skipping layout");
                Ok(Lookup::NotFound)
            }
        }
    }

    fn split_long_lines(&self, block: LyricBlock) -> LyricBlock {
        let mut lines = Vec::with_capacity(block.lines.len());
        for line in block.lines {
            self.push_split_line(line, &mut lines);
        }
        LyricBlock::new(lines)
    }

    fn push_split_line(&self, line: String, out: &mut Vec<String>) {
        let max = self.cfg.constraints.max_visual_width;
        if self.measurer.measure_text(&line) > max {
            if let Some((head, tail)) = split_point(&line, &self.cfg.heuristics) {
                self.push_split_line(head, out);
                self.push_split_line(tail, out);
                return;
            }
            log::warn!("Lyric line {:?} is too wide and has no break point", line);
        }
        out.push(line);
    }
}

/// Remove `[...]` and `(...)` spans and split into blocks on blank lines.
///
/// A line left empty by stripping (a `[Chorus]` header, say) separates blocks
/// just like a blank line.
fn strip_annotations(raw: &str) -> Vec<LyricBlock> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in raw.lines() {
        let stripped = strip_bracketed(line);
        let cleaned = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        if cleaned.is_empty() {
            if !current.is_empty() {
                blocks.push(LyricBlock::new(core::mem::take(&mut current)));
            }
            continue;
        }
        current.push(cleaned);
    }
    if !current.is_empty() {
        blocks.push(LyricBlock::new(current));
    }
    blocks
}

fn strip_bracketed(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(open) = rest.find(|ch: char| ch == '[' || ch == '(') {
        let close_ch = if rest[open..].starts_with('[') { ']' } else { ')' };
        match rest[open + 1..].find(close_ch) {
            Some(rel) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + 1 + rel + 1..];
            }
            None => {
                out.push_str(&rest[..=open]);
                rest = &rest[open + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Merge immediate repeats of a block that fits on one slide.
fn collapse_repeated_blocks(blocks: Vec<LyricBlock>, max_block_lines: usize) -> Vec<LyricBlock> {
    let mut out: Vec<LyricBlock> = Vec::with_capacity(blocks.len());
    let mut iter = blocks.into_iter().peekable();
    while let Some(mut block) = iter.next() {
        let mut count = 1usize;
        if block.line_count() <= max_block_lines {
            while iter.peek() == Some(&block) {
                iter.next();
                count += 1;
            }
        }
        if count > 1 {
            block.append_repeat_suffix(count);
        }
        out.push(block);
    }
    out
}

/// Collapse runs of `threshold` or more identical adjacent lines.
fn collapse_repeated_lines(block: LyricBlock, threshold: usize) -> LyricBlock {
    let mut lines: Vec<String> = Vec::with_capacity(block.lines.len());
    let mut iter = block.lines.into_iter().peekable();
    while let Some(line) = iter.next() {
        let mut count = 1usize;
        while iter.peek() == Some(&line) {
            iter.next();
            count += 1;
        }
        if count >= threshold.max(2) {
            lines.push(format!("{} (x{})", line, count));
        } else {
            lines.extend(core::iter::repeat(line).take(count));
        }
    }
    LyricBlock::new(lines)
}

/// Pick a break for an over-wide line: punctuation first, then a space.
fn split_point(line: &str, heuristics: &LayoutHeuristics) -> Option<(String, String)> {
    let chars: Vec<(usize, char)> = line.char_indices().collect();

    for mark in BREAK_PUNCTUATION {
        if let Some(byte) = rightmost_in_window(&chars, heuristics.punctuation_window, mark) {
            let head = line[..byte + mark.len_utf8()].trim_end();
            let tail = line[byte + mark.len_utf8()..].trim_start();
            if !head.is_empty() && !tail.is_empty() {
                return Some((head.to_string(), tail.to_string()));
            }
        }
    }

    let byte = rightmost_in_window(&chars, heuristics.space_window, ' ')?;
    let head = line[..byte].trim_end();
    let tail = line[byte + 1..].trim_start();
    (!head.is_empty() && !tail.is_empty()).then(|| (head.to_string(), tail.to_string()))
}

fn rightmost_in_window(chars: &[(usize, char)], window: SplitWindow, target: char) -> Option<usize> {
    let (lo, hi) = window.bounds(chars.len());
    chars
        .get(lo..hi)?
        .iter()
        .rev()
        .find(|(_, ch)| *ch == target)
        .map(|(byte, _)| *byte)
}

/// Append the following block to a short one when both fit with margin.
fn merge_short_blocks(
    blocks: Vec<LyricBlock>,
    min_block_lines: usize,
    max_block_lines: usize,
    margin: usize,
) -> Vec<LyricBlock> {
    let mut out = Vec::with_capacity(blocks.len());
    let mut iter = blocks.into_iter().peekable();
    while let Some(mut block) = iter.next() {
        let fits_with_next = block.line_count() < min_block_lines
            && iter.peek().is_some_and(|next| {
                block.line_count() + next.line_count() + margin <= max_block_lines
            });
        if fits_with_next {
            if let Some(next) = iter.next() {
                block.lines.push(String::new());
                block.lines.extend(next.lines);
            }
        }
        out.push(block);
    }
    out
}

/// Cut over-long blocks into `ceil(n / max)` pieces of near-equal size.
fn split_long_blocks(blocks: Vec<LyricBlock>, max_block_lines: usize) -> Vec<LyricBlock> {
    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        let total = block.line_count();
        if total <= max_block_lines {
            out.push(block);
            continue;
        }
        let pieces = total.div_ceil(max_block_lines);
        let base = total / pieces;
        let extra = total % pieces;
        let mut lines = block.lines.into_iter();
        for piece in 0..pieces {
            let take = base + usize::from(piece < extra);
            out.push(LyricBlock::new(lines.by_ref().take(take).collect()));
        }
    }
    out
}

/// Rewrite a block that repeats itself as its principal period plus `(xN)`.
///
/// The block text (every line newline-terminated) equals a non-trivial
/// rotation of itself exactly when it occurs inside the doubled text at an
/// offset between 1 and its length; the first such offset is the period.
fn collapse_periodic(block: LyricBlock) -> LyricBlock {
    let mut text = String::new();
    for line in &block.lines {
        text.push_str(line);
        text.push('\n');
    }
    let len = text.len();
    let doubled = text.repeat(2);
    let skip = text.chars().next().map_or(0, char::len_utf8);
    let period = match doubled.get(skip..).and_then(|tail| tail.find(text.as_str())) {
        Some(rel) if skip + rel < len => skip + rel,
        _ => return block,
    };

    let count = len / period;
    let period_lines = text[..period].matches('\n').count();
    let mut lines = block.lines;
    lines.truncate(period_lines);
    let mut collapsed = LyricBlock::new(lines);
    collapsed.append_repeat_suffix(count);
    collapsed
}
