//! Scripture passages: verse segmentation, numbering annotations, and
//! passage-level slide output.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::LayoutError;
use crate::layout::LayoutConfig;
use crate::lookup::Lookup;
use crate::measure::TextMeasurer;
use crate::paginate::{SlideGroup, SlidePaginator, WrappedUnit};
use crate::ranges::{rebase_ranges, AnnotatedRange, RangeKind, RangeTracker};
use crate::wrap::{FormattedLine, LineWrapper};

/// One numbered unit of a passage.
///
/// `number` stays a string so labels like `"a"` survive; an empty number
/// marks text that preceded the first marker.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    /// Label found inside `[...]`, trimmed.
    pub number: String,
    /// Verse body with whitespace collapsed.
    pub text: String,
}

/// Split a passage on `[N]` markers.
///
/// Whitespace runs (including newlines) collapse to single spaces first. Text
/// before the first marker becomes a verse with an empty number; an `[`
/// without a closing `]` is kept as plain text.
pub fn segment_passage(passage: &str) -> Vec<Verse> {
    let normalized = passage.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut verses = Vec::new();
    let mut number: Option<String> = None;
    let mut body = String::new();
    let mut rest = normalized.as_str();
    loop {
        let Some(open) = rest.find('[') else {
            body.push_str(rest);
            break;
        };
        let Some(close_rel) = rest[open + 1..].find(']') else {
            body.push_str(rest);
            break;
        };
        body.push_str(&rest[..open]);
        push_verse(&mut verses, number.take(), &body);
        body.clear();

        let close = open + 1 + close_rel;
        number = Some(rest[open + 1..close].trim().to_string());
        rest = &rest[close + 1..];
    }
    push_verse(&mut verses, number, &body);
    verses
}

fn push_verse(verses: &mut Vec<Verse>, number: Option<String>, body: &str) {
    let text = body.trim();
    match number {
        Some(number) => verses.push(Verse {
            number,
            text: text.to_string(),
        }),
        None if !text.is_empty() => verses.push(Verse {
            number: String::new(),
            text: text.to_string(),
        }),
        None => {}
    }
}

/// Spaces to superscript on continuation lines so they line up with a
/// superscripted number of `digits` characters.
fn alignment_spaces(digits: usize) -> usize {
    match digits {
        1 => 2,
        2 => 1,
        _ => 0,
    }
}

fn numeric_label(label: &str) -> Option<u32> {
    if label.is_empty() || !label.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    label.parse().ok()
}

/// Wraps verses and derives their superscript annotations.
#[derive(Clone, Debug)]
pub struct VerseSegmenter {
    wrapper: LineWrapper,
    max_visual_width: i32,
    indent_width: usize,
}

impl VerseSegmenter {
    /// Create a segmenter with an explicit wrapper and budgets.
    pub fn new(wrapper: LineWrapper, max_visual_width: i32, indent_width: usize) -> Self {
        Self {
            wrapper,
            max_visual_width,
            indent_width,
        }
    }

    /// See [`segment_passage`].
    pub fn segment(&self, passage: &str) -> Vec<Verse> {
        segment_passage(passage)
    }

    /// Wrap each verse independently with its number as the first-line prefix.
    pub fn wrap_verses(&self, verses: &[Verse]) -> Result<Vec<Vec<FormattedLine>>, LayoutError> {
        verses
            .iter()
            .map(|verse| {
                self.wrapper.wrap(
                    &verse.text,
                    self.max_visual_width,
                    &verse.number,
                    self.indent_width,
                )
            })
            .collect()
    }

    /// Superscript ranges over the concatenation of `wrapped`.
    ///
    /// A number is annotated only when it is numeric and is the first number
    /// seen, the previous annotated number plus one, or `1` (chapter reset).
    /// Continuation lines of an annotated verse get `Space` ranges sized to
    /// the number's digit count. Everything else stays plain text.
    pub fn annotate_verses(
        verses: &[Verse],
        wrapped: &[Vec<FormattedLine>],
    ) -> Vec<AnnotatedRange> {
        let mut tracker = RangeTracker::new();
        let mut last: Option<u32> = None;
        for (verse, lines) in verses.iter().zip(wrapped) {
            let annotated_digits = match numeric_label(&verse.number) {
                Some(value)
                    if last.is_none()
                        || last.and_then(|prev| prev.checked_add(1)) == Some(value)
                        || value == 1 =>
                {
                    last = Some(value);
                    Some(verse.number.len())
                }
                _ => None,
            };

            for (idx, line) in lines.iter().enumerate() {
                if let Some(digits) = annotated_digits {
                    if idx == 0 {
                        tracker.mark(RangeKind::VerseNumber, 0, digits);
                    } else {
                        let spaces = alignment_spaces(digits).min(line.lead().len());
                        tracker.mark(RangeKind::Space, 0, spaces);
                    }
                }
                tracker.advance(line.len());
            }
        }
        tracker.into_ranges()
    }
}

/// Formats looked-up passages into slide text.
#[derive(Clone)]
pub struct PassageFormatter {
    cfg: LayoutConfig,
    wrapper: LineWrapper,
}

impl core::fmt::Debug for PassageFormatter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PassageFormatter")
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

impl PassageFormatter {
    /// Create a formatter over a shared measurer.
    pub fn new(cfg: LayoutConfig, measurer: Arc<dyn TextMeasurer>) -> Self {
        Self {
            cfg,
            wrapper: LineWrapper::new(measurer),
        }
    }

    /// Segment, wrap, and annotate `passage`.
    ///
    /// `title` is the passage reference (for example `"john 3:16-18"`); it is
    /// used for slide headers and the attribution line.
    pub fn format(&self, title: &str, passage: &str) -> Result<FormattedPassage, LayoutError> {
        self.cfg.validate()?;
        let constraints = self.cfg.constraints;
        let segmenter = VerseSegmenter::new(
            self.wrapper.clone(),
            constraints.max_visual_width,
            constraints.indent_width,
        );

        let verses = segmenter.segment(passage);
        let wrapped = segmenter.wrap_verses(&verses)?;
        let ranges = VerseSegmenter::annotate_verses(&verses, &wrapped);

        let mut units = Vec::with_capacity(wrapped.len());
        let mut offset = 0usize;
        for lines in wrapped {
            let len: usize = lines.iter().map(FormattedLine::len).sum();
            let unit_ranges = rebase_ranges(&ranges, offset..offset + len, offset);
            units.push(WrappedUnit::new(lines, unit_ranges));
            offset += len;
        }

        Ok(FormattedPassage {
            title: title.to_string(),
            verses,
            units,
            source_lines: self.source_lines(title),
            paginator: SlidePaginator::new(self.cfg.heuristics),
            max_lines_per_slide: constraints.max_lines_per_slide,
        })
    }

    /// Format a lookup result; a miss passes straight through.
    pub fn format_lookup(
        &self,
        title: &str,
        passage: Lookup<&str>,
    ) -> Result<Lookup<FormattedPassage>, LayoutError> {
        match passage {
            Lookup::Found(text) => Ok(Lookup::Found(self.format(title, text)?)),
            Lookup::NotFound => {
                log::debug!("Passage {:?} not found; skipping layout", title);
                Ok(Lookup::NotFound)
            }
        }
    }

    /// Blank line plus an attribution pushed towards the right edge.
    fn source_lines(&self, title: &str) -> Vec<FormattedLine> {
        let attribution = format!("\u{2014}{}", title_case(title.trim()));
        let space = self.wrapper.measurer().space_width().max(1);
        let target = (f64::from(self.cfg.heuristics.source_inset)
            * f64::from(self.cfg.constraints.max_visual_width)
            / f64::from(space))
        .floor() as i64;
        let used = i64::try_from(attribution.chars().count()).unwrap_or(i64::MAX);
        let pad = usize::try_from(target - used).unwrap_or(0);
        vec![
            FormattedLine::new("", ""),
            FormattedLine::new(&" ".repeat(pad), &attribution),
        ]
    }
}

/// A passage wrapped and annotated, ready to be cut into slides.
#[derive(Clone, Debug)]
pub struct FormattedPassage {
    title: String,
    verses: Vec<Verse>,
    units: Vec<WrappedUnit>,
    source_lines: Vec<FormattedLine>,
    paginator: SlidePaginator,
    max_lines_per_slide: usize,
}

impl FormattedPassage {
    /// Passage reference as given.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Parsed verses in source order.
    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    /// One wrapped unit per verse.
    pub fn units(&self) -> &[WrappedUnit] {
        &self.units
    }

    /// All verse lines concatenated.
    pub fn text(&self) -> String {
        self.units.iter().map(WrappedUnit::text).collect()
    }

    /// All ranges over [`text`](Self::text).
    pub fn ranges(&self) -> Vec<AnnotatedRange> {
        self.units
            .iter()
            .flat_map(|unit| unit.ranges.iter().copied())
            .collect()
    }

    /// Total wrapped line count.
    pub fn line_count(&self) -> usize {
        self.units.iter().map(WrappedUnit::line_count).sum()
    }

    /// Paginate with the configured line budget.
    pub fn slides(&self, append_source: bool) -> Result<Vec<SlideGroup>, LayoutError> {
        self.slides_with_budget(self.max_lines_per_slide, append_source)
    }

    /// Paginate with an explicit line budget.
    ///
    /// With `append_source` the attribution lines ride along with the last
    /// verse, so they land on the final slide.
    pub fn slides_with_budget(
        &self,
        max_lines_per_slide: usize,
        append_source: bool,
    ) -> Result<Vec<SlideGroup>, LayoutError> {
        if !append_source {
            return self.paginator.paginate(&self.units, max_lines_per_slide);
        }
        let mut units = self.units.clone();
        match units.last_mut() {
            Some(last) => last.lines.extend(self.source_lines.iter().cloned()),
            None => units.push(WrappedUnit::new(self.source_lines.clone(), Vec::new())),
        }
        self.paginator.paginate(&units, max_lines_per_slide)
    }

    /// Whole passage on one slide, followed by the attribution line.
    pub fn single_slide(&self) -> SlideGroup {
        let mut slide = SlideGroup::from_units(&self.units, 0);
        for line in &self.source_lines {
            slide.text.push_str(line.as_str());
        }
        slide
    }
}

/// Capitalize the first letter of every alphabetic run, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutConstraints;
    use crate::measure::FixedAdvanceMeasurer;

    fn formatter(max_visual_width: i32, max_lines_per_slide: usize) -> PassageFormatter {
        let cfg = LayoutConfig {
            constraints: LayoutConstraints {
                max_visual_width,
                max_lines_per_slide,
                indent_width: 4,
                ..LayoutConstraints::default()
            },
            ..LayoutConfig::default()
        };
        PassageFormatter::new(cfg, Arc::new(FixedAdvanceMeasurer::new(10)))
    }

    #[test]
    fn segments_numbered_verses() {
        let verses = segment_passage("[1] In the beginning [2] God created");
        assert_eq!(
            verses,
            vec![
                Verse {
                    number: "1".into(),
                    text: "In the beginning".into()
                },
                Verse {
                    number: "2".into(),
                    text: "God created".into()
                },
            ]
        );
    }

    #[test]
    fn leading_text_becomes_unnumbered_verse() {
        let verses = segment_passage("  For God so\nloved [17] For God did not send");
        assert_eq!(verses[0].number, "");
        assert_eq!(verses[0].text, "For God so loved");
        assert_eq!(verses[1].number, "17");
    }

    #[test]
    fn unbalanced_bracket_is_plain_text() {
        let verses = segment_passage("[3] and there was [light");
        assert_eq!(verses.len(), 1);
        assert_eq!(verses[0].text, "and there was [light");
    }

    #[test]
    fn empty_passage_has_no_verses() {
        assert!(segment_passage("   ").is_empty());
    }

    #[test]
    fn verse_number_ranges_cover_digits() {
        let passage = formatter(10_000, 12)
            .format("genesis 1:1-2", "[1] In the beginning [2] God created")
            .unwrap();
        let text = passage.text();
        let numbers: Vec<&str> = passage
            .ranges()
            .iter()
            .filter(|r| r.kind == RangeKind::VerseNumber)
            .map(|r| &text[r.span()])
            .collect();
        assert_eq!(numbers, vec!["1", "2"]);
        assert_eq!(passage.verses().len(), 2);
    }

    #[test]
    fn continuation_lines_get_alignment_spaces() {
        let passage = formatter(120, 12)
            .format("psalm 1:1", "[1] Blessed is the man who walks not in the counsel")
            .unwrap();
        let text = passage.text();
        let ranges = passage.ranges();
        assert!(passage.line_count() > 1);
        let spaces: Vec<&AnnotatedRange> =
            ranges.iter().filter(|r| r.kind == RangeKind::Space).collect();
        assert_eq!(spaces.len(), passage.line_count() - 1);
        for range in spaces {
            assert_eq!(range.len(), 2);
            assert_eq!(&text[range.span()], "  ");
        }
    }

    #[test]
    fn non_incrementing_numbers_stay_plain() {
        let passage = formatter(10_000, 12)
            .format("x", "[4] a [5] b [9] c [1] d [2] e")
            .unwrap();
        let text = passage.text();
        let numbers: Vec<&str> = passage
            .ranges()
            .iter()
            .filter(|r| r.kind == RangeKind::VerseNumber)
            .map(|r| &text[r.span()])
            .collect();
        assert_eq!(numbers, vec!["4", "5", "1", "2"]);
    }

    #[test]
    fn non_numeric_labels_are_not_annotated() {
        let passage = formatter(10_000, 12).format("x", "[a] one [1] two").unwrap();
        assert_eq!(passage.ranges().len(), 1);
        assert!(passage.text().starts_with("a   one"));
    }

    #[test]
    fn ten_verses_split_into_three_slides() {
        let passage: String = (1..=10).map(|n| format!("[{}] word ", n)).collect();
        let formatted = formatter(10_000, 4).format("x", &passage).unwrap();
        let slides = formatted.slides(false).unwrap();
        assert_eq!(slides.len(), 3);
        let joined: String = slides.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, formatted.text());
    }

    #[test]
    fn appended_source_lands_on_last_slide() {
        let passage: String = (1..=6).map(|n| format!("[{}] word ", n)).collect();
        let formatted = formatter(1_000, 4).format("john 3:16", &passage).unwrap();
        let slides = formatted.slides(true).unwrap();
        let last = slides.last().unwrap();
        assert!(last.text.ends_with("\u{2014}John 3:16\n"));
        assert!(!slides[0].text.contains('\u{2014}'));
    }

    #[test]
    fn single_slide_right_aligns_attribution() {
        let formatted = formatter(1_000, 12)
            .format("john 3:16", "[16] For God so loved the world")
            .unwrap();
        let slide = formatted.single_slide();
        let last_line = slide.text.lines().last().unwrap();
        // floor(0.93 * 1000 / 10) = 93 columns, minus 10 chars of attribution
        assert_eq!(last_line.len() - "\u{2014}John 3:16".len(), 83);
        assert!(slide.text.contains("\n\n"));
        assert_eq!(slide.styled_text(RangeKind::VerseNumber).next(), Some("16"));
    }

    #[test]
    fn long_attribution_pad_clamps_to_zero() {
        let formatted = formatter(100, 12)
            .format("a very long book name 1:1", "[1] x")
            .unwrap();
        let slide = formatted.single_slide();
        let last_line = slide.text.lines().last().unwrap();
        assert_eq!(last_line, "\u{2014}A Very Long Book Name 1:1");
        assert!(slide.text.ends_with("\n\n\u{2014}A Very Long Book Name 1:1\n"));
    }

    #[test]
    fn not_found_lookup_skips_formatting() {
        let out = formatter(1_000, 12)
            .format_lookup("john 99:1", Lookup::NotFound)
            .unwrap();
        assert!(!out.is_found());
    }

    #[test]
    fn title_case_matches_reference_style() {
        assert_eq!(title_case("1 corinthians 13:4-7"), "1 Corinthians 13:4-7");
        assert_eq!(title_case("JOHN 3"), "John 3");
    }
}
