//! Text wrapping, annotation tracking, and slide pagination for service slides.
//!
//! `slide-prep` turns raw scripture passages, hymn lyrics, and numbered lists
//! into pre-wrapped, pre-paginated [`SlideGroup`]s. Each group carries the
//! exact text to write into a slide text box plus byte ranges that need
//! post-hoc styling (superscript verse numbers, alignment spaces, list item
//! starts).
//!
//! Width decisions are made against an injected [`TextMeasurer`]; the crate
//! never measures glyphs by itself.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

mod error;
mod hymn;
mod layout;
mod list;
mod lookup;
mod measure;
mod paginate;
mod ranges;
mod verse;
mod wrap;

pub use error::{LayoutError, LayoutPhase};
pub use hymn::{hymn_slide_titles, HymnFormatter, LyricBlock};
pub use layout::{LayoutConfig, LayoutConstraints, LayoutHeuristics, SplitWindow};
pub use list::NumberedListFormatter;
pub use lookup::{assemble_hymn, ConsistencyWarning, HymnAssembly, HymnStanzaRow, Lookup};
pub use measure::{FixedAdvanceMeasurer, TextMeasurer};
pub use paginate::{SlideGroup, SlidePaginator, WrappedUnit};
pub use ranges::{rebase_ranges, AnnotatedRange, RangeKind, RangeTracker};
pub use verse::{segment_passage, FormattedPassage, PassageFormatter, Verse, VerseSegmenter};
pub use wrap::{FormattedLine, LineWrapper};
