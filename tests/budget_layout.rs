mod common;

use common::budget_alloc::BudgetAlloc;
use common::fixtures::{amazing_grace, genesis};
use slide_prep::{HymnFormatter, LayoutConfig, PassageFormatter};
use slide_prep_afm::TimesRomanMeasurer;

// Genesis plus one hymn currently peaks well under 64KiB.
// Keep a guardrail at 256KiB so regressions in wrapping show up.
const LAYOUT_BUDGET_BYTES: usize = 256 * 1024;

#[global_allocator]
static ALLOC: BudgetAlloc = BudgetAlloc::new();

#[test]
fn passage_and_hymn_layout_under_budget() {
    let passage_text = genesis();
    let lyrics = amazing_grace();
    let cfg = LayoutConfig::default();
    let passages = PassageFormatter::new(cfg, TimesRomanMeasurer::shared());
    let hymns = HymnFormatter::new(cfg, TimesRomanMeasurer::shared());

    ALLOC.reset();
    let baseline = ALLOC.live_bytes();

    let passage = passages
        .format("genesis 1:1-10", &passage_text)
        .unwrap_or_else(|e| panic!("format passage: {}", e));
    let slides = passage
        .slides(true)
        .unwrap_or_else(|e| panic!("paginate passage: {}", e));
    let blocks = hymns
        .format_lyrics(&lyrics)
        .unwrap_or_else(|e| panic!("format lyrics: {}", e));
    assert!(!slides.is_empty());
    assert!(!blocks.is_empty());

    let usage = ALLOC.snapshot_since(baseline);
    assert!(
        usage.peak_bytes <= LAYOUT_BUDGET_BYTES,
        "layout peak over budget: {} bytes ({:.1}KB), budget: {}KB",
        usage.peak_bytes,
        usage.peak_kib(),
        LAYOUT_BUDGET_BYTES / 1024
    );
    println!(
        "layout slides={} blocks={} peak_kib={:.1} allocs={}",
        slides.len(),
        blocks.len(),
        usage.peak_kib(),
        usage.allocs
    );
}
