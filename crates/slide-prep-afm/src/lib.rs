//! Times-Roman advance widths for `slide-prep` line wrapping.
//!
//! Widths come from the Adobe Core 14 AFM file for Times-Roman and are
//! expressed in 1/1000 em units. Characters outside printable ASCII are
//! measured as a space.

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

use std::sync::Arc;

use slide_prep::TextMeasurer;

/// Advance width of the space glyph.
pub const SPACE_WIDTH: i32 = 250;

/// Widths for `' '..='~'`, indexed by `byte - 0x20`.
const PRINTABLE_WIDTHS: [u16; 95] = [
    // ' ' ! " # $ % & ' ( ) * + , - . /
    250, 333, 408, 500, 500, 833, 778, 333, 333, 333, 500, 564, 250, 333, 250, 278,
    // 0-9
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    // : ; < = > ? @
    278, 278, 564, 564, 564, 444, 921,
    // A-Z
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, 556, 722, 667,
    556, 611, 722, 722, 944, 722, 722, 611,
    // [ \ ] ^ _ `
    333, 278, 333, 469, 500, 333,
    // a-z
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, 500, 500, 333,
    389, 278, 500, 500, 722, 500, 500, 444,
    // { | } ~
    480, 200, 480, 541,
];

/// Advance width of a single character.
pub fn char_width(ch: char) -> i32 {
    match ch {
        ' '..='~' => i32::from(PRINTABLE_WIDTHS[ch as usize - 0x20]),
        '\n' | '\r' | '\t' => 0,
        c if c.is_control() => 0,
        _ => SPACE_WIDTH,
    }
}

/// [`TextMeasurer`] summing Times-Roman AFM widths without kerning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimesRomanMeasurer;

impl TimesRomanMeasurer {
    /// Create a measurer.
    pub fn new() -> Self {
        Self
    }

    /// Create a shared measurer trait object for formatter wiring.
    pub fn shared() -> Arc<dyn TextMeasurer> {
        Arc::new(Self::new())
    }
}

impl TextMeasurer for TimesRomanMeasurer {
    fn measure_text(&self, text: &str) -> i32 {
        let mut width = 0i32;
        let mut fallback = 0usize;
        for ch in text.chars() {
            if !ch.is_ascii() && !ch.is_control() {
                fallback += 1;
            }
            width = width.saturating_add(char_width(ch));
        }
        if fallback > 0 {
            log::trace!(
                "Measured {} non-ASCII chars as spaces in {:?}",
                fallback,
                text
            );
        }
        width
    }

    fn space_width(&self) -> i32 {
        SPACE_WIDTH
    }
}
