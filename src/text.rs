//! Text measurement and label fitting
//!
//! The engine never touches a font rasterizer. Widths come from a
//! [`TextMeasurer`] the host supplies; two self-contained measurers are
//! provided for offline use and tests.

use crate::types::Px;

/// Appended to truncated labels
pub const ELLIPSIS: &str = "...";

/// Points to CSS pixels
const PX_PER_PT: f64 = 96.0 / 72.0;

/// Average advance of 100 table units, as a fraction of the font size
const EM_PER_100_UNITS: f64 = 0.08 / 0.14;

/// Bold glyphs run wider than the regular advance table
const BOLD_WIDEN: f64 = 1.05;

/// Proportional glyph advances for printable ASCII (0x20..=0x7e),
/// in hundredths of the average advance.
#[rustfmt::skip]
const ADVANCE: [u8; 95] = [
    45,  55,  62, 115,  90, 132, 125,  40,
    55,  55,  71, 115,  45,  48,  45,  50,
    91,  91,  91,  91,  91,  91,  91,  91,
    91,  91,  50,  50, 120, 120, 120,  78,
   142, 102, 105, 110, 115, 105,  98, 105,
   125,  58,  58, 107,  95, 145, 125, 115,
    95, 115, 107,  95,  97, 118, 102, 150,
   100,  93, 100,  58,  50,  58, 119,  72,
    72,  86,  92,  80,  92,  85,  52,  92,
    92,  47,  47,  88,  48, 135,  92,  86,
    92,  92,  69,  75,  58,  92,  80, 121,
    81,  80,  76,  91,  49,  91, 118,
];

/// Advance used for anything outside the table
const FALLBACK_ADVANCE: u32 = 100;

/// Font a label is drawn with
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size_pt: f64,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size_pt: f64) -> Self {
        Self { family: family.into(), size_pt, bold: false, italic: false }
    }

    pub fn size_px(&self) -> f64 {
        self.size_pt * PX_PER_PT
    }
}

/// Host text-measurement capability.
///
/// Implementations must be monotonic: appending characters never makes a
/// string narrower. Truncation relies on that to binary search.
pub trait TextMeasurer {
    /// Rendered width of `text` in `font`
    fn measure_width(&self, text: &str, font: &FontSpec) -> Px;

    /// Widest ellipsized prefix of `text` that fits in `max`.
    ///
    /// Text that already fits comes back unchanged. When not even one
    /// character fits, the bare ellipsis is returned if it fits, else "".
    fn truncate_to_width(&self, text: &str, font: &FontSpec, max: Px) -> String {
        truncate_with_ellipsis(self, text, font, max)
    }
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for &M {
    fn measure_width(&self, text: &str, font: &FontSpec) -> Px {
        (**self).measure_width(text, font)
    }

    fn truncate_to_width(&self, text: &str, font: &FontSpec, max: Px) -> String {
        (**self).truncate_to_width(text, font, max)
    }
}

/// Binary search over character boundaries for the widest prefix `p`
/// with `measure(p + ELLIPSIS) <= max`.
pub fn truncate_with_ellipsis<M: TextMeasurer + ?Sized>(
    measurer: &M,
    text: &str,
    font: &FontSpec,
    max: Px,
) -> String {
    if text.is_empty() || measurer.measure_width(text, font) <= max {
        return text.to_string();
    }

    let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).chain([text.len()]).collect();
    let char_count = bounds.len() - 1;
    let fits = |k: usize| {
        let candidate = format!("{}{}", &text[..bounds[k]], ELLIPSIS);
        measurer.measure_width(&candidate, font) <= max
    };

    // The whole text doesn't fit, so at most char_count - 1 characters survive.
    let mut best = 0;
    let mut lo = 1;
    let mut hi = char_count.saturating_sub(1);
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        if fits(mid) {
            best = mid;
            lo = mid + 1;
        } else {
            hi = mid - 1;
        }
    }

    if best > 0 {
        format!("{}{}", &text[..bounds[best]], ELLIPSIS)
    } else if measurer.measure_width(ELLIPSIS, font) <= max {
        ELLIPSIS.to_string()
    } else {
        String::new()
    }
}

/// What to draw when a label can't keep a single character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Fall back to the bare ellipsis (stage and value labels)
    Ellipsis,
    /// Draw nothing (segment labels)
    Suppress,
}

/// Fit `text` into `budget` pixels.
pub fn fit<M: TextMeasurer + ?Sized>(
    measurer: &M,
    text: &str,
    font: &FontSpec,
    budget: Px,
    overflow: Overflow,
) -> String {
    if !(budget.raw() > 0.0) {
        return String::new();
    }
    let fitted = measurer.truncate_to_width(text, font, budget);
    match overflow {
        Overflow::Suppress if fitted == ELLIPSIS && text != ELLIPSIS => String::new(),
        _ => fitted,
    }
}

/// Every character advances by the same amount, whatever the font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedWidthMeasurer {
    pub char_width: Px,
}

impl FixedWidthMeasurer {
    pub fn new(char_width: f64) -> Self {
        Self { char_width: Px(char_width) }
    }
}

impl TextMeasurer for FixedWidthMeasurer {
    fn measure_width(&self, text: &str, _font: &FontSpec) -> Px {
        self.char_width * text.chars().count() as f64
    }
}

/// Approximates a proportional sans-serif face from a glyph advance table.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProportionalMeasurer;

impl ProportionalMeasurer {
    /// Sum of table advances for `text`
    pub fn advance_units(text: &str) -> u32 {
        text.chars()
            .map(|c| {
                if (' '..='~').contains(&c) {
                    ADVANCE[(c as usize) - 0x20] as u32
                } else {
                    FALLBACK_ADVANCE
                }
            })
            .sum()
    }
}

impl TextMeasurer for ProportionalMeasurer {
    fn measure_width(&self, text: &str, font: &FontSpec) -> Px {
        let units = Self::advance_units(text) as f64;
        let widen = if font.bold { BOLD_WIDEN } else { 1.0 };
        Px(units * 0.01 * EM_PER_100_UNITS * font.size_px() * widen)
    }
}
