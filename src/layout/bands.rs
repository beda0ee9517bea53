//! Vertical stage layout: one equal-height band per stage
//!
//! Bands follow a rounded band scale: a fixed step per stage, the band
//! taking `1 - inner_padding` of it, outer padding above the first and
//! below the last, and leftover space split evenly.

use crate::log::debug;
use crate::settings::FunnelSettings;
use crate::types::Px;

use super::defaults::{BAND_ALIGN, MAX_HEIGHT_DIVISOR, OUTER_PADDING, TOP_INSET, USABLE_HEIGHT};

/// Band scale parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandConfig {
    /// Gap between bands, as a fraction of the step
    pub inner_padding: f64,
    /// Padding outside the first/last band, as a fraction of the step
    pub outer_padding: f64,
    pub min_band_height: Px,
    /// Bands stay below usable height / this
    pub max_height_divisor: f64,
    /// First stage at the bottom
    pub invert: bool,
}

impl BandConfig {
    pub fn from_settings(funnel: &FunnelSettings) -> Self {
        Self {
            inner_padding: (funnel.vertical_padding_pct / 100.0).clamp(0.0, 0.99),
            outer_padding: OUTER_PADDING,
            min_band_height: Px(funnel.min_bar_height_px.max(0.0)),
            max_height_divisor: MAX_HEIGHT_DIVISOR,
            invert: funnel.invert,
        }
    }
}

/// Vertical slot of one stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub top: Px,
    pub height: Px,
}

impl Band {
    pub fn bottom(&self) -> Px {
        self.top + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandLayout {
    /// In stage order (not screen order when inverted)
    pub bands: Vec<Band>,
    pub step: Px,
    /// Height the chart needs; larger than the viewport when overflowed
    pub extent: Px,
    /// Minimum band height forced a scrollable layout
    pub overflowed: bool,
}

impl BandLayout {
    fn empty() -> Self {
        Self { bands: Vec::new(), step: Px::ZERO, extent: Px::ZERO, overflowed: false }
    }
}

/// Assign a band to each of `count` stages within `viewport_height`.
///
/// Few stages: the band height is capped and the outer padding grows to
/// absorb the rest. Many stages: once bands would drop below the minimum
/// height, the extent grows past the viewport instead.
pub fn layout_stages(count: usize, viewport_height: Px, config: &BandConfig) -> BandLayout {
    if count == 0 {
        return BandLayout::empty();
    }

    let n = count as f64;
    let mut height = viewport_height * USABLE_HEIGHT;
    let max_band = height / config.max_height_divisor;
    let min_band = config.min_band_height;
    let mut outer = config.outer_padding;

    let naive_step = viewport_height / (n + 2.0 * outer);
    let required = min_band * (n + 2.0 * outer);
    let mut overflowed = false;

    if naive_step > max_band {
        let band = if max_band >= min_band { max_band } else { min_band };
        // Outer padding that makes `count` bands of `band` fill the height
        if let Some(solved) = (height - band * n).checked_ratio(band * 2.0) {
            if solved > 0.0 {
                outer = solved;
            }
        }
    } else if naive_step < min_band && required > height {
        debug!(required = required.raw(), available = height.raw(), "stages overflow the viewport");
        height = required;
        overflowed = true;
    }

    let scale = BandScale::new(count, TOP_INSET, height, config.inner_padding, outer);
    let mut bands: Vec<Band> = (0..count)
        .map(|i| Band { top: scale.position(i), height: scale.bandwidth })
        .collect();
    if config.invert {
        bands.reverse();
    }

    BandLayout { bands, step: scale.step, extent: height, overflowed }
}

/// Rounded band scale over `[start, stop]`
struct BandScale {
    first: Px,
    step: Px,
    bandwidth: Px,
}

impl BandScale {
    fn new(count: usize, start: Px, stop: Px, inner: f64, outer: f64) -> Self {
        let n = count as f64;
        let span = stop - start;
        let step = (span / (n - inner + outer * 2.0).max(1.0)).floor().max(Px::ZERO);
        let first = (start + (span - step * (n - inner)) * BAND_ALIGN).round();
        let bandwidth = (step * (1.0 - inner)).round();
        Self { first, step, bandwidth }
    }

    fn position(&self, i: usize) -> Px {
        self.first + self.step * i as f64
    }
}
