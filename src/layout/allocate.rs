//! Segment width allocation within one stage
//!
//! Widths are proportional to value, except that no segment drops below
//! the minimum bar width. A segment whose proportional width is under the
//! minimum is pinned to it; the remaining width is split among the rest in
//! proportion to their values. This is a single pass: a segment that only
//! falls under the minimum after the redistribution is not pinned.

use crate::log::warn;
use crate::model::Stage;
use crate::types::Px;

/// Placement of one segment, relative to its stage's left edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSpan {
    pub x: Px,
    pub width: Px,
    pub forced: bool,
    /// Value that would yield `width` proportionally; equals the input
    /// value for unconstrained segments
    pub effective_value: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Allocation {
    pub spans: Vec<SegmentSpan>,
    /// Width taken by pinned segments
    pub forced_width: Px,
    /// Width shared by the unconstrained segments; negative when the
    /// pinned segments alone overrun the envelope
    pub free_width: Px,
}

impl Allocation {
    pub fn is_overcommitted(&self) -> bool {
        self.free_width < Px::ZERO
    }

    /// Right edge of the last segment
    pub fn used_width(&self) -> Px {
        self.spans.last().map_or(Px::ZERO, |s| s.x + s.width)
    }
}

/// Allocate `stage`'s segments across `envelope` pixels (paddings included).
///
/// A stage with no segments or a zero total gets no spans.
pub fn allocate_widths(stage: &Stage, envelope: Px, bar_padding: Px, min_bar_width: Px) -> Allocation {
    let values: Vec<f64> = stage.segments.iter().map(|s| s.value).collect();
    allocate_values(&values, envelope, bar_padding, min_bar_width)
}

/// [`allocate_widths`] over bare values
pub fn allocate_values(values: &[f64], envelope: Px, bar_padding: Px, min_bar_width: Px) -> Allocation {
    let total: f64 = values.iter().sum();
    if values.is_empty() || total == 0.0 {
        return Allocation::default();
    }

    let inner = envelope - bar_padding * (values.len() - 1) as f64;
    let naive: Vec<Px> = values.iter().map(|v| inner * (v / total)).collect();
    let forced: Vec<bool> = naive.iter().map(|w| *w < min_bar_width).collect();

    let forced_count = forced.iter().filter(|f| **f).count();
    let forced_width = min_bar_width * forced_count as f64;
    let free_width = inner - forced_width;
    let free_sum: f64 = values.iter().zip(&forced).filter(|(_, f)| !**f).map(|(v, _)| v).sum();

    let mut spans = Vec::with_capacity(values.len());
    let mut x = Px::ZERO;
    for ((&value, &naive), &forced) in values.iter().zip(&naive).zip(&forced) {
        let (width, effective_value) = if forced {
            let effective = match min_bar_width.checked_ratio(naive) {
                Some(ratio) => value * ratio,
                None => 0.0,
            };
            (min_bar_width, effective)
        } else if free_sum > 0.0 {
            (free_width * (value / free_sum), value)
        } else {
            (Px::ZERO, value)
        };
        spans.push(SegmentSpan { x, width, forced, effective_value });
        x += width + bar_padding;
    }

    let allocation = Allocation { spans, forced_width, free_width };
    if allocation.is_overcommitted() {
        warn!(
            forced = forced_count,
            overrun = (-free_width).raw(),
            "minimum bar widths overrun the stage envelope"
        );
    }
    allocation
}
