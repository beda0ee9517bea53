//! Stage and segment model shared by the aggregator and the layout stages
//!
//! The aggregator fills in identity, values, colors and formatted text; the
//! layout stages fill in the derived geometry and fitted labels.

use glam::{DVec2, dvec2};

use crate::types::{Color, Px};

/// One line of tooltip metadata
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipItem {
    pub display_name: String,
    pub value: String,
}

impl TooltipItem {
    pub fn new(display_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { display_name: display_name.into(), value: value.into() }
    }
}

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PxRect {
    pub origin: DVec2,
    pub size: DVec2,
}

impl PxRect {
    pub fn new(x: Px, y: Px, width: Px, height: Px) -> Self {
        Self { origin: dvec2(x.raw(), y.raw()), size: dvec2(width.raw(), height.raw()) }
    }

    pub fn right(&self) -> f64 {
        self.origin.x + self.size.x
    }

    pub fn center(&self) -> DVec2 {
        self.origin + self.size / 2.0
    }
}

/// One status slice within a stage
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub status_key: String,
    pub value: f64,
    pub color: Color,
    /// Left-to-right stacking position within the stage
    pub order_index: usize,
    pub formatted_value: String,
    pub tooltip: Vec<TooltipItem>,

    /// Offset from the stage's left edge
    pub pixel_x: Px,
    pub pixel_width: Px,
    /// Pinned to the minimum bar width
    pub forced: bool,
    /// Value a forced segment would need to justify its minimum width;
    /// equals `value` for unconstrained segments.
    pub effective_value: f64,
    /// Absolute rectangle in chart coordinates
    pub rect: PxRect,
    pub label_text: String,
}

impl Segment {
    pub fn new(status_key: impl Into<String>, value: f64, color: Color, order_index: usize) -> Self {
        Self {
            status_key: status_key.into(),
            value,
            color,
            order_index,
            formatted_value: String::new(),
            tooltip: Vec::new(),
            pixel_x: Px::ZERO,
            pixel_width: Px::ZERO,
            forced: false,
            effective_value: value,
            rect: PxRect::default(),
            label_text: String::new(),
        }
    }
}

/// One funnel row
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    /// Input order index
    pub id: usize,
    pub name: String,
    pub segments: Vec<Segment>,
    pub total_value: f64,
    pub formatted_total: String,

    pub band_top: Px,
    pub band_height: Px,
    /// Inset of the stage's bar from the funnel envelope's left edge
    pub x_offset: Px,
    /// Width available to the stage's segments, paddings included
    pub envelope_width: Px,
    pub label_text: String,
    pub value_label_text: String,
}

impl Stage {
    pub fn new(id: usize, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            segments: Vec::new(),
            total_value: 0.0,
            formatted_total: String::new(),
            band_top: Px::ZERO,
            band_height: Px::ZERO,
            x_offset: Px::ZERO,
            envelope_width: Px::ZERO,
            label_text: String::new(),
            value_label_text: String::new(),
        }
    }

    /// Zero-total stages keep their row but draw no bar
    pub fn is_degenerate(&self) -> bool {
        self.segments.is_empty() || self.total_value == 0.0
    }
}
