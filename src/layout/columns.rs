//! Horizontal layout: stage label column, funnel envelope, value label column
//!
//! ```text
//! | stage labels | gap | margin |   funnel envelope   | value labels | margin |
//! 0                             x1                    x2                 total
//! ```
//!
//! With `mirror_labels` the two label columns swap sides.

use crate::settings::Settings;
use crate::types::Px;

use super::defaults::STAGE_LABEL_GAP;

/// Which end of a label sits on its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Start,
    End,
}

/// Where a label column's text is anchored
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelAnchor {
    pub x: Px,
    pub align: TextAlign,
}

impl LabelAnchor {
    fn start(x: Px) -> Self {
        Self { x, align: TextAlign::Start }
    }

    fn end(x: Px) -> Self {
        Self { x, align: TextAlign::End }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Columns {
    /// Width the chart needs; larger than the viewport when `scale` < 100
    pub total_width: Px,
    /// Left edge of the funnel envelope
    pub status_bar_x1: Px,
    /// Right edge of the funnel envelope
    pub status_bar_x2: Px,
    pub stage_label_budget: Px,
    /// Fitting budget for value labels: the column's share of the width
    /// minus its margin
    pub value_label_budget: Px,
    pub stage_anchor: LabelAnchor,
    /// None when value labels are hidden
    pub value_anchor: Option<LabelAnchor>,
    pub overflowed: bool,
}

impl Columns {
    pub fn funnel_width(&self) -> Px {
        (self.status_bar_x2 - self.status_bar_x1).max(Px::ZERO)
    }
}

/// Size the label columns from the widest measured labels and place the
/// funnel envelope between them.
pub fn layout_columns(
    viewport_width: Px,
    max_stage_label: Px,
    max_value_label: Px,
    settings: &Settings,
) -> Columns {
    let stage = &settings.stage_label;
    let value = &settings.value_label;

    let stage_budget = |width: Px| max_stage_label.min(width * (stage.max_width_pct / 100.0)).ceil();
    let value_share = |width: Px| width * (value.max_width_pct / 100.0);
    let value_budget = |width: Px| max_value_label.min(value_share(width)).ceil();
    let stage_column = |width: Px| stage_budget(width) + STAGE_LABEL_GAP + Px(stage.margin);
    let value_column = |width: Px| {
        if value.show {
            value_budget(width) + Px(value.margin)
        } else {
            Px(value.margin)
        }
    };

    let labels = stage_column(viewport_width) + value_column(viewport_width);
    let funnel = (viewport_width - labels) * (100.0 / settings.funnel.scale);
    let natural = labels + funnel;
    let total = viewport_width.max(natural);

    // Budgets scale with the final chart width
    let stage_col = stage_column(total);
    let value_col = value_column(total);

    let (x1, x2, stage_anchor, value_anchor) = if settings.funnel.mirror_labels {
        let x1 = value_col;
        let x2 = total - stage_col;
        (x1, x2, LabelAnchor::start(x2), LabelAnchor::end(x1))
    } else {
        let x1 = stage_col;
        let x2 = total - value_col;
        (x1, x2, LabelAnchor::end(x1), LabelAnchor::start(x2))
    };

    Columns {
        total_width: total,
        status_bar_x1: x1,
        status_bar_x2: x2,
        stage_label_budget: stage_budget(total),
        value_label_budget: if value.show {
            (value_share(total) - Px(value.margin)).max(Px::ZERO)
        } else {
            Px::ZERO
        },
        stage_anchor,
        value_anchor: value.show.then_some(value_anchor),
        overflowed: natural > viewport_width,
    }
}
