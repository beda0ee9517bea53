//! Funnel envelope shapes and the taper angle solver
//!
//! In angle mode each stage is inset from both sides of the funnel envelope
//! by `tan(degree) * band_top + margin`, so deeper stages narrow. The solver
//! lowers the angle when the deepest stage would end up narrower than the
//! minimum bar width.

use enum_dispatch::enum_dispatch;

use crate::log::debug;
use crate::model::Stage;
use crate::settings::{FunnelSettings, ShapeMode};
use crate::types::{Degrees, Px};

/// Horizontal inset of a stage at vertical position `y`
pub fn offset_at(degree: Degrees, y: Px, margin: Px) -> Px {
    Px(degree.tan() * y.raw()) + margin
}

/// Fixed inputs to the taper solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaperParams {
    /// Funnel envelope width (x2 - x1)
    pub envelope: Px,
    pub margin: Px,
    pub bar_padding: Px,
    pub min_bar_width_fraction: f64,
}

impl TaperParams {
    pub fn new(envelope: Px, funnel: &FunnelSettings) -> Self {
        Self {
            envelope,
            margin: funnel.margin(),
            bar_padding: funnel.bar_padding(),
            min_bar_width_fraction: funnel.min_bar_width_fraction(),
        }
    }

    pub fn min_bar_width(&self) -> Px {
        self.envelope * self.min_bar_width_fraction
    }

    /// Width left for segment bars (paddings excluded) at depth `y`
    pub fn available_width(&self, degree: Degrees, y: Px, segment_count: usize) -> Px {
        let paddings = self.bar_padding * segment_count.saturating_sub(1) as f64;
        self.envelope - offset_at(degree, y, self.margin) * 2.0 - paddings
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaperSolution {
    pub degree: Degrees,
    /// The configured angle didn't fit and was lowered
    pub fell_back: bool,
}

/// Pick the taper angle for `stages`, whose bands are already assigned.
///
/// The check runs against the deepest stage (largest band top). If its
/// bars would be narrower than the minimum at the configured angle, the
/// angle that leaves exactly the minimum is solved for, rounded to whole
/// degrees and clamped to `[0, configured]`.
pub fn solve_taper(stages: &[Stage], configured: Degrees, params: &TaperParams) -> TaperSolution {
    let kept = TaperSolution { degree: configured, fell_back: false };

    let Some(deepest) = stages
        .iter()
        .max_by(|a, b| a.band_top.partial_cmp(&b.band_top).unwrap_or(std::cmp::Ordering::Equal))
    else {
        return kept;
    };

    let y = deepest.band_top;
    let min_width = params.min_bar_width();
    if params.available_width(configured, y, deepest.segments.len()) >= min_width {
        return kept;
    }
    // Angle has no effect on a stage at the very top
    if y.raw() <= 0.0 {
        return kept;
    }

    let room = params.envelope - min_width - params.margin * 2.0;
    let solved = Degrees::from_radians((room.raw() / (2.0 * y.raw())).atan()).round();
    let degree = solved.clamp(Degrees(0.0), configured);
    debug!(configured = configured.raw(), chosen = degree.raw(), "taper angle lowered");

    TaperSolution { degree, fell_back: true }
}

/// Inputs a shape needs to place one stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageSlot {
    pub band_top: Px,
    pub total_value: f64,
    pub segment_count: usize,
}

impl From<&Stage> for StageSlot {
    fn from(stage: &Stage) -> Self {
        Self {
            band_top: stage.band_top,
            total_value: stage.total_value,
            segment_count: stage.segments.len(),
        }
    }
}

/// Horizontal extent of one stage within the funnel envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageEnvelope {
    /// Inset from the envelope's left edge
    pub x_offset: Px,
    /// Segment widths plus paddings
    pub width: Px,
}

#[enum_dispatch]
pub trait EnvelopeShape {
    fn stage_envelope(&self, slot: &StageSlot) -> StageEnvelope;
}

/// Symmetric taper by a fixed angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleTaper {
    pub degree: Degrees,
    pub margin: Px,
    pub funnel_width: Px,
}

impl EnvelopeShape for AngleTaper {
    fn stage_envelope(&self, slot: &StageSlot) -> StageEnvelope {
        let offset = offset_at(self.degree, slot.band_top, self.margin);
        StageEnvelope { x_offset: offset, width: self.funnel_width - offset * 2.0 }
    }
}

/// Centred bars whose width is proportional to the stage total
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProportionalBars {
    /// Largest stage total; that stage spans the whole envelope
    pub max_total: f64,
    pub margin: Px,
    pub funnel_width: Px,
    pub bar_padding: Px,
}

impl EnvelopeShape for ProportionalBars {
    fn stage_envelope(&self, slot: &StageSlot) -> StageEnvelope {
        let share = if self.max_total > 0.0 { slot.total_value / self.max_total } else { 0.0 };
        let bars = (self.funnel_width * share - self.margin * 2.0).max(Px::ZERO);
        let width = bars + self.bar_padding * slot.segment_count.saturating_sub(1) as f64;
        StageEnvelope { x_offset: (self.funnel_width - width) / 2.0, width }
    }
}

#[enum_dispatch(EnvelopeShape)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FunnelShape {
    AngleTaper,
    ProportionalBars,
}

impl FunnelShape {
    /// Build the shape for `funnel.shape_mode`, running the solver in angle mode
    pub fn for_stages(stages: &[Stage], funnel: &FunnelSettings, params: &TaperParams) -> (Self, TaperSolution) {
        match funnel.shape_mode {
            ShapeMode::Angle => {
                let solution = solve_taper(stages, funnel.degree(), params);
                let shape = AngleTaper {
                    degree: solution.degree,
                    margin: params.margin,
                    funnel_width: params.envelope,
                };
                (shape.into(), solution)
            }
            ShapeMode::Stage => {
                let max_total = stages.iter().map(|s| s.total_value).fold(0.0, f64::max);
                let shape = ProportionalBars {
                    max_total,
                    margin: params.margin,
                    funnel_width: params.envelope,
                    bar_padding: params.bar_padding,
                };
                (shape.into(), TaperSolution { degree: funnel.degree(), fell_back: false })
            }
        }
    }
}
