//! Layout pipeline: aggregated stages in, pixel geometry and fitted labels out
//!
//! One recompute runs aggregate, label measurement, columns, bands, taper,
//! allocation and label fitting in that order. Nothing is cached between
//! calls; the same inputs always produce the same [`LayoutModel`].

pub mod allocate;
pub mod bands;
pub mod columns;
pub mod defaults;
pub mod taper;

use crate::aggregate::aggregate;
use crate::data::DataTable;
use crate::errors::FunnelError;
use crate::log::debug;
use crate::model::{PxRect, Stage};
use crate::settings::Settings;
use crate::text::{FontSpec, Overflow, TextMeasurer, fit};
use crate::types::{Degrees, Px, Viewport};

pub use allocate::{Allocation, SegmentSpan, allocate_values, allocate_widths};
pub use bands::{Band, BandConfig, BandLayout, layout_stages};
pub use columns::{Columns, LabelAnchor, TextAlign, layout_columns};
pub use taper::{
    AngleTaper, EnvelopeShape, FunnelShape, ProportionalBars, StageEnvelope, StageSlot, TaperParams,
    TaperSolution, offset_at, solve_taper,
};

/// Everything a renderer needs to draw the funnel
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutModel {
    /// In input order; screen order is reversed when inverted
    pub stages: Vec<Stage>,
    pub max_stage_label_width: Px,
    pub max_value_label_width: Px,
    pub vertical_extent_pixels: Px,
    pub horizontal_extent_pixels: Px,
    /// Taper angle actually used
    pub chosen_degree: Degrees,
    pub configured_degree: Degrees,
    /// Left edge of the funnel envelope
    pub status_bar_x1: Px,
    /// Right edge of the funnel envelope
    pub status_bar_x2: Px,
    pub min_bar_width: Px,
    pub stage_label_anchor: LabelAnchor,
    pub value_label_anchor: Option<LabelAnchor>,
    /// Content is taller than the viewport
    pub vertical_overflow: bool,
    /// Content is wider than the viewport
    pub horizontal_overflow: bool,
}

impl LayoutModel {
    /// Model with no stages, returned when there is nothing to lay out
    pub fn empty(settings: &Settings) -> Self {
        let degree = settings.funnel.degree();
        Self {
            stages: Vec::new(),
            max_stage_label_width: Px::ZERO,
            max_value_label_width: Px::ZERO,
            vertical_extent_pixels: Px::ZERO,
            horizontal_extent_pixels: Px::ZERO,
            chosen_degree: degree,
            configured_degree: degree,
            status_bar_x1: Px::ZERO,
            status_bar_x2: Px::ZERO,
            min_bar_width: Px::ZERO,
            stage_label_anchor: LabelAnchor { x: Px::ZERO, align: TextAlign::End },
            value_label_anchor: None,
            vertical_overflow: false,
            horizontal_overflow: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn funnel_width(&self) -> Px {
        (self.status_bar_x2 - self.status_bar_x1).max(Px::ZERO)
    }

    /// The taper solver lowered the configured angle
    pub fn taper_fell_back(&self) -> bool {
        self.chosen_degree != self.configured_degree
    }

    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }
}

/// Run the full recompute.
///
/// Missing columns, an undrawable viewport and an empty stage list come
/// back as errors here; [`crate::layout()`] turns those into an empty model.
pub fn compute<M: TextMeasurer + ?Sized>(
    table: &DataTable,
    settings: &Settings,
    viewport: Viewport,
    measurer: &M,
) -> Result<LayoutModel, FunnelError> {
    settings.check_finite()?;
    if !viewport.is_drawable() {
        return Err(FunnelError::DegenerateGeometry { reason: "viewport has no drawable area" });
    }

    let mut stages = aggregate(table, settings)?;
    if stages.is_empty() {
        return Err(FunnelError::DegenerateGeometry { reason: "no stages to lay out" });
    }

    let max_stage_label = widest(measurer, stages.iter().map(|s| s.name.as_str()), &settings.stage_label.style.font());
    let max_value_label = if settings.value_label.show {
        widest(measurer, stages.iter().map(|s| s.formatted_total.as_str()), &settings.value_label.style.font())
    } else {
        Px::ZERO
    };

    let columns = layout_columns(viewport.width, max_stage_label, max_value_label, settings);
    if columns.overflowed {
        debug!(width = columns.total_width.raw(), "funnel wider than the viewport");
    }
    let funnel_width = columns.funnel_width();
    if funnel_width <= Px::ZERO {
        return Err(FunnelError::DegenerateGeometry { reason: "label columns leave no room for the funnel" });
    }

    let bands = layout_stages(stages.len(), viewport.height, &BandConfig::from_settings(&settings.funnel));
    for (stage, band) in stages.iter_mut().zip(&bands.bands) {
        stage.band_top = band.top;
        stage.band_height = band.height;
    }

    let params = TaperParams::new(funnel_width, &settings.funnel);
    let (shape, solution) = FunnelShape::for_stages(&stages, &settings.funnel, &params);
    let min_bar_width = params.min_bar_width();
    for stage in &mut stages {
        place_stage(stage, &shape, &params, columns.status_bar_x1);
    }

    fit_labels(&mut stages, &columns, settings, measurer);

    Ok(LayoutModel {
        stages,
        max_stage_label_width: max_stage_label,
        max_value_label_width: max_value_label,
        vertical_extent_pixels: bands.extent,
        horizontal_extent_pixels: columns.total_width,
        chosen_degree: solution.degree,
        configured_degree: settings.funnel.degree(),
        status_bar_x1: columns.status_bar_x1,
        status_bar_x2: columns.status_bar_x2,
        min_bar_width,
        stage_label_anchor: columns.stage_anchor,
        value_label_anchor: columns.value_anchor,
        vertical_overflow: bands.overflowed,
        horizontal_overflow: columns.overflowed,
    })
}

fn widest<'a, M: TextMeasurer + ?Sized>(
    measurer: &M,
    labels: impl Iterator<Item = &'a str>,
    font: &FontSpec,
) -> Px {
    labels.map(|label| measurer.measure_width(label, font)).fold(Px::ZERO, Px::max)
}

/// Horizontal geometry of one stage and its segments
fn place_stage(stage: &mut Stage, shape: &FunnelShape, params: &TaperParams, envelope_left: Px) {
    let envelope = shape.stage_envelope(&StageSlot::from(&*stage));
    stage.x_offset = envelope.x_offset;
    stage.envelope_width = envelope.width;

    if stage.is_degenerate() {
        stage.segments.clear();
        return;
    }

    let allocation = allocate_widths(stage, envelope.width, params.bar_padding, params.min_bar_width());
    if allocation.forced_width > Px::ZERO {
        debug!(stage = %stage.name, forced = allocation.forced_width.raw(), "segments pinned to minimum width");
    }

    let left = envelope_left + envelope.x_offset;
    let (top, height) = (stage.band_top, stage.band_height);
    for (segment, span) in stage.segments.iter_mut().zip(&allocation.spans) {
        segment.pixel_x = span.x;
        segment.pixel_width = span.width;
        segment.forced = span.forced;
        segment.effective_value = span.effective_value;
        segment.rect = PxRect::new(left + span.x, top, span.width, height);
    }
}

fn fit_labels<M: TextMeasurer + ?Sized>(
    stages: &mut [Stage],
    columns: &Columns,
    settings: &Settings,
    measurer: &M,
) {
    let stage_font = settings.stage_label.style.font();
    let value_font = settings.value_label.style.font();
    let status_font = settings.status.style.font();
    let status = &settings.status;

    for stage in stages {
        stage.label_text =
            fit(measurer, &stage.name, &stage_font, columns.stage_label_budget, Overflow::Ellipsis);
        if settings.value_label.show {
            stage.value_label_text = fit(
                measurer,
                &stage.formatted_total,
                &value_font,
                columns.value_label_budget,
                Overflow::Ellipsis,
            );
        }
        if !status.show {
            continue;
        }
        for segment in &mut stage.segments {
            let text = if status.value_on_bar { &segment.formatted_value } else { &segment.status_key };
            segment.label_text = fit(measurer, text, &status_font, segment.pixel_width, Overflow::Suppress);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ColumnRoles, Row};
    use crate::settings::ShapeMode;
    use crate::text::FixedWidthMeasurer;

    fn table(rows: Vec<Row>) -> DataTable {
        DataTable::new(ColumnRoles::new("Stage", Some("Status"), "Count"), rows)
    }

    fn pipeline() -> DataTable {
        table(vec![
            Row::new("Visited", Some("web"), 600.0),
            Row::new("Visited", Some("store"), 400.0),
            Row::new("Signed up", Some("web"), 300.0),
            Row::new("Signed up", Some("store"), 100.0),
            Row::new("Purchased", Some("web"), 50.0),
            Row::new("Purchased", Some("store"), 5.0),
        ])
    }

    fn measurer() -> FixedWidthMeasurer {
        FixedWidthMeasurer::new(6.0)
    }

    #[test]
    fn segments_stay_inside_their_stage() {
        let model = compute(&pipeline(), &Settings::default(), Viewport::new(800.0, 500.0), &measurer()).unwrap();
        assert_eq!(model.stages.len(), 3);
        for stage in &model.stages {
            let left = model.status_bar_x1 + stage.x_offset;
            let right = left + stage.envelope_width;
            for segment in &stage.segments {
                assert!(segment.rect.origin.x >= left.raw() - 1e-9);
                assert!(segment.rect.right() <= right.raw() + 1e-9);
                assert_eq!(segment.rect.origin.y, stage.band_top.raw());
                assert_eq!(segment.rect.size.y, stage.band_height.raw());
            }
        }
    }

    #[test]
    fn deeper_stages_are_narrower() {
        let model = compute(&pipeline(), &Settings::default(), Viewport::new(800.0, 500.0), &measurer()).unwrap();
        let widths: Vec<Px> = model.stages.iter().map(|s| s.envelope_width).collect();
        assert!(widths.windows(2).all(|w| w[0] > w[1]), "{widths:?}");
    }

    #[test]
    fn small_segment_is_pinned() {
        let model = compute(&pipeline(), &Settings::default(), Viewport::new(800.0, 500.0), &measurer()).unwrap();
        let purchased = model.stage("Purchased").unwrap();
        let store = &purchased.segments[1];
        assert!(store.forced);
        assert_eq!(store.pixel_width, model.min_bar_width);
        assert!(store.effective_value > store.value);
    }

    #[test]
    fn stage_mode_keeps_configured_degree() {
        let mut settings = Settings::default();
        settings.funnel.shape_mode = ShapeMode::Stage;
        settings.funnel.degree = 45.0;
        settings.funnel.margin = 5.0;
        let model = compute(&pipeline(), &settings, Viewport::new(300.0, 900.0), &measurer()).unwrap();
        assert_eq!(model.chosen_degree, Degrees(45.0));
        assert!(!model.taper_fell_back());
        let first = &model.stages[0];
        let centre = first.x_offset + first.envelope_width / 2.0;
        assert!((centre.raw() - model.funnel_width().raw() / 2.0).abs() < 1e-9);
    }

    #[test]
    fn labels_fit_their_budgets() {
        let model = compute(&pipeline(), &Settings::default(), Viewport::new(800.0, 500.0), &measurer()).unwrap();
        let m = measurer();
        let settings = Settings::default();
        let stage_font = settings.stage_label.style.font();
        let status_font = settings.status.style.font();
        for stage in &model.stages {
            assert!(m.measure_width(&stage.label_text, &stage_font) <= model.max_stage_label_width.ceil());
            for segment in &stage.segments {
                assert!(m.measure_width(&segment.label_text, &status_font) <= segment.pixel_width);
            }
        }
        assert_eq!(model.stages[0].value_label_text, "1K");
    }

    #[test]
    fn nothing_to_lay_out_is_degenerate() {
        let err = compute(&table(vec![]), &Settings::default(), Viewport::new(800.0, 500.0), &measurer());
        assert!(matches!(err, Err(FunnelError::DegenerateGeometry { .. })));
        let err = compute(&pipeline(), &Settings::default(), Viewport::new(0.0, 500.0), &measurer());
        assert!(matches!(err, Err(FunnelError::DegenerateGeometry { .. })));
    }

    #[test]
    fn non_finite_settings_are_rejected() {
        let mut settings = Settings::default();
        settings.funnel.margin = f64::NAN;
        let err = compute(&pipeline(), &settings, Viewport::new(800.0, 500.0), &measurer());
        assert!(matches!(err, Err(FunnelError::InvalidSettings(_))));
    }
}
