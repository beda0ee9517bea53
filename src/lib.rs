//! Layout and geometry engine for tapered, multi-status funnel charts.
//!
//! Give it a table of (stage, status, value) rows, the host settings, the
//! viewport size and a way to measure text; get back pixel rectangles for
//! every segment, fitted label text and the taper angle actually used.
//!
//! ```
//! use funnelgeo::{ColumnRoles, DataTable, FixedWidthMeasurer, Row, Settings, Viewport};
//!
//! let table = DataTable::new(
//!     ColumnRoles::new("Stage", Some("Status"), "Count"),
//!     vec![
//!         Row::new("Visited", Some("web"), 120.0),
//!         Row::new("Visited", Some("store"), 80.0),
//!         Row::new("Bought", Some("web"), 30.0),
//!     ],
//! );
//! let model = funnelgeo::layout(
//!     &table,
//!     &Settings::default(),
//!     Viewport::new(640.0, 360.0),
//!     &FixedWidthMeasurer::new(7.0),
//! )?;
//! assert_eq!(model.stages.len(), 2);
//! assert_eq!(model.stages[0].segments.len(), 2);
//! # Ok::<(), funnelgeo::FunnelError>(())
//! ```

pub mod aggregate;
pub mod data;
pub mod errors;
pub mod format;
pub mod layout;
pub mod legend;
pub mod log;
pub mod model;
pub mod settings;
pub mod text;
pub mod types;

pub use data::{CellValue, ColumnRoles, DataTable, GroupingMode, Row};
pub use errors::{ColumnRole, FunnelError, SettingsError};
pub use layout::{LabelAnchor, LayoutModel, TextAlign};
pub use legend::{LegendEntry, legend_entries};
pub use model::{PxRect, Segment, Stage, TooltipItem};
pub use settings::{Settings, ShapeMode};
pub use text::{FixedWidthMeasurer, FontSpec, ProportionalMeasurer, TextMeasurer};
pub use types::{Color, Degrees, Px, Viewport};

/// Lay out a funnel chart.
///
/// Input that can't be drawn at all (a missing stage or value column, an
/// empty table, a zero-sized viewport) yields an empty model rather than an
/// error. Non-finite settings are still reported.
pub fn layout<M: TextMeasurer + ?Sized>(
    table: &DataTable,
    settings: &Settings,
    viewport: Viewport,
    measurer: &M,
) -> Result<LayoutModel, FunnelError> {
    match layout::compute(table, settings, viewport, measurer) {
        Err(err) if err.yields_empty_model() => {
            log::debug!(reason = %err, "recompute short-circuited");
            Ok(LayoutModel::empty(settings))
        }
        result => result,
    }
}

/// Like [`layout`], but reports why nothing could be laid out.
pub fn try_layout<M: TextMeasurer + ?Sized>(
    table: &DataTable,
    settings: &Settings,
    viewport: Viewport,
    measurer: &M,
) -> Result<LayoutModel, FunnelError> {
    layout::compute(table, settings, viewport, measurer)
}
