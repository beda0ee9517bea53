//! Fixed layout constants (not exposed as host settings)

use crate::types::Px;

/// Padding above the first and below the last band, as a fraction of the band step
pub const OUTER_PADDING: f64 = 0.05;
/// Share of the viewport height the bands may use before overflowing
pub const USABLE_HEIGHT: f64 = 0.95;
/// Bands never grow taller than usable height / this divisor
pub const MAX_HEIGHT_DIVISOR: f64 = 3.0;
/// Bands start this far below the top edge
pub const TOP_INSET: Px = Px(5.0);
/// Where leftover vertical space goes (0.5 = centred)
pub const BAND_ALIGN: f64 = 0.5;
/// Gap between the stage label column and the funnel
pub const STAGE_LABEL_GAP: Px = Px(5.0);
