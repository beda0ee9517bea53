//! Error types with diagnostics using miette
//!
//! Most geometric trouble is absorbed by the layout itself (taper fallback,
//! best-effort allocation). What remains here is input that cannot be laid
//! out at all, and settings outside the ranges the host property pane allows.

use miette::Diagnostic;
use thiserror::Error;

use crate::types::NumericError;

// ============================================================================
// Layout Errors
// ============================================================================

/// Errors that stop a recompute before any geometry is produced
#[derive(Error, Diagnostic, Debug)]
pub enum FunnelError {
    #[error("no column is bound to the {role} role")]
    #[diagnostic(
        code(funnelgeo::input::missing_column),
        help("a funnel needs both a stage column and a value column")
    )]
    MissingRequiredColumn { role: ColumnRole },

    #[error("degenerate geometry: {reason}")]
    #[diagnostic(code(funnelgeo::layout::degenerate_geometry))]
    DegenerateGeometry { reason: &'static str },

    #[error("invalid settings")]
    #[diagnostic(code(funnelgeo::settings::invalid))]
    InvalidSettings(#[from] SettingsError),
}

impl FunnelError {
    /// Errors the public entry point turns into an empty model
    pub fn yields_empty_model(&self) -> bool {
        matches!(
            self,
            FunnelError::MissingRequiredColumn { .. } | FunnelError::DegenerateGeometry { .. }
        )
    }
}

/// Column roles the host binds data to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Stage,
    Value,
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnRole::Stage => write!(f, "stage"),
            ColumnRole::Value => write!(f, "value"),
        }
    }
}

// ============================================================================
// Settings Errors
// ============================================================================

/// Errors found while validating a settings object
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("{field} = {value} is outside {min}..={max}")]
    #[diagnostic(
        code(funnelgeo::settings::out_of_range),
        help("use Settings::clamped() to pull values into range")
    )]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} is not a usable number: {source}")]
    #[diagnostic(code(funnelgeo::settings::non_finite))]
    NonFinite {
        field: &'static str,
        #[source]
        source: NumericError,
    },

    #[error("unknown funnel shape mode: {value}")]
    #[diagnostic(
        code(funnelgeo::settings::unknown_shape_mode),
        help("expected \"angle\" or \"stage\"")
    )]
    UnknownShapeMode { value: String },

    #[error("{count} settings are out of range")]
    #[diagnostic(code(funnelgeo::settings::many))]
    Many {
        count: usize,
        #[related]
        errors: Vec<SettingsError>,
    },
}

impl SettingsError {
    /// Fold a list of problems into a single error, if there are any
    pub fn collect(mut errors: Vec<SettingsError>) -> Result<(), SettingsError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            count => Err(SettingsError::Many { count, errors }),
        }
    }
}
