//! Host settings object: defaults, ranges, and deserialization
//!
//! Field names follow the host's camelCase property layout so a settings
//! JSON blob can be deserialized directly; anything missing falls back to
//! the defaults below.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Deserialize;

use crate::errors::SettingsError;
use crate::text::FontSpec;
use crate::types::{Color, Degrees, Px};

const DEFAULT_FONT_FAMILY: &str = "'Segoe UI', wf_segoe-ui_normal, helvetica, arial, sans-serif";

/// Font and fill shared by every label kind
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: String,
    /// Point size
    pub text_size: f64,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            text_size: 10.0,
            color: Color::rgb(0x33, 0x33, 0x33),
            bold: false,
            italic: false,
        }
    }
}

impl TextStyle {
    pub fn font(&self) -> FontSpec {
        FontSpec {
            family: self.font_family.clone(),
            size_pt: self.text_size,
            bold: self.bold,
            italic: self.italic,
        }
    }
}

/// Stage name column
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StageLabelSettings {
    #[serde(flatten)]
    pub style: TextStyle,
    /// Upper bound on the label column, in percent of total width
    pub max_width_pct: f64,
    pub margin: f64,
}

impl Default for StageLabelSettings {
    fn default() -> Self {
        Self { style: TextStyle::default(), max_width_pct: 30.0, margin: 0.0 }
    }
}

/// Stage total column
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValueLabelSettings {
    #[serde(flatten)]
    pub style: TextStyle,
    pub max_width_pct: f64,
    pub margin: f64,
    pub display_unit: f64,
    pub decimal_places: f64,
    pub show: bool,
}

impl Default for ValueLabelSettings {
    fn default() -> Self {
        Self {
            style: TextStyle::default(),
            max_width_pct: 30.0,
            margin: 0.0,
            display_unit: 0.0,
            decimal_places: 0.0,
            show: true,
        }
    }
}

/// Labels drawn on the segments themselves
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatusSettings {
    #[serde(flatten)]
    pub style: TextStyle,
    pub display_unit: f64,
    pub decimal_places: f64,
    pub show: bool,
    /// Show the formatted value instead of the status name
    pub value_on_bar: bool,
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            style: TextStyle::default(),
            display_unit: 0.0,
            decimal_places: 0.0,
            show: true,
            value_on_bar: false,
        }
    }
}

/// How each stage's bar width is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum ShapeMode {
    /// Straight-sided taper driven by `degree`
    #[default]
    Angle,
    /// Bar width proportional to the stage total
    Stage,
}

impl FromStr for ShapeMode {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "angle" => Ok(ShapeMode::Angle),
            "stage" => Ok(ShapeMode::Stage),
            _ => Err(SettingsError::UnknownShapeMode { value: s.to_string() }),
        }
    }
}

impl TryFrom<String> for ShapeMode {
    type Error = SettingsError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FunnelSettings {
    pub shape_mode: ShapeMode,
    /// Horizontal gap between segments of one stage
    pub bar_padding_px: f64,
    /// Gap between stage rows, in percent of the band step
    pub vertical_padding_pct: f64,
    pub degree: f64,
    pub margin: f64,
    /// Minimum segment width, in percent of the funnel envelope
    pub min_bar_width_pct: f64,
    pub min_bar_height_px: f64,
    /// Lay stages out bottom-to-top
    pub invert: bool,
    /// Put stage labels on the right and value labels on the left
    pub mirror_labels: bool,
    /// Funnel width in percent of the space left by the label columns
    pub scale: f64,
}

impl Default for FunnelSettings {
    fn default() -> Self {
        Self {
            shape_mode: ShapeMode::Angle,
            bar_padding_px: 5.0,
            vertical_padding_pct: 25.0,
            degree: 30.0,
            margin: 30.0,
            min_bar_width_pct: 15.0,
            min_bar_height_px: 30.0,
            invert: false,
            mirror_labels: false,
            scale: 100.0,
        }
    }
}

impl FunnelSettings {
    pub fn bar_padding(&self) -> Px {
        Px(self.bar_padding_px)
    }

    pub fn margin(&self) -> Px {
        Px(self.margin)
    }

    pub fn degree(&self) -> Degrees {
        Degrees(self.degree)
    }

    pub fn min_bar_width_fraction(&self) -> f64 {
        self.min_bar_width_pct / 100.0
    }
}

/// Pins one status in one stage to a color
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorOverride {
    pub stage: String,
    pub status: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataColorSettings {
    pub default_color: Color,
    pub show_all_in_legend: bool,
    /// Per-status defaults
    pub status_colors: HashMap<String, Color>,
    /// Per stage+status overrides
    pub overrides: Vec<ColorOverride>,
}

impl Default for DataColorSettings {
    fn default() -> Self {
        Self {
            default_color: Color::rgb(0x01, 0xb8, 0xaa),
            show_all_in_legend: false,
            status_colors: HashMap::new(),
            overrides: Vec::new(),
        }
    }
}

impl DataColorSettings {
    /// Resolve a segment color: stage+status override, then the row's own
    /// override, then the per-status default, then the global default.
    pub fn resolve(&self, stage: &str, status: &str, row_override: Option<&Color>) -> Color {
        self.overrides
            .iter()
            .find(|o| o.stage == stage && o.status == status)
            .map(|o| &o.color)
            .or(row_override)
            .or_else(|| self.status_colors.get(status))
            .unwrap_or(&self.default_color)
            .clone()
    }
}

/// Complete settings object
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub stage_label: StageLabelSettings,
    pub value_label: ValueLabelSettings,
    pub status: StatusSettings,
    pub funnel: FunnelSettings,
    pub data_colors: DataColorSettings,
}

/// Inclusive range the host property pane enforces for a numeric field
struct Range {
    field: &'static str,
    min: f64,
    max: f64,
}

const fn range(field: &'static str, min: f64, max: f64) -> Range {
    Range { field, min, max }
}

impl Settings {
    /// Numeric field values paired with their allowed ranges
    fn ranged_values(&self) -> [(Range, f64); 15] {
        [
            (range("stageLabel.textSize", 1.0, 72.0), self.stage_label.style.text_size),
            (range("stageLabel.maxWidthPct", 15.0, 100.0), self.stage_label.max_width_pct),
            (range("stageLabel.margin", 0.0, 25.0), self.stage_label.margin),
            (range("valueLabel.textSize", 1.0, 72.0), self.value_label.style.text_size),
            (range("valueLabel.maxWidthPct", 15.0, 30.0), self.value_label.max_width_pct),
            (range("valueLabel.margin", 0.0, 25.0), self.value_label.margin),
            (range("valueLabel.decimalPlaces", 0.0, 9.0), self.value_label.decimal_places),
            (range("status.decimalPlaces", 0.0, 9.0), self.status.decimal_places),
            (range("funnel.barPaddingPx", 0.0, 30.0), self.funnel.bar_padding_px),
            (range("funnel.verticalPaddingPct", 0.0, 50.0), self.funnel.vertical_padding_pct),
            (range("funnel.degree", 10.0, 45.0), self.funnel.degree),
            (range("funnel.margin", 5.0, 30.0), self.funnel.margin),
            (range("funnel.minBarWidthPct", 0.0, 50.0), self.funnel.min_bar_width_pct),
            (range("funnel.minBarHeightPx", 20.0, 100.0), self.funnel.min_bar_height_px),
            (range("funnel.scale", 10.0, 100.0), self.funnel.scale),
        ]
    }

    /// Mutable access to the ranged fields, for clamping
    fn ranged_fields(&mut self) -> [(Range, &mut f64); 15] {
        [
            (range("stageLabel.textSize", 1.0, 72.0), &mut self.stage_label.style.text_size),
            (range("stageLabel.maxWidthPct", 15.0, 100.0), &mut self.stage_label.max_width_pct),
            (range("stageLabel.margin", 0.0, 25.0), &mut self.stage_label.margin),
            (range("valueLabel.textSize", 1.0, 72.0), &mut self.value_label.style.text_size),
            (range("valueLabel.maxWidthPct", 15.0, 30.0), &mut self.value_label.max_width_pct),
            (range("valueLabel.margin", 0.0, 25.0), &mut self.value_label.margin),
            (range("valueLabel.decimalPlaces", 0.0, 9.0), &mut self.value_label.decimal_places),
            (range("status.decimalPlaces", 0.0, 9.0), &mut self.status.decimal_places),
            (range("funnel.barPaddingPx", 0.0, 30.0), &mut self.funnel.bar_padding_px),
            (range("funnel.verticalPaddingPct", 0.0, 50.0), &mut self.funnel.vertical_padding_pct),
            (range("funnel.degree", 10.0, 45.0), &mut self.funnel.degree),
            (range("funnel.margin", 5.0, 30.0), &mut self.funnel.margin),
            (range("funnel.minBarWidthPct", 0.0, 50.0), &mut self.funnel.min_bar_width_pct),
            (range("funnel.minBarHeightPx", 20.0, 100.0), &mut self.funnel.min_bar_height_px),
            (range("funnel.scale", 10.0, 100.0), &mut self.funnel.scale),
        ]
    }

    /// Reject NaN/infinite numbers; those can't be laid out at all.
    pub fn check_finite(&self) -> Result<(), SettingsError> {
        let mut errors = Vec::new();
        let units = [
            ("valueLabel.displayUnit", self.value_label.display_unit),
            ("status.displayUnit", self.status.display_unit),
        ];
        for (field, value) in units {
            if let Err(source) = Px::try_new(value) {
                errors.push(SettingsError::NonFinite { field, source });
            }
        }
        for (r, value) in self.ranged_values() {
            if let Err(source) = Px::try_new(value) {
                errors.push(SettingsError::NonFinite { field: r.field, source });
            }
        }
        SettingsError::collect(errors)
    }

    /// Report every value outside the range the host allows.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.check_finite()?;
        let errors = self
            .ranged_values()
            .into_iter()
            .filter(|(r, value)| *value < r.min || *value > r.max)
            .map(|(r, value)| SettingsError::OutOfRange {
                field: r.field,
                value,
                min: r.min,
                max: r.max,
            })
            .collect();
        SettingsError::collect(errors)
    }

    /// Copy with every ranged value pulled into its allowed range.
    pub fn clamped(&self) -> Settings {
        let mut copy = self.clone();
        for (r, value) in copy.ranged_fields() {
            if value.is_nan() {
                *value = r.min;
            }
            *value = value.clamp(r.min, r.max);
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NumericError;

    #[test]
    fn defaults_validate() {
        assert_eq!(Settings::default().validate(), Ok(()));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r##"{
            "funnel": { "shapeMode": "stage", "degree": 40, "invert": true },
            "stageLabel": { "fontFamily": "Arial", "maxWidthPct": 20 },
            "dataColors": { "defaultColor": "#ff0000", "statusColors": { "won": "#00ff00" } }
        }"##;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.funnel.shape_mode, ShapeMode::Stage);
        assert_eq!(settings.funnel.degree, 40.0);
        assert!(settings.funnel.invert);
        assert_eq!(settings.funnel.bar_padding_px, 5.0);
        assert_eq!(settings.stage_label.style.font_family, "Arial");
        assert_eq!(settings.stage_label.style.text_size, 10.0);
        assert_eq!(settings.stage_label.max_width_pct, 20.0);
        assert_eq!(settings.data_colors.default_color, Color::rgb(255, 0, 0));
        assert_eq!(settings.data_colors.status_colors["won"], Color::rgb(0, 255, 0));
    }

    #[test]
    fn unknown_shape_mode_is_rejected() {
        let json = r#"{ "funnel": { "shapeMode": "cone" } }"#;
        assert!(serde_json::from_str::<Settings>(json).is_err());
        assert_eq!(
            "cone".parse::<ShapeMode>(),
            Err(SettingsError::UnknownShapeMode { value: "cone".into() })
        );
    }

    #[test]
    fn validate_reports_every_violation() {
        let mut settings = Settings::default();
        settings.funnel.degree = 60.0;
        settings.funnel.scale = 5.0;
        match settings.validate() {
            Err(SettingsError::Many { count, .. }) => assert_eq!(count, 2),
            other => panic!("expected two violations, got {:?}", other),
        }
        settings.funnel.scale = 50.0;
        assert_eq!(
            settings.validate(),
            Err(SettingsError::OutOfRange { field: "funnel.degree", value: 60.0, min: 10.0, max: 45.0 })
        );
    }

    #[test]
    fn range_tables_agree() {
        let mut settings = Settings::default();
        settings.funnel.degree = 33.0;
        settings.value_label.margin = 7.0;
        let read: Vec<_> = settings.ranged_values().iter().map(|(r, v)| (r.field, r.min, r.max, *v)).collect();
        let written: Vec<_> = settings
            .ranged_fields()
            .into_iter()
            .map(|(r, v)| (r.field, r.min, r.max, *v))
            .collect();
        assert_eq!(read, written);
    }

    #[test]
    fn validate_leaves_settings_untouched() {
        let mut settings = Settings::default();
        settings.funnel.degree = 90.0;
        settings.funnel.min_bar_width_pct = f64::NAN;
        assert!(matches!(settings.check_finite(), Err(SettingsError::NonFinite { .. })));
        assert!(settings.validate().is_err());
        assert_eq!(settings.funnel.degree, 90.0);
        assert!(settings.funnel.min_bar_width_pct.is_nan());
    }

    #[test]
    fn clamped_pulls_into_range() {
        let mut settings = Settings::default();
        settings.funnel.degree = 90.0;
        settings.funnel.margin = 0.0;
        settings.funnel.min_bar_width_pct = f64::NAN;
        let clamped = settings.clamped();
        assert_eq!(clamped.funnel.degree, 45.0);
        assert_eq!(clamped.funnel.margin, 5.0);
        assert_eq!(clamped.funnel.min_bar_width_pct, 0.0);
        assert_eq!(clamped.validate(), Ok(()));
    }

    #[test]
    fn non_finite_is_caught() {
        let mut settings = Settings::default();
        settings.funnel.bar_padding_px = f64::INFINITY;
        assert_eq!(
            settings.check_finite(),
            Err(SettingsError::NonFinite { field: "funnel.barPaddingPx", source: NumericError::Infinite })
        );
    }

    #[test]
    fn color_precedence() {
        let mut colors = DataColorSettings::default();
        colors.status_colors.insert("won".into(), Color::rgb(0, 255, 0));
        colors.overrides.push(ColorOverride {
            stage: "Q1".into(),
            status: "won".into(),
            color: Color::rgb(0, 0, 255),
        });
        let row = Color::rgb(9, 9, 9);
        assert_eq!(colors.resolve("Q1", "won", Some(&row)), Color::rgb(0, 0, 255));
        assert_eq!(colors.resolve("Q2", "won", Some(&row)), row);
        assert_eq!(colors.resolve("Q2", "won", None), Color::rgb(0, 255, 0));
        assert_eq!(colors.resolve("Q2", "lost", None), Color::rgb(0x01, 0xb8, 0xaa));
    }
}
