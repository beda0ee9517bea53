//! Legend entries for the host's color/legend pane

use std::collections::HashSet;

use crate::layout::LayoutModel;
use crate::settings::Settings;
use crate::types::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub display_name: String,
    pub color: Color,
    /// Stable key the host uses to route color edits back to this entry
    pub selector: String,
}

impl LegendEntry {
    fn status(key: &str, color: &Color) -> Self {
        Self { display_name: key.to_string(), color: color.clone(), selector: format!("status:{key}") }
    }

    fn segment(stage: &str, key: &str, color: &Color) -> Self {
        Self {
            display_name: key.to_string(),
            color: color.clone(),
            selector: format!("stage:{stage}/status:{key}"),
        }
    }
}

/// One entry per distinct status in first-seen order, or one per segment
/// when `dataColors.showAllInLegend` is set.
pub fn legend_entries(model: &LayoutModel, settings: &Settings) -> Vec<LegendEntry> {
    let segments = model
        .stages
        .iter()
        .flat_map(|stage| stage.segments.iter().map(move |segment| (stage, segment)));

    if settings.data_colors.show_all_in_legend {
        return segments
            .map(|(stage, segment)| LegendEntry::segment(&stage.name, &segment.status_key, &segment.color))
            .collect();
    }

    let mut seen = HashSet::new();
    segments
        .filter(|(_, segment)| seen.insert(segment.status_key.as_str()))
        .map(|(_, segment)| LegendEntry::status(&segment.status_key, &segment.color))
        .collect()
}
