//! Aggregator: raw rows into stages and status segments
//!
//! Identity is exact key equality. Stages and segments keep first-seen
//! order; lookups go through a key -> position map next to the ordered
//! vector, and duplicates are merged into the existing entry.

use std::collections::HashMap;

use crate::data::{CellValue, DataTable, GroupingMode, Row};
use crate::errors::FunnelError;
use crate::format::{format_plain, format_value};
use crate::model::{Segment, Stage, TooltipItem};
use crate::settings::Settings;

/// A segment while rows are still being merged into it
struct PendingSegment<'a> {
    status: String,
    value: f64,
    /// First contributing row; supplies color override and tooltip extras
    first: &'a Row,
}

struct PendingStage<'a> {
    name: &'a str,
    segments: Vec<PendingSegment<'a>>,
    by_status: HashMap<String, usize>,
}

impl<'a> PendingStage<'a> {
    fn new(name: &'a str) -> Self {
        Self { name, segments: Vec::new(), by_status: HashMap::new() }
    }

    /// Append-or-update by status key
    fn add(&mut self, status: &str, value: f64, row: &'a Row) {
        match self.by_status.get(status) {
            Some(&pos) => self.segments[pos].value += value,
            None => {
                self.by_status.insert(status.to_string(), self.segments.len());
                self.segments.push(PendingSegment { status: status.to_string(), value, first: row });
            }
        }
    }
}

/// Ordered set of keys with position lookup
#[derive(Default)]
struct KeyOrder<'a> {
    keys: Vec<&'a str>,
    index: HashMap<&'a str, usize>,
}

impl<'a> KeyOrder<'a> {
    fn position_or_insert(&mut self, key: &'a str) -> usize {
        if let Some(&pos) = self.index.get(key) {
            return pos;
        }
        let pos = self.keys.len();
        self.keys.push(key);
        self.index.insert(key, pos);
        pos
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }
}

fn status_key<'a>(row: &'a Row, fallback: &'a str) -> &'a str {
    row.status.as_deref().unwrap_or(fallback)
}

/// Group the table's rows into stages.
///
/// Rows whose value is null (or doesn't coerce to a number) contribute no
/// segment. In [`GroupingMode::PreGrouped`] they still establish their
/// stage and status order; in [`GroupingMode::Flat`] they are ignored.
pub fn aggregate(table: &DataTable, settings: &Settings) -> Result<Vec<Stage>, FunnelError> {
    let (_, value_column) = table.columns.required()?;

    let mut stage_order = KeyOrder::default();
    let mut status_order = KeyOrder::default();
    let mut pending: Vec<PendingStage> = Vec::new();

    for row in &table.rows {
        let status = status_key(row, value_column);
        let value = row.value.as_number();
        if value.is_none() && table.mode == GroupingMode::Flat {
            continue;
        }

        let pos = stage_order.position_or_insert(&row.stage);
        if pos == pending.len() {
            pending.push(PendingStage::new(&row.stage));
        }
        status_order.position_or_insert(status);

        if let Some(value) = value {
            pending[pos].add(status, value, row);
        }
    }

    if table.mode == GroupingMode::PreGrouped {
        // Series order: a status stacks at the same rank in every stage
        for stage in &mut pending {
            stage.segments.sort_by_key(|s| status_order.position(&s.status));
        }
    }

    Ok(pending
        .into_iter()
        .enumerate()
        .map(|(id, p)| finish_stage(id, p, table, value_column, settings))
        .collect())
}

fn finish_stage(
    id: usize,
    pending: PendingStage<'_>,
    table: &DataTable,
    value_column: &str,
    settings: &Settings,
) -> Stage {
    let mut stage = Stage::new(id, pending.name);
    let status_settings = &settings.status;

    for (order_index, p) in pending.segments.into_iter().enumerate() {
        let color = settings.data_colors.resolve(pending.name, &p.status, p.first.color.as_ref());
        let mut segment = Segment::new(p.status, p.value, color, order_index);
        segment.formatted_value =
            format_value(p.value, status_settings.display_unit, status_settings.decimal_places);
        segment.tooltip = tooltip(table, value_column, pending.name, &segment, p.first);
        stage.total_value += p.value;
        stage.segments.push(segment);
    }

    stage.formatted_total = format_value(
        stage.total_value,
        settings.value_label.display_unit,
        settings.value_label.decimal_places,
    );
    stage
}

/// Stage, status and value first, then the tooltip columns verbatim
fn tooltip(
    table: &DataTable,
    value_column: &str,
    stage_name: &str,
    segment: &Segment,
    first: &Row,
) -> Vec<TooltipItem> {
    let columns = &table.columns;
    let mut items = Vec::with_capacity(3 + columns.tooltips.len());
    if let Some(stage_column) = &columns.stage {
        items.push(TooltipItem::new(stage_column.as_str(), stage_name));
    }
    if let Some(status_column) = &columns.status {
        items.push(TooltipItem::new(status_column.as_str(), segment.status_key.as_str()));
    }
    items.push(TooltipItem::new(value_column, format_plain(segment.value)));
    for (i, name) in columns.tooltips.iter().enumerate() {
        let cell = first.extras.get(i).cloned().unwrap_or(CellValue::Null);
        items.push(TooltipItem::new(name.as_str(), cell.display()));
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ColumnRoles;
    use crate::settings::ColorOverride;
    use crate::types::Color;

    fn columns() -> ColumnRoles {
        ColumnRoles::new("Stage", Some("Status"), "Count")
    }

    fn names(stages: &[Stage]) -> Vec<&str> {
        stages.iter().map(|s| s.name.as_str()).collect()
    }

    fn statuses(stage: &Stage) -> Vec<(&str, f64)> {
        stage.segments.iter().map(|s| (s.status_key.as_str(), s.value)).collect()
    }

    #[test]
    fn flat_rows_merge_by_key_in_first_seen_order() {
        let rows = vec![
            Row::new("Lead", Some("open"), 10.0),
            Row::new("Won", Some("closed"), 2.0),
            Row::new("Lead", Some("closed"), 5.0),
            Row::new("Lead", Some("open"), 3.0),
        ];
        let stages = aggregate(&DataTable::new(columns(), rows), &Settings::default()).unwrap();
        assert_eq!(names(&stages), ["Lead", "Won"]);
        assert_eq!(statuses(&stages[0]), [("open", 13.0), ("closed", 5.0)]);
        assert_eq!(stages[0].total_value, 18.0);
        assert_eq!(stages[1].id, 1);
        assert_eq!(stages[0].segments[1].order_index, 1);
    }

    #[test]
    fn null_values_contribute_no_segment() {
        let rows = vec![
            Row::new("Lead", Some("open"), 10.0),
            Row::new("Lead", Some("lost"), None::<f64>),
            Row::new("Ghost", Some("open"), "not a number"),
        ];
        let stages = aggregate(&DataTable::new(columns(), rows), &Settings::default()).unwrap();
        assert_eq!(names(&stages), ["Lead"]);
        assert_eq!(statuses(&stages[0]), [("open", 10.0)]);
    }

    #[test]
    fn pre_grouped_keeps_empty_stages_and_series_order() {
        let rows = vec![
            Row::new("Lead", Some("a"), None::<f64>),
            Row::new("Lead", Some("b"), 4.0),
            Row::new("Won", Some("b"), 1.0),
            Row::new("Won", Some("a"), 2.0),
            Row::new("Lost", Some("a"), None::<f64>),
        ];
        let table = DataTable::new(columns(), rows).grouped(GroupingMode::PreGrouped);
        let stages = aggregate(&table, &Settings::default()).unwrap();
        assert_eq!(names(&stages), ["Lead", "Won", "Lost"]);
        assert_eq!(statuses(&stages[0]), [("b", 4.0)]);
        // "a" was seen first globally, so it stacks first
        assert_eq!(statuses(&stages[1]), [("a", 2.0), ("b", 1.0)]);
        assert_eq!(stages[1].segments[0].order_index, 0);
        assert!(stages[2].segments.is_empty());
        assert!(stages[2].is_degenerate());
    }

    #[test]
    fn missing_status_column_uses_value_column_name() {
        let cols = ColumnRoles::new("Stage", None, "Count");
        let rows = vec![Row::new("Lead", None, 100.0)];
        let stages = aggregate(&DataTable::new(cols, rows), &Settings::default()).unwrap();
        assert_eq!(stages[0].segments[0].status_key, "Count");
    }

    #[test]
    fn missing_value_column_is_an_error() {
        let cols = ColumnRoles { value: None, ..columns() };
        let result = aggregate(&DataTable::new(cols, vec![]), &Settings::default());
        assert!(matches!(result, Err(FunnelError::MissingRequiredColumn { .. })));
    }

    #[test]
    fn colors_follow_precedence() {
        let mut settings = Settings::default();
        settings.data_colors.status_colors.insert("won".into(), Color::rgb(0, 200, 0));
        settings.data_colors.overrides.push(ColorOverride {
            stage: "Q2".into(),
            status: "won".into(),
            color: Color::rgb(0, 0, 200),
        });
        let rows = vec![
            Row::new("Q1", Some("won"), 1.0),
            Row::new("Q2", Some("won"), 1.0).with_color("#ff0000"),
            Row::new("Q3", Some("won"), 1.0).with_color("#ff0000"),
            Row::new("Q3", Some("lost"), 1.0),
        ];
        let stages = aggregate(&DataTable::new(columns(), rows), &settings).unwrap();
        assert_eq!(stages[0].segments[0].color, Color::rgb(0, 200, 0));
        assert_eq!(stages[1].segments[0].color, Color::rgb(0, 0, 200));
        assert_eq!(stages[2].segments[0].color, Color::rgb(255, 0, 0));
        assert_eq!(stages[2].segments[1].color, Color::rgb(0x01, 0xb8, 0xaa));
    }

    #[test]
    fn formatted_labels_and_tooltips() {
        let mut settings = Settings::default();
        settings.value_label.display_unit = 1e3;
        settings.value_label.decimal_places = 1.0;
        settings.status.display_unit = 1e3;
        settings.status.decimal_places = 1.0;
        let cols = columns().with_tooltips(["Region"]);
        let rows = vec![
            Row::new("Lead", Some("open"), 1200.0).with_extras([CellValue::from("EMEA")]),
            Row::new("Lead", Some("open"), 300.0).with_extras([CellValue::from("APAC")]),
        ];
        let stages = aggregate(&DataTable::new(cols, rows), &settings).unwrap();
        let stage = &stages[0];
        assert_eq!(stage.formatted_total, "1.5K");
        assert_eq!(stage.segments[0].formatted_value, "1.5K");
        let lines: Vec<String> = stage.segments[0]
            .tooltip
            .iter()
            .map(|t| format!("{}: {}", t.display_name, t.value))
            .collect();
        insta::assert_snapshot!(lines.join("\n"), @r"
        Stage: Lead
        Status: open
        Count: 1,500
        Region: EMEA
        ");
    }
}
