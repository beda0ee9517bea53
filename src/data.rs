//! Input table handed over by the host data query

use crate::errors::{ColumnRole, FunnelError};
use crate::format::format_plain;
use crate::types::Color;

/// One cell as the host delivers it
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Numeric coercion: numbers pass through, text is parsed, anything
    /// NaN, infinite or unparseable is treated as missing.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            CellValue::Null => return None,
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }

    /// Text shown verbatim in tooltips
    pub fn display(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Number(n) => format_plain(*n),
            CellValue::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<Option<f64>> for CellValue {
    fn from(n: Option<f64>) -> Self {
        n.map_or(CellValue::Null, CellValue::Number)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// One (stage, status, value) tuple
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub stage: String,
    pub status: Option<String>,
    pub value: CellValue,
    /// Per-row color override
    pub color: Option<Color>,
    /// Tooltip column values, aligned with [`ColumnRoles::tooltips`]
    pub extras: Vec<CellValue>,
}

impl Row {
    pub fn new(stage: impl Into<String>, status: Option<&str>, value: impl Into<CellValue>) -> Self {
        Self {
            stage: stage.into(),
            status: status.map(str::to_string),
            value: value.into(),
            color: None,
            extras: Vec::new(),
        }
    }

    pub fn with_color(mut self, color: impl Into<Color>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_extras(mut self, extras: impl IntoIterator<Item = CellValue>) -> Self {
        self.extras = extras.into_iter().collect();
        self
    }
}

/// Display names of the columns bound to each data role
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnRoles {
    pub stage: Option<String>,
    pub status: Option<String>,
    pub value: Option<String>,
    pub tooltips: Vec<String>,
}

impl ColumnRoles {
    pub fn new(stage: &str, status: Option<&str>, value: &str) -> Self {
        Self {
            stage: Some(stage.to_string()),
            status: status.map(str::to_string),
            value: Some(value.to_string()),
            tooltips: Vec::new(),
        }
    }

    pub fn with_tooltips<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.tooltips = names.into_iter().map(Into::into).collect();
        self
    }

    /// Stage and value columns, or the role that is missing
    pub fn required(&self) -> Result<(&str, &str), FunnelError> {
        let stage = self
            .stage
            .as_deref()
            .ok_or(FunnelError::MissingRequiredColumn { role: ColumnRole::Stage })?;
        let value = self
            .value
            .as_deref()
            .ok_or(FunnelError::MissingRequiredColumn { role: ColumnRole::Value })?;
        Ok((stage, value))
    }
}

/// Shape of the incoming rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupingMode {
    /// Statuses are value series aligned by stage: every stage key is a
    /// stage even when all its values are null, and segments stack in
    /// series order in every stage.
    PreGrouped,
    /// Independent tuples: stages and segments appear on first
    /// contributing occurrence.
    #[default]
    Flat,
}

/// Rows plus their column bindings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataTable {
    pub columns: ColumnRoles,
    pub rows: Vec<Row>,
    pub mode: GroupingMode,
}

impl DataTable {
    pub fn new(columns: ColumnRoles, rows: Vec<Row>) -> Self {
        Self { columns, rows, mode: GroupingMode::Flat }
    }

    pub fn grouped(mut self, mode: GroupingMode) -> Self {
        self.mode = mode;
        self
    }
}
