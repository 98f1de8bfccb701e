//! Tabular frames for display
//!
//! A `Frame` is a fixed set of named columns over rows of text cells, with
//! an optional row index. A `HighlightMask` has the same shape and marks
//! cells that changed relative to an earlier frame.

pub mod state;
pub mod tables;

use serde::Serialize;
use serde_json::Value;

pub use state::{
    diff_state, diff_system_state, state_frame, system_state_columns, SystemStateColumn,
    STATE_COLUMNS, STATE_DIFF_COLUMNS,
};
pub use tables::{database_frame, dialog_act_frame, goal_frame, DIALOG_ACT_COLUMNS};

/// CSS applied to a changed cell.
pub const CHANGED_CSS: &str = "color: #fa323c";

/// Render a JSON value as cell text.
///
/// Strings are shown verbatim, `null` as empty, anything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub columns: Vec<String>,
    /// Row labels; empty means positional.
    pub index: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Frame {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            index: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn push_indexed_row(&mut self, label: impl Into<String>, row: Vec<String>) {
        self.index.push(label.into());
        self.push_row(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_position(column)?;
        self.rows.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }

    /// Insert a column at `position`; `values` shorter than the frame pad with empty text.
    pub fn insert_column(&mut self, position: usize, name: impl Into<String>, values: Vec<String>) {
        self.columns.insert(position, name.into());
        let mut values = values.into_iter();
        for row in &mut self.rows {
            row.insert(position, values.next().unwrap_or_default());
        }
    }
}

/// Visual style for a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellStyle {
    #[default]
    Plain,
    Changed,
}

impl CellStyle {
    pub fn css(&self) -> &'static str {
        match self {
            CellStyle::Plain => "",
            CellStyle::Changed => CHANGED_CSS,
        }
    }
}

/// Per-cell changed flags, shaped like the frame they describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightMask {
    cells: Vec<Vec<bool>>,
}

impl HighlightMask {
    /// All-unchanged mask for a frame.
    pub fn clean(frame: &Frame) -> Self {
        Self {
            cells: vec![vec![false; frame.columns.len()]; frame.rows.len()],
        }
    }

    pub(crate) fn mark(&mut self, row: usize, col: usize) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = true;
        }
    }

    pub fn is_changed(&self, row: usize, col: usize) -> bool {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    pub fn is_clean(&self) -> bool {
        self.cells.iter().flatten().all(|changed| !changed)
    }

    /// `(row, column)` positions of changed cells, row-major.
    pub fn changed_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, changed)| **changed)
                    .map(move |(c, _)| (r, c))
            })
            .collect()
    }

    pub fn style(&self, row: usize, col: usize) -> CellStyle {
        if self.is_changed(row, col) {
            CellStyle::Changed
        } else {
            CellStyle::Plain
        }
    }
}

/// A frame ready for display, with optional highlighting.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledFrame {
    pub frame: Frame,
    pub mask: Option<HighlightMask>,
}

impl StyledFrame {
    pub fn plain(frame: Frame) -> Self {
        Self { frame, mask: None }
    }

    pub fn highlighted(frame: Frame, mask: HighlightMask) -> Self {
        Self {
            frame,
            mask: Some(mask),
        }
    }

    pub fn style(&self, row: usize, col: usize) -> CellStyle {
        self.mask
            .as_ref()
            .map(|m| m.style(row, col))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("故宫")), "故宫");
        assert_eq!(display_value(&json!(null)), "");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!(4.5)), "4.5");
        assert_eq!(display_value(&json!(["a", "b"])), r#"["a","b"]"#);
    }

    #[test]
    fn test_insert_column_pads() {
        let mut frame = Frame::new(["A", "B"]);
        frame.push_row(vec!["1".into(), "2".into()]);
        frame.push_row(vec!["3".into(), "4".into()]);
        frame.insert_column(1, "X", vec!["x".into()]);

        assert_eq!(frame.columns, vec!["A", "X", "B"]);
        assert_eq!(frame.rows[0], vec!["1", "x", "2"]);
        assert_eq!(frame.rows[1], vec!["3", "", "4"]);
    }

    #[test]
    fn test_mask_changed_cells() {
        let mut frame = Frame::new(["A", "B"]);
        frame.push_row(vec!["1".into(), "2".into()]);
        let mut mask = HighlightMask::clean(&frame);
        assert!(mask.is_clean());

        mask.mark(0, 1);
        mask.mark(5, 5);
        assert_eq!(mask.changed_cells(), vec![(0, 1)]);
        assert_eq!(mask.style(0, 1).css(), CHANGED_CSS);
        assert_eq!(mask.style(0, 0), CellStyle::Plain);
    }
}
