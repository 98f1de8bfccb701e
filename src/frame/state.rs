//! User- and system-state frames with turn-over-turn diffing

use serde_json::{Map, Value};

use super::{display_value, Frame, HighlightMask};
use crate::dataset::StateRow;

pub const STATE_COLUMNS: [&str; 5] = ["Id", "Domain", "Slot", "Value", "Selected"];

/// Columns compared between turns. `Id` is never compared.
pub const STATE_DIFF_COLUMNS: [&str; 4] = ["Domain", "Slot", "Value", "Selected"];

/// Build the fixed-column state frame. Every column is coerced to text.
pub fn state_frame(rows: &[StateRow]) -> Frame {
    let mut frame = Frame::new(STATE_COLUMNS);
    for row in rows {
        frame.push_row(vec![
            display_value(&row.id),
            row.domain.clone(),
            row.slot.clone(),
            display_value(&row.value),
            display_value(&row.selected),
        ]);
    }
    frame
}

/// Mark cells of `current` that differ from the same position in `previous`.
///
/// Without a previous frame the mask is clean. Rows past the end of the
/// previous frame count as changed in every compared column.
pub fn diff_state(current: &Frame, previous: Option<&Frame>) -> HighlightMask {
    let mut mask = HighlightMask::clean(current);
    let Some(previous) = previous else {
        return mask;
    };

    for name in STATE_DIFF_COLUMNS {
        let Some(col) = current.column_position(name) else {
            continue;
        };
        for row in 0..current.len() {
            if current.cell(row, name) != previous.cell(row, name) {
                mask.mark(row, col);
            }
        }
    }
    mask
}

/// One label of the system state rendered as a single-column frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemStateColumn {
    pub label: String,
    pub frame: Frame,
}

/// One column per label, labels in sorted order. Object values are indexed
/// by key, arrays by position, scalars as a single row.
pub fn system_state_columns(state: &Map<String, Value>) -> Vec<SystemStateColumn> {
    let mut labels: Vec<&String> = state.keys().collect();
    labels.sort();

    labels
        .into_iter()
        .map(|label| SystemStateColumn {
            label: label.clone(),
            frame: label_frame(label, &state[label.as_str()]),
        })
        .collect()
}

fn label_frame(label: &str, value: &Value) -> Frame {
    let mut frame = Frame::new([label]);
    match value {
        Value::Object(slots) => {
            for (slot, v) in slots {
                frame.push_indexed_row(slot.clone(), vec![display_value(v)]);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                frame.push_indexed_row(i.to_string(), vec![display_value(v)]);
            }
        }
        scalar => frame.push_indexed_row("0", vec![display_value(scalar)]),
    }
    frame
}

/// System-state columns with per-label highlighting against `previous`.
///
/// A label is only compared with the same label of the previous turn; a
/// label absent from the previous turn is left unhighlighted. Within a
/// label, rows are matched by index and a row missing from the previous
/// column counts as changed.
pub fn diff_system_state(
    current: &Map<String, Value>,
    previous: Option<&Map<String, Value>>,
) -> Vec<(SystemStateColumn, HighlightMask)> {
    let previous_columns = previous.map(system_state_columns).unwrap_or_default();

    system_state_columns(current)
        .into_iter()
        .map(|column| {
            let mut mask = HighlightMask::clean(&column.frame);
            if let Some(prev) = previous_columns.iter().find(|p| p.label == column.label) {
                for (row, key) in column.frame.index.iter().enumerate() {
                    let before = prev
                        .frame
                        .index
                        .iter()
                        .position(|k| k == key)
                        .map(|i| &prev.frame.rows[i][0]);
                    if before != Some(&column.frame.rows[row][0]) {
                        mask.mark(row, 0);
                    }
                }
            }
            (column, mask)
        })
        .collect()
}
