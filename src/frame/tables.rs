//! Goal, dialog-act and database tables

use serde_json::{Map, Value};

use super::{display_value, state_frame, Frame};
use crate::dataset::{DialogAct, StateRow};

pub const DIALOG_ACT_COLUMNS: [&str; 4] = ["Intent", "Domain", "Slot", "Value"];

/// Goal rows with a `Final Value` column taken from the matching `final_goal` row.
pub fn goal_frame(goal: &[StateRow], final_goal: &[StateRow]) -> Frame {
    let mut frame = state_frame(goal);
    let finals = final_goal.iter().map(|row| display_value(&row.value)).collect();
    // Before "Selected"
    frame.insert_column(4, "Final Value", finals);
    frame
}

pub fn dialog_act_frame(acts: &[DialogAct]) -> Frame {
    let mut frame = Frame::new(DIALOG_ACT_COLUMNS);
    for act in acts {
        frame.push_row(vec![
            act.intent.clone(),
            act.domain.clone(),
            act.slot.clone(),
            display_value(&act.value),
        ]);
    }
    frame
}

/// Flat table of records. Columns are the union of keys in first-seen order.
pub fn database_frame<'a>(records: impl IntoIterator<Item = &'a Map<String, Value>>) -> Frame {
    let records: Vec<_> = records.into_iter().collect();
    let mut columns: Vec<&str> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut frame = Frame::new(columns.iter().copied());
    for record in &records {
        let row = columns
            .iter()
            .map(|c| record.get(*c).map(display_value).unwrap_or_default())
            .collect();
        frame.push_row(row);
    }
    frame
}
