//! Per-example dialogue rendering
//!
//! Renders, in order: task description, goal table, then every turn with
//! its messages, user state, system state and dialog acts. User and system
//! state are highlighted against the previous turn of the same example.

use serde_json::{Map, Value};
use tracing::debug;

use crate::dataset::{Example, Turn};
use crate::frame::{
    diff_state, diff_system_state, dialog_act_frame, goal_frame, state_frame, Frame, StyledFrame,
};
use crate::surface::{Block, Surface};

/// State carried from one turn to the next within an example.
struct PreviousTurn<'a> {
    user_frame: Frame,
    system_state: &'a Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DialogRenderer;

impl DialogRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render one example; returns the number of turns rendered.
    pub fn render_example(&self, surface: &mut dyn Surface, example: &Example) -> usize {
        self.render_task(surface, example);
        self.render_goal(surface, example);

        let mut previous: Option<PreviousTurn<'_>> = None;
        let mut turns = 0;
        for turn in example.turns() {
            previous = Some(self.render_turn(surface, &turn, previous.as_ref()));
            turns += 1;
        }
        debug!("Rendered {} turns of a '{}' example", turns, example.kind);
        turns
    }

    pub fn render_task(&self, surface: &mut dyn Surface, example: &Example) {
        surface.header(&format!("Task Description ({})", example.kind));
        for (i, desc) in example.task_description.iter().enumerate() {
            surface.markdown(&format!("{}. {}", i + 1, desc));
        }
    }

    pub fn render_goal(&self, surface: &mut dyn Surface, example: &Example) {
        surface.header("Goal");
        surface.table(StyledFrame::plain(goal_frame(
            &example.goal,
            &example.final_goal,
        )));
    }

    fn render_turn<'a>(
        &self,
        surface: &mut dyn Surface,
        turn: &Turn<'a>,
        previous: Option<&PreviousTurn<'_>>,
    ) -> PreviousTurn<'a> {
        surface.header(&format!("Turn #{}", turn.index));
        surface.markdown(&format!("- {}: {}", turn.user.role, turn.user.content));
        surface.markdown(&format!("- {}: {}", turn.system.role, turn.system.content));

        let user_frame = state_frame(&turn.user.user_state);
        self.render_user_state(surface, &user_frame, previous.map(|p| &p.user_frame));
        self.render_system_state(
            surface,
            &turn.system.sys_state,
            previous.map(|p| p.system_state),
        );
        self.render_dialog_acts(surface, turn);

        PreviousTurn {
            user_frame,
            system_state: &turn.system.sys_state,
        }
    }

    fn render_user_state(
        &self,
        surface: &mut dyn Surface,
        frame: &Frame,
        previous: Option<&Frame>,
    ) {
        surface.subheader("User State");
        let styled = match previous {
            Some(_) => StyledFrame::highlighted(frame.clone(), diff_state(frame, previous)),
            None => StyledFrame::plain(frame.clone()),
        };
        surface.table(styled);
    }

    fn render_system_state(
        &self,
        surface: &mut dyn Surface,
        state: &Map<String, Value>,
        previous: Option<&Map<String, Value>>,
    ) {
        surface.subheader("System State");
        let panes: Vec<Vec<Block>> = diff_system_state(state, previous)
            .into_iter()
            .map(|(column, mask)| {
                let styled = if previous.is_some() {
                    StyledFrame::highlighted(column.frame, mask)
                } else {
                    StyledFrame::plain(column.frame)
                };
                vec![Block::Table(styled)]
            })
            .collect();
        if !panes.is_empty() {
            surface.columns(panes);
        }
    }

    fn render_dialog_acts(&self, surface: &mut dyn Surface, turn: &Turn<'_>) {
        surface.subheader("Dialog Act");
        let panes = [("User", turn.user), ("System", turn.system)]
            .into_iter()
            .map(|(name, message)| {
                vec![
                    Block::Subheader(name.to_string()),
                    Block::Table(StyledFrame::plain(dialog_act_frame(&message.dialog_act))),
                ]
            })
            .collect();
        surface.columns(panes);
    }
}
