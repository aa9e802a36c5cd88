use crate::engine::tick::RadarEngine;
use crate::signal::{SignalId, SignalKind};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const SPEED_STEP: f64 = 1.2;
const MAX_SWEEP_SPEED: f64 = PI / 5.0;
const MIN_SWEEP_SPEED: f64 = PI / 120.0;

/// Operator input accepted across the render boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ControlCommand {
    Pause,
    SpeedUp,
    SlowDown,
    Reset,
    ToggleFilter { kind: SignalKind },
    ToggleAll,
    ToggleFiltering,
    SelectNext,
    SelectPrevious,
    ClearSelection,
    ToggleRealData,
}

impl RadarEngine {
    pub fn apply(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::Pause => self.toggle_pause(),
            ControlCommand::SpeedUp => self.speed_up(),
            ControlCommand::SlowDown => self.slow_down(),
            ControlCommand::Reset => self.reset(),
            ControlCommand::ToggleFilter { kind } => self.toggle_filter(kind),
            ControlCommand::ToggleAll => self.toggle_all_filters(),
            ControlCommand::ToggleFiltering => {
                let enabled = self.filter.is_enabled();
                self.set_filtering_enabled(!enabled);
            }
            ControlCommand::SelectNext => self.select_next(),
            ControlCommand::SelectPrevious => self.select_previous(),
            ControlCommand::ClearSelection => self.clear_selection(),
            ControlCommand::ToggleRealData => {
                let real = self.real_data;
                self.set_real_data(!real);
            }
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn speed_up(&mut self) {
        self.config.sweep_speed = (self.config.sweep_speed * SPEED_STEP).min(MAX_SWEEP_SPEED);
    }

    pub fn slow_down(&mut self) {
        self.config.sweep_speed = (self.config.sweep_speed / SPEED_STEP).max(MIN_SWEEP_SPEED);
    }

    /// Fresh simulated picture, sweep back at zero, running.
    pub fn reset(&mut self) {
        self.populate();
        self.sweep_angle = 0.0;
        self.paused = false;
        self.selected = None;
    }

    pub fn toggle_filter(&mut self, kind: SignalKind) {
        self.filter.toggle(kind);
        self.drop_hidden_selection();
    }

    pub fn toggle_all_filters(&mut self) {
        self.filter.toggle_all();
        self.drop_hidden_selection();
    }

    pub fn set_filtering_enabled(&mut self, enabled: bool) {
        self.filter.set_enabled(enabled);
        self.drop_hidden_selection();
    }

    pub fn selected(&self) -> Option<SignalId> {
        self.selected
    }

    pub fn select_next(&mut self) {
        self.step_selection(1);
    }

    pub fn select_previous(&mut self) {
        self.step_selection(-1);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Switching to simulation swaps the live set for a simulated one.
    pub fn set_real_data(&mut self, enabled: bool) {
        if self.real_data == enabled {
            return;
        }
        self.real_data = enabled;
        if !enabled {
            self.populate();
            self.selected = None;
        }
    }

    fn step_selection(&mut self, step: isize) {
        let candidates: Vec<SignalId> = self.displayable().map(|signal| signal.id).collect();
        if candidates.is_empty() {
            self.selected = None;
            return;
        }

        let len = candidates.len() as isize;
        let next = match self
            .selected
            .and_then(|id| candidates.iter().position(|candidate| *candidate == id))
        {
            Some(index) => (index as isize + step).rem_euclid(len),
            None if step >= 0 => 0,
            None => len - 1,
        };
        self.selected = Some(candidates[next as usize]);
    }

    fn drop_hidden_selection(&mut self) {
        if let Some(id) = self.selected {
            if !self.displayable().any(|signal| signal.id == id) {
                self.selected = None;
            }
        }
    }
}
