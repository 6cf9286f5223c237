//! Climber state machine (driver controller).

use frc_common::input::ControllerRole;
use frc_common::state::ClimberState;

use crate::input::bindings::ControlScheme;
use crate::input::toggle::ToggleTracker;

#[derive(Debug, Clone, Default)]
pub struct ClimberMachine {
    state: ClimberState,
}

impl ClimberMachine {
    pub const fn new() -> Self {
        Self {
            state: ClimberState::Off,
        }
    }

    #[inline]
    pub const fn state(&self) -> ClimberState {
        self.state
    }

    /// Up bumper: Up. Down bumper: Down. Neither or both: Off.
    pub fn desired(edges: &ToggleTracker, scheme: &ControlScheme) -> ClimberState {
        let driver = edges.current().controller(ControllerRole::Driver);
        match (driver.pressed(scheme.climber_up), driver.pressed(scheme.climber_down)) {
            (true, false) => ClimberState::Up,
            (false, true) => ClimberState::Down,
            _ => ClimberState::Off,
        }
    }

    pub fn evaluate(&self, edges: &ToggleTracker, scheme: &ControlScheme) -> Option<ClimberState> {
        let desired = Self::desired(edges, scheme);
        (desired != self.state).then_some(desired)
    }

    #[inline]
    pub fn commit(&mut self, state: ClimberState) {
        self.state = state;
    }
}
