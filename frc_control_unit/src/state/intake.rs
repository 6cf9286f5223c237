//! Intake state machine (operator controller).
//!
//! Stop bumper held: Stop. Intake stick beyond the deadband: Run, or Reverse
//! while the reverse toggle is set. Otherwise Stop. Holding the handoff
//! button additionally requests the Handoff task; the press tick is marked.

use frc_common::input::ControllerRole;
use frc_common::state::IntakeState;

use crate::input::bindings::ControlScheme;
use crate::input::toggle::{ToggleId, ToggleTracker};

/// Request produced by one evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntakeRequest {
    /// New state, only when it differs from the committed one.
    pub state: Option<IntakeState>,
    /// Handoff button held.
    pub handoff: bool,
    /// Handoff button went down this tick.
    pub handoff_pressed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct IntakeMachine {
    state: IntakeState,
}

impl IntakeMachine {
    pub const fn new() -> Self {
        Self {
            state: IntakeState::Stop,
        }
    }

    #[inline]
    pub const fn state(&self) -> IntakeState {
        self.state
    }

    /// State the controls ask for, regardless of the committed state.
    pub fn desired(edges: &ToggleTracker, scheme: &ControlScheme) -> IntakeState {
        let operator = edges.current().controller(ControllerRole::Operator);
        if operator.pressed(scheme.intake_stop) {
            IntakeState::Stop
        } else if operator.axis(scheme.intake_axis).abs() > scheme.intake_deadband {
            if edges.flag(ToggleId::IntakeReverse) {
                IntakeState::Reverse
            } else {
                IntakeState::Run
            }
        } else {
            IntakeState::Stop
        }
    }

    pub fn evaluate(&self, edges: &ToggleTracker, scheme: &ControlScheme) -> IntakeRequest {
        let desired = Self::desired(edges, scheme);
        IntakeRequest {
            state: (desired != self.state).then_some(desired),
            handoff: edges
                .current()
                .controller(ControllerRole::Operator)
                .pressed(scheme.handoff),
            handoff_pressed: edges.rising(ControllerRole::Operator, scheme.handoff),
        }
    }

    #[inline]
    pub fn commit(&mut self, state: IntakeState) {
        self.state = state;
    }
}
