//! Launcher state machine.
//!
//! Evaluated top-down on the operator controller, first match wins:
//!
//! 1. shoot trigger above threshold: request the Shoot task (POV ignored),
//!    flagged as pressed on the tick the trigger crosses the threshold;
//! 2. shoot trigger released this tick, or abort trigger held: force Off
//!    and cancel Shoot and Handoff;
//! 3. POV 0/90/180/270: Speaker/Amp/Trap/Hold. Any other POV reading
//!    leaves the state unchanged.

use frc_common::input::{ControllerRole, Pov};
use frc_common::state::LauncherState;

use crate::input::bindings::ControlScheme;
use crate::input::toggle::ToggleTracker;

/// Request produced by one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherAction {
    /// Schedule the Shoot one-shot task. `pressed` is set only on the tick
    /// the trigger crossed the threshold.
    Shoot { pressed: bool },
    /// Force Off and cancel in-flight Shoot/Handoff.
    Abort,
    /// Switch to a different state.
    Set(LauncherState),
}

/// Launcher state for a recognized POV angle.
pub const fn pov_target(pov: Pov) -> Option<LauncherState> {
    match pov {
        Pov::Angle(0) => Some(LauncherState::Speaker),
        Pov::Angle(90) => Some(LauncherState::Amp),
        Pov::Angle(180) => Some(LauncherState::Trap),
        Pov::Angle(270) => Some(LauncherState::Hold),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct LauncherMachine {
    state: LauncherState,
}

impl LauncherMachine {
    pub const fn new() -> Self {
        Self {
            state: LauncherState::Off,
        }
    }

    #[inline]
    pub const fn state(&self) -> LauncherState {
        self.state
    }

    pub fn evaluate(&self, edges: &ToggleTracker, scheme: &ControlScheme) -> Option<LauncherAction> {
        let role = ControllerRole::Operator;
        let operator = edges.current().controller(role);
        let threshold = scheme.shoot_threshold;

        if operator.axis(scheme.shoot_axis) > threshold {
            return Some(LauncherAction::Shoot {
                pressed: edges.rose_above(role, scheme.shoot_axis, threshold),
            });
        }
        let released = edges.fell_below(role, scheme.shoot_axis, threshold);
        let aborted = scheme.abort_enabled && operator.axis(scheme.abort_axis) > threshold;
        if released || aborted {
            return Some(LauncherAction::Abort);
        }

        pov_target(operator.pov)
            .filter(|target| *target != self.state)
            .map(LauncherAction::Set)
    }

    /// Record the state the platform was given.
    #[inline]
    pub fn commit(&mut self, state: LauncherState) {
        self.state = state;
    }
}
