//! Toggle/edge tracker.
//!
//! Converts momentary button presses into persistent [`ToggleId`] flags and
//! answers edge queries (rising button, thresholded axis rise and release)
//! against the previous tick's snapshot.
//!
//! Flags live here and nowhere else: re-evaluating the mapping on a tick
//! never resets them, only a rising edge of the bound button flips them.
//! [`ToggleTracker::clear`] (called on every mode transition) resets the
//! flags but keeps the previous physical snapshot, so a button held across a
//! transition does not produce a spurious edge.

use frc_common::consts::TOGGLE_COUNT;
use frc_common::input::{Axis, Button, ControllerRole, InputSnapshot};

use super::bindings::ControlScheme;

/// Persistent boolean toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ToggleId {
    /// Intake runs in reverse while set.
    IntakeReverse = 0,
    /// Drive commands are robot relative while set.
    RobotRelative = 1,
}

impl ToggleId {
    pub const ALL: [Self; TOGGLE_COUNT] = [Self::IntakeReverse, Self::RobotRelative];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Button bound to a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleBinding {
    pub role: ControllerRole,
    pub button: Button,
}

/// Edge detector and owner of all toggle flags.
#[derive(Debug, Clone)]
pub struct ToggleTracker {
    bindings: [ToggleBinding; TOGGLE_COUNT],
    flags: [bool; TOGGLE_COUNT],
    previous: InputSnapshot,
    current: InputSnapshot,
}

impl ToggleTracker {
    /// Build a tracker with bindings taken from the control scheme.
    pub fn new(scheme: &ControlScheme) -> Self {
        let mut bindings = [ToggleBinding {
            role: ControllerRole::Operator,
            button: scheme.intake_reverse_toggle,
        }; TOGGLE_COUNT];
        bindings[ToggleId::RobotRelative.index()] = ToggleBinding {
            role: ControllerRole::Driver,
            button: scheme.robot_relative_toggle,
        };

        Self {
            bindings,
            flags: [false; TOGGLE_COUNT],
            previous: InputSnapshot::default(),
            current: InputSnapshot::default(),
        }
    }

    /// Advance one tick: shift snapshots and flip flags on rising edges.
    pub fn update(&mut self, input: &InputSnapshot) {
        self.previous = self.current;
        self.current = *input;

        for id in ToggleId::ALL {
            let binding = self.bindings[id.index()];
            if self.rising(binding.role, binding.button) {
                self.flags[id.index()] = !self.flags[id.index()];
            }
        }
    }

    /// Current value of a toggle flag.
    #[inline]
    pub fn flag(&self, id: ToggleId) -> bool {
        self.flags[id.index()]
    }

    /// Reset every flag to `false`.
    pub fn clear(&mut self) {
        self.flags = [false; TOGGLE_COUNT];
    }

    /// Button went from released to pressed this tick.
    pub fn rising(&self, role: ControllerRole, button: Button) -> bool {
        self.current.controller(role).pressed(button) && !self.previous.controller(role).pressed(button)
    }

    /// Axis was at or below `threshold` last tick and is above it now.
    pub fn rose_above(&self, role: ControllerRole, axis: Axis, threshold: f64) -> bool {
        self.previous.controller(role).axis(axis) <= threshold
            && self.current.controller(role).axis(axis) > threshold
    }

    /// Axis was above `threshold` last tick and is at or below it now.
    pub fn fell_below(&self, role: ControllerRole, axis: Axis, threshold: f64) -> bool {
        self.previous.controller(role).axis(axis) > threshold
            && self.current.controller(role).axis(axis) <= threshold
    }

    /// Snapshot seen by the last `update`.
    #[inline]
    pub fn current(&self) -> &InputSnapshot {
        &self.current
    }
}
