//! Drivebase mode (driver controller).
//!
//! Lock button held: wheels locked, and on the press edge the pose is reset
//! to the selected routine's start pose. Otherwise a drive command every
//! tick, robot relative while the toggle is set.

use frc_common::drive::DriveCommand;
use frc_common::input::{Axis, ControllerRole};
use frc_common::state::DriveMode;

use crate::input::bindings::ControlScheme;
use crate::input::toggle::{ToggleId, ToggleTracker};

/// Request produced by one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveRequest {
    Drive(DriveCommand),
    /// Lock the wheels; `reset_pose` on the first tick of the press.
    Lock { reset_pose: bool },
}

#[derive(Debug, Clone, Default)]
pub struct DriveMachine {
    mode: DriveMode,
}

impl DriveMachine {
    pub const fn new() -> Self {
        Self {
            mode: DriveMode::FieldRelative,
        }
    }

    #[inline]
    pub const fn mode(&self) -> DriveMode {
        self.mode
    }

    pub fn evaluate(&self, edges: &ToggleTracker, scheme: &ControlScheme) -> DriveRequest {
        let role = ControllerRole::Driver;
        let driver = edges.current().controller(role);
        if driver.pressed(scheme.lock_wheels) {
            return DriveRequest::Lock {
                reset_pose: edges.rising(role, scheme.lock_wheels),
            };
        }

        let scale = scheme.drive_scale;
        DriveRequest::Drive(DriveCommand {
            x_speed: -driver.axis(Axis::LeftY) * scale,
            y_speed: driver.axis(Axis::LeftX) * scale,
            rotation: driver.axis(Axis::RightX) * scale,
            field_relative: !edges.flag(ToggleId::RobotRelative),
        })
    }

    /// Mode implied by a command the platform received.
    pub const fn mode_for(command: &DriveCommand) -> DriveMode {
        if command.field_relative {
            DriveMode::FieldRelative
        } else {
            DriveMode::RobotRelative
        }
    }

    #[inline]
    pub fn commit(&mut self, mode: DriveMode) {
        self.mode = mode;
    }
}
