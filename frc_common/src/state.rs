//! State enums for the control core.
//!
//! All enums use `#[repr(u8)]` and derive `Copy` so they can live in the
//! per-tick runtime state without allocation. Each subsystem owns exactly one
//! value at any tick; the initial value is the `Default`.
//!
//! Textual labels for these states are deliberately not defined here: only
//! the telemetry adapter maps states to strings.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// ─── LEVEL 1: Operating Mode ────────────────────────────────────────

/// Platform operating mode, as commanded by the driver station.
///
/// The same type is used for the external mode signal and for the Mode
/// Controller's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum RobotMode {
    /// Outputs disabled. Initial state.
    #[default]
    Disabled = 0,
    /// Autonomous period: the selected routine owns the platform.
    Autonomous = 1,
    /// Driver-controlled period.
    Teleop = 2,
    /// Test mode. No control actions are issued.
    Test = 3,
}

impl RobotMode {
    /// Modes in which subsystem state machines are evaluated.
    #[inline]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Autonomous | Self::Teleop)
    }
}

// ─── LEVEL 2: Subsystem States ──────────────────────────────────────

/// Launcher (pivot + flywheel) target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LauncherState {
    Speaker = 0,
    Amp = 1,
    Trap = 2,
    Hold = 3,
    #[default]
    Off = 4,
}

/// Intake roller target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum IntakeState {
    Run = 0,
    Reverse = 1,
    #[default]
    Stop = 2,
}

/// Climber winch target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ClimberState {
    Up = 0,
    Down = 1,
    #[default]
    Off = 2,
}

/// Drivebase command frame / lock mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum DriveMode {
    #[default]
    FieldRelative = 0,
    RobotRelative = 1,
    /// Wheels locked in an X pattern; drive commands are not applied.
    Locked = 2,
}

// ─── Actuator Groups ────────────────────────────────────────────────

/// A physical mechanism with one exclusive owner per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ActuatorGroup {
    Drivebase = 0,
    Launcher = 1,
    Intake = 2,
    Climber = 3,
}

impl ActuatorGroup {
    /// All groups, in slot order.
    pub const ALL: [Self; 4] = [Self::Drivebase, Self::Launcher, Self::Intake, Self::Climber];

    /// Ownership slot index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Flag for this group inside [`ActuatorGroups`].
    pub const fn flag(self) -> ActuatorGroups {
        match self {
            Self::Drivebase => ActuatorGroups::DRIVEBASE,
            Self::Launcher => ActuatorGroups::LAUNCHER,
            Self::Intake => ActuatorGroups::INTAKE,
            Self::Climber => ActuatorGroups::CLIMBER,
        }
    }
}

bitflags! {
    /// Set of actuator groups required by a task or routine.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ActuatorGroups: u8 {
        const DRIVEBASE = 0x01;
        const LAUNCHER  = 0x02;
        const INTAKE    = 0x04;
        const CLIMBER   = 0x08;
    }
}

impl ActuatorGroups {
    /// Iterate contained groups in slot order.
    pub fn groups(self) -> impl Iterator<Item = ActuatorGroup> {
        ActuatorGroup::ALL
            .into_iter()
            .filter(move |g| self.contains(g.flag()))
    }
}
