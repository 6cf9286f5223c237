//! Prelude module for common re-exports.
//!
//! ```rust
//! use frc_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Input ──────────────────────────────────────────────────────────
pub use crate::input::{Axis, Button, Buttons, ControllerRole, ControllerSnapshot, InputSnapshot, Pov};

// ─── State ──────────────────────────────────────────────────────────
pub use crate::state::{
    ActuatorGroup, ActuatorGroups, ClimberState, DriveMode, IntakeState, LauncherState, RobotMode,
};

// ─── Commands & Ownership ───────────────────────────────────────────
pub use crate::command::{
    ManualTarget, OneShotKind, Owner, OwnershipSlot, RoutineId, TaskHandle, TaskId, TaskKind,
    TaskState,
};
pub use crate::drive::{DriveCommand, Pose2d};
pub use crate::error::CommandError;

// ─── Telemetry ──────────────────────────────────────────────────────
pub use crate::telemetry::{
    DiagnosticFlags, Diagnostics, TelemetryError, TelemetryFrame, TelemetryValue,
};

/// Default control tick as Duration.
pub const DEFAULT_TICK: Duration =
    Duration::from_millis(crate::consts::DEFAULT_TICK_PERIOD_MS as u64);
