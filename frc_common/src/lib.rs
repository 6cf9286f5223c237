//! FRC Common Library
//!
//! Shared types, constants and configuration loading for the control
//! workspace. Everything here is plain data: the behaviour lives in
//! `frc_control_unit`.
//!
//! # Module Structure
//!
//! - [`consts`] - Tick period, buffer capacities and default thresholds
//! - [`input`] - Per-tick controller snapshots
//! - [`state`] - Operating mode, subsystem states and actuator groups
//! - [`command`] - Task identities, task lifecycle and ownership slots
//! - [`drive`] - Pose and drive command value types
//! - [`telemetry`] - Diagnostics and telemetry frame types
//! - [`error`] - Command rejection flags
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience

pub mod command;
pub mod config;
pub mod consts;
pub mod drive;
pub mod error;
pub mod input;
pub mod prelude;
pub mod state;
pub mod telemetry;
