//! System-wide constants for the FRC control workspace.
//!
//! Single source of truth for numeric limits and defaults.
//! Imported by all crates, never duplicated.

use static_assertions::const_assert;

/// Canonical control tick period [ms] (50 Hz).
pub const DEFAULT_TICK_PERIOD_MS: u32 = 20;

/// Shortest accepted tick period [ms].
pub const TICK_PERIOD_MS_MIN: u32 = 5;

/// Longest accepted tick period [ms].
pub const TICK_PERIOD_MS_MAX: u32 = 100;

/// Number of physical actuator groups with an ownership slot.
pub const ACTUATOR_GROUP_COUNT: usize = 4;

/// Number of persistent toggle flags.
pub const TOGGLE_COUNT: usize = 2;

/// Capacity of the per-tick instruction buffer.
pub const MAX_INSTRUCTIONS: usize = 32;

/// Capacity of one telemetry frame (entries).
pub const MAX_TELEMETRY_ENTRIES: usize = 32;

/// Default trigger level above which the shoot trigger counts as pressed.
pub const DEFAULT_SHOOT_THRESHOLD: f64 = 0.1;

/// Default intake stick deadband.
pub const DEFAULT_INTAKE_DEADBAND: f64 = 0.2;

/// Default share of the tick period the critical path may use before
/// telemetry for that tick is dropped [%].
pub const DEFAULT_TELEMETRY_BUDGET_PCT: u8 = 80;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/robot.toml";

const_assert!(TICK_PERIOD_MS_MIN <= DEFAULT_TICK_PERIOD_MS);
const_assert!(DEFAULT_TICK_PERIOD_MS <= TICK_PERIOD_MS_MAX);
// Worst case per tick: a mode transition (2 task cancels, routine cancel,
// routine start, pose reset, 3 sets, drive) plus a full manual pass.
const_assert!(MAX_INSTRUCTIONS >= 24);
