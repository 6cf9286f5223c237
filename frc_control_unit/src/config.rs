//! TOML configuration loader with validation.
//!
//! Loads [`RobotConfig`] from a single TOML file. Every section is optional
//! and falls back to its defaults. Validates: tick period bounds, input
//! thresholds, telemetry budget, routine name uniqueness and non-empty task
//! requirements.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use frc_common::config::{ConfigError, ConfigLoader, SharedConfig};
use frc_common::consts::{
    DEFAULT_TELEMETRY_BUDGET_PCT, DEFAULT_TICK_PERIOD_MS, TICK_PERIOD_MS_MAX, TICK_PERIOD_MS_MIN,
};
use frc_common::drive::Pose2d;
use frc_common::state::ActuatorGroups;

use crate::input::bindings::ControlScheme;

// ─── Sections ───────────────────────────────────────────────────────

/// Complete control unit configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub shared: SharedConfig,
    pub cycle: CycleConfig,
    pub scheme: ControlScheme,
    pub autonomous: AutonomousConfig,
    pub tasks: TaskConfig,
}

/// Fixed-tick loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Tick period [ms].
    pub tick_period_ms: u32,
    /// Publish telemetry every N ticks (1 = every tick).
    pub telemetry_interval: u32,
    /// Share of the tick period the critical path may use before telemetry
    /// for that tick is dropped [%].
    pub telemetry_budget_pct: u8,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            telemetry_interval: 1,
            telemetry_budget_pct: DEFAULT_TELEMETRY_BUDGET_PCT,
        }
    }
}

impl CycleConfig {
    pub fn tick_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(u64::from(self.tick_period_ms))
    }
}

/// One entry of the name → routine registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineConfig {
    pub name: String,
    /// Pose the drivebase is reset to when this routine starts.
    #[serde(default)]
    pub start_pose: Option<Pose2d>,
    /// Actuator groups the routine takes from manual control.
    #[serde(default = "ActuatorGroups::all")]
    pub requires: ActuatorGroups,
}

/// Autonomous routines and the initial selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutonomousConfig {
    /// Pose used when the selected routine has none, or nothing is selected.
    pub start_pose: Pose2d,
    /// Routine selected at startup.
    pub selected: Option<String>,
    #[serde(rename = "routine")]
    pub routines: Vec<RoutineConfig>,
}

/// Actuator requirements of the one-shot tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub shoot_requires: ActuatorGroups,
    pub handoff_requires: ActuatorGroups,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            shoot_requires: ActuatorGroups::LAUNCHER | ActuatorGroups::INTAKE,
            handoff_requires: ActuatorGroups::LAUNCHER | ActuatorGroups::INTAKE,
        }
    }
}

// ─── Validation ─────────────────────────────────────────────────────

impl RobotConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        let cycle = &self.cycle;
        if !(TICK_PERIOD_MS_MIN..=TICK_PERIOD_MS_MAX).contains(&cycle.tick_period_ms) {
            return Err(ConfigError::ValidationError(format!(
                "tick_period_ms {} out of range [{TICK_PERIOD_MS_MIN}, {TICK_PERIOD_MS_MAX}]",
                cycle.tick_period_ms
            )));
        }
        if cycle.telemetry_interval == 0 {
            return Err(ConfigError::ValidationError(
                "telemetry_interval must be at least 1".to_string(),
            ));
        }
        if cycle.telemetry_budget_pct == 0 || cycle.telemetry_budget_pct > 100 {
            return Err(ConfigError::ValidationError(format!(
                "telemetry_budget_pct {} out of range (0, 100]",
                cycle.telemetry_budget_pct
            )));
        }

        self.scheme
            .validate()
            .map_err(ConfigError::ValidationError)?;

        validate_routines(&self.autonomous)?;

        if self.tasks.shoot_requires.is_empty() || self.tasks.handoff_requires.is_empty() {
            return Err(ConfigError::ValidationError(
                "one-shot task requirements cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_routines(auto: &AutonomousConfig) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for routine in &auto.routines {
        if routine.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "routine name cannot be empty".to_string(),
            ));
        }
        if !seen.insert(routine.name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate routine name '{}'",
                routine.name
            )));
        }
        if routine.requires.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "routine '{}' requires no actuator group",
                routine.name
            )));
        }
    }
    Ok(())
}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate the configuration file.
pub fn load_config(path: &Path) -> Result<RobotConfig, ConfigError> {
    let config = RobotConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(text: &str) -> Result<RobotConfig, ConfigError> {
    let config: RobotConfig =
        toml::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

// ─── Tests ──────────────────────────────────────────────────────────
