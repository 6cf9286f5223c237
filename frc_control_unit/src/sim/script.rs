//! Match script replay.
//!
//! A script is a TOML list of steps, each holding one mode and one input
//! snapshot for a number of ticks:
//!
//! ```toml
//! [[step]]
//! mode = "autonomous"
//! ticks = 750
//! select_auto = "P2 1 Piece"
//!
//! [[step]]
//! mode = "teleop"
//! ticks = 5
//! [step.operator]
//! pov = 0
//! right_trigger = 0.5
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use frc_common::config::{ConfigError, ConfigLoader};
use frc_common::input::{ControllerSnapshot, InputSnapshot};
use frc_common::state::RobotMode;

use crate::cycle::{DriverStation, StationFrame};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("script has no steps")]
    Empty,
    #[error("step {0} has zero ticks")]
    ZeroTicks(usize),
}

/// One scripted segment.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptStep {
    pub mode: RobotMode,
    pub ticks: u32,
    /// Dashboard selection made on the first tick of the step.
    #[serde(default)]
    pub select_auto: Option<String>,
    #[serde(default)]
    pub driver: ControllerSnapshot,
    #[serde(default)]
    pub operator: ControllerSnapshot,
}

#[derive(Debug, Deserialize)]
struct ScriptFile {
    #[serde(rename = "step")]
    steps: Vec<ScriptStep>,
}

/// [`DriverStation`] that replays [`ScriptStep`]s in order.
#[derive(Debug, Clone)]
pub struct ScriptedStation {
    steps: Vec<ScriptStep>,
    index: usize,
    tick_in_step: u32,
    looping: bool,
}

impl ScriptedStation {
    pub fn new(steps: Vec<ScriptStep>) -> Result<Self, ScriptError> {
        if steps.is_empty() {
            return Err(ScriptError::Empty);
        }
        if let Some(i) = steps.iter().position(|s| s.ticks == 0) {
            return Err(ScriptError::ZeroTicks(i));
        }
        Ok(Self {
            steps,
            index: 0,
            tick_in_step: 0,
            looping: false,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let file = ScriptFile::load(path)?;
        Self::new(file.steps)
    }

    pub fn from_toml(text: &str) -> Result<Self, ScriptError> {
        let file: ScriptFile =
            toml::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Self::new(file.steps)
    }

    /// Restart from the first step instead of ending.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Total ticks in one pass.
    pub fn total_ticks(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.ticks)).sum()
    }

    /// Whether every step has been replayed.
    pub fn finished(&self) -> bool {
        self.index >= self.steps.len()
    }
}

impl DriverStation for ScriptedStation {
    fn sample(&mut self) -> Option<StationFrame> {
        if self.finished() {
            if !self.looping {
                return None;
            }
            self.index = 0;
        }
        let step = &self.steps[self.index];
        let first = self.tick_in_step == 0;
        if first {
            debug!(step = self.index, mode = ?step.mode, ticks = step.ticks, "script step");
        }

        let frame = StationFrame {
            mode: step.mode,
            input: InputSnapshot {
                driver: step.driver,
                operator: step.operator,
            },
            select_auto: if first { step.select_auto.clone() } else { None },
        };

        self.tick_in_step += 1;
        if self.tick_in_step >= step.ticks {
            self.tick_in_step = 0;
            self.index += 1;
        }
        Some(frame)
    }
}
