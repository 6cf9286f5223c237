//! Autonomous routine registry and selection.
//!
//! [`AutoRegistry`] is the static name → routine table built at startup. It
//! is constructed once, populated via `register()`, and handed to the
//! control core by value. [`AutoSession`] holds the operator's chosen name
//! and the lifecycle of the routine started from it:
//!
//! ```text
//! Selected ──start──▶ Running ──┬──▶ Completed
//!                               └──▶ Cancelled
//! ```
//!
//! A selection made while a routine runs is stored and only takes effect
//! at the next Autonomous entry.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{info, warn};

use frc_common::command::{RoutineId, TaskId};
use frc_common::drive::Pose2d;
use frc_common::state::ActuatorGroups;

use crate::config::AutonomousConfig;

/// Registry error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("routine '{0}' is already registered")]
    Duplicate(String),
    #[error("too many routines registered")]
    Full,
}

/// What a routine needs from the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoRoutine {
    /// Pose the drivebase is reset to before the routine starts.
    pub start_pose: Option<Pose2d>,
    /// Groups the routine takes from manual control.
    pub requires: ActuatorGroups,
}

impl Default for AutoRoutine {
    fn default() -> Self {
        Self {
            start_pose: None,
            requires: ActuatorGroups::all(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredRoutine {
    pub id: RoutineId,
    pub name: String,
    pub routine: AutoRoutine,
}

/// Static name → routine registry.
#[derive(Debug, Default)]
pub struct AutoRegistry {
    routines: Vec<RegisteredRoutine>,
    by_name: HashMap<String, RoutineId>,
}

impl AutoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from the `[[autonomous.routine]]` entries.
    pub fn from_config(config: &AutonomousConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for entry in &config.routines {
            registry.register(
                &entry.name,
                AutoRoutine {
                    start_pose: entry.start_pose,
                    requires: entry.requires,
                },
            )?;
        }
        Ok(registry)
    }

    /// Register a routine under `name`.
    pub fn register(&mut self, name: &str, routine: AutoRoutine) -> Result<RoutineId, RegistryError> {
        if self.by_name.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        let id = u16::try_from(self.routines.len())
            .map(RoutineId)
            .map_err(|_| RegistryError::Full)?;
        self.routines.push(RegisteredRoutine {
            id,
            name: name.to_string(),
            routine,
        });
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Look a routine up by name.
    pub fn resolve(&self, name: &str) -> Option<&RegisteredRoutine> {
        self.by_name.get(name).and_then(|id| self.get(*id))
    }

    pub fn get(&self, id: RoutineId) -> Option<&RegisteredRoutine> {
        self.routines.get(usize::from(id.0))
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routines.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }
}

/// Resolved selection, detached from the registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutoSelection {
    /// No name chosen, or the name is not registered.
    None,
    Routine { id: RoutineId, routine: AutoRoutine },
}

impl AutoSelection {
    /// Start pose of the selected routine, if it has one.
    pub fn start_pose(&self) -> Option<Pose2d> {
        match self {
            Self::None => None,
            Self::Routine { routine, .. } => routine.start_pose,
        }
    }
}

/// Routine lifecycle within a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing running; the chosen name (if any) waits for Autonomous.
    #[default]
    Selected,
    Running(TaskId),
    Cancelled,
    Completed,
}

/// Operator's autonomous choice and the routine started from it.
#[derive(Debug, Clone, Default)]
pub struct AutoSession {
    chosen: Option<String>,
    phase: SessionPhase,
}

impl AutoSession {
    pub fn new(chosen: Option<String>) -> Self {
        Self {
            chosen,
            phase: SessionPhase::Selected,
        }
    }

    /// Record the operator's choice. `None` clears it.
    pub fn select(&mut self, name: Option<&str>) {
        if matches!(self.phase, SessionPhase::Running(_)) {
            info!(?name, "autonomous selection stored, applies at next autonomous entry");
        }
        self.chosen = name.map(str::to_string);
    }

    #[inline]
    pub fn chosen(&self) -> Option<&str> {
        self.chosen.as_deref()
    }

    #[inline]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Resolve the chosen name against the registry.
    pub fn resolve(&self, registry: &AutoRegistry) -> AutoSelection {
        let Some(name) = self.chosen() else {
            return AutoSelection::None;
        };
        match registry.resolve(name) {
            Some(entry) => AutoSelection::Routine {
                id: entry.id,
                routine: entry.routine,
            },
            None => {
                warn!(name, "selected autonomous routine is not registered");
                AutoSelection::None
            }
        }
    }

    pub fn started(&mut self, id: TaskId) {
        self.phase = SessionPhase::Running(id);
    }

    /// Mark the running routine cancelled. No-op when nothing runs.
    pub fn cancelled(&mut self) {
        if matches!(self.phase, SessionPhase::Running(_)) {
            self.phase = SessionPhase::Cancelled;
        }
    }

    /// Mark routine `id` completed if it is the one running.
    pub fn completed(&mut self, id: TaskId) {
        if self.phase == SessionPhase::Running(id) {
            self.phase = SessionPhase::Completed;
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
