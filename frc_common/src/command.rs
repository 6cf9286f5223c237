//! Command and ownership types for the control core.
//!
//! Defines task identities (`TaskId`, `TaskKind`, `TaskHandle`), the
//! one-shot task lifecycle (`TaskState`), actuator ownership (`Owner`,
//! `OwnershipSlot`) and the manual targets that can be parked on a slot
//! while another owner holds it.

use serde::{Deserialize, Serialize};

use crate::drive::DriveCommand;
use crate::state::{ActuatorGroup, ClimberState, IntakeState, LauncherState};

/// Identity of one scheduled task instance. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub u32);

/// Identity of a registered autonomous routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoutineId(pub u16);

/// Triggered, self-terminating actions available to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum OneShotKind {
    /// Spin up and fire the loaded note.
    Shoot = 0,
    /// Move a note from the intake into the launcher.
    Handoff = 1,
}

impl OneShotKind {
    pub const ALL: [Self; 2] = [Self::Shoot, Self::Handoff];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// What the task executor is asked to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    OneShot(OneShotKind),
    Routine(RoutineId),
}

/// Handle passed to the task executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle {
    pub id: TaskId,
    pub kind: TaskKind,
}

/// One-shot task / routine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TaskState {
    /// Never scheduled.
    #[default]
    Idle = 0,
    /// Start instruction issued this tick.
    Scheduled = 1,
    /// Executor is running it.
    Running = 2,
    /// Cancelled before natural completion.
    Cancelled = 3,
    /// Executor reported completion.
    Completed = 4,
}

impl TaskState {
    /// Scheduled or running, so it holds ownership.
    #[inline]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Scheduled | Self::Running)
    }
}

/// Exclusive commanding owner of one actuator group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Owner {
    /// Teleoperation via the subsystem state machines.
    #[default]
    Manual,
    /// The running autonomous routine.
    Autonomous,
    /// A live one-shot task.
    OneShot(TaskId),
}

/// Manual command for one actuator group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ManualTarget {
    Launcher(LauncherState),
    Intake(IntakeState),
    Climber(ClimberState),
    Drive(DriveCommand),
}

impl ManualTarget {
    /// Actuator group this target drives.
    pub const fn group(&self) -> ActuatorGroup {
        match self {
            Self::Launcher(_) => ActuatorGroup::Launcher,
            Self::Intake(_) => ActuatorGroup::Intake,
            Self::Climber(_) => ActuatorGroup::Climber,
            Self::Drive(_) => ActuatorGroup::Drivebase,
        }
    }
}

/// Per-group ownership slot.
///
/// Tracks who may command the group and the latest manual target received
/// while a non-manual owner held it.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipSlot {
    /// Current owner.
    pub owner: Owner,
    /// Manual target recorded while not owned by `Manual`.
    pub pending: Option<ManualTarget>,
}

impl OwnershipSlot {
    #[inline]
    pub fn is_manual(&self) -> bool {
        matches!(self.owner, Owner::Manual)
    }

    #[inline]
    pub fn is_held_by(&self, owner: Owner) -> bool {
        self.owner == owner
    }

    /// Hand the slot to a new owner. Pending manual targets survive.
    pub fn grant(&mut self, owner: Owner) {
        self.owner = owner;
    }

    /// Park a manual target until ownership reverts (last writer wins).
    pub fn record_pending(&mut self, target: ManualTarget) {
        self.pending = Some(target);
    }

    /// Return the slot to `Manual`, yielding the parked target if any.
    pub fn revert_to_manual(&mut self) -> Option<ManualTarget> {
        self.owner = Owner::Manual;
        self.pending.take()
    }

    /// Return to `Manual` and drop any parked target.
    pub fn force_release(&mut self) {
        self.owner = Owner::Manual;
        self.pending = None;
    }
}
