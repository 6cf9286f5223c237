//! Task arbiter.
//!
//! Reconciles subsystem requests against group ownership and the task
//! table, and emits [`Instruction`]s into a bounded per-tick buffer that the
//! control core dispatches to the platform. The arbiter is the only mutator
//! of ownership.

use heapless::Vec;
use tracing::{debug, error, info, trace};

use frc_common::command::{ManualTarget, OneShotKind, Owner, RoutineId, TaskHandle, TaskId};
use frc_common::consts::{ACTUATOR_GROUP_COUNT, MAX_INSTRUCTIONS};
use frc_common::drive::{DriveCommand, Pose2d};
use frc_common::error::CommandError;
use frc_common::state::{
    ActuatorGroup, ActuatorGroups, ClimberState, IntakeState, LauncherState, RobotMode,
};

use super::ownership::{OwnershipResult, OwnershipTable, try_acquire};
use super::task::{TaskEvent, TaskTable};
use crate::config::TaskConfig;
use crate::platform::TaskExecutor;

/// One side effect to apply to the platform this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    StartTask(TaskHandle),
    CancelTask(TaskHandle),
    SetLauncher(LauncherState),
    SetIntake(IntakeState),
    SetClimber(ClimberState),
    Drive(DriveCommand),
    LockWheels,
    ResetPose(Pose2d),
}

impl From<ManualTarget> for Instruction {
    fn from(target: ManualTarget) -> Self {
        match target {
            ManualTarget::Launcher(s) => Self::SetLauncher(s),
            ManualTarget::Intake(s) => Self::SetIntake(s),
            ManualTarget::Climber(s) => Self::SetClimber(s),
            ManualTarget::Drive(cmd) => Self::Drive(cmd),
        }
    }
}

/// Per-tick instruction buffer.
pub type Instructions = Vec<Instruction, MAX_INSTRUCTIONS>;

/// Result of a one-shot schedule request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleResult {
    /// New instance created.
    Scheduled(TaskId),
    /// Instance already Scheduled or Running, nothing emitted.
    AlreadyActive(TaskId),
    Rejected(CommandError),
}

/// Whether a one-shot request comes from a new press or a held input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestEdge {
    /// Input went active this tick; may preempt another one-shot.
    Pressed,
    /// Input still held; yields to another active one-shot.
    Held,
}

impl RequestEdge {
    #[inline]
    pub const fn from_pressed(pressed: bool) -> Self {
        if pressed { Self::Pressed } else { Self::Held }
    }
}

/// Result of a cancel request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelResult {
    Cancelled(TaskId),
    /// Nothing active, nothing emitted.
    NotActive,
}

/// Result of submitting a manual target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetResult {
    /// Emitted, group was under manual control.
    Applied,
    /// Emitted after cancelling the one-shot task that owned the group.
    Preempted(TaskId),
    /// Group owned by Autonomous; recorded and applied on release.
    Pending,
    /// Same target as the one already applied under a one-shot owner.
    Unchanged,
}

/// What the executor poll changed this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Routine instance that finished this tick.
    pub routine_completed: Option<TaskId>,
    /// Number of one-shot instances that finished this tick.
    pub one_shots_completed: u8,
}

/// Ownership and task arbitration.
#[derive(Debug)]
pub struct TaskArbiter {
    ownership: OwnershipTable,
    tasks: TaskTable,
    requirements: [ActuatorGroups; OneShotKind::ALL.len()],
    last_applied: [Option<ManualTarget>; ACTUATOR_GROUP_COUNT],
    out: Instructions,
    dropped: u32,
}

impl TaskArbiter {
    pub fn new(config: &TaskConfig) -> Self {
        let mut requirements = [ActuatorGroups::empty(); OneShotKind::ALL.len()];
        requirements[OneShotKind::Shoot.index()] = config.shoot_requires;
        requirements[OneShotKind::Handoff.index()] = config.handoff_requires;
        Self {
            ownership: OwnershipTable::new(),
            tasks: TaskTable::new(),
            requirements,
            last_applied: [None; ACTUATOR_GROUP_COUNT],
            out: Instructions::new(),
            dropped: 0,
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub fn owner(&self, group: ActuatorGroup) -> Owner {
        self.ownership.owner(group)
    }

    #[inline]
    pub fn ownership(&self) -> &OwnershipTable {
        &self.ownership
    }

    #[inline]
    pub fn tasks(&self) -> &TaskTable {
        &self.tasks
    }

    /// Instructions emitted since the last [`take_instructions`](Self::take_instructions).
    #[inline]
    pub fn instructions(&self) -> &[Instruction] {
        &self.out
    }

    /// Drain the buffer for dispatch.
    pub fn take_instructions(&mut self) -> Instructions {
        core::mem::take(&mut self.out)
    }

    /// Instructions lost to a full buffer since startup.
    #[inline]
    pub fn dropped_instructions(&self) -> u32 {
        self.dropped
    }

    fn emit(&mut self, instruction: Instruction) {
        if self.out.push(instruction).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            error!(?instruction, "instruction buffer full, instruction dropped");
        }
    }

    fn apply(&mut self, target: ManualTarget) {
        self.last_applied[target.group().index()] = Some(target);
        self.emit(target.into());
    }

    // ─── One-shot tasks ─────────────────────────────────────────────

    /// Request a one-shot task.
    ///
    /// Only honoured in Teleop. Idempotent while the kind is active. A new
    /// instance takes its requirement groups; it is rejected if Autonomous
    /// holds any of them. Another one-shot holding them is cancelled on a
    /// [`RequestEdge::Pressed`] request and kept on a [`RequestEdge::Held`]
    /// one, so two held inputs do not trade the groups every tick.
    pub fn request_one_shot(
        &mut self,
        mode: RobotMode,
        kind: OneShotKind,
        edge: RequestEdge,
    ) -> ScheduleResult {
        if mode != RobotMode::Teleop {
            debug!(?kind, ?mode, "one-shot request outside teleop ignored");
            return ScheduleResult::Rejected(CommandError::MODE_NOT_TELEOP);
        }
        if let Some(active) = self.tasks.one_shot(kind).active_handle() {
            return ScheduleResult::AlreadyActive(active.id);
        }

        let requires = self.requirements[kind.index()];
        if self.ownership.autonomous_holds_any(requires) {
            debug!(?kind, "one-shot rejected, groups owned by autonomous");
            return ScheduleResult::Rejected(CommandError::AUTONOMOUS_OWNED);
        }
        if edge == RequestEdge::Held {
            if let Some(holder) = self.one_shot_holding(requires) {
                trace!(?kind, holder = holder.0, "held request yields to active one-shot");
                return ScheduleResult::Rejected(CommandError::ONE_SHOT_ACTIVE);
            }
        }
        if self.out.len() + requires.bits().count_ones() as usize + 1 > MAX_INSTRUCTIONS {
            error!(?kind, "instruction buffer full, one-shot not scheduled");
            return ScheduleResult::Rejected(CommandError::BUFFER_FULL);
        }

        let Some(handle) = self.tasks.begin_one_shot(kind, requires) else {
            return ScheduleResult::Rejected(CommandError::empty());
        };
        let owner = Owner::OneShot(handle.id);
        self.acquire(requires, owner);
        debug!(?kind, id = handle.id.0, "one-shot scheduled");
        self.emit(Instruction::StartTask(handle));
        ScheduleResult::Scheduled(handle.id)
    }

    /// Cancel a one-shot task. Idempotent.
    pub fn cancel_one_shot(&mut self, kind: OneShotKind) -> CancelResult {
        let entry = self.tasks.one_shot_mut(kind);
        let Some(handle) = entry.active_handle() else {
            trace!(?kind, "cancel of inactive one-shot ignored");
            return CancelResult::NotActive;
        };
        entry.handle_event(TaskEvent::Cancel);
        self.ownership.release_all_of(Owner::OneShot(handle.id));
        debug!(?kind, id = handle.id.0, "one-shot cancelled");
        self.emit(Instruction::CancelTask(handle));
        CancelResult::Cancelled(handle.id)
    }

    /// Take `groups` for `owner`, cancelling one-shots that held them.
    fn acquire(&mut self, groups: ActuatorGroups, owner: Owner) {
        for group in groups.groups() {
            match try_acquire(self.ownership.slot_mut(group), owner) {
                OwnershipResult::Preempted(previous) => {
                    self.cancel_one_shot_by_id(previous);
                }
                OwnershipResult::Rejected { held_by } => {
                    debug!(?group, ?owner, ?held_by, "group not acquired");
                }
                _ => {}
            }
        }
    }

    fn one_shot_holding(&self, groups: ActuatorGroups) -> Option<TaskId> {
        groups.groups().find_map(|g| match self.ownership.owner(g) {
            Owner::OneShot(id) => Some(id),
            _ => None,
        })
    }

    fn cancel_one_shot_by_id(&mut self, id: TaskId) -> CancelResult {
        match self.tasks.one_shot_by_id(id) {
            Some(kind) => self.cancel_one_shot(kind),
            None => CancelResult::NotActive,
        }
    }

    pub fn cancel_all_one_shots(&mut self) {
        for kind in OneShotKind::ALL {
            self.cancel_one_shot(kind);
        }
    }

    // ─── Autonomous routine ─────────────────────────────────────────

    /// Give Autonomous `groups`, cancelling one-shot owners.
    ///
    /// Manual targets submitted for these groups are parked until
    /// [`release_autonomous`](Self::release_autonomous).
    pub fn hold_autonomous(&mut self, groups: ActuatorGroups) {
        self.acquire(groups, Owner::Autonomous);
    }

    /// Start a routine, holding its requirement groups for Autonomous.
    ///
    /// Returns `None` when a routine is already active.
    pub fn start_routine(&mut self, routine: RoutineId, requires: ActuatorGroups) -> Option<TaskId> {
        let handle = self.tasks.begin_routine(routine, requires)?;
        self.hold_autonomous(requires);
        info!(routine = routine.0, id = handle.id.0, "autonomous routine started");
        self.emit(Instruction::StartTask(handle));
        Some(handle.id)
    }

    /// Cancel the routine and hand its groups back to manual control,
    /// applying any pending manual targets. Idempotent.
    pub fn cancel_routine(&mut self) -> CancelResult {
        let entry = self.tasks.routine_mut();
        let Some(handle) = entry.active_handle() else {
            return CancelResult::NotActive;
        };
        entry.handle_event(TaskEvent::Cancel);
        info!(id = handle.id.0, "autonomous routine cancelled");
        self.emit(Instruction::CancelTask(handle));
        self.release_autonomous();
        CancelResult::Cancelled(handle.id)
    }

    /// Return Autonomous-held groups to Manual and apply pending targets.
    pub fn release_autonomous(&mut self) {
        for target in self.ownership.release_all_of(Owner::Autonomous) {
            debug!(?target, "applying pending manual target");
            self.apply(target);
        }
    }

    // ─── Manual targets ─────────────────────────────────────────────

    /// Submit a manual target for its group.
    pub fn submit(&mut self, target: ManualTarget) -> TargetResult {
        let group = target.group();
        match self.ownership.owner(group) {
            Owner::Manual => {
                self.apply(target);
                TargetResult::Applied
            }
            Owner::Autonomous => {
                trace!(?target, "group owned by autonomous, target parked");
                self.ownership.slot_mut(group).record_pending(target);
                TargetResult::Pending
            }
            Owner::OneShot(id) => {
                if self.last_applied[group.index()] == Some(target) {
                    return TargetResult::Unchanged;
                }
                self.cancel_one_shot_by_id(id);
                // Stale owner with no live task.
                self.ownership.slot_mut(group).force_release();
                self.apply(target);
                TargetResult::Preempted(id)
            }
        }
    }

    /// Lock the drivebase wheels, optionally resetting the pose first.
    ///
    /// Follows the same ownership rules as a drive target.
    pub fn lock_wheels(&mut self, reset_to: Option<Pose2d>) -> TargetResult {
        let result = match self.ownership.owner(ActuatorGroup::Drivebase) {
            Owner::Manual => TargetResult::Applied,
            Owner::Autonomous => {
                trace!("drivebase owned by autonomous, lock ignored");
                return TargetResult::Pending;
            }
            Owner::OneShot(id) => {
                self.cancel_one_shot_by_id(id);
                self.ownership.slot_mut(ActuatorGroup::Drivebase).force_release();
                TargetResult::Preempted(id)
            }
        };
        self.last_applied[ActuatorGroup::Drivebase.index()] = None;
        if let Some(pose) = reset_to {
            self.emit(Instruction::ResetPose(pose));
        }
        self.emit(Instruction::LockWheels);
        result
    }

    /// Unconditional pose reset (mode entry).
    pub fn reset_pose(&mut self, pose: Pose2d) {
        self.emit(Instruction::ResetPose(pose));
    }

    // ─── Bulk operations ────────────────────────────────────────────

    /// Cancel everything and return all groups to Manual, dropping pending
    /// targets.
    pub fn cancel_all(&mut self) {
        self.cancel_all_one_shots();
        if let Some(handle) = self.tasks.routine().active_handle() {
            self.tasks.routine_mut().handle_event(TaskEvent::Cancel);
            info!(id = handle.id.0, "autonomous routine cancelled");
            self.emit(Instruction::CancelTask(handle));
        }
        self.ownership.force_release_all();
    }

    /// Safe outputs: launcher off, intake stopped, climber off, zero drive.
    pub fn safe_outputs(&mut self) {
        self.apply(ManualTarget::Launcher(LauncherState::Off));
        self.apply(ManualTarget::Intake(IntakeState::Stop));
        self.apply(ManualTarget::Climber(ClimberState::Off));
        self.apply(ManualTarget::Drive(DriveCommand::STOP));
    }

    // ─── Executor poll ──────────────────────────────────────────────

    /// Advance task states from what the executor reports.
    pub fn poll(&mut self, executor: &dyn TaskExecutor) -> PollReport {
        let mut report = PollReport::default();

        for kind in OneShotKind::ALL {
            let Some(handle) = self.tasks.one_shot(kind).active_handle() else {
                continue;
            };
            let entry = self.tasks.one_shot_mut(kind);
            if executor.is_finished(&handle) {
                entry.handle_event(TaskEvent::Finish);
                self.ownership.release_all_of(Owner::OneShot(handle.id));
                report.one_shots_completed += 1;
                debug!(?kind, id = handle.id.0, "one-shot completed");
            } else {
                // Scheduled → Running; already Running is rejected and ignored.
                entry.handle_event(TaskEvent::Start);
            }
        }

        if let Some(handle) = self.tasks.routine().active_handle() {
            if executor.is_finished(&handle) {
                // Groups stay with Autonomous until the mode is left.
                self.tasks.routine_mut().handle_event(TaskEvent::Finish);
                info!(id = handle.id.0, "autonomous routine completed");
                report.routine_completed = Some(handle.id);
            } else {
                self.tasks.routine_mut().handle_event(TaskEvent::Start);
            }
        }
        report
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
