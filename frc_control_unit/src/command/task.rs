//! Task lifecycle: Idle → Scheduled → Running → Completed | Cancelled.
//!
//! One [`TaskEntry`] per one-shot kind plus one for the autonomous routine.
//! Every schedule that creates a new instance draws a fresh [`TaskId`] from
//! a single monotonically increasing counter.

use frc_common::command::{OneShotKind, RoutineId, TaskHandle, TaskId, TaskKind, TaskState};
use frc_common::state::ActuatorGroups;

/// Result of a task lifecycle transition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionResult {
    Ok(TaskState),
    Rejected(&'static str),
}

/// Lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent {
    /// New instance handed to the executor.
    Schedule,
    /// Executor observed the instance (first poll after scheduling).
    Start,
    /// Executor reports the instance finished.
    Finish,
    /// Instance cancelled by the arbiter.
    Cancel,
}

/// Lifecycle of one task slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskEntry {
    state: TaskState,
    handle: Option<TaskHandle>,
    requires: ActuatorGroups,
}

impl TaskEntry {
    #[inline]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Handle of the current (or last) instance.
    #[inline]
    pub const fn handle(&self) -> Option<TaskHandle> {
        self.handle
    }

    /// Handle of the instance, only while it is Scheduled or Running.
    #[inline]
    pub fn active_handle(&self) -> Option<TaskHandle> {
        if self.state.is_active() { self.handle } else { None }
    }

    #[inline]
    pub const fn requires(&self) -> ActuatorGroups {
        self.requires
    }

    pub fn handle_event(&mut self, event: TaskEvent) -> TransitionResult {
        use TaskEvent::*;
        use TaskState::*;

        let next = match (self.state, event) {
            (Idle | Cancelled | Completed, Schedule) => Scheduled,
            (Scheduled, Start) => Running,
            (Scheduled | Running, Finish) => Completed,
            (Scheduled | Running, Cancel) => Cancelled,
            (Scheduled | Running, Schedule) => {
                return TransitionResult::Rejected("already active");
            }
            (_, Start) => return TransitionResult::Rejected("Start: task is not scheduled"),
            (_, Finish | Cancel) => return TransitionResult::Rejected("task is not active"),
        };
        self.state = next;
        TransitionResult::Ok(next)
    }

    /// Schedule a new instance with the given identity.
    fn begin(&mut self, handle: TaskHandle, requires: ActuatorGroups) -> TransitionResult {
        let result = self.handle_event(TaskEvent::Schedule);
        if matches!(result, TransitionResult::Ok(_)) {
            self.handle = Some(handle);
            self.requires = requires;
        }
        result
    }
}

/// Task table owned by the arbiter.
#[derive(Debug, Clone)]
pub struct TaskTable {
    one_shots: [TaskEntry; OneShotKind::ALL.len()],
    routine: TaskEntry,
    next_id: u32,
}

impl Default for TaskTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskTable {
    pub const fn new() -> Self {
        const IDLE: TaskEntry = TaskEntry {
            state: TaskState::Idle,
            handle: None,
            requires: ActuatorGroups::empty(),
        };
        Self {
            one_shots: [IDLE; OneShotKind::ALL.len()],
            routine: IDLE,
            next_id: 1,
        }
    }

    fn allocate(&mut self) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    #[inline]
    pub fn one_shot(&self, kind: OneShotKind) -> &TaskEntry {
        &self.one_shots[kind.index()]
    }

    #[inline]
    pub fn one_shot_mut(&mut self, kind: OneShotKind) -> &mut TaskEntry {
        &mut self.one_shots[kind.index()]
    }

    #[inline]
    pub fn routine(&self) -> &TaskEntry {
        &self.routine
    }

    #[inline]
    pub fn routine_mut(&mut self) -> &mut TaskEntry {
        &mut self.routine
    }

    /// Create a new one-shot instance. `None` if the kind is already active.
    pub fn begin_one_shot(
        &mut self,
        kind: OneShotKind,
        requires: ActuatorGroups,
    ) -> Option<TaskHandle> {
        if self.one_shot(kind).state().is_active() {
            return None;
        }
        let handle = TaskHandle {
            id: self.allocate(),
            kind: TaskKind::OneShot(kind),
        };
        match self.one_shots[kind.index()].begin(handle, requires) {
            TransitionResult::Ok(_) => Some(handle),
            TransitionResult::Rejected(_) => None,
        }
    }

    /// Create a new routine instance. `None` if a routine is already active.
    pub fn begin_routine(
        &mut self,
        routine: RoutineId,
        requires: ActuatorGroups,
    ) -> Option<TaskHandle> {
        if self.routine.state().is_active() {
            return None;
        }
        let handle = TaskHandle {
            id: self.allocate(),
            kind: TaskKind::Routine(routine),
        };
        match self.routine.begin(handle, requires) {
            TransitionResult::Ok(_) => Some(handle),
            TransitionResult::Rejected(_) => None,
        }
    }

    /// Active one-shot kind running under `id`, if any.
    pub fn one_shot_by_id(&self, id: TaskId) -> Option<OneShotKind> {
        OneShotKind::ALL
            .into_iter()
            .find(|k| self.one_shot(*k).active_handle().is_some_and(|h| h.id == id))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
