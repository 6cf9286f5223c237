//! Simulated subsystems and task executor.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, trace};

use frc_common::command::{TaskHandle, TaskId, TaskKind};
use frc_common::drive::{DriveCommand, Pose2d};
use frc_common::state::{ClimberState, IntakeState, LauncherState};
use frc_common::telemetry::{DiagnosticFlags, Diagnostics};

use crate::platform::{Actuator, Drivebase, Platform, TaskExecutor, TelemetrySink};
use crate::telemetry::sinks::MemorySink;

/// Top speed the normalized drive command is scaled to [m/s].
pub const SIM_MAX_SPEED_MPS: f64 = 4.5;
/// Top rotation rate [deg/s].
pub const SIM_MAX_ROTATION_DPS: f64 = 360.0;

// ─── Actuators ──────────────────────────────────────────────────────

/// Mechanism whose readings follow its commanded state.
///
/// `profile` maps a state to `(position, current, aux_current)`.
#[derive(Debug, Clone)]
pub struct SimActuator<S> {
    state: S,
    applied: u32,
    profile: fn(S) -> (f64, f64, f64),
    connected: bool,
    break_beam: bool,
}

impl<S: Copy + Default> SimActuator<S> {
    pub fn new(profile: fn(S) -> (f64, f64, f64)) -> Self {
        Self {
            state: S::default(),
            applied: 0,
            profile,
            connected: true,
            break_beam: false,
        }
    }

    #[inline]
    pub fn state(&self) -> S {
        self.state
    }

    /// Number of `set_state` calls received.
    #[inline]
    pub fn applied(&self) -> u32 {
        self.applied
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn set_break_beam(&mut self, blocked: bool) {
        self.break_beam = blocked;
    }
}

impl SimActuator<LauncherState> {
    /// Pivot angle [deg] and pivot/flywheel current [A].
    pub fn launcher() -> Self {
        Self::new(|state| match state {
            LauncherState::Speaker => (35.0, 18.0, 40.0),
            LauncherState::Amp => (95.0, 6.0, 12.0),
            LauncherState::Trap => (110.0, 8.0, 30.0),
            LauncherState::Hold => (20.0, 2.0, 0.0),
            LauncherState::Off => (0.0, 0.0, 0.0),
        })
    }
}

impl SimActuator<IntakeState> {
    /// Flipper position [rot] and flipper/roller current [A].
    pub fn intake() -> Self {
        Self::new(|state| match state {
            IntakeState::Run => (0.5, 3.0, 22.0),
            IntakeState::Reverse => (0.5, 3.0, 18.0),
            IntakeState::Stop => (0.0, 0.0, 0.0),
        })
    }
}

impl SimActuator<ClimberState> {
    pub fn climber() -> Self {
        Self::new(|state| match state {
            ClimberState::Up => (1.0, 25.0, 25.0),
            ClimberState::Down => (0.0, 35.0, 35.0),
            ClimberState::Off => (0.0, 0.0, 0.0),
        })
    }
}

impl<S: Copy + Default + std::fmt::Debug> Actuator<S> for SimActuator<S> {
    fn set_state(&mut self, state: S) {
        trace!(?state, "sim actuator set");
        self.state = state;
        self.applied += 1;
    }

    fn diagnostics(&self) -> Diagnostics {
        let (position, current, aux_current) = (self.profile)(self.state);
        let mut flags = DiagnosticFlags::empty();
        flags.set(DiagnosticFlags::CONNECTED, self.connected);
        flags.set(DiagnosticFlags::BREAK_BEAM, self.break_beam);
        if !self.connected {
            return Diagnostics {
                flags,
                ..Default::default()
            };
        }
        Diagnostics {
            position,
            current,
            aux_current,
            flags,
        }
    }
}

// ─── Drivebase ──────────────────────────────────────────────────────

/// Kinematic swerve stand-in: integrates each drive command over one tick.
#[derive(Debug, Clone)]
pub struct SimDrivebase {
    dt: Duration,
    pose: Pose2d,
    last_command: Option<DriveCommand>,
    locked: bool,
    locks: u32,
    resets: u32,
    connected: bool,
}

impl SimDrivebase {
    pub fn new(dt: Duration) -> Self {
        Self {
            dt,
            pose: Pose2d::ORIGIN,
            last_command: None,
            locked: false,
            locks: 0,
            resets: 0,
            connected: true,
        }
    }

    #[inline]
    pub fn pose(&self) -> Pose2d {
        self.pose
    }

    #[inline]
    pub fn last_command(&self) -> Option<DriveCommand> {
        self.last_command
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Number of wheel-lock calls.
    #[inline]
    pub fn locks(&self) -> u32 {
        self.locks
    }

    /// Number of pose resets.
    #[inline]
    pub fn resets(&self) -> u32 {
        self.resets
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Drivebase for SimDrivebase {
    fn drive(&mut self, command: &DriveCommand) {
        let dt = self.dt.as_secs_f64();
        let (vx, vy) = (
            command.x_speed * SIM_MAX_SPEED_MPS,
            command.y_speed * SIM_MAX_SPEED_MPS,
        );
        // Robot-relative speeds are rotated into the field frame.
        let (fx, fy) = if command.field_relative {
            (vx, vy)
        } else {
            let (sin, cos) = self.pose.heading_deg.to_radians().sin_cos();
            (vx * cos - vy * sin, vx * sin + vy * cos)
        };
        self.pose.x_m += fx * dt;
        self.pose.y_m += fy * dt;
        self.pose.heading_deg =
            (self.pose.heading_deg + command.rotation * SIM_MAX_ROTATION_DPS * dt).rem_euclid(360.0);
        self.last_command = Some(*command);
        self.locked = false;
    }

    fn lock_wheels(&mut self) {
        self.locked = true;
        self.locks += 1;
        self.last_command = Some(DriveCommand::STOP);
    }

    fn reset_pose(&mut self, pose: Pose2d) {
        self.pose = pose;
        self.resets += 1;
    }

    fn translational_velocity(&self) -> f64 {
        match self.last_command {
            Some(cmd) if !self.locked => cmd.x_speed.hypot(cmd.y_speed) * SIM_MAX_SPEED_MPS,
            _ => 0.0,
        }
    }

    fn diagnostics(&self) -> Diagnostics {
        let mut flags = DiagnosticFlags::empty();
        flags.set(DiagnosticFlags::CONNECTED, self.connected);
        Diagnostics {
            position: self.pose.heading_deg,
            flags,
            ..Default::default()
        }
    }
}

// ─── Task Executor ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct SimTask {
    /// Completion polls left; `None` runs until finished by hand.
    remaining: Option<u32>,
    finished: bool,
}

/// Executor that completes tasks after a fixed number of polls.
///
/// The control core polls each active task once per tick, so the budget is
/// effectively measured in ticks.
#[derive(Debug, Default)]
pub struct SimExecutor {
    one_shot_ticks: Option<u32>,
    routine_ticks: Option<u32>,
    tasks: RefCell<HashMap<TaskId, SimTask>>,
    scheduled: Vec<TaskHandle>,
    cancelled: Vec<TaskHandle>,
}

impl SimExecutor {
    /// Tasks that never finish on their own.
    pub fn manual() -> Self {
        Self::default()
    }

    pub fn with_durations(one_shot_ticks: Option<u32>, routine_ticks: Option<u32>) -> Self {
        Self {
            one_shot_ticks,
            routine_ticks,
            ..Default::default()
        }
    }

    /// Mark a task as finished.
    pub fn finish(&mut self, id: TaskId) {
        if let Some(task) = self.tasks.get_mut().get_mut(&id) {
            task.finished = true;
        }
    }

    /// Every handle ever scheduled, in order.
    pub fn scheduled(&self) -> &[TaskHandle] {
        &self.scheduled
    }

    /// Every handle cancelled, in order.
    pub fn cancelled(&self) -> &[TaskHandle] {
        &self.cancelled
    }

    pub fn is_running(&self, id: TaskId) -> bool {
        self.tasks.borrow().get(&id).is_some_and(|t| !t.finished)
    }

    /// Most recently scheduled handle of the given kind.
    pub fn last_scheduled(&self, kind: TaskKind) -> Option<TaskHandle> {
        self.scheduled.iter().rev().find(|h| h.kind == kind).copied()
    }
}

impl TaskExecutor for SimExecutor {
    fn schedule(&mut self, task: &TaskHandle) {
        let remaining = match task.kind {
            TaskKind::OneShot(_) => self.one_shot_ticks,
            TaskKind::Routine(_) => self.routine_ticks,
        };
        debug!(id = task.id.0, kind = ?task.kind, ?remaining, "sim task scheduled");
        self.tasks.get_mut().insert(
            task.id,
            SimTask {
                remaining,
                finished: false,
            },
        );
        self.scheduled.push(*task);
    }

    fn cancel(&mut self, task: &TaskHandle) {
        if self.tasks.get_mut().remove(&task.id).is_some() {
            debug!(id = task.id.0, "sim task cancelled");
        }
        self.cancelled.push(*task);
    }

    fn is_finished(&self, task: &TaskHandle) -> bool {
        let mut tasks = self.tasks.borrow_mut();
        let Some(entry) = tasks.get_mut(&task.id) else {
            return false;
        };
        if let Some(left) = entry.remaining.as_mut() {
            *left = left.saturating_sub(1);
            if *left == 0 {
                entry.finished = true;
            }
        }
        entry.finished
    }
}

// ─── Platform ───────────────────────────────────────────────────────

/// All simulated collaborators, with a pluggable telemetry sink.
pub struct SimPlatform<T: TelemetrySink = MemorySink> {
    pub drivebase: SimDrivebase,
    pub launcher: SimActuator<LauncherState>,
    pub intake: SimActuator<IntakeState>,
    pub climber: SimActuator<ClimberState>,
    pub executor: SimExecutor,
    pub telemetry: T,
}

impl SimPlatform<MemorySink> {
    /// Tasks finish only by hand; frames go to a [`MemorySink`].
    pub fn manual(dt: Duration) -> Self {
        Self::new(dt, SimExecutor::manual(), MemorySink::default())
    }
}

impl<T: TelemetrySink> SimPlatform<T> {
    pub fn new(dt: Duration, executor: SimExecutor, telemetry: T) -> Self {
        Self {
            drivebase: SimDrivebase::new(dt),
            launcher: SimActuator::launcher(),
            intake: SimActuator::intake(),
            climber: SimActuator::climber(),
            executor,
            telemetry,
        }
    }
}

impl<T: TelemetrySink> Platform for SimPlatform<T> {
    type Drivebase = SimDrivebase;
    type Launcher = SimActuator<LauncherState>;
    type Intake = SimActuator<IntakeState>;
    type Climber = SimActuator<ClimberState>;
    type Executor = SimExecutor;
    type Telemetry = T;

    fn drivebase(&mut self) -> &mut SimDrivebase {
        &mut self.drivebase
    }

    fn launcher(&mut self) -> &mut SimActuator<LauncherState> {
        &mut self.launcher
    }

    fn intake(&mut self) -> &mut SimActuator<IntakeState> {
        &mut self.intake
    }

    fn climber(&mut self) -> &mut SimActuator<ClimberState> {
        &mut self.climber
    }

    fn executor(&mut self) -> &mut SimExecutor {
        &mut self.executor
    }

    fn telemetry(&mut self) -> &mut T {
        &mut self.telemetry
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
