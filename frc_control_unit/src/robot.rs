//! Control core: one call to [`RobotCore::tick`] is one control period.
//!
//! Order within a tick:
//!
//! 1. sample the mode signal, run entry actions on a transition;
//! 2. update the toggle/edge tracker with the input snapshot;
//! 3. poll the task executor (Scheduled → Running, finished → Completed);
//! 4. in Autonomous and Teleop, evaluate the subsystem machines and submit
//!    their requests to the arbiter (Autonomous owns every group, so its
//!    requests are parked until Teleop);
//! 5. dispatch the arbiter's instructions to the platform, committing
//!    subsystem states as they are applied.
//!
//! Telemetry is published separately through
//! [`publish_telemetry`](RobotCore::publish_telemetry) so the cycle runner
//! can drop it when the critical path ran long.

use tracing::{debug, info};

use frc_common::command::{ManualTarget, OneShotKind};
use frc_common::drive::{DriveCommand, Pose2d};
use frc_common::input::InputSnapshot;
use frc_common::state::{
    ActuatorGroups, ClimberState, DriveMode, IntakeState, LauncherState, RobotMode,
};

use crate::autonomous::{AutoRegistry, AutoSelection, AutoSession, RegistryError};
use crate::command::arbitration::{
    CancelResult, Instruction, Instructions, RequestEdge, TaskArbiter,
};
use crate::config::RobotConfig;
use crate::input::bindings::ControlScheme;
use crate::input::toggle::ToggleTracker;
use crate::platform::{Actuator, Drivebase, Platform, TaskExecutor};
use crate::state::climber::ClimberMachine;
use crate::state::drive::{DriveMachine, DriveRequest};
use crate::state::intake::IntakeMachine;
use crate::state::launcher::{LauncherAction, LauncherMachine};
use crate::state::mode::{EntryActions, ModeController, ModeTransition};
use crate::telemetry::adapter::{ControlSummary, SubsystemReadings, TelemetryAdapter};

/// Outcome of one tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    pub mode: RobotMode,
    pub transition: Option<ModeTransition>,
    /// Instructions dispatched this tick, in order.
    pub instructions: Instructions,
}

/// The periodic control core, generic over the injected platform.
pub struct RobotCore<P: Platform> {
    platform: P,
    scheme: ControlScheme,
    default_start_pose: Pose2d,
    registry: AutoRegistry,
    modes: ModeController,
    toggles: ToggleTracker,
    arbiter: TaskArbiter,
    launcher: LauncherMachine,
    intake: IntakeMachine,
    climber: ClimberMachine,
    drive: DriveMachine,
    telemetry: TelemetryAdapter,
    tick: u64,
}

impl<P: Platform> RobotCore<P> {
    pub fn new(platform: P, config: &RobotConfig, registry: AutoRegistry) -> Self {
        let session = AutoSession::new(config.autonomous.selected.clone());
        Self {
            platform,
            scheme: config.scheme.clone(),
            default_start_pose: config.autonomous.start_pose,
            registry,
            modes: ModeController::new(session),
            toggles: ToggleTracker::new(&config.scheme),
            arbiter: TaskArbiter::new(&config.tasks),
            launcher: LauncherMachine::new(),
            intake: IntakeMachine::new(),
            climber: ClimberMachine::new(),
            drive: DriveMachine::new(),
            telemetry: TelemetryAdapter::new(),
            tick: 0,
        }
    }

    /// Build the registry from the config and construct the core.
    pub fn from_config(platform: P, config: &RobotConfig) -> Result<Self, RegistryError> {
        let registry = AutoRegistry::from_config(&config.autonomous)?;
        Ok(Self::new(platform, config, registry))
    }

    // ─── Tick ───────────────────────────────────────────────────────

    /// Run one control period. Never blocks, never fails.
    pub fn tick(&mut self, signal: RobotMode, input: &InputSnapshot) -> TickReport {
        self.tick += 1;

        let transition = self.modes.sample(signal);
        if let Some(t) = transition {
            self.enter(t);
        }

        self.toggles.update(input);

        let poll = self.arbiter.poll(&*self.platform.executor());
        if let Some(id) = poll.routine_completed {
            self.modes.session_mut().completed(id);
        }

        if self.modes.mode().is_enabled() {
            self.evaluate_subsystems();
        }

        let instructions = self.dispatch();
        TickReport {
            tick: self.tick,
            mode: self.modes.mode(),
            transition,
            instructions,
        }
    }

    fn enter(&mut self, transition: ModeTransition) {
        let actions = transition.entry_actions();

        if actions.contains(EntryActions::CANCEL_ALL) {
            self.arbiter.cancel_all();
            self.modes.session_mut().cancelled();
        }
        if actions.contains(EntryActions::CANCEL_ROUTINE) {
            if let CancelResult::Cancelled(_) = self.arbiter.cancel_routine() {
                self.modes.session_mut().cancelled();
            }
            self.arbiter.release_autonomous();
        }
        if actions.contains(EntryActions::SAFE_OUTPUTS) {
            self.arbiter.safe_outputs();
        }
        if actions.contains(EntryActions::RELEASE_LOCK) && self.drive.mode() == DriveMode::Locked {
            self.arbiter.submit(ManualTarget::Drive(DriveCommand::STOP));
        }
        if actions.contains(EntryActions::CLEAR_TOGGLES) {
            self.toggles.clear();
        }
        if actions.contains(EntryActions::HOLD_GROUPS) {
            self.arbiter.hold_autonomous(ActuatorGroups::all());
        }

        if actions.intersects(EntryActions::RESET_POSE | EntryActions::START_ROUTINE) {
            let selection = self.modes.session().resolve(&self.registry);
            if actions.contains(EntryActions::RESET_POSE) {
                let pose = selection.start_pose().unwrap_or(self.default_start_pose);
                self.arbiter.reset_pose(pose);
            }
            if actions.contains(EntryActions::START_ROUTINE) {
                self.start_selected(selection);
            }
        }
    }

    fn start_selected(&mut self, selection: AutoSelection) {
        match selection {
            AutoSelection::None => {
                info!("no autonomous routine selected, nothing started");
            }
            AutoSelection::Routine { id, routine } => {
                if let Some(task) = self.arbiter.start_routine(id, routine.requires) {
                    self.modes.session_mut().started(task);
                }
            }
        }
    }

    fn evaluate_subsystems(&mut self) {
        let mode = self.modes.mode();

        match self.launcher.evaluate(&self.toggles, &self.scheme) {
            Some(LauncherAction::Shoot { pressed }) => {
                self.arbiter.request_one_shot(
                    mode,
                    OneShotKind::Shoot,
                    RequestEdge::from_pressed(pressed),
                );
            }
            Some(LauncherAction::Abort) => {
                self.arbiter.cancel_one_shot(OneShotKind::Shoot);
                self.arbiter.cancel_one_shot(OneShotKind::Handoff);
                self.arbiter.submit(ManualTarget::Launcher(LauncherState::Off));
            }
            Some(LauncherAction::Set(state)) => {
                self.arbiter.submit(ManualTarget::Launcher(state));
            }
            None => {}
        }

        let intake = self.intake.evaluate(&self.toggles, &self.scheme);
        if let Some(state) = intake.state {
            self.arbiter.submit(ManualTarget::Intake(state));
        }
        if intake.handoff {
            self.arbiter.request_one_shot(
                mode,
                OneShotKind::Handoff,
                RequestEdge::from_pressed(intake.handoff_pressed),
            );
        }

        if let Some(state) = self.climber.evaluate(&self.toggles, &self.scheme) {
            self.arbiter.submit(ManualTarget::Climber(state));
        }

        match self.drive.evaluate(&self.toggles, &self.scheme) {
            DriveRequest::Drive(command) => {
                self.arbiter.submit(ManualTarget::Drive(command));
            }
            DriveRequest::Lock { reset_pose } => {
                let pose = reset_pose.then(|| self.lock_pose());
                self.arbiter.lock_wheels(pose);
            }
        }
    }

    /// Pose used by the wheel-lock reset: the selected routine's start pose.
    fn lock_pose(&self) -> Pose2d {
        self.modes
            .session()
            .resolve(&self.registry)
            .start_pose()
            .unwrap_or(self.default_start_pose)
    }

    fn dispatch(&mut self) -> Instructions {
        let instructions = self.arbiter.take_instructions();
        for instruction in &instructions {
            match *instruction {
                Instruction::StartTask(task) => self.platform.executor().schedule(&task),
                Instruction::CancelTask(task) => self.platform.executor().cancel(&task),
                Instruction::SetLauncher(state) => {
                    self.platform.launcher().set_state(state);
                    self.launcher.commit(state);
                }
                Instruction::SetIntake(state) => {
                    self.platform.intake().set_state(state);
                    self.intake.commit(state);
                }
                Instruction::SetClimber(state) => {
                    self.platform.climber().set_state(state);
                    self.climber.commit(state);
                }
                Instruction::Drive(command) => {
                    self.platform.drivebase().drive(&command);
                    self.drive.commit(DriveMachine::mode_for(&command));
                }
                Instruction::LockWheels => {
                    self.platform.drivebase().lock_wheels();
                    self.drive.commit(DriveMode::Locked);
                }
                Instruction::ResetPose(pose) => {
                    debug!(?pose, "pose reset");
                    self.platform.drivebase().reset_pose(pose);
                }
            }
        }
        instructions
    }

    // ─── Telemetry ──────────────────────────────────────────────────

    /// Build and publish this tick's telemetry frame. Returns whether the
    /// sink accepted it.
    pub fn publish_telemetry(&mut self) -> bool {
        let readings = SubsystemReadings {
            drivebase: self.platform.drivebase().diagnostics(),
            launcher: self.platform.launcher().diagnostics(),
            intake: self.platform.intake().diagnostics(),
            climber: self.platform.climber().diagnostics(),
            translational_velocity: self.platform.drivebase().translational_velocity(),
        };
        self.telemetry.observe(&readings);

        let summary = ControlSummary {
            mode: self.modes.mode(),
            launcher: self.launcher.state(),
            intake: self.intake.state(),
            climber: self.climber.state(),
            drive_mode: self.drive.mode(),
            shoot_done: !self.shoot_active(),
            auto_selected: self.modes.session().chosen(),
        };
        let frame = self.telemetry.build(self.tick, &summary, &readings);
        self.telemetry.publish(self.platform.telemetry(), &frame)
    }

    // ─── Operator actions ───────────────────────────────────────────

    /// Choose the autonomous routine by name. Applies at the next
    /// Autonomous entry.
    pub fn select_auto(&mut self, name: Option<&str>) {
        self.modes.session_mut().select(name);
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub fn mode(&self) -> RobotMode {
        self.modes.mode()
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    #[inline]
    pub fn launcher_state(&self) -> LauncherState {
        self.launcher.state()
    }

    #[inline]
    pub fn intake_state(&self) -> IntakeState {
        self.intake.state()
    }

    #[inline]
    pub fn climber_state(&self) -> ClimberState {
        self.climber.state()
    }

    #[inline]
    pub fn drive_mode(&self) -> DriveMode {
        self.drive.mode()
    }

    pub fn shoot_active(&self) -> bool {
        self.arbiter
            .tasks()
            .one_shot(OneShotKind::Shoot)
            .state()
            .is_active()
    }

    #[inline]
    pub fn arbiter(&self) -> &TaskArbiter {
        &self.arbiter
    }

    #[inline]
    pub fn toggles(&self) -> &ToggleTracker {
        &self.toggles
    }

    #[inline]
    pub fn session(&self) -> &AutoSession {
        self.modes.session()
    }

    #[inline]
    pub fn registry(&self) -> &AutoRegistry {
        &self.registry
    }

    #[inline]
    pub fn telemetry(&self) -> &TelemetryAdapter {
        &self.telemetry
    }

    #[inline]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    #[inline]
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}
