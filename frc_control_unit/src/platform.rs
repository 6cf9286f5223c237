//! Capability interfaces the control core drives.
//!
//! The [`Platform`] trait aggregates every collaborator (drivebase, three
//! mechanism subsystems, the task executor and the telemetry sink) behind
//! associated types, so a concrete platform is fixed at compile time and
//! injected into [`RobotCore`](crate::robot::RobotCore) at construction.
//! There are no global instances.
//!
//! None of these calls may block; every one is made from inside the tick.

use frc_common::command::TaskHandle;
use frc_common::drive::{DriveCommand, Pose2d};
use frc_common::state::{ClimberState, IntakeState, LauncherState};
use frc_common::telemetry::{Diagnostics, TelemetryError, TelemetryFrame};

/// Mechanism subsystem driven by a discrete state.
pub trait Actuator<S> {
    /// Apply a new target state.
    fn set_state(&mut self, state: S);

    /// Sensor snapshot for telemetry and connection monitoring.
    fn diagnostics(&self) -> Diagnostics;
}

/// Swerve drivebase.
pub trait Drivebase {
    fn drive(&mut self, command: &DriveCommand);

    /// Point the modules in an X so the robot resists being pushed.
    fn lock_wheels(&mut self);

    /// Reset odometry and the pose estimate.
    fn reset_pose(&mut self, pose: Pose2d);

    /// Current translational speed [m/s].
    fn translational_velocity(&self) -> f64;

    fn diagnostics(&self) -> Diagnostics;
}

/// Runs one-shot tasks and autonomous routines outside the control core.
pub trait TaskExecutor {
    fn schedule(&mut self, task: &TaskHandle);

    /// Stop a task. Must tolerate handles it no longer runs.
    fn cancel(&mut self, task: &TaskHandle);

    /// Whether the task has run to completion.
    fn is_finished(&self, task: &TaskHandle) -> bool;
}

/// Telemetry destination. Failures are reported, never fatal.
pub trait TelemetrySink {
    fn publish(&mut self, frame: &TelemetryFrame<'_>) -> Result<(), TelemetryError>;
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for Box<T> {
    fn publish(&mut self, frame: &TelemetryFrame<'_>) -> Result<(), TelemetryError> {
        (**self).publish(frame)
    }
}

/// Everything the control core needs from the outside world.
pub trait Platform {
    type Drivebase: Drivebase;
    type Launcher: Actuator<LauncherState>;
    type Intake: Actuator<IntakeState>;
    type Climber: Actuator<ClimberState>;
    type Executor: TaskExecutor;
    type Telemetry: TelemetrySink;

    fn drivebase(&mut self) -> &mut Self::Drivebase;
    fn launcher(&mut self) -> &mut Self::Launcher;
    fn intake(&mut self) -> &mut Self::Intake;
    fn climber(&mut self) -> &mut Self::Climber;
    fn executor(&mut self) -> &mut Self::Executor;
    fn telemetry(&mut self) -> &mut Self::Telemetry;
}
