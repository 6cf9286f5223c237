//! Stable dashboard keys and state labels.
//!
//! These strings are the published interface. They live here and nowhere
//! else so state enums never carry presentation concerns.

use frc_common::state::{ClimberState, DriveMode, IntakeState, LauncherState, RobotMode};

pub mod keys {
    pub const MODE: &str = "Mode";
    pub const LAUNCHER_STATE: &str = "Launcher State";
    pub const INTAKE_STATE: &str = "Intake State";
    pub const CLIMBER_STATE: &str = "Climber State";
    pub const DRIVE_MODE: &str = "Drive Mode";
    pub const AUTO_SELECTED: &str = "Auto Selected";
    pub const SHOOT_DONE: &str = "Shoot Done";

    pub const FLIPPER_CURRENT: &str = "Flipper Current";
    pub const PIVOT_CURRENT: &str = "Pivot Current";
    pub const ROLLER_CURRENT: &str = "Roller Current";
    pub const FLIPPER_POSITION: &str = "Flipper Position";
    pub const LAUNCHER_POSITION: &str = "Launcher Position";
    pub const BREAKBEAM: &str = "Breakbeam";
    pub const TRANSLATIONAL_VELOCITY: &str = "Translational Velocity";

    pub const DRIVEBASE_CONNECTED: &str = "Drivebase Connected";
    pub const LAUNCHER_CONNECTED: &str = "Launcher Connected";
    pub const INTAKE_CONNECTED: &str = "Intake Connected";
    pub const CLIMBER_CONNECTED: &str = "Climber Connected";
}

/// Shown as `Auto Selected` when nothing is chosen.
pub const NO_AUTO: &str = "NONE";

pub const fn mode(mode: RobotMode) -> &'static str {
    match mode {
        RobotMode::Disabled => "DISABLED",
        RobotMode::Autonomous => "AUTONOMOUS",
        RobotMode::Teleop => "TELEOP",
        RobotMode::Test => "TEST",
    }
}

pub const fn launcher(state: LauncherState) -> &'static str {
    match state {
        LauncherState::Speaker => "SPEAKER",
        LauncherState::Amp => "AMP",
        LauncherState::Trap => "TRAP",
        LauncherState::Hold => "HOLD",
        LauncherState::Off => "OFF",
    }
}

pub const fn intake(state: IntakeState) -> &'static str {
    match state {
        IntakeState::Run => "RUN",
        IntakeState::Reverse => "REVERSE",
        IntakeState::Stop => "STOP",
    }
}

pub const fn climber(state: ClimberState) -> &'static str {
    match state {
        ClimberState::Up => "UP",
        ClimberState::Down => "DOWN",
        ClimberState::Off => "OFF",
    }
}

pub const fn drive_mode(mode: DriveMode) -> &'static str {
    match mode {
        DriveMode::FieldRelative => "FIELD_RELATIVE",
        DriveMode::RobotRelative => "ROBOT_RELATIVE",
        DriveMode::Locked => "LOCKED",
    }
}
