//! Shared fixtures.

use std::time::Duration;

use frc_common::prelude::*;
use frc_control_unit::command::arbitration::Instruction;
use frc_control_unit::config::{RobotConfig, RoutineConfig};
use frc_control_unit::robot::{RobotCore, TickReport};
use frc_control_unit::sim::SimPlatform;

mod arbitration;
mod autonomous;
mod cycle;
mod teleop;

pub const DT: Duration = Duration::from_millis(20);

pub const DEFAULT_START: Pose2d = Pose2d::new(1.0, 2.0, 0.0);
pub const P1_START: Pose2d = Pose2d::new(0.7, 6.7, 60.0);

pub type Core = RobotCore<SimPlatform>;

/// Defaults plus two routines: "P1 1 Piece" (all groups, own start pose)
/// and "BeepBoop" (drivebase only).
pub fn config() -> RobotConfig {
    let mut config = RobotConfig::default();
    config.autonomous.start_pose = DEFAULT_START;
    config.autonomous.routines = vec![
        RoutineConfig {
            name: "P1 1 Piece".to_string(),
            start_pose: Some(P1_START),
            requires: ActuatorGroups::all(),
        },
        RoutineConfig {
            name: "BeepBoop".to_string(),
            start_pose: None,
            requires: ActuatorGroups::DRIVEBASE,
        },
    ];
    config
}

pub fn core() -> Core {
    RobotCore::from_config(SimPlatform::manual(DT), &config()).unwrap()
}

/// Core already in Teleop after one neutral tick.
pub fn teleop_core() -> Core {
    let mut core = core();
    core.tick(RobotMode::Teleop, &idle());
    core
}

pub fn idle() -> InputSnapshot {
    InputSnapshot::default()
}

pub fn operator(f: impl FnOnce(&mut ControllerSnapshot)) -> InputSnapshot {
    let mut snap = InputSnapshot::default();
    f(&mut snap.operator);
    snap
}

pub fn driver(f: impl FnOnce(&mut ControllerSnapshot)) -> InputSnapshot {
    let mut snap = InputSnapshot::default();
    f(&mut snap.driver);
    snap
}

pub fn has(report: &TickReport, instruction: Instruction) -> bool {
    report.instructions.contains(&instruction)
}

pub fn starts(report: &TickReport) -> Vec<TaskHandle> {
    report
        .instructions
        .iter()
        .filter_map(|i| match i {
            Instruction::StartTask(h) => Some(*h),
            _ => None,
        })
        .collect()
}

pub fn cancels(report: &TickReport) -> Vec<TaskHandle> {
    report
        .instructions
        .iter()
        .filter_map(|i| match i {
            Instruction::CancelTask(h) => Some(*h),
            _ => None,
        })
        .collect()
}

pub fn one_shot_state(core: &Core, kind: OneShotKind) -> TaskState {
    core.arbiter().tasks().one_shot(kind).state()
}
