//! Autonomous entry, routine ownership and hand-back to manual control.

use frc_common::prelude::*;
use frc_control_unit::autonomous::SessionPhase;
use frc_control_unit::command::arbitration::Instruction;

use super::*;

fn routine_handle(core: &Core) -> TaskHandle {
    core.arbiter().tasks().routine().handle().unwrap()
}

#[test]
fn unregistered_routine_is_a_no_op() {
    let mut core = core();
    core.select_auto(Some("Does Not Exist"));

    let report = core.tick(RobotMode::Autonomous, &idle());
    assert_eq!(core.mode(), RobotMode::Autonomous);
    assert!(starts(&report).is_empty());
    assert!(has(&report, Instruction::ResetPose(DEFAULT_START)));
    assert_eq!(core.session().phase(), SessionPhase::Selected);
    // The period belongs to Autonomous even with nothing running.
    for group in ActuatorGroup::ALL {
        assert_eq!(core.arbiter().owner(group), Owner::Autonomous);
    }

    let report = core.tick(RobotMode::Teleop, &idle());
    assert!(cancels(&report).is_empty());
    assert_eq!(core.mode(), RobotMode::Teleop);
    assert!(core.platform().executor.cancelled().is_empty());
    for group in ActuatorGroup::ALL {
        assert_eq!(core.arbiter().owner(group), Owner::Manual);
    }
}

#[test]
fn nothing_selected_is_a_no_op() {
    let mut core = core();
    let report = core.tick(RobotMode::Autonomous, &idle());
    assert!(starts(&report).is_empty());
    assert!(core.platform().executor.scheduled().is_empty());
}

#[test]
fn entry_resets_pose_and_starts_selected_routine() {
    let mut core = core();
    core.select_auto(Some("P1 1 Piece"));

    let report = core.tick(RobotMode::Autonomous, &idle());
    let started = starts(&report);
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].kind, TaskKind::Routine(RoutineId(0)));
    assert!(has(&report, Instruction::ResetPose(P1_START)));
    assert_eq!(core.platform().drivebase.pose(), P1_START);
    assert_eq!(core.session().phase(), SessionPhase::Running(started[0].id));
    for group in ActuatorGroup::ALL {
        assert_eq!(core.arbiter().owner(group), Owner::Autonomous);
    }
}

#[test]
fn manual_targets_wait_for_teleop() {
    let mut core = core();
    core.select_auto(Some("P1 1 Piece"));
    core.tick(RobotMode::Autonomous, &idle());

    let report = core.tick(RobotMode::Autonomous, &operator(|o| o.pov = Pov::Angle(0)));
    assert!(!report
        .instructions
        .iter()
        .any(|i| matches!(i, Instruction::SetLauncher(_))));
    assert_eq!(core.launcher_state(), LauncherState::Off);
    assert_eq!(core.platform().launcher.applied(), 0);
    assert_eq!(
        core.arbiter().ownership().slot(ActuatorGroup::Launcher).pending,
        Some(ManualTarget::Launcher(LauncherState::Speaker))
    );

    for _ in 0..3 {
        core.tick(RobotMode::Autonomous, &idle());
    }
    let routine = routine_handle(&core);
    core.platform_mut().executor.finish(routine.id);

    // A finished routine does not hand the robot back mid-period.
    let report = core.tick(RobotMode::Autonomous, &idle());
    assert!(!has(&report, Instruction::SetLauncher(LauncherState::Speaker)));
    assert_eq!(core.session().phase(), SessionPhase::Completed);
    for group in ActuatorGroup::ALL {
        assert_eq!(core.arbiter().owner(group), Owner::Autonomous);
    }

    let report = core.tick(RobotMode::Teleop, &idle());
    assert!(has(&report, Instruction::SetLauncher(LauncherState::Speaker)));
    assert_eq!(core.launcher_state(), LauncherState::Speaker);
    for group in ActuatorGroup::ALL {
        assert_eq!(core.arbiter().owner(group), Owner::Manual);
    }
}

#[test]
fn last_pending_target_wins() {
    let mut core = core();
    core.select_auto(Some("P1 1 Piece"));
    core.tick(RobotMode::Autonomous, &idle());
    core.tick(RobotMode::Autonomous, &operator(|o| o.pov = Pov::Angle(0)));
    core.tick(RobotMode::Autonomous, &operator(|o| o.pov = Pov::Angle(180)));

    let report = core.tick(RobotMode::Teleop, &idle());
    assert!(has(&report, Instruction::SetLauncher(LauncherState::Trap)));
    assert!(!has(&report, Instruction::SetLauncher(LauncherState::Speaker)));
    assert_eq!(core.launcher_state(), LauncherState::Trap);
}

#[test]
fn teleop_entry_cancels_the_routine() {
    let mut core = core();
    core.select_auto(Some("P1 1 Piece"));
    core.tick(RobotMode::Autonomous, &idle());
    core.tick(RobotMode::Autonomous, &idle());
    let routine = routine_handle(&core);
    assert_eq!(core.arbiter().tasks().routine().state(), TaskState::Running);

    let report = core.tick(RobotMode::Teleop, &idle());
    assert_eq!(cancels(&report), vec![routine]);
    assert_eq!(core.arbiter().tasks().routine().state(), TaskState::Cancelled);
    assert_eq!(core.session().phase(), SessionPhase::Cancelled);
    assert_eq!(core.platform().executor.cancelled(), &[routine]);
    for group in ActuatorGroup::ALL {
        assert_eq!(core.arbiter().owner(group), Owner::Manual);
    }
}

#[test]
fn teleop_entry_after_completed_routine_cancels_nothing() {
    let mut core = core();
    core.select_auto(Some("P1 1 Piece"));
    core.tick(RobotMode::Autonomous, &idle());
    let routine = routine_handle(&core);
    core.platform_mut().executor.finish(routine.id);
    core.tick(RobotMode::Autonomous, &idle());
    assert_eq!(core.session().phase(), SessionPhase::Completed);

    let report = core.tick(RobotMode::Teleop, &idle());
    assert!(cancels(&report).is_empty());
    assert_eq!(core.session().phase(), SessionPhase::Completed);
    for group in ActuatorGroup::ALL {
        assert_eq!(core.arbiter().owner(group), Owner::Manual);
    }
}

#[test]
fn reselection_applies_at_next_entry() {
    let mut core = core();
    core.select_auto(Some("P1 1 Piece"));
    core.tick(RobotMode::Autonomous, &idle());
    let first = routine_handle(&core);

    core.select_auto(Some("BeepBoop"));
    core.tick(RobotMode::Autonomous, &idle());
    assert_eq!(core.session().phase(), SessionPhase::Running(first.id));
    assert_eq!(routine_handle(&core), first);
    assert_eq!(core.session().chosen(), Some("BeepBoop"));

    core.tick(RobotMode::Disabled, &idle());
    let report = core.tick(RobotMode::Autonomous, &idle());
    let started = starts(&report);
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].kind, TaskKind::Routine(RoutineId(1)));
    // BeepBoop has no start pose of its own.
    assert!(has(&report, Instruction::ResetPose(DEFAULT_START)));
}

/// Every controller input that moves something in Teleop.
fn busy_sticks(tick: u16) -> InputSnapshot {
    InputSnapshot {
        driver: ControllerSnapshot {
            left_x: 0.4,
            left_y: -1.0,
            right_x: 0.6,
            buttons: if tick % 2 == 0 {
                Buttons::A | Buttons::RIGHT_BUMPER
            } else {
                Buttons::Y
            },
            ..Default::default()
        },
        operator: ControllerSnapshot {
            left_y: 0.9,
            pov: Pov::Angle(90 * (tick % 4)),
            buttons: Buttons::X | Buttons::LEFT_BUMPER,
            ..Default::default()
        },
    }
}

fn is_actuation(instruction: &Instruction) -> bool {
    matches!(
        instruction,
        Instruction::Drive(_)
            | Instruction::LockWheels
            | Instruction::SetLauncher(_)
            | Instruction::SetIntake(_)
            | Instruction::SetClimber(_)
    )
}

#[test]
fn manual_input_is_parked_in_autonomous() {
    for selection in [None, Some("BeepBoop"), Some("P1 1 Piece")] {
        let mut core = core();
        core.select_auto(selection);
        for tick in 0..12 {
            let report = core.tick(RobotMode::Autonomous, &busy_sticks(tick));
            assert!(
                !report.instructions.iter().any(is_actuation),
                "{selection:?} tick {tick}: {:?}",
                report.instructions
            );
        }
        assert_eq!(core.launcher_state(), LauncherState::Off);
        assert_eq!(core.intake_state(), IntakeState::Stop);
        assert_eq!(core.drive_mode(), DriveMode::FieldRelative);
        assert_eq!(core.platform().drivebase.last_command(), None);
        assert_eq!(core.platform().drivebase.locks(), 0);
        assert_eq!(core.platform().launcher.applied(), 0);
        assert_eq!(core.platform().intake.applied(), 0);
        assert_eq!(core.platform().climber.applied(), 0);
        for group in ActuatorGroup::ALL {
            assert_eq!(core.arbiter().owner(group), Owner::Autonomous, "{selection:?}");
        }
    }
}

#[test]
fn drivebase_only_routine_still_parks_the_launcher() {
    let mut core = core();
    core.select_auto(Some("BeepBoop"));
    core.tick(RobotMode::Autonomous, &idle());
    core.tick(RobotMode::Autonomous, &operator(|o| o.pov = Pov::Angle(90)));
    assert_eq!(core.launcher_state(), LauncherState::Off);

    let routine = routine_handle(&core);
    core.platform_mut().executor.finish(routine.id);
    core.tick(RobotMode::Autonomous, &idle());
    assert_eq!(core.launcher_state(), LauncherState::Off);

    let report = core.tick(RobotMode::Teleop, &idle());
    assert!(has(&report, Instruction::SetLauncher(LauncherState::Amp)));
    assert_eq!(core.launcher_state(), LauncherState::Amp);
}

#[test]
fn one_shots_are_not_scheduled_in_autonomous() {
    let mut core = core();
    core.tick(RobotMode::Autonomous, &idle());
    let report = core.tick(
        RobotMode::Autonomous,
        &operator(|o| {
            o.right_trigger = 1.0;
            o.buttons = Buttons::RIGHT_BUMPER;
        }),
    );
    assert!(starts(&report).is_empty());
    assert_eq!(one_shot_state(&core, OneShotKind::Shoot), TaskState::Idle);
    assert_eq!(one_shot_state(&core, OneShotKind::Handoff), TaskState::Idle);
}
