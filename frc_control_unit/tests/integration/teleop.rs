//! Teleop control: launcher, intake, climber and drivebase mappings.

use frc_common::prelude::*;
use frc_control_unit::command::arbitration::Instruction;
use frc_control_unit::input::toggle::ToggleId;

use super::*;

#[test]
fn pov_sets_launcher_state_in_one_tick() {
    let mut core = teleop_core();

    let report = core.tick(RobotMode::Teleop, &operator(|o| o.pov = Pov::Angle(0)));
    assert!(has(&report, Instruction::SetLauncher(LauncherState::Speaker)));
    assert_eq!(core.launcher_state(), LauncherState::Speaker);
    assert_eq!(core.platform().launcher.state(), LauncherState::Speaker);

    let report = core.tick(RobotMode::Teleop, &operator(|o| o.pov = Pov::Angle(270)));
    assert!(has(&report, Instruction::SetLauncher(LauncherState::Hold)));
    assert_eq!(core.launcher_state(), LauncherState::Hold);
}

#[test]
fn unrecognized_pov_keeps_state() {
    let mut core = teleop_core();
    core.tick(RobotMode::Teleop, &operator(|o| o.pov = Pov::Angle(90)));
    assert_eq!(core.launcher_state(), LauncherState::Amp);

    for raw in [45, -1, 360, 12] {
        let report = core.tick(RobotMode::Teleop, &operator(|o| o.pov = Pov::from(raw)));
        assert!(
            !report
                .instructions
                .iter()
                .any(|i| matches!(i, Instruction::SetLauncher(_))),
            "pov {raw} changed the launcher"
        );
        assert_eq!(core.launcher_state(), LauncherState::Amp);
    }
}

#[test]
fn holding_a_pov_does_not_resend() {
    let mut core = teleop_core();
    let speaker = operator(|o| o.pov = Pov::Angle(0));
    core.tick(RobotMode::Teleop, &speaker);
    for _ in 0..5 {
        core.tick(RobotMode::Teleop, &speaker);
    }
    assert_eq!(core.platform().launcher.applied(), 1);
}

#[test]
fn shoot_trigger_schedules_then_release_cancels() {
    let mut core = teleop_core();
    let pull = operator(|o| o.right_trigger = 0.5);

    let report = core.tick(RobotMode::Teleop, &pull);
    let started = starts(&report);
    assert_eq!(started.len(), 1);
    let shoot = started[0];
    assert_eq!(shoot.kind, TaskKind::OneShot(OneShotKind::Shoot));
    assert_eq!(one_shot_state(&core, OneShotKind::Shoot), TaskState::Scheduled);
    assert_eq!(core.arbiter().owner(ActuatorGroup::Launcher), Owner::OneShot(shoot.id));
    assert_eq!(core.arbiter().owner(ActuatorGroup::Intake), Owner::OneShot(shoot.id));
    assert!(core.platform().executor.is_running(shoot.id));
    assert!(core.shoot_active());

    let report = core.tick(RobotMode::Teleop, &pull);
    assert!(starts(&report).is_empty());
    assert_eq!(one_shot_state(&core, OneShotKind::Shoot), TaskState::Running);

    let report = core.tick(RobotMode::Teleop, &idle());
    assert_eq!(cancels(&report), vec![shoot]);
    assert!(has(&report, Instruction::SetLauncher(LauncherState::Off)));
    assert_eq!(one_shot_state(&core, OneShotKind::Shoot), TaskState::Cancelled);
    assert_eq!(core.launcher_state(), LauncherState::Off);
    assert_eq!(core.arbiter().owner(ActuatorGroup::Launcher), Owner::Manual);
    assert!(!core.platform().executor.is_running(shoot.id));
    assert!(!core.shoot_active());
}

#[test]
fn trigger_overrides_pov() {
    let mut core = teleop_core();
    core.tick(
        RobotMode::Teleop,
        &operator(|o| {
            o.right_trigger = 0.9;
            o.pov = Pov::Angle(90);
        }),
    );
    assert_eq!(core.launcher_state(), LauncherState::Off);
    assert!(core.shoot_active());
}

#[test]
fn holding_the_trigger_rearms_after_completion() {
    let mut core = teleop_core();
    let pull = operator(|o| o.right_trigger = 0.5);

    let first = starts(&core.tick(RobotMode::Teleop, &pull))[0];
    core.tick(RobotMode::Teleop, &pull);
    core.platform_mut().executor.finish(first.id);

    let report = core.tick(RobotMode::Teleop, &pull);
    let second = starts(&report);
    assert_eq!(second.len(), 1);
    assert!(second[0].id > first.id);
    assert_eq!(core.platform().executor.scheduled().len(), 2);
    assert_eq!(one_shot_state(&core, OneShotKind::Shoot), TaskState::Scheduled);
}

#[test]
fn abort_trigger_turns_launcher_off() {
    let mut core = teleop_core();
    core.tick(RobotMode::Teleop, &operator(|o| o.pov = Pov::Angle(0)));
    core.tick(RobotMode::Teleop, &operator(|o| o.buttons = Buttons::RIGHT_BUMPER));
    assert_eq!(one_shot_state(&core, OneShotKind::Handoff), TaskState::Scheduled);

    let report = core.tick(RobotMode::Teleop, &operator(|o| o.left_trigger = 1.0));
    assert_eq!(cancels(&report).len(), 1);
    assert_eq!(one_shot_state(&core, OneShotKind::Handoff), TaskState::Cancelled);
    assert_eq!(core.launcher_state(), LauncherState::Off);
}

#[test]
fn climber_bumpers() {
    let mut core = teleop_core();
    let mut tick = |buttons: Buttons| {
        core.tick(RobotMode::Teleop, &driver(|d| d.buttons = buttons));
        core.climber_state()
    };
    assert_eq!(tick(Buttons::RIGHT_BUMPER), ClimberState::Up);
    assert_eq!(tick(Buttons::RIGHT_BUMPER | Buttons::LEFT_BUMPER), ClimberState::Off);
    assert_eq!(tick(Buttons::LEFT_BUMPER), ClimberState::Down);
    assert_eq!(tick(Buttons::empty()), ClimberState::Off);
}

#[test]
fn intake_stick_and_reverse_toggle() {
    let mut core = teleop_core();
    let stick = |buttons: Buttons| {
        operator(|o| {
            o.left_y = 0.8;
            o.buttons = buttons;
        })
    };

    core.tick(RobotMode::Teleop, &stick(Buttons::empty()));
    assert_eq!(core.intake_state(), IntakeState::Run);

    // Held for several ticks: one flip.
    for _ in 0..4 {
        core.tick(RobotMode::Teleop, &stick(Buttons::X));
    }
    assert!(core.toggles().flag(ToggleId::IntakeReverse));
    assert_eq!(core.intake_state(), IntakeState::Reverse);

    core.tick(RobotMode::Teleop, &stick(Buttons::empty()));
    assert_eq!(core.intake_state(), IntakeState::Reverse);

    core.tick(RobotMode::Teleop, &stick(Buttons::X));
    assert!(!core.toggles().flag(ToggleId::IntakeReverse));
    assert_eq!(core.intake_state(), IntakeState::Run);

    core.tick(RobotMode::Teleop, &stick(Buttons::LEFT_BUMPER));
    assert_eq!(core.intake_state(), IntakeState::Stop);
}

#[test]
fn intake_deadband() {
    let mut core = teleop_core();
    core.tick(RobotMode::Teleop, &operator(|o| o.left_y = -0.2));
    assert_eq!(core.intake_state(), IntakeState::Stop);
    core.tick(RobotMode::Teleop, &operator(|o| o.left_y = -0.21));
    assert_eq!(core.intake_state(), IntakeState::Run);
}

#[test]
fn drive_sticks_and_robot_relative_toggle() {
    let mut core = teleop_core();
    let sticks = |buttons: Buttons| {
        driver(|d| {
            d.left_y = -0.5;
            d.left_x = 0.25;
            d.right_x = 0.1;
            d.buttons = buttons;
        })
    };

    core.tick(RobotMode::Teleop, &sticks(Buttons::empty()));
    let cmd = core.platform().drivebase.last_command().unwrap();
    assert_eq!(cmd.x_speed, 0.5);
    assert_eq!(cmd.y_speed, 0.25);
    assert_eq!(cmd.rotation, 0.1);
    assert!(cmd.field_relative);
    assert_eq!(core.drive_mode(), DriveMode::FieldRelative);

    core.tick(RobotMode::Teleop, &sticks(Buttons::Y));
    assert_eq!(core.drive_mode(), DriveMode::RobotRelative);
    assert!(!core.platform().drivebase.last_command().unwrap().field_relative);

    core.tick(RobotMode::Teleop, &sticks(Buttons::empty()));
    assert_eq!(core.drive_mode(), DriveMode::RobotRelative);
}

#[test]
fn lock_wheels_resets_pose_on_press_only() {
    let mut core = teleop_core();
    core.select_auto(Some("P1 1 Piece"));
    let lock = driver(|d| d.buttons = Buttons::A);

    let report = core.tick(RobotMode::Teleop, &lock);
    assert!(has(&report, Instruction::ResetPose(P1_START)));
    assert!(has(&report, Instruction::LockWheels));
    assert_eq!(core.drive_mode(), DriveMode::Locked);

    let report = core.tick(RobotMode::Teleop, &lock);
    assert!(!report.instructions.iter().any(|i| matches!(i, Instruction::ResetPose(_))));
    assert!(has(&report, Instruction::LockWheels));

    let db = &core.platform().drivebase;
    assert!(db.is_locked());
    assert_eq!(db.locks(), 2);
    assert_eq!(db.resets(), 1);
    assert_eq!(db.pose(), P1_START);

    core.tick(RobotMode::Teleop, &idle());
    assert_eq!(core.drive_mode(), DriveMode::FieldRelative);
    assert!(!core.platform().drivebase.is_locked());
}

#[test]
fn lock_without_selection_uses_default_pose() {
    let mut core = teleop_core();
    let report = core.tick(RobotMode::Teleop, &driver(|d| d.buttons = Buttons::A));
    assert!(has(&report, Instruction::ResetPose(DEFAULT_START)));
}
