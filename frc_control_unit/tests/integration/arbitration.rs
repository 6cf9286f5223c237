//! Ownership resolution between manual control and one-shot tasks.

use frc_common::prelude::*;
use frc_control_unit::command::arbitration::Instruction;

use super::*;

#[test]
fn schedule_is_idempotent_while_active() {
    let mut core = teleop_core();
    let pull = operator(|o| o.right_trigger = 1.0);
    for _ in 0..10 {
        core.tick(RobotMode::Teleop, &pull);
    }
    assert_eq!(core.platform().executor.scheduled().len(), 1);
    assert_eq!(one_shot_state(&core, OneShotKind::Shoot), TaskState::Running);
}

#[test]
fn cancel_is_idempotent() {
    let mut core = teleop_core();
    core.tick(RobotMode::Teleop, &operator(|o| o.right_trigger = 1.0));

    let abort = operator(|o| o.left_trigger = 1.0);
    for _ in 0..5 {
        core.tick(RobotMode::Teleop, &abort);
    }
    assert_eq!(core.platform().executor.cancelled().len(), 1);
    assert_eq!(one_shot_state(&core, OneShotKind::Shoot), TaskState::Cancelled);
}

#[test]
fn cancel_after_completion_is_a_no_op() {
    let mut core = teleop_core();
    let pull = operator(|o| o.right_trigger = 1.0);
    let shoot = starts(&core.tick(RobotMode::Teleop, &pull))[0];
    core.platform_mut().executor.finish(shoot.id);

    // Released on the tick the executor reports completion.
    let report = core.tick(RobotMode::Teleop, &idle());
    assert!(cancels(&report).is_empty());
    assert_eq!(one_shot_state(&core, OneShotKind::Shoot), TaskState::Completed);
    assert!(has(&report, Instruction::SetLauncher(LauncherState::Off)));
    assert!(core.platform().executor.cancelled().is_empty());
}

#[test]
fn completion_releases_groups() {
    let mut core = teleop_core();
    let shoot = starts(&core.tick(RobotMode::Teleop, &operator(|o| o.right_trigger = 1.0)))[0];
    assert_eq!(core.arbiter().owner(ActuatorGroup::Intake), Owner::OneShot(shoot.id));

    core.platform_mut().executor.finish(shoot.id);
    core.tick(RobotMode::Teleop, &idle());
    assert_eq!(core.arbiter().owner(ActuatorGroup::Launcher), Owner::Manual);
    assert_eq!(core.arbiter().owner(ActuatorGroup::Intake), Owner::Manual);
}

#[test]
fn manual_change_cancels_owning_task() {
    let mut core = teleop_core();
    let handoff = starts(&core.tick(RobotMode::Teleop, &operator(|o| o.buttons = Buttons::RIGHT_BUMPER)))[0];
    assert_eq!(handoff.kind, TaskKind::OneShot(OneShotKind::Handoff));
    assert_eq!(core.arbiter().owner(ActuatorGroup::Intake), Owner::OneShot(handoff.id));

    let report = core.tick(RobotMode::Teleop, &operator(|o| o.left_y = 0.9));
    assert_eq!(cancels(&report), vec![handoff]);
    assert!(has(&report, Instruction::SetIntake(IntakeState::Run)));
    assert_eq!(core.intake_state(), IntakeState::Run);
    // Every group of the cancelled task is released, not only the intake.
    assert_eq!(core.arbiter().owner(ActuatorGroup::Launcher), Owner::Manual);
    assert_eq!(one_shot_state(&core, OneShotKind::Handoff), TaskState::Cancelled);
}

#[test]
fn pov_change_cancels_owning_task() {
    let mut core = teleop_core();
    core.tick(RobotMode::Teleop, &operator(|o| o.buttons = Buttons::RIGHT_BUMPER));
    let report = core.tick(RobotMode::Teleop, &operator(|o| o.pov = Pov::Angle(90)));
    assert_eq!(cancels(&report).len(), 1);
    assert_eq!(core.launcher_state(), LauncherState::Amp);
    assert_eq!(one_shot_state(&core, OneShotKind::Handoff), TaskState::Cancelled);
}

#[test]
fn untouched_groups_do_not_cancel() {
    let mut core = teleop_core();
    core.tick(RobotMode::Teleop, &operator(|o| o.buttons = Buttons::RIGHT_BUMPER));

    // Drive and climber are not required by the handoff.
    let report = core.tick(
        RobotMode::Teleop,
        &InputSnapshot {
            driver: ControllerSnapshot {
                left_y: -1.0,
                buttons: Buttons::RIGHT_BUMPER,
                ..Default::default()
            },
            operator: ControllerSnapshot::default(),
        },
    );
    assert!(cancels(&report).is_empty());
    assert!(core.arbiter().tasks().one_shot(OneShotKind::Handoff).state().is_active());
    assert_eq!(core.climber_state(), ClimberState::Up);
}

#[test]
fn newer_one_shot_preempts_older() {
    let mut core = teleop_core();
    let handoff = starts(&core.tick(RobotMode::Teleop, &operator(|o| o.buttons = Buttons::RIGHT_BUMPER)))[0];

    let report = core.tick(RobotMode::Teleop, &operator(|o| o.right_trigger = 1.0));
    let shoot = starts(&report)[0];
    assert_eq!(cancels(&report), vec![handoff]);
    assert_eq!(core.arbiter().owner(ActuatorGroup::Launcher), Owner::OneShot(shoot.id));
    assert_eq!(core.arbiter().owner(ActuatorGroup::Intake), Owner::OneShot(shoot.id));
    assert_eq!(one_shot_state(&core, OneShotKind::Handoff), TaskState::Cancelled);
    assert_eq!(one_shot_state(&core, OneShotKind::Shoot), TaskState::Scheduled);
}

#[test]
fn task_ids_are_never_reused() {
    let mut core = teleop_core();
    let mut ids = Vec::new();
    for _ in 0..4 {
        let report = core.tick(RobotMode::Teleop, &operator(|o| o.right_trigger = 1.0));
        ids.extend(starts(&report).into_iter().map(|h| h.id));
        core.tick(RobotMode::Teleop, &idle());
    }
    assert_eq!(ids.len(), 4);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn busy_ticks_fit_the_instruction_buffer() {
    let mut core = core();
    core.select_auto(Some("P1 1 Piece"));
    let everything = InputSnapshot {
        driver: ControllerSnapshot {
            left_y: 1.0,
            buttons: Buttons::A | Buttons::Y | Buttons::RIGHT_BUMPER,
            ..Default::default()
        },
        operator: ControllerSnapshot {
            left_y: 1.0,
            right_trigger: 1.0,
            pov: Pov::Angle(0),
            buttons: Buttons::RIGHT_BUMPER | Buttons::X,
            ..Default::default()
        },
    };
    for mode in [
        RobotMode::Autonomous,
        RobotMode::Teleop,
        RobotMode::Teleop,
        RobotMode::Autonomous,
        RobotMode::Test,
        RobotMode::Teleop,
        RobotMode::Disabled,
    ] {
        core.tick(mode, &everything);
    }
    assert_eq!(core.arbiter().dropped_instructions(), 0);
}

#[test]
fn held_one_shot_inputs_do_not_trade_groups() {
    let mut core = teleop_core();
    let both = operator(|o| {
        o.right_trigger = 1.0;
        o.buttons = Buttons::RIGHT_BUMPER;
    });

    // Both pressed on the same tick: the handoff is evaluated last and wins.
    let report = core.tick(RobotMode::Teleop, &both);
    let started = starts(&report);
    assert_eq!(started.len(), 2);
    let handoff = started[1];
    assert_eq!(handoff.kind, TaskKind::OneShot(OneShotKind::Handoff));
    assert_eq!(cancels(&report), vec![started[0]]);

    for _ in 0..20 {
        let report = core.tick(RobotMode::Teleop, &both);
        assert!(starts(&report).is_empty());
        assert!(cancels(&report).is_empty());
    }
    assert_eq!(core.platform().executor.scheduled().len(), 2);
    assert_eq!(core.platform().executor.cancelled().len(), 1);
    assert_eq!(one_shot_state(&core, OneShotKind::Handoff), TaskState::Running);
    assert_eq!(core.arbiter().owner(ActuatorGroup::Launcher), Owner::OneShot(handoff.id));

    // The held trigger takes over once the handoff is done.
    core.platform_mut().executor.finish(handoff.id);
    let report = core.tick(RobotMode::Teleop, &operator(|o| o.right_trigger = 1.0));
    let shoot = starts(&report);
    assert_eq!(shoot.len(), 1);
    assert_eq!(shoot[0].kind, TaskKind::OneShot(OneShotKind::Shoot));
    assert!(cancels(&report).is_empty());
}
