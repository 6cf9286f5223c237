//! Cycle runner driven by scripted match input.

use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Duration;

use frc_common::prelude::*;
use frc_control_unit::config::CycleConfig;
use frc_control_unit::cycle::{CycleRunner, DriverStation, StationFrame, TickFlags};
use frc_control_unit::platform::TelemetrySink;
use frc_control_unit::robot::RobotCore;
use frc_control_unit::sim::{ScriptedStation, SimExecutor};
use frc_control_unit::telemetry::labels::keys;

use super::*;

const SHORT_MATCH: &str = r#"
[[step]]
mode = "disabled"
ticks = 2
select_auto = "P1 1 Piece"

[[step]]
mode = "autonomous"
ticks = 3

[[step]]
mode = "teleop"
ticks = 5
[step.operator]
pov = 90
"#;

fn runner(script: &str, cycle: CycleConfig) -> CycleRunner<SimPlatform, ScriptedStation> {
    let station = ScriptedStation::from_toml(script).unwrap();
    CycleRunner::new(core(), station, &cycle)
}

#[test]
fn stops_when_the_script_ends() {
    let mut runner = runner(SHORT_MATCH, CycleConfig::default());
    let stats = runner.run_for(100);
    assert_eq!(stats.cycle_count, 10);
    assert!(runner.step().is_none());
    assert_eq!(runner.core().tick_count(), 10);
    assert_eq!(runner.core().mode(), RobotMode::Teleop);
    assert_eq!(runner.core().launcher_state(), LauncherState::Amp);
}

#[test]
fn script_selection_reaches_autonomous() {
    let mut runner = runner(SHORT_MATCH, CycleConfig::default());
    runner.run_for(2);
    assert_eq!(runner.core().session().chosen(), Some("P1 1 Piece"));

    let flags = runner.step().unwrap();
    assert!(flags.contains(TickFlags::MODE_CHANGED));
    assert_eq!(runner.core().platform().drivebase.pose(), P1_START);
    assert_eq!(
        runner.core().arbiter().owner(ActuatorGroup::Launcher),
        Owner::Autonomous
    );
}

#[test]
fn every_tick_publishes_or_drops() {
    let mut runner = runner(SHORT_MATCH, CycleConfig::default());
    let stats = runner.run_for(10).clone();
    assert_eq!(stats.telemetry_sent + stats.telemetry_dropped, 10);
    assert_eq!(stats.telemetry_failed, 0);
    assert_eq!(
        runner.core().platform().telemetry.len() as u64,
        stats.telemetry_sent
    );
}

#[test]
fn telemetry_interval_thins_publishing() {
    let cycle = CycleConfig {
        telemetry_interval: 5,
        ..CycleConfig::default()
    };
    let mut runner = runner(SHORT_MATCH, cycle);
    let stats = runner.run_for(10).clone();
    assert_eq!(stats.telemetry_sent + stats.telemetry_dropped, 2);
}

#[test]
fn cleared_flag_runs_nothing() {
    let mut runner = runner(SHORT_MATCH, CycleConfig::default());
    let running = AtomicBool::new(false);
    runner.run(&running, None).unwrap();
    assert_eq!(runner.stats().cycle_count, 0);
    assert_eq!(runner.core().tick_count(), 0);
}

#[test]
fn tick_limit_bounds_the_paced_loop() {
    let cycle = CycleConfig {
        tick_period_ms: 1,
        ..CycleConfig::default()
    };
    let mut runner = runner(SHORT_MATCH, cycle);
    let running = AtomicBool::new(true);
    runner.run(&running, Some(4)).unwrap();
    assert_eq!(runner.stats().cycle_count, 4);
}

#[test]
fn looping_script_restarts() {
    let station = ScriptedStation::from_toml(SHORT_MATCH).unwrap().looping(true);
    let mut runner = CycleRunner::new(core(), station, &CycleConfig::default());
    assert_eq!(runner.run_for(25).cycle_count, 25);
    // Ticks 21..25 replay the opening disabled and autonomous steps.
    assert_eq!(runner.core().mode(), RobotMode::Autonomous);
}

#[test]
fn frame_reports_selection_and_connection() {
    let mut core = teleop_core();
    core.select_auto(Some("P1 1 Piece"));
    core.platform_mut().climber.set_connected(false);

    assert!(core.publish_telemetry());
    let frame = core.platform().telemetry.latest().unwrap();
    assert_eq!(frame["tick"], 1);
    assert_eq!(frame[keys::MODE], "TELEOP");
    assert_eq!(frame[keys::AUTO_SELECTED], "P1 1 Piece");
    assert_eq!(frame[keys::CLIMBER_CONNECTED], false);
    assert_eq!(frame[keys::LAUNCHER_CONNECTED], true);
    assert_eq!(frame[keys::SHOOT_DONE], true);
    assert_eq!(core.telemetry().is_connected(ActuatorGroup::Climber), Some(false));

    core.platform_mut().climber.set_connected(true);
    core.tick(RobotMode::Teleop, &idle());
    assert!(core.publish_telemetry());
    let frame = core.platform().telemetry.latest().unwrap();
    assert_eq!(frame[keys::CLIMBER_CONNECTED], true);
    assert_eq!(core.telemetry().is_connected(ActuatorGroup::Climber), Some(true));
}

// ─── Degraded cycles ────────────────────────────────────────────────

/// Station whose sample blocks longer than the tick period.
struct SlowStation {
    delay: Duration,
    input: InputSnapshot,
}

impl DriverStation for SlowStation {
    fn sample(&mut self) -> Option<StationFrame> {
        thread::sleep(self.delay);
        Some(StationFrame {
            mode: RobotMode::Teleop,
            input: self.input,
            select_auto: None,
        })
    }
}

/// Sink that refuses every frame.
struct DeadSink;

impl TelemetrySink for DeadSink {
    fn publish(&mut self, _frame: &TelemetryFrame<'_>) -> Result<(), TelemetryError> {
        Err(TelemetryError::Transport("link down".to_string()))
    }
}

#[test]
fn slow_cycles_drop_telemetry_and_keep_running() {
    let cycle = CycleConfig {
        tick_period_ms: 2,
        ..CycleConfig::default()
    };
    let station = SlowStation {
        delay: Duration::from_millis(5),
        input: operator(|o| o.pov = Pov::Angle(180)),
    };
    let mut runner = CycleRunner::new(core(), station, &cycle);

    for _ in 0..4 {
        let flags = runner.step().unwrap();
        assert!(flags.contains(TickFlags::OVERRUN | TickFlags::TELEMETRY_DROPPED));
        assert!(!flags.intersects(TickFlags::TELEMETRY_SENT | TickFlags::TELEMETRY_FAILED));
    }

    let stats = runner.stats();
    assert_eq!(stats.cycle_count, 4);
    assert_eq!(stats.overruns, 4);
    assert_eq!(stats.telemetry_dropped, 4);
    assert_eq!(stats.telemetry_sent, 0);
    assert!(stats.max_overrun_ns >= 3_000_000);
    assert!(runner.core().platform().telemetry.is_empty());
    // Control output is unaffected by the overruns.
    assert_eq!(runner.core().tick_count(), 4);
    assert_eq!(runner.core().launcher_state(), LauncherState::Trap);
    assert!(runner.step().is_some());
}

#[test]
fn failing_sink_is_counted_and_control_continues() {
    let platform = SimPlatform::new(DT, SimExecutor::manual(), DeadSink);
    let core = RobotCore::from_config(platform, &config()).unwrap();
    let mut runner = CycleRunner::new(
        core,
        ScriptedStation::from_toml(SHORT_MATCH).unwrap(),
        &CycleConfig::default(),
    );

    let mut failed = 0;
    while let Some(flags) = runner.step() {
        assert!(!flags.contains(TickFlags::TELEMETRY_SENT));
        if flags.contains(TickFlags::TELEMETRY_FAILED) {
            failed += 1;
        }
    }

    let stats = runner.stats();
    assert_eq!(stats.cycle_count, 10);
    assert_eq!(stats.telemetry_failed, failed);
    assert_eq!(stats.telemetry_failed + stats.telemetry_dropped, 10);
    assert_eq!(runner.core().telemetry().failures(), failed);
    assert_eq!(runner.core().tick_count(), 10);
    assert_eq!(runner.core().mode(), RobotMode::Teleop);
    assert_eq!(runner.core().launcher_state(), LauncherState::Amp);
}
