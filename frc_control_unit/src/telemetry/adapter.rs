//! Builds the per-tick telemetry frame and watches subsystem connections.

use tracing::{info, warn};

use frc_common::consts::ACTUATOR_GROUP_COUNT;
use frc_common::state::{
    ActuatorGroup, ClimberState, DriveMode, IntakeState, LauncherState, RobotMode,
};
use frc_common::telemetry::{DiagnosticFlags, Diagnostics, TelemetryFrame};

use super::labels::{self, keys};
use crate::platform::TelemetrySink;

/// Sensor readings gathered from the platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubsystemReadings {
    pub drivebase: Diagnostics,
    pub launcher: Diagnostics,
    pub intake: Diagnostics,
    pub climber: Diagnostics,
    pub translational_velocity: f64,
}

impl SubsystemReadings {
    fn by_group(&self, group: ActuatorGroup) -> &Diagnostics {
        match group {
            ActuatorGroup::Drivebase => &self.drivebase,
            ActuatorGroup::Launcher => &self.launcher,
            ActuatorGroup::Intake => &self.intake,
            ActuatorGroup::Climber => &self.climber,
        }
    }
}

/// Control state to publish.
#[derive(Debug, Clone, Copy)]
pub struct ControlSummary<'a> {
    pub mode: RobotMode,
    pub launcher: LauncherState,
    pub intake: IntakeState,
    pub climber: ClimberState,
    pub drive_mode: DriveMode,
    pub shoot_done: bool,
    pub auto_selected: Option<&'a str>,
}

const CONNECTED_KEYS: [&str; ACTUATOR_GROUP_COUNT] = [
    keys::DRIVEBASE_CONNECTED,
    keys::LAUNCHER_CONNECTED,
    keys::INTAKE_CONNECTED,
    keys::CLIMBER_CONNECTED,
];

/// Frame builder plus publish bookkeeping.
#[derive(Debug, Default)]
pub struct TelemetryAdapter {
    connected: [Option<bool>; ACTUATOR_GROUP_COUNT],
    published: u64,
    failures: u64,
}

impl TelemetryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log connection changes. The first reading only logs when a
    /// subsystem starts out disconnected.
    pub fn observe(&mut self, readings: &SubsystemReadings) {
        for group in ActuatorGroup::ALL {
            let now = readings.by_group(group).connected();
            let before = self.connected[group.index()].replace(now);
            match (before, now) {
                (Some(true) | None, false) => warn!(?group, "subsystem disconnected"),
                (Some(false), true) => info!(?group, "subsystem reconnected"),
                _ => {}
            }
        }
    }

    /// Last observed connection state of a group.
    pub fn is_connected(&self, group: ActuatorGroup) -> Option<bool> {
        self.connected[group.index()]
    }

    pub fn build<'a>(
        &self,
        tick: u64,
        summary: &ControlSummary<'a>,
        readings: &SubsystemReadings,
    ) -> TelemetryFrame<'a> {
        let mut frame = TelemetryFrame::new(tick);
        frame.put_text(keys::MODE, labels::mode(summary.mode));
        frame.put_text(keys::LAUNCHER_STATE, labels::launcher(summary.launcher));
        frame.put_text(keys::INTAKE_STATE, labels::intake(summary.intake));
        frame.put_text(keys::CLIMBER_STATE, labels::climber(summary.climber));
        frame.put_text(keys::DRIVE_MODE, labels::drive_mode(summary.drive_mode));
        frame.put_text(
            keys::AUTO_SELECTED,
            summary.auto_selected.unwrap_or(labels::NO_AUTO),
        );
        frame.put_flag(keys::SHOOT_DONE, summary.shoot_done);

        frame.put_number(keys::FLIPPER_CURRENT, readings.intake.current);
        frame.put_number(keys::ROLLER_CURRENT, readings.intake.aux_current);
        frame.put_number(keys::FLIPPER_POSITION, readings.intake.position);
        frame.put_number(keys::PIVOT_CURRENT, readings.launcher.current);
        frame.put_number(keys::LAUNCHER_POSITION, readings.launcher.position);
        frame.put_flag(
            keys::BREAKBEAM,
            readings.launcher.flags.contains(DiagnosticFlags::BREAK_BEAM),
        );
        frame.put_number(keys::TRANSLATIONAL_VELOCITY, readings.translational_velocity);

        for group in ActuatorGroup::ALL {
            frame.put_flag(
                CONNECTED_KEYS[group.index()],
                readings.by_group(group).connected(),
            );
        }
        frame
    }

    /// Hand a frame to the sink. Failures are logged and counted.
    pub fn publish<S: TelemetrySink + ?Sized>(
        &mut self,
        sink: &mut S,
        frame: &TelemetryFrame<'_>,
    ) -> bool {
        match sink.publish(frame) {
            Ok(()) => {
                self.published += 1;
                true
            }
            Err(e) => {
                self.failures += 1;
                warn!(tick = frame.tick, error = %e, "telemetry publish failed");
                false
            }
        }
    }

    #[inline]
    pub fn published(&self) -> u64 {
        self.published
    }

    #[inline]
    pub fn failures(&self) -> u64 {
        self.failures
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
