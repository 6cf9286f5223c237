//! Control scheme: which controller inputs drive which action.
//!
//! Launcher and intake bindings read the operator controller; drive and
//! climber bindings read the driver controller. Alternate control schemes
//! are expressed by changing these bindings in the `[scheme]` config
//! section rather than by swapping code paths.

use serde::{Deserialize, Serialize};

use frc_common::consts::{DEFAULT_INTAKE_DEADBAND, DEFAULT_SHOOT_THRESHOLD};
use frc_common::input::{Axis, Button};

/// Input bindings and thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlScheme {
    // ── Operator: launcher ──
    /// Axis that requests the Shoot task while above `shoot_threshold`.
    pub shoot_axis: Axis,
    /// Level above which `shoot_axis` (and `abort_axis`) count as pressed.
    pub shoot_threshold: f64,
    /// Axis that aborts Shoot/Handoff and turns the launcher off.
    pub abort_axis: Axis,
    /// Whether `abort_axis` is bound at all.
    pub abort_enabled: bool,

    // ── Operator: intake ──
    /// Stick axis whose magnitude runs the intake.
    pub intake_axis: Axis,
    /// Magnitude at or below which the intake stops.
    pub intake_deadband: f64,
    /// Held: force the intake to stop.
    pub intake_stop: Button,
    /// Rising edge flips the intake reverse flag.
    pub intake_reverse_toggle: Button,
    /// Held: request the Handoff task.
    pub handoff: Button,

    // ── Driver: drivebase + climber ──
    /// Rising edge flips robot-relative driving.
    pub robot_relative_toggle: Button,
    /// Held: lock wheels (rising edge also resets the pose).
    pub lock_wheels: Button,
    /// Held: climber up.
    pub climber_up: Button,
    /// Held: climber down.
    pub climber_down: Button,
    /// Scale applied to all drive stick axes, (0, 1].
    pub drive_scale: f64,
}

impl Default for ControlScheme {
    fn default() -> Self {
        Self {
            shoot_axis: Axis::RightTrigger,
            shoot_threshold: DEFAULT_SHOOT_THRESHOLD,
            abort_axis: Axis::LeftTrigger,
            abort_enabled: true,
            intake_axis: Axis::LeftY,
            intake_deadband: DEFAULT_INTAKE_DEADBAND,
            intake_stop: Button::LeftBumper,
            intake_reverse_toggle: Button::X,
            handoff: Button::RightBumper,
            robot_relative_toggle: Button::Y,
            lock_wheels: Button::A,
            climber_up: Button::RightBumper,
            climber_down: Button::LeftBumper,
            drive_scale: 1.0,
        }
    }
}

impl ControlScheme {
    /// Validate thresholds and binding uniqueness per controller.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.shoot_threshold > 0.0 && self.shoot_threshold < 1.0) {
            return Err(format!(
                "shoot_threshold {} out of range (0, 1)",
                self.shoot_threshold
            ));
        }
        if !(0.0..1.0).contains(&self.intake_deadband) {
            return Err(format!(
                "intake_deadband {} out of range [0, 1)",
                self.intake_deadband
            ));
        }
        if !(self.drive_scale > 0.0 && self.drive_scale <= 1.0) {
            return Err(format!("drive_scale {} out of range (0, 1]", self.drive_scale));
        }
        if !self.shoot_axis.is_trigger() {
            return Err(format!("shoot_axis {:?} must be a trigger", self.shoot_axis));
        }
        if self.abort_enabled && self.abort_axis == self.shoot_axis {
            return Err("abort_axis must differ from shoot_axis".to_string());
        }
        if self.intake_axis.is_trigger() {
            return Err(format!("intake_axis {:?} must be a stick axis", self.intake_axis));
        }

        let operator = [
            ("intake_stop", self.intake_stop),
            ("intake_reverse_toggle", self.intake_reverse_toggle),
            ("handoff", self.handoff),
        ];
        ensure_distinct("operator", &operator)?;

        let driver = [
            ("robot_relative_toggle", self.robot_relative_toggle),
            ("lock_wheels", self.lock_wheels),
            ("climber_up", self.climber_up),
            ("climber_down", self.climber_down),
        ];
        ensure_distinct("driver", &driver)?;
        Ok(())
    }
}

fn ensure_distinct(controller: &str, bindings: &[(&str, Button)]) -> Result<(), String> {
    for (i, (name_a, a)) in bindings.iter().enumerate() {
        for (name_b, b) in &bindings[i + 1..] {
            if a == b {
                return Err(format!(
                    "{controller} bindings {name_a} and {name_b} both use {a:?}"
                ));
            }
        }
    }
    Ok(())
}
