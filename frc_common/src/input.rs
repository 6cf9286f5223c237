//! Input snapshot types.
//!
//! One immutable [`InputSnapshot`] is produced per tick by the driver
//! station layer and consumed read-only by the control core. All types are
//! `Copy` so a snapshot can be retained as the "previous tick" for edge
//! detection without allocation.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Logical role of a controller on the driver station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ControllerRole {
    /// Port 0: drivebase and climber.
    Driver = 0,
    /// Port 1: launcher and intake.
    Operator = 1,
}

impl ControllerRole {
    /// Driver station port index.
    #[inline]
    pub const fn port(self) -> usize {
        self as usize
    }
}

bitflags! {
    /// Momentary button state of one controller.
    ///
    /// Serialized as a `|`-separated list of flag names (e.g. `"A | RIGHT_BUMPER"`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Buttons: u16 {
        const A            = 0x0001;
        const B            = 0x0002;
        const X            = 0x0004;
        const Y            = 0x0008;
        const LEFT_BUMPER  = 0x0010;
        const RIGHT_BUMPER = 0x0020;
        const LEFT_STICK   = 0x0040;
        const RIGHT_STICK  = 0x0080;
        const BACK         = 0x0100;
        const START        = 0x0200;
    }
}

/// A single button, as named in control-scheme bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    A,
    B,
    X,
    Y,
    LeftBumper,
    RightBumper,
    LeftStick,
    RightStick,
    Back,
    Start,
}

impl Button {
    /// Flag for this button inside [`Buttons`].
    pub const fn flag(self) -> Buttons {
        match self {
            Self::A => Buttons::A,
            Self::B => Buttons::B,
            Self::X => Buttons::X,
            Self::Y => Buttons::Y,
            Self::LeftBumper => Buttons::LEFT_BUMPER,
            Self::RightBumper => Buttons::RIGHT_BUMPER,
            Self::LeftStick => Buttons::LEFT_STICK,
            Self::RightStick => Buttons::RIGHT_STICK,
            Self::Back => Buttons::BACK,
            Self::Start => Buttons::START,
        }
    }
}

/// A continuous controller axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    LeftTrigger,
    RightTrigger,
}

impl Axis {
    /// Triggers report [0, 1]; sticks report [-1, 1].
    #[inline]
    pub const fn is_trigger(self) -> bool {
        matches!(self, Self::LeftTrigger | Self::RightTrigger)
    }
}

/// Directional pad reading.
///
/// Raw driver station values are `-1` (centered) or an angle in degrees.
/// Only multiples of 45 in `[0, 315]` are recognized angles; anything else
/// is kept as [`Pov::Unrecognized`] so consumers can ignore it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum Pov {
    #[default]
    Centered,
    Angle(u16),
    Unrecognized(i32),
}

impl From<i32> for Pov {
    fn from(raw: i32) -> Self {
        match raw {
            -1 => Self::Centered,
            0..=315 if raw % 45 == 0 => Self::Angle(raw as u16),
            _ => Self::Unrecognized(raw),
        }
    }
}

impl From<Pov> for i32 {
    fn from(pov: Pov) -> Self {
        match pov {
            Pov::Centered => -1,
            Pov::Angle(deg) => i32::from(deg),
            Pov::Unrecognized(raw) => raw,
        }
    }
}

/// One controller's state for a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSnapshot {
    pub left_x: f64,
    pub left_y: f64,
    pub right_x: f64,
    pub right_y: f64,
    pub left_trigger: f64,
    pub right_trigger: f64,
    pub buttons: Buttons,
    pub pov: Pov,
}

impl ControllerSnapshot {
    /// Sanitized axis value: NaN reads as 0, sticks clamp to [-1, 1],
    /// triggers clamp to [0, 1].
    pub fn axis(&self, axis: Axis) -> f64 {
        let raw = match axis {
            Axis::LeftX => self.left_x,
            Axis::LeftY => self.left_y,
            Axis::RightX => self.right_x,
            Axis::RightY => self.right_y,
            Axis::LeftTrigger => self.left_trigger,
            Axis::RightTrigger => self.right_trigger,
        };
        if raw.is_nan() {
            return 0.0;
        }
        if axis.is_trigger() {
            raw.clamp(0.0, 1.0)
        } else {
            raw.clamp(-1.0, 1.0)
        }
    }

    #[inline]
    pub fn pressed(&self, button: Button) -> bool {
        self.buttons.contains(button.flag())
    }
}

/// All controller input valid for exactly one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSnapshot {
    pub driver: ControllerSnapshot,
    pub operator: ControllerSnapshot,
}

impl InputSnapshot {
    /// Controller by role.
    #[inline]
    pub fn controller(&self, role: ControllerRole) -> &ControllerSnapshot {
        match role {
            ControllerRole::Driver => &self.driver,
            ControllerRole::Operator => &self.operator,
        }
    }
}

static_assertions::assert_impl_all!(InputSnapshot: Copy, Send, Sync);
