//! Drivebase value types: field pose and per-tick drive command.

use serde::{Deserialize, Serialize};

/// Field pose used for odometry resets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose2d {
    /// X position [m].
    pub x_m: f64,
    /// Y position [m].
    pub y_m: f64,
    /// Heading [deg].
    #[serde(default)]
    pub heading_deg: f64,
}

impl Pose2d {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x_m: f64, y_m: f64, heading_deg: f64) -> Self {
        Self {
            x_m,
            y_m,
            heading_deg,
        }
    }
}

/// Normalized chassis speed request for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriveCommand {
    /// Forward speed, [-1, 1].
    pub x_speed: f64,
    /// Leftward speed, [-1, 1].
    pub y_speed: f64,
    /// Rotation rate, [-1, 1].
    pub rotation: f64,
    /// Interpret speeds in the field frame instead of the robot frame.
    pub field_relative: bool,
}

impl DriveCommand {
    /// Zero speed, field relative.
    pub const STOP: Self = Self {
        x_speed: 0.0,
        y_speed: 0.0,
        rotation: 0.0,
        field_relative: true,
    };
}
