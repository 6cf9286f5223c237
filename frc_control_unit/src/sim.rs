//! Software simulation of the robot and the driver station.
//!
//! Lets the control core run on a development machine without a roboRIO:
//! [`SimPlatform`] stands in for the hardware, [`ScriptedStation`] replays
//! a match script tick by tick.

mod platform;
mod script;

pub use platform::{SimActuator, SimDrivebase, SimExecutor, SimPlatform};
pub use script::{ScriptError, ScriptStep, ScriptedStation};
