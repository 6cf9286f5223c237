//! # FRC Control Unit Library
//!
//! Periodic control core for a competition robot. Every 20 ms tick samples
//! the operating mode and controller input, runs the subsystem state
//! machines, arbitrates actuator ownership between the driver, one-shot
//! tasks and the autonomous routine, and publishes telemetry.
//!
//! ## Layers
//!
//! 1. **RobotMode**: Disabled / Autonomous / Teleop / Test, with entry actions
//! 2. **Subsystem machines**: launcher, intake, climber, drivebase
//! 3. **Task Arbiter**: per-group ownership: Manual, Autonomous, OneShot
//!
//! ## Bounded Tick
//!
//! The tick never blocks. Per-tick buffers (instructions, telemetry frame)
//! are fixed-capacity `heapless` vectors; the platform is injected as a
//! generic [`platform::Platform`] so there are no global instances.

pub mod autonomous;
pub mod command;
pub mod config;
pub mod cycle;
pub mod input;
pub mod platform;
pub mod robot;
pub mod sim;
pub mod state;
pub mod telemetry;
