//! Command module root.
//!
//! Group ownership, task lifecycle and the arbiter that reconciles manual
//! targets, one-shot tasks and the autonomous routine each tick.

pub mod arbitration;
pub mod ownership;
pub mod task;
