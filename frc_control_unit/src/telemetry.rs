//! Telemetry module root.
//!
//! Read-only summary of the control state published after the critical
//! path of each tick. Publishing is best effort: a frame may be dropped
//! under time pressure and sink failures never reach the control logic.

pub mod adapter;
pub mod labels;
pub mod sinks;
