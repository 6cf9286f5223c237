//! State machine module root.
//!
//! The mode controller plus one machine per subsystem. Subsystem machines
//! hold the committed state and a pure `evaluate` that maps this tick's
//! input to a request; requests go through the task arbiter and the state
//! is committed only when the platform receives it.

pub mod climber;
pub mod drive;
pub mod intake;
pub mod launcher;
pub mod mode;
