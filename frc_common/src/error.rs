//! Command rejection flags.
//!
//! Rejections are never fatal: they are reported back to the caller as
//! bitflags and logged, and the control loop carries on.

use bitflags::bitflags;

bitflags! {
    /// Reasons a one-shot schedule request was not honored.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CommandError: u8 {
        /// One-shot tasks are only accepted in Teleop.
        const MODE_NOT_TELEOP   = 0x01;
        /// A required group is owned by the autonomous routine.
        const AUTONOMOUS_OWNED  = 0x02;
        /// The per-tick instruction buffer is full.
        const BUFFER_FULL       = 0x04;
        /// Another one-shot holds a required group and the request is a
        /// held input, not a new press.
        const ONE_SHOT_ACTIVE   = 0x08;
    }
}

impl Default for CommandError {
    fn default() -> Self {
        Self::empty()
    }
}
