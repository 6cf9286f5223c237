//! Mode controller: Disabled / Autonomous / Teleop / Test.
//!
//! Samples the external mode signal once per tick. A change produces a
//! [`ModeTransition`] whose [`EntryActions`] the control core executes
//! before anything else that tick. Every mode is reachable from every
//! other; the entry actions depend only on the target mode.

use bitflags::bitflags;
use tracing::info;

use frc_common::state::RobotMode;

use crate::autonomous::AutoSession;

bitflags! {
    /// Side effects of entering a mode, in execution order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EntryActions: u16 {
        /// Cancel one-shots and the routine, force ownership to Manual,
        /// drop pending targets.
        const CANCEL_ALL        = 0x0001;
        /// Cancel the routine, release its groups and apply pending targets.
        const CANCEL_ROUTINE    = 0x0002;
        /// Launcher Off, intake Stop, climber Off, zero drive command.
        const SAFE_OUTPUTS      = 0x0004;
        /// Drop a held wheel lock.
        const RELEASE_LOCK      = 0x0008;
        /// Clear every toggle flag.
        const CLEAR_TOGGLES     = 0x0010;
        /// Give Autonomous every actuator group until the mode is left.
        const HOLD_GROUPS       = 0x0020;
        /// Reset the pose to the selected routine's start pose.
        const RESET_POSE        = 0x0040;
        /// Start the selected routine.
        const START_ROUTINE     = 0x0080;
    }
}

/// A change of operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    pub from: RobotMode,
    pub to: RobotMode,
}

impl ModeTransition {
    /// Actions to run on entering `self.to`.
    pub const fn entry_actions(&self) -> EntryActions {
        match self.to {
            RobotMode::Disabled => EntryActions::CANCEL_ALL
                .union(EntryActions::SAFE_OUTPUTS)
                .union(EntryActions::CLEAR_TOGGLES),
            RobotMode::Autonomous => EntryActions::CLEAR_TOGGLES
                .union(EntryActions::HOLD_GROUPS)
                .union(EntryActions::RESET_POSE)
                .union(EntryActions::START_ROUTINE),
            RobotMode::Teleop => EntryActions::CANCEL_ROUTINE
                .union(EntryActions::RELEASE_LOCK)
                .union(EntryActions::CLEAR_TOGGLES),
            RobotMode::Test => EntryActions::CANCEL_ALL.union(EntryActions::CLEAR_TOGGLES),
        }
    }
}

/// Current mode plus the autonomous session.
#[derive(Debug, Clone, Default)]
pub struct ModeController {
    mode: RobotMode,
    session: AutoSession,
    transitions: u64,
}

impl ModeController {
    pub fn new(session: AutoSession) -> Self {
        Self {
            mode: RobotMode::Disabled,
            session,
            transitions: 0,
        }
    }

    #[inline]
    pub const fn mode(&self) -> RobotMode {
        self.mode
    }

    /// Feed this tick's mode signal.
    pub fn sample(&mut self, signal: RobotMode) -> Option<ModeTransition> {
        if signal == self.mode {
            return None;
        }
        let transition = ModeTransition {
            from: self.mode,
            to: signal,
        };
        info!(from = ?transition.from, to = ?transition.to, "mode transition");
        self.mode = signal;
        self.transitions += 1;
        Some(transition)
    }

    /// Transitions seen since startup.
    #[inline]
    pub const fn transitions(&self) -> u64 {
        self.transitions
    }

    #[inline]
    pub fn session(&self) -> &AutoSession {
        &self.session
    }

    #[inline]
    pub fn session_mut(&mut self) -> &mut AutoSession {
        &mut self.session
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
