//! Actuator group ownership.
//!
//! One [`OwnershipSlot`] per actuator group records who may currently drive
//! it. Acquisition rules:
//!
//! - a Manual slot can be taken by anyone;
//! - Autonomous always wins and preempts a one-shot owner;
//! - a one-shot preempts another one-shot owner;
//! - a one-shot is rejected while Autonomous holds the slot.
//!
//! Only the task arbiter mutates these slots.

use heapless::Vec;

use frc_common::command::{ManualTarget, Owner, OwnershipSlot, TaskId};
use frc_common::consts::ACTUATOR_GROUP_COUNT;
use frc_common::state::{ActuatorGroup, ActuatorGroups};

/// Result of an ownership operation on one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipResult {
    /// Slot granted (or already held by the caller).
    Acquired,
    /// Slot granted; the one-shot task that held it must be cancelled.
    Preempted(TaskId),
    /// Slot returned to Manual.
    Released,
    /// Operation rejected, slot held by another owner.
    Rejected { held_by: Owner },
    /// Caller did not hold the slot, release ignored.
    NotHeld,
}

/// Attempt to take a slot for `owner`.
pub fn try_acquire(slot: &mut OwnershipSlot, owner: Owner) -> OwnershipResult {
    let result = match (slot.owner, owner) {
        (current, requested) if current == requested => OwnershipResult::Acquired,
        (Owner::Manual, _) => OwnershipResult::Acquired,
        (Owner::OneShot(previous), _) => OwnershipResult::Preempted(previous),
        (held_by, _) => return OwnershipResult::Rejected { held_by },
    };
    slot.grant(owner);
    result
}

/// Return a slot to Manual if `owner` holds it.
///
/// A pending manual target recorded while the slot was held is handed back
/// to the caller for dispatch.
pub fn try_release(
    slot: &mut OwnershipSlot,
    owner: Owner,
) -> (OwnershipResult, Option<ManualTarget>) {
    if slot.is_held_by(owner) && !slot.is_manual() {
        let pending = slot.revert_to_manual();
        (OwnershipResult::Released, pending)
    } else if slot.is_manual() {
        (OwnershipResult::NotHeld, None)
    } else {
        (OwnershipResult::Rejected { held_by: slot.owner }, None)
    }
}

/// Pending targets handed back by a bulk release.
pub type PendingTargets = Vec<ManualTarget, ACTUATOR_GROUP_COUNT>;

/// Ownership of all actuator groups.
#[derive(Debug, Clone, Default)]
pub struct OwnershipTable {
    slots: [OwnershipSlot; ACTUATOR_GROUP_COUNT],
}

impl OwnershipTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn slot(&self, group: ActuatorGroup) -> &OwnershipSlot {
        &self.slots[group.index()]
    }

    #[inline]
    pub fn slot_mut(&mut self, group: ActuatorGroup) -> &mut OwnershipSlot {
        &mut self.slots[group.index()]
    }

    #[inline]
    pub fn owner(&self, group: ActuatorGroup) -> Owner {
        self.slot(group).owner
    }

    /// Whether Autonomous holds any of `groups`.
    pub fn autonomous_holds_any(&self, groups: ActuatorGroups) -> bool {
        groups
            .groups()
            .any(|g| self.slot(g).is_held_by(Owner::Autonomous))
    }

    /// Release every slot held by `owner`, collecting pending targets.
    pub fn release_all_of(&mut self, owner: Owner) -> PendingTargets {
        let mut pending = PendingTargets::new();
        for slot in self.slots.iter_mut() {
            if let (OwnershipResult::Released, Some(target)) = try_release(slot, owner) {
                // At most one pending target per slot, capacity matches.
                let _ = pending.push(target);
            }
        }
        pending
    }

    /// Return every slot to Manual and drop all pending targets.
    pub fn force_release_all(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.force_release();
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
