//! Protection-key lock gate
//!
//! The SCU is unlocked while the key cell holds a non-zero value. Writes to
//! the guarded range while locked are reported; whether they are also
//! dropped depends on the gate's enforcement.

use std::ops::Range;

use crate::config::LockEnforcement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Register is outside the guarded range
    Unguarded,
    Unlocked,
    Locked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockGate {
    /// Index of the protection-key cell
    pub key: usize,
    /// Register indices the key protects
    pub guarded: Range<usize>,
    pub enforcement: LockEnforcement,
}

impl LockGate {
    pub fn is_unlocked(&self, regs: &[u32]) -> bool {
        regs.get(self.key).is_some_and(|&key| key != 0)
    }

    pub fn guards(&self, reg: usize) -> bool {
        self.guarded.contains(&reg)
    }

    /// Lock state as seen by a write to register `reg`
    pub fn check(&self, regs: &[u32], reg: usize) -> LockState {
        if !self.guards(reg) {
            LockState::Unguarded
        } else if self.is_unlocked(regs) {
            LockState::Unlocked
        } else {
            LockState::Locked
        }
    }

    /// Whether a write that found the SCU locked must be dropped
    pub fn blocks(&self, override_with: Option<LockEnforcement>) -> bool {
        override_with.unwrap_or(self.enforcement) == LockEnforcement::Block
    }
}
