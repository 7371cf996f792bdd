//! Opportunity Gate
//!
//! One-shot latch: the first profitable evaluation to claim it owns the single
//! execution slot for the rest of the process. There is no reset.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct OpportunityGate {
    claimed: AtomicBool,
}

impl OpportunityGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true for exactly one caller over the lifetime of the gate
    pub fn try_claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }
}
