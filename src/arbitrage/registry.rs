//! Seen-Order Registry
//!
//! Process-lifetime set of order identities that have entered evaluation.
//! An order is marked before any network call is made for it, so an identity
//! is evaluated at most once whether or not it turned out to be profitable.
//! Nothing is ever evicted.

use alloy::primitives::B256;
use dashmap::DashSet;

#[derive(Debug, Default)]
pub struct SeenOrders {
    seen: DashSet<B256>,
}

impl SeenOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_seen(&self, id: &B256) -> bool {
        self.seen.contains(id)
    }

    /// Idempotent
    pub fn mark_seen(&self, id: B256) {
        self.seen.insert(id);
    }

    /// Atomically mark `id`. Returns true if this call inserted it (first sighting).
    pub fn check_and_mark(&self, id: B256) -> bool {
        self.seen.insert(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
