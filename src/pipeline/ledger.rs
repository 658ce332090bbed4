//! Deduplication ledger of guests recorded during this run.
//!
//! The ledger lives in memory only. It grows for the lifetime of the process
//! and is never pruned; a restart starts from an empty ledger, so a guest seen
//! before the restart is recorded again the next time it is announced.

use std::collections::HashSet;

use crate::models::GuestIdentity;

/// Set of guest identities already persisted.
#[derive(Debug, Default)]
pub struct GuestLedger {
    seen: HashSet<GuestIdentity>,
}

impl GuestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identity: &GuestIdentity) -> bool {
        self.seen.contains(identity)
    }

    /// Mark a guest as persisted. Returns `false` if it was already present.
    pub fn record(&mut self, identity: GuestIdentity) -> bool {
        self.seen.insert(identity)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_contains() {
        let mut ledger = GuestLedger::new();
        let guest = GuestIdentity::new("AA:BB", "10.0.0.5");

        assert!(!ledger.contains(&guest));
        assert!(ledger.record(guest.clone()));
        assert!(ledger.contains(&guest));
        assert!(!ledger.record(guest));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_same_mac_new_ip_is_distinct() {
        let mut ledger = GuestLedger::new();
        ledger.record(GuestIdentity::new("AA:BB", "10.0.0.5"));

        assert!(!ledger.contains(&GuestIdentity::new("AA:BB", "10.0.0.6")));
    }
}
