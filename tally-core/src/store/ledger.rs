//! `CountLedger` — in-memory per-item counts.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{apply_operation, CountStore};
use crate::error::Result;
use crate::ipc::Operation;

/// Cloneable handle to a shared item → count map. Unknown items start at 0.
#[derive(Debug, Clone, Default)]
pub struct CountLedger {
    counts: Arc<Mutex<BTreeMap<String, u32>>>,
}

impl CountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every count, ordered by item name.
    pub fn snapshot(&self) -> BTreeMap<String, u32> {
        self.counts.lock().clone()
    }
}

impl CountStore for CountLedger {
    fn apply(&self, item: &str, operation: Operation, value: u32) -> Result<u32> {
        let mut counts = self.counts.lock();
        let slot = counts.entry(item.to_string()).or_insert(0);
        *slot = apply_operation(*slot, operation, value);
        Ok(*slot)
    }

    fn get(&self, item: &str) -> Option<u32> {
        self.counts.lock().get(item).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_items_start_at_zero() {
        let ledger = CountLedger::new();
        assert_eq!(ledger.get("RIBS"), None);
        assert_eq!(ledger.apply("RIBS", Operation::Subtract, 3).expect("apply"), 0);
        assert_eq!(ledger.apply("RIBS", Operation::Add, 3).expect("apply"), 3);
    }

    #[test]
    fn snapshot_is_ordered() {
        let ledger = CountLedger::new();
        ledger.apply("WINGS", Operation::Set, 1).expect("apply");
        ledger.apply("BEEF", Operation::Set, 2).expect("apply");
        let keys: Vec<String> = ledger.snapshot().into_keys().collect();
        assert_eq!(keys, ["BEEF", "WINGS"]);
    }
}
